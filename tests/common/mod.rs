//! Recording test doubles shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use doc2cast::pipeline::extract::TextExtractor;
use doc2cast::provider::{CompletionClient, ImageClient, SpeechClient};
use doc2cast::{
    ConvertError, Converter, DocumentFormat, LocalArtifactStore, ProviderError, ServiceConfig,
    ServiceConfigBuilder,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Completion double: records prompts, answers with a fixed reply.
pub struct MockCompletion {
    reply: Result<String, ProviderError>,
    delay: Option<Duration>,
    pub prompts: Mutex<Vec<String>>,
}

impl MockCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            reply: Err(err),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn slow(reply: &str, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::replying(reply)
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}

/// Speech double: records inputs, returns fake MP3 bytes.
pub struct MockSpeech {
    delay: Option<Duration>,
    pub inputs: Mutex<Vec<String>>,
}

pub const FAKE_MP3: &[u8] = b"ID3\x04\x00fake-mp3-frames";

impl MockSpeech {
    pub fn new() -> Self {
        Self {
            delay: None,
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechClient for MockSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        self.inputs.lock().unwrap().push(text.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(FAKE_MP3.to_vec())
    }
}

/// Image double: records prompts, returns a fixed URL.
pub struct MockImage {
    pub prompts: Mutex<Vec<String>>,
}

pub const FAKE_IMAGE_URL: &str = "https://images.example.com/generated/abc.png";

impl MockImage {
    pub fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageClient for MockImage {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(FAKE_IMAGE_URL.to_string())
    }
}

/// Extractor double: returns canned text (or an error) and records the temp
/// path it was handed, so tests can check the file is gone afterwards.
pub struct FakeExtractor {
    text: Option<String>,
    pub calls: Mutex<Vec<(PathBuf, DocumentFormat)>>,
}

impl FakeExtractor {
    pub fn returning(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, DocumentFormat)> {
        self.calls.lock().unwrap().clone()
    }
}

impl TextExtractor for FakeExtractor {
    fn extract(&self, path: &Path, format: DocumentFormat) -> Result<String, ConvertError> {
        assert!(path.exists(), "upload must be spooled before extraction");
        self.calls
            .lock()
            .unwrap()
            .push((path.to_path_buf(), format));
        self.text.clone().ok_or_else(|| ConvertError::Extraction {
            format: format.name().to_string(),
            detail: "corrupt document".to_string(),
        })
    }
}

/// A converter wired to recording doubles and temp artifact directories.
pub struct Harness {
    pub tmp: TempDir,
    pub completion: Arc<MockCompletion>,
    pub speech: Arc<MockSpeech>,
    pub image: Arc<MockImage>,
    pub extractor: Arc<FakeExtractor>,
    pub converter: Arc<Converter>,
}

pub struct HarnessBuilder {
    completion: MockCompletion,
    speech: MockSpeech,
    extractor: FakeExtractor,
    with_image: bool,
    configure: Box<dyn FnOnce(ServiceConfigBuilder) -> ServiceConfigBuilder>,
}

impl HarnessBuilder {
    pub fn completion(mut self, completion: MockCompletion) -> Self {
        self.completion = completion;
        self
    }

    pub fn speech(mut self, speech: MockSpeech) -> Self {
        self.speech = speech;
        self
    }

    pub fn extractor(mut self, extractor: FakeExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn without_image(mut self) -> Self {
        self.with_image = false;
        self
    }

    pub fn config(
        mut self,
        f: impl FnOnce(ServiceConfigBuilder) -> ServiceConfigBuilder + 'static,
    ) -> Self {
        self.configure = Box::new(f);
        self
    }

    pub async fn build(self) -> Harness {
        let tmp = tempfile::tempdir().unwrap();
        let builder = ServiceConfig::builder()
            .audio_dir(tmp.path().join("audio"))
            .document_dir(tmp.path().join("documents"));
        let config = (self.configure)(builder).build().unwrap();

        let store = LocalArtifactStore::from_config(&config).await.unwrap();
        let completion = Arc::new(self.completion);
        let speech = Arc::new(self.speech);
        let image = Arc::new(MockImage::new());
        let extractor = Arc::new(self.extractor);

        let mut converter = Converter::new(completion.clone(), Arc::new(store), config)
            .with_speech(speech.clone())
            .with_extractor(extractor.clone());
        if self.with_image {
            converter = converter.with_image(image.clone());
        }

        Harness {
            tmp,
            completion,
            speech,
            image,
            extractor,
            converter: Arc::new(converter),
        }
    }
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            completion: MockCompletion::replying("mock completion"),
            speech: MockSpeech::new(),
            extractor: FakeExtractor::returning("extracted text"),
            with_image: true,
            configure: Box::new(|b| b),
        }
    }

    pub async fn new() -> Harness {
        Self::builder().build().await
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.tmp.path().join("audio")
    }

    pub fn document_dir(&self) -> PathBuf {
        self.tmp.path().join("documents")
    }

    /// Number of files written to both artifact directories.
    pub fn artifact_count(&self) -> usize {
        [self.audio_dir(), self.document_dir()]
            .iter()
            .map(|d| std::fs::read_dir(d).map(|r| r.count()).unwrap_or(0))
            .sum()
    }

    /// Path on disk of an artifact location such as `/audio/output-….mp3`.
    pub fn artifact_path(&self, location: &str) -> PathBuf {
        if let Some(name) = location.strip_prefix("/audio/") {
            self.audio_dir().join(name)
        } else if let Some(name) = location.strip_prefix("/documents/") {
            self.document_dir().join(name)
        } else {
            panic!("unexpected artifact location {location}")
        }
    }
}

/// `lines` lines of roughly `width` characters.
pub fn slide_text(lines: usize, width: usize) -> String {
    (1..=lines)
        .map(|i| {
            let head = format!("- point {i}: ");
            format!("{head}{}", "x".repeat(width.saturating_sub(head.len())))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A `.docx` holding one paragraph per entry, built in memory.
pub fn docx_fixture(paragraphs: &[&str]) -> Vec<u8> {
    use std::io::Write;

    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
        .collect();
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{body}</w:body></w:document>"
    );

    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::default();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(document.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}
