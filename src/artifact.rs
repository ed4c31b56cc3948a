//! Artifact persistence for generated audio and documents.
//!
//! Every artifact gets a fresh name,
//! `<prefix>-<unix millis>-<8 hex random>.<ext>`, and is opened with
//! `create_new`, so two concurrent requests can never write the same file.
//! A name collision (same millisecond, same random suffix) is retried with a
//! new name instead of overwriting.
//!
//! Locations returned to clients are `/audio/<name>` and
//! `/documents/<name>`, prefixed with `public_base_url` when one is
//! configured. The HTTP layer serves both directories under those routes.

use crate::config::ServiceConfig;
use crate::error::ConvertError;
use async_trait::async_trait;
use rand::Rng;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Route prefix under which audio artifacts are served.
pub const AUDIO_ROUTE: &str = "/audio";

/// Route prefix under which document artifacts are served.
pub const DOCUMENT_ROUTE: &str = "/documents";

const MAX_NAME_ATTEMPTS: usize = 8;

/// What kind of artifact is being stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// MP3 narration.
    Audio,
    /// `.docx` export of the primary text.
    Document,
}

impl ArtifactKind {
    fn prefix(self) -> &'static str {
        match self {
            ArtifactKind::Audio => "output",
            ArtifactKind::Document => "document",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Audio => "mp3",
            ArtifactKind::Document => "docx",
        }
    }

    pub fn route(self) -> &'static str {
        match self {
            ArtifactKind::Audio => AUDIO_ROUTE,
            ArtifactKind::Document => DOCUMENT_ROUTE,
        }
    }
}

/// Persists artifact bytes and returns their public location.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn store(&self, bytes: &[u8], kind: ArtifactKind) -> Result<String, ConvertError>;

    /// Delete an artifact previously returned by [`ArtifactStore::store`].
    async fn remove(&self, location: &str, kind: ArtifactKind) -> Result<(), ConvertError>;
}

/// [`ArtifactStore`] writing to two local directories.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    audio_dir: PathBuf,
    document_dir: PathBuf,
    public_base_url: Option<String>,
}

impl LocalArtifactStore {
    /// Create the store, creating both directories if needed.
    pub async fn new(
        audio_dir: impl Into<PathBuf>,
        document_dir: impl Into<PathBuf>,
        public_base_url: Option<String>,
    ) -> Result<Self, ConvertError> {
        let store = Self {
            audio_dir: audio_dir.into(),
            document_dir: document_dir.into(),
            public_base_url: public_base_url.map(|u| u.trim_end_matches('/').to_string()),
        };
        for dir in [&store.audio_dir, &store.document_dir] {
            fs::create_dir_all(dir)
                .await
                .map_err(|source| ConvertError::ArtifactWrite {
                    path: dir.clone(),
                    source,
                })?;
        }
        Ok(store)
    }

    pub async fn from_config(config: &ServiceConfig) -> Result<Self, ConvertError> {
        Self::new(
            config.audio_dir.clone(),
            config.document_dir.clone(),
            config.public_base_url.clone(),
        )
        .await
    }

    pub fn dir(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Audio => &self.audio_dir,
            ArtifactKind::Document => &self.document_dir,
        }
    }

    /// Public location of an artifact file name.
    pub fn location(&self, kind: ArtifactKind, name: &str) -> String {
        format!(
            "{}{}/{}",
            self.public_base_url.as_deref().unwrap_or(""),
            kind.route(),
            name
        )
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn store(&self, bytes: &[u8], kind: ArtifactKind) -> Result<String, ConvertError> {
        let dir = self.dir(kind);

        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = artifact_name(kind);
            let path = dir.join(&name);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("Artifact name {} taken, picking another", name);
                    continue;
                }
                Err(source) => return Err(ConvertError::ArtifactWrite { path, source }),
            };

            let written = match file.write_all(bytes).await {
                Ok(()) => file.flush().await,
                Err(e) => Err(e),
            };
            if let Err(source) = written {
                drop(file);
                let _ = fs::remove_file(&path).await;
                return Err(ConvertError::ArtifactWrite { path, source });
            }

            info!("Stored {} bytes at {}", bytes.len(), path.display());
            return Ok(self.location(kind, &name));
        }

        Err(ConvertError::ArtifactWrite {
            path: dir.to_path_buf(),
            source: std::io::Error::new(ErrorKind::AlreadyExists, "no free artifact name"),
        })
    }

    async fn remove(&self, location: &str, kind: ArtifactKind) -> Result<(), ConvertError> {
        let name = location.rsplit('/').next().unwrap_or_default();
        if name.is_empty() || name.starts_with('.') {
            return Err(ConvertError::Internal(format!(
                "not an artifact location: {location}"
            )));
        }

        let path = self.dir(kind).join(name);
        fs::remove_file(&path)
            .await
            .map_err(|source| ConvertError::ArtifactWrite {
                path: path.clone(),
                source,
            })?;
        debug!("Removed artifact {}", path.display());
        Ok(())
    }
}

/// `<prefix>-<unix millis>-<8 hex random>.<ext>`
pub fn artifact_name(kind: ArtifactKind) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let suffix: u32 = rand::rng().random();
    format!("{}-{}-{:08x}.{}", kind.prefix(), millis, suffix, kind.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::collections::HashSet;

    #[test]
    fn names_follow_pattern() {
        let audio = Regex::new(r"^output-\d{13,}-[0-9a-f]{8}\.mp3$").unwrap();
        let doc = Regex::new(r"^document-\d{13,}-[0-9a-f]{8}\.docx$").unwrap();
        assert!(audio.is_match(&artifact_name(ArtifactKind::Audio)));
        assert!(doc.is_match(&artifact_name(ArtifactKind::Document)));
    }

    #[test]
    fn locations_use_routes_and_base_url() {
        let store = LocalArtifactStore {
            audio_dir: "a".into(),
            document_dir: "d".into(),
            public_base_url: None,
        };
        assert_eq!(store.location(ArtifactKind::Audio, "x.mp3"), "/audio/x.mp3");

        let store = LocalArtifactStore {
            public_base_url: Some("https://cast.example.com".into()),
            ..store
        };
        assert_eq!(
            store.location(ArtifactKind::Document, "y.docx"),
            "https://cast.example.com/documents/y.docx"
        );
    }

    #[tokio::test]
    async fn concurrent_stores_never_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(
            LocalArtifactStore::new(tmp.path().join("audio"), tmp.path().join("docs"), None)
                .await
                .unwrap(),
        );

        let mut handles = Vec::new();
        for i in 0..32u8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.store(&[i; 16], ArtifactKind::Audio).await.unwrap()
            }));
        }
        let mut locations = HashSet::new();
        for h in handles {
            locations.insert(h.await.unwrap());
        }
        assert_eq!(locations.len(), 32);

        let files = std::fs::read_dir(tmp.path().join("audio")).unwrap().count();
        assert_eq!(files, 32);
    }

    #[tokio::test]
    async fn stored_bytes_are_readable() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(tmp.path().join("a"), tmp.path().join("d"), None)
            .await
            .unwrap();
        let location = store.store(b"PK-docx", ArtifactKind::Document).await.unwrap();
        let name = location.strip_prefix("/documents/").unwrap();
        let on_disk = std::fs::read(tmp.path().join("d").join(name)).unwrap();
        assert_eq!(on_disk, b"PK-docx");
    }

    #[tokio::test]
    async fn removed_artifacts_are_gone() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(tmp.path().join("a"), tmp.path().join("d"), None)
            .await
            .unwrap();
        let location = store.store(b"ID3", ArtifactKind::Audio).await.unwrap();
        store.remove(&location, ArtifactKind::Audio).await.unwrap();

        assert_eq!(std::fs::read_dir(tmp.path().join("a")).unwrap().count(), 0);
        assert!(store.remove(&location, ArtifactKind::Audio).await.is_err());
        assert!(store.remove("/audio/", ArtifactKind::Audio).await.is_err());
    }
}
