//! Prompt templates for every known conversion mode.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth**: rewording a mode touches exactly one place.
//!
//! 2. **Testability**: tests inspect the exact prompt sent to the provider
//!    without a live model, so prompt regressions are caught early.
//!
//! Every template has exactly one content slot: the text before it
//! (`head`) and the text after it (`tail`). Keeping the two halves apart,
//! instead of substituting a placeholder, means user-supplied mode labels
//! containing `{content}` cannot create a second slot.

use std::borrow::Cow;
use std::fmt;

/// A prompt with a single content slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    head: Cow<'static, str>,
    tail: Cow<'static, str>,
}

impl PromptTemplate {
    /// Template from static halves.
    pub const fn fixed(head: &'static str, tail: &'static str) -> Self {
        Self {
            head: Cow::Borrowed(head),
            tail: Cow::Borrowed(tail),
        }
    }

    /// Literal instruction prefix: `"<label>: <content>"`.
    pub fn prefix(label: &str) -> Self {
        Self {
            head: Cow::Owned(format!("{label}: ")),
            tail: Cow::Borrowed(""),
        }
    }

    /// Substitute `content` into the slot.
    pub fn render(&self, content: &str) -> String {
        let mut out = String::with_capacity(self.head.len() + content.len() + self.tail.len());
        out.push_str(&self.head);
        out.push_str(content);
        out.push_str(&self.tail);
        out
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<content>{}", self.head, self.tail)
    }
}

/// `summarize concisely`: the label doubles as the instruction.
pub const SUMMARIZE: PromptTemplate = PromptTemplate::fixed("summarize concisely:\n\n", "");

/// `structure for comprehension`.
pub const STRUCTURE: PromptTemplate = PromptTemplate::fixed(
    "structure for comprehension: reorganise the following content so a student \
can grasp it quickly. Use short headings, bullet points for the key ideas, \
define any technical term the first time it appears and finish with a \
three-sentence recap. Keep every fact and do not add new ones.\n\n",
    "",
);

/// `turn into a story`.
pub const STORY: PromptTemplate = PromptTemplate::fixed(
    "turn into a story: retell the following content as an engaging short story \
with characters, a setting and a clear beginning, middle and end. Every key \
idea of the original must appear in the story.\n\n",
    "",
);

/// `produce a podcast script`: only used when the content looks like slides.
///
/// Bullet fragments read aloud verbatim sound robotic, so they are first
/// restated as continuous speech.
pub const PODCAST_REWRITE: PromptTemplate = PromptTemplate::fixed(
    "The following text was extracted from presentation slides. Rewrite it as \
natural spoken language for a single podcast host: full sentences, smooth \
transitions between points, no bullet symbols, headings or slide numbers. \
Reply with the narration only.\n\n\"\"\"\n",
    "\n\"\"\"",
);

/// `describe as an image`.
pub const ILLUSTRATE: PromptTemplate = PromptTemplate::fixed(
    "A clear, friendly educational illustration that visualises the main idea \
of the following text. No written words in the image.\n\n",
    "",
);
