//! Mode routing: user-facing label → transformation strategy + prompt.
//!
//! Labels are matched exactly and case-sensitively against a fixed table.
//! Anything else becomes [`Mode::Custom`], whose label is used verbatim as an
//! instruction prefix; free-text modes are a supported feature, not an
//! error path.

use crate::prompts::{self, PromptTemplate};
use serde::Serialize;
use std::fmt;

/// Label applied when a request does not name a mode.
pub const DEFAULT_MODE_LABEL: &str = "summarize concisely";

/// Known conversion modes plus the free-text fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// `summarize concisely`
    Summarize,
    /// `structure for comprehension`
    Structure,
    /// `turn into a story`
    Story,
    /// `produce a podcast script`
    Podcast,
    /// `describe as an image`
    Illustrate,
    /// Any other label, used as a literal prompt prefix.
    Custom(String),
}

impl Mode {
    /// Every known mode, in display order.
    pub const KNOWN: [Mode; 5] = [
        Mode::Summarize,
        Mode::Structure,
        Mode::Story,
        Mode::Podcast,
        Mode::Illustrate,
    ];

    /// Exact, case-sensitive label lookup.
    pub fn from_label(label: &str) -> Self {
        match label {
            "summarize concisely" => Mode::Summarize,
            "structure for comprehension" => Mode::Structure,
            "turn into a story" => Mode::Story,
            "produce a podcast script" => Mode::Podcast,
            "describe as an image" => Mode::Illustrate,
            other => Mode::Custom(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Mode::Summarize => "summarize concisely",
            Mode::Structure => "structure for comprehension",
            Mode::Story => "turn into a story",
            Mode::Podcast => "produce a podcast script",
            Mode::Illustrate => "describe as an image",
            Mode::Custom(label) => label,
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Mode::Summarize | Mode::Custom(_) => Strategy::PlainCompletion,
            Mode::Structure => Strategy::StructuredRewrite,
            Mode::Story => Strategy::NarrativeRewrite,
            Mode::Podcast => Strategy::SpeechSynthesis,
            Mode::Illustrate => Strategy::ImageGeneration,
        }
    }

    fn template(&self) -> PromptTemplate {
        match self {
            Mode::Summarize => prompts::SUMMARIZE,
            Mode::Structure => prompts::STRUCTURE,
            Mode::Story => prompts::STORY,
            Mode::Podcast => prompts::PODCAST_REWRITE,
            Mode::Illustrate => prompts::ILLUSTRATE,
            Mode::Custom(label) => PromptTemplate::prefix(label),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the pipeline transforms content for a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One completion call; output returned verbatim.
    PlainCompletion,
    /// One completion call asking for a study-friendly structure.
    StructuredRewrite,
    /// One completion call asking for a story.
    NarrativeRewrite,
    /// Optional slide rewrite, then one speech call.
    SpeechSynthesis,
    /// One image-generation call.
    ImageGeneration,
}

/// The resolved plan for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeDecision {
    pub mode: Mode,
    pub strategy: Strategy,
    /// For [`Strategy::SpeechSynthesis`] this is the slide-rewrite prompt,
    /// used only when the content is slide-like.
    pub template: PromptTemplate,
}

/// Resolve a mode label, falling back to `default_label` when absent.
///
/// An empty label is a (custom) label, not an absent one.
pub fn route(label: Option<&str>, default_label: &str) -> ModeDecision {
    let mode = Mode::from_label(label.unwrap_or(default_label));
    ModeDecision {
        strategy: mode.strategy(),
        template: mode.template(),
        mode,
    }
}
