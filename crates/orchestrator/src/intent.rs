//! Intent classification.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::OrchestratorError;

/// Words asking what is in an image (Arabic and English).
pub const ANALYSIS_KEYWORDS: &str =
    r"analyz|تحل|ما في الصورة|ما الموجود|اوصف|وصف|اقرأ|قراءة|describe|what'?s in|what is in|\bread\b";

/// Words asking for a new image (Arabic and English).
pub const GENERATION_KEYWORDS: &str = r"صمم|ارسم|انشئ|انشؤ|create|generate|draw|design|logo|تصميم";

/// The capability a turn needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Plain chat.
    Text,
    /// Produce an image from the text.
    GenerateImage,
    /// Describe the attached image.
    AnalyzeImage,
}

impl Intent {
    /// Wire name of the intent.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Text => "text",
            Intent::GenerateImage => "generate_image",
            Intent::AnalyzeImage => "analyze_image",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a turn to an [`Intent`].
///
/// Implementations must be deterministic and free of side effects.
pub trait IntentClassifier: Send + Sync {
    /// Classify a turn from its text and whether an image is attached.
    fn classify(&self, text: &str, has_image: bool) -> Intent;
}

/// Case-insensitive keyword matcher.
///
/// Rules, in order:
/// 1. image attached and an analysis keyword matches: analyze
/// 2. a generation keyword matches: generate, image or not
/// 3. image attached: analyze
/// 4. otherwise: text
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    analysis: Regex,
    generation: Regex,
}

impl KeywordClassifier {
    /// Build a classifier from the standard keyword sets.
    pub fn standard() -> Result<Self, OrchestratorError> {
        Self::with_patterns(ANALYSIS_KEYWORDS, GENERATION_KEYWORDS)
    }

    /// Build a classifier from custom patterns.
    pub fn with_patterns(analysis: &str, generation: &str) -> Result<Self, OrchestratorError> {
        Ok(Self {
            analysis: compile(analysis)?,
            generation: compile(generation)?,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex, OrchestratorError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| OrchestratorError::Configuration(format!("invalid keyword pattern: {}", e)))
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, text: &str, has_image: bool) -> Intent {
        let intent = if has_image && self.analysis.is_match(text) {
            Intent::AnalyzeImage
        } else if self.generation.is_match(text) {
            Intent::GenerateImage
        } else if has_image {
            Intent::AnalyzeImage
        } else {
            Intent::Text
        };

        trace!(has_image, %intent, "Classified turn");
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> KeywordClassifier {
        KeywordClassifier::standard().unwrap()
    }

    #[test]
    fn test_plain_text() {
        let c = classifier();
        assert_eq!(c.classify("السلام عليكم", false), Intent::Text);
        assert_eq!(c.classify("", false), Intent::Text);
        assert_eq!(c.classify("tell me a joke", false), Intent::Text);
    }

    #[test]
    fn test_generation_ignores_image_flag() {
        let c = classifier();
        assert_eq!(c.classify("ارسم شعار", false), Intent::GenerateImage);
        assert_eq!(c.classify("Design a LOGO for my shop", false), Intent::GenerateImage);
        assert_eq!(c.classify("ارسم شعار", true), Intent::GenerateImage);
    }

    #[test]
    fn test_analysis_needs_image() {
        let c = classifier();
        assert_eq!(c.classify("ما في هذه الصورة", true), Intent::AnalyzeImage);
        assert_eq!(c.classify("please analyze this", true), Intent::AnalyzeImage);
        // Without an image the analysis words are plain text
        assert_eq!(c.classify("analyze the economy", false), Intent::Text);
    }

    #[test]
    fn test_analysis_beats_generation_with_image() {
        let c = classifier();
        assert_eq!(c.classify("describe this logo", true), Intent::AnalyzeImage);
        assert_eq!(c.classify("describe and draw a cat", false), Intent::GenerateImage);
    }

    #[test]
    fn test_image_default() {
        let c = classifier();
        assert_eq!(c.classify("", true), Intent::AnalyzeImage);
        assert_eq!(c.classify("hmm?", true), Intent::AnalyzeImage);
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let err = KeywordClassifier::with_patterns("(", "x").unwrap_err();
        assert!(matches!(err, OrchestratorError::Configuration(_)));
    }

    #[test]
    fn test_intent_wire_names() {
        assert_eq!(
            serde_json::to_string(&Intent::GenerateImage).unwrap(),
            "\"generate_image\""
        );
        assert_eq!(Intent::AnalyzeImage.to_string(), "analyze_image");
    }
}
