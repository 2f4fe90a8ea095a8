//! Failure policy per call site.
//!
//! Tool failures on the image paths are shown to the user, plain-chat and
//! title failures are masked, and missing credentials abort the turn. The
//! table below is the single place that decides this.

use std::fmt::Display;

use serde::Serialize;
use tracing::warn;

use crate::error::OrchestratorError;

/// Where a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallSite {
    /// The image generation service call.
    ImageGeneration,
    /// The image analysis service call.
    ImageAnalysis,
    /// Any step of the plain-chat path (facts, prompt, model).
    PlainChat,
    /// Conversation title generation.
    TitleGeneration,
    /// A required credential was missing when a service was called.
    Credentials,
}

/// What to do with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Return `{success: false, error}` to the caller.
    SurfaceToCaller,
    /// Log it and return a fixed substitute as a success.
    LogAndMask,
    /// Abort with an error.
    FailFast,
}

impl CallSite {
    /// The policy for this call site.
    pub const fn policy(self) -> FailurePolicy {
        match self {
            CallSite::ImageGeneration | CallSite::ImageAnalysis => FailurePolicy::SurfaceToCaller,
            CallSite::PlainChat | CallSite::TitleGeneration => FailurePolicy::LogAndMask,
            CallSite::Credentials => FailurePolicy::FailFast,
        }
    }

    /// Apply this call site's policy to `error`.
    ///
    /// Masked failures are logged here so callers only supply the substitute.
    pub fn handle(self, error: &dyn Display) -> Disposition {
        match self.policy() {
            FailurePolicy::SurfaceToCaller => Disposition::Surface(error.to_string()),
            FailurePolicy::LogAndMask => {
                warn!(call_site = ?self, "Masking failure: {}", error);
                Disposition::Masked
            }
            FailurePolicy::FailFast => Disposition::Abort(error.to_string()),
        }
    }
}

/// The decision for one failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Report the message to the caller as an unsuccessful turn.
    Surface(String),
    /// Replace the result with a fixed substitute.
    Masked,
    /// Abort with a configuration error.
    Abort(String),
}

impl Disposition {
    /// Resolve for call sites that return a value: masked failures become
    /// `substitute()`, the others become errors.
    pub fn or_mask<T>(self, substitute: impl FnOnce() -> T) -> Result<T, OrchestratorError> {
        match self {
            Disposition::Masked => Ok(substitute()),
            Disposition::Surface(message) => Err(OrchestratorError::ToolFailed(message)),
            Disposition::Abort(message) => Err(OrchestratorError::Configuration(message)),
        }
    }
}
