//! Image name policy.
//!
//! A single rule: whether a container image reference contains a configured
//! substring. The [`Polarity`] decides what a match means:
//! - `DenyIfContains`: any matching image rejects the workload
//! - `AllowOnlyIfNotContains`: the workload is admitted only if some image does not match

mod matcher;

pub use matcher::{ALLOWED_REASON, NO_IMAGES_REASON, evaluate};

/// Which image-match outcome implies denial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[clap(rename_all = "kebab_case")]
pub enum Polarity {
    /// Deny on the first image containing the substring.
    DenyIfContains,
    /// Allow on the first image not containing the substring.
    AllowOnlyIfNotContains,
}

/// Policy applied to every review.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    match_substring: String,
    polarity: Polarity,
}

impl PolicyConfig {
    pub fn new(match_substring: impl Into<String>, polarity: Polarity) -> Self {
        Self {
            match_substring: match_substring.into(),
            polarity,
        }
    }

    /// Substring tested against each image reference. May be empty, which matches every image.
    pub fn match_substring(&self) -> &str {
        &self.match_substring
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }
}

/// Outcome of evaluating a review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the workload may be admitted
    pub allowed: bool,
    /// Human-readable justification, always populated
    pub reason: String,
}

impl Verdict {
    /// Create an allowed verdict
    pub fn allowed(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
        }
    }

    /// Create a denied verdict
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}
