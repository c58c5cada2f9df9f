//! Substring matcher over container image references.
//!
//! Image references are opaque strings: no registry, tag or digest parsing.

use super::{Polarity, PolicyConfig, Verdict};

/// Reason attached to every allowed verdict
pub const ALLOWED_REASON: &str = "Image name is allowed";

/// Reason for denying an empty image list under `AllowOnlyIfNotContains`
pub const NO_IMAGES_REASON: &str = "no container images to evaluate";

/// Evaluate image references against the policy.
///
/// Images are scanned in order and the first decisive image short-circuits the scan.
/// An empty list is allowed under `DenyIfContains` (nothing to object to) and denied
/// under `AllowOnlyIfNotContains` (no image proves innocence).
pub fn evaluate<S: AsRef<str>>(images: &[S], config: &PolicyConfig) -> Verdict {
    let needle = config.match_substring();

    match config.polarity() {
        Polarity::DenyIfContains => {
            if images.iter().any(|image| image.as_ref().contains(needle)) {
                Verdict::denied(format!("image name contains disallowed string: {}", needle))
            } else {
                Verdict::allowed(ALLOWED_REASON)
            }
        }
        Polarity::AllowOnlyIfNotContains => {
            if images.is_empty() {
                return Verdict::denied(NO_IMAGES_REASON);
            }

            if images.iter().any(|image| !image.as_ref().contains(needle)) {
                Verdict::allowed(ALLOWED_REASON)
            } else {
                Verdict::denied(format!("all image names contain disallowed string: {}", needle))
            }
        }
    }
}
