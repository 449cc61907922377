//! Outcome of a manifest or archive comparison.

use crate::scanner::Artifact;

/// Produced once per comparison and handed straight to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub valid: bool,
    /// Rendered expectation (manifest mode only)
    pub expected_content: Option<String>,
    /// Archive entries that should have been excluded, in byte order
    pub unexpected_artifacts: Vec<Artifact>,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}
