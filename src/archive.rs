//! Membership diff between a packaged archive and the exclusion set.

use crate::generator::ExclusionSet;
use crate::scanner::Artifact;
use crate::verdict::Verdict;

/// Lean iff no archive entry is part of the exclusion set.
/// `unexpected_artifacts` is the offending intersection in byte order.
pub fn compare<'a, I>(archive_artifacts: I, exclusions: &ExclusionSet) -> Verdict
where
    I: IntoIterator<Item = &'a Artifact>,
{
    let mut unexpected: Vec<Artifact> = archive_artifacts
        .into_iter()
        .filter(|artifact| exclusions.contains(artifact))
        .cloned()
        .collect();
    unexpected.sort();
    unexpected.dedup();

    Verdict {
        valid: unexpected.is_empty(),
        expected_content: None,
        unexpected_artifacts: unexpected,
    }
}
