//! lean-package-validator - export-ignore manifest validation
//!
//! Derives the `.gitattributes` export-ignore entries a repository should carry
//! so that `git archive` packages omit development-only artifacts (tests, CI
//! config, build tooling), and checks an existing manifest or an actual archive
//! against that expectation.
//!
//! ## Pipeline
//!
//! - [`glob`] compiles the extended glob pattern into a matcher tree
//! - [`scanner`] enumerates the repository root in byte order
//! - [`generator`] classifies the entries and renders canonical manifest text
//! - [`manifest`] diffs an existing manifest (set or strict order)
//! - [`archive`] diffs the listing produced by [`vcs`] against the exclusion set

pub mod archive;
pub mod config;
pub mod error;
pub mod generator;
pub mod glob;
pub mod manifest;
pub mod scanner;
pub mod vcs;
pub mod verdict;

// Re-export commonly used items
pub use config::{load_pattern_file, Config};
pub use error::{LeanError, PatternError, Result};
pub use generator::{ContentGenerator, ExclusionSet, ManifestContent, ManifestLine, EXPORT_IGNORE};
pub use glob::{compile, GlobMatcher};
pub use manifest::{read_manifest, write_manifest, ManifestCheck, ManifestComparator, ParsedManifest};
pub use scanner::{scan, Artifact, TreeScanner};
pub use vcs::{find_git_root, list_archive_artifacts, DEFAULT_REVISION, VCS_INTERNALS};
pub use verdict::Verdict;
