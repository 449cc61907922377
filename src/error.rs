//! Error types shared by the scanner, generator, comparators and I/O helpers.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, LeanError>;

/// Reasons a glob pattern is rejected at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,

    /// `{single}` style groups with fewer than two alternatives.
    #[error("alternation group at offset {offset} needs at least two alternatives")]
    DegenerateGroup { offset: usize },

    #[error("alternation group at offset {offset} is never closed")]
    UnclosedGroup { offset: usize },

    #[error("unexpected '}}' at offset {offset}")]
    UnmatchedBrace { offset: usize },

    #[error("character class at offset {offset} is never closed")]
    UnclosedClass { offset: usize },

    #[error("character class at offset {offset} is empty")]
    EmptyClass { offset: usize },

    #[error("character range '{start}-{end}' is reversed")]
    ReversedRange { start: char, end: char },

    #[error("pattern ends with a dangling escape")]
    TrailingEscape,
}

/// Errors surfaced to callers of the library.
#[derive(Debug, Error)]
pub enum LeanError {
    #[error("The provided glob pattern '{pattern}' is considered invalid: {reason}")]
    InvalidPattern {
        pattern: String,
        #[source]
        reason: PatternError,
    },

    #[error("The provided directory '{}' does not exist or is not a directory.", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read {}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `git archive` or `tar` could not produce a listing.
    #[error("Unable to list archive artifacts: {0}")]
    ArchiveListing(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
