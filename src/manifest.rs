//! Parsing, comparison and persistence of an existing manifest.

use crate::config::Config;
use crate::error::{LeanError, Result};
use crate::generator::{ManifestContent, EXPORT_IGNORE};
use crate::scanner::Artifact;
use crate::verdict::Verdict;

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// An existing manifest split into the parts the comparator cares about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedManifest {
    has_header: bool,
    entries: Vec<Artifact>,
    /// Every other non-blank line, verbatim and in file order
    residue: Vec<String>,
}

impl ParsedManifest {
    pub fn parse(content: &str, header: &str) -> Self {
        let mut parsed = ParsedManifest::default();

        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if line == header {
                parsed.has_header = true;
                continue;
            }
            match parse_entry(line) {
                Some(artifact) => parsed.entries.push(artifact),
                None => parsed.residue.push(line.to_string()),
            }
        }

        parsed
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    /// Recognized entries in file order, duplicates included
    pub fn entries(&self) -> &[Artifact] {
        &self.entries
    }

    pub fn residue(&self) -> &[String] {
        &self.residue
    }
}

/// `<path> export-ignore` with exactly one space and no whitespace in the path
fn parse_entry(line: &str) -> Option<Artifact> {
    let path = line.strip_suffix(EXPORT_IGNORE)?.strip_suffix(' ')?;
    if path.is_empty() || path.chars().any(char::is_whitespace) {
        return None;
    }
    Some(Artifact::parse(path))
}

/// Result of checking a possibly missing manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestCheck {
    /// No manifest on disk; carries what it should contain
    Absent { expected: String },
    Present(Verdict),
}

/// Diffs existing manifest text against generated content
#[derive(Debug, Clone)]
pub struct ManifestComparator {
    header: String,
}

impl ManifestComparator {
    pub fn new(config: &Config) -> Self {
        ManifestComparator {
            header: config.manifest.header.clone(),
        }
    }

    pub fn parse(&self, existing: &str) -> ParsedManifest {
        ParsedManifest::parse(existing, &self.header)
    }

    /// Compare `existing` against `expected`. Without `strict_order` only the
    /// set of entries matters; with it the entries must also appear in
    /// canonical order. Residue never affects validity.
    pub fn compare(&self, existing: &str, expected: &ManifestContent, strict_order: bool) -> Verdict {
        self.compare_parsed(&self.parse(existing), expected, strict_order)
    }

    pub fn compare_parsed(
        &self,
        parsed: &ParsedManifest,
        expected: &ManifestContent,
        strict_order: bool,
    ) -> Verdict {
        let canonical: Vec<&Artifact> = expected.lines().iter().map(|l| &l.artifact).collect();

        let valid = if strict_order {
            parsed.entries.iter().eq(canonical.iter().copied())
        } else {
            let present: BTreeSet<&Artifact> = parsed.entries.iter().collect();
            let wanted: BTreeSet<&Artifact> = canonical.into_iter().collect();
            present == wanted
        };

        Verdict {
            valid,
            expected_content: Some(render_expected(expected, &parsed.residue)),
            unexpected_artifacts: Vec::new(),
        }
    }

    /// Like [`compare`](Self::compare), but a missing manifest is reported as
    /// [`ManifestCheck::Absent`] rather than as invalid content.
    pub fn check(
        &self,
        existing: Option<&str>,
        expected: &ManifestContent,
        strict_order: bool,
    ) -> ManifestCheck {
        match existing {
            None => ManifestCheck::Absent {
                expected: expected.render(),
            },
            Some(existing) => ManifestCheck::Present(self.compare(existing, expected, strict_order)),
        }
    }
}

/// Canonical content followed by the residue block
fn render_expected(expected: &ManifestContent, residue: &[String]) -> String {
    let mut rendered = expected.render();
    for line in residue {
        rendered.push_str(line);
        rendered.push('\n');
    }
    rendered
}

/// Read the manifest, `None` when it does not exist
pub fn read_manifest(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(LeanError::ReadFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn write_manifest(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| LeanError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ContentGenerator;

    const CANONICAL: &str = "* text=auto eol=lf\n\n\
                             .buildignore export-ignore\n\
                             .travis.yml export-ignore\n\
                             CONDUCT.md export-ignore\n\
                             phpspec.yml.dist export-ignore\n\
                             specs/ export-ignore\n";

    fn comparator() -> ManifestComparator {
        ManifestComparator::new(&Config::load().unwrap())
    }

    fn expected() -> ManifestContent {
        let tree: Vec<Artifact> = [
            "CONDUCT.md",
            ".travis.yml",
            ".buildignore",
            "phpspec.yml.dist",
            "specs/",
        ]
        .iter()
        .map(|e| Artifact::parse(e))
        .collect();
        ContentGenerator::with_default_pattern(Config::load().unwrap())
            .unwrap()
            .generate(&tree)
    }

    // ============ parsing tests ============

    #[test]
    fn test_parse_splits_header_entries_and_residue() {
        let parsed = comparator().parse(
            "* text=auto eol=lf\n\n*.php text eol=lf\nspecs/ export-ignore\nbroken-entry\n.travis.yml export-ignore\n",
        );
        assert!(parsed.has_header());
        assert_eq!(
            parsed.entries(),
            &[Artifact::parse("specs/"), Artifact::parse(".travis.yml")]
        );
        assert_eq!(parsed.residue(), &["*.php text eol=lf", "broken-entry"]);
    }

    #[test]
    fn test_parse_only_accepts_exact_entry_form() {
        let parsed = comparator().parse(
            "specs/  export-ignore\nspecs/export-ignore\n export-ignore\nspecs/ export-ignore \r\n",
        );
        assert!(parsed.entries().is_empty());
        assert_eq!(parsed.residue().len(), 4);
    }

    #[test]
    fn test_parse_handles_crlf() {
        let parsed = comparator().parse("* text=auto eol=lf\r\nspecs/ export-ignore\r\n");
        assert!(parsed.has_header());
        assert_eq!(parsed.entries(), &[Artifact::parse("specs/")]);
    }

    // ============ comparison tests ============

    #[test]
    fn test_generated_content_validates_against_itself() {
        let expected = expected();
        let rendered = expected.render();
        assert_eq!(rendered, CANONICAL);

        let verdict = comparator().compare(&rendered, &expected, false);
        assert!(verdict.is_valid());
        assert_eq!(verdict.expected_content.as_deref(), Some(CANONICAL));
        assert!(comparator().compare(&rendered, &expected, true).is_valid());
    }

    #[test]
    fn test_incomplete_manifest_is_invalid() {
        let verdict = comparator().compare("specs/ export-ignore\n", &expected(), false);
        assert!(!verdict.is_valid());
        assert_eq!(verdict.expected_content.as_deref(), Some(CANONICAL));
    }

    #[test]
    fn test_extra_entry_is_invalid() {
        let existing = format!("{CANONICAL}src/ export-ignore\n");
        assert!(!comparator().compare(&existing, &expected(), false).is_valid());
    }

    #[test]
    fn test_order_only_matters_in_strict_mode() {
        let shuffled = "specs/ export-ignore\n\
                        CONDUCT.md export-ignore\n\
                        .buildignore export-ignore\n\
                        phpspec.yml.dist export-ignore\n\
                        .travis.yml export-ignore\n";
        let comparator = comparator();
        let expected = expected();

        assert!(comparator.compare(shuffled, &expected, false).is_valid());
        assert!(comparator.compare(CANONICAL, &expected, false).is_valid());
        assert!(!comparator.compare(shuffled, &expected, true).is_valid());
        assert!(comparator.compare(CANONICAL, &expected, true).is_valid());
    }

    #[test]
    fn test_duplicates_only_fail_strict_mode() {
        let existing = format!("{CANONICAL}specs/ export-ignore\n");
        assert!(comparator().compare(&existing, &expected(), false).is_valid());
        assert!(!comparator().compare(&existing, &expected(), true).is_valid());
    }

    #[test]
    fn test_residue_is_appended_but_ignored_for_validity() {
        let existing = format!("{CANONICAL}*.php diff=php\nstray text\n");
        let verdict = comparator().compare(&existing, &expected(), true);
        assert!(verdict.is_valid());
        assert_eq!(
            verdict.expected_content.unwrap(),
            format!("{CANONICAL}*.php diff=php\nstray text\n")
        );
    }

    #[test]
    fn test_missing_manifest_is_reported_as_absent() {
        match comparator().check(None, &expected(), false) {
            ManifestCheck::Absent { expected } => assert_eq!(expected, CANONICAL),
            other => panic!("expected Absent, got {other:?}"),
        }
        assert!(matches!(
            comparator().check(Some(CANONICAL), &expected(), false),
            ManifestCheck::Present(Verdict { valid: true, .. })
        ));
    }

    // ============ persistence tests ============

    #[test]
    fn test_read_and_write_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".gitattributes");

        assert_eq!(read_manifest(&path).unwrap(), None);
        write_manifest(&path, CANONICAL).unwrap();
        assert_eq!(read_manifest(&path).unwrap().as_deref(), Some(CANONICAL));
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join(".gitattributes");
        assert!(matches!(
            write_manifest(&path, CANONICAL),
            Err(LeanError::WriteFailed { .. })
        ));
    }
}
