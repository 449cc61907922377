//! Expected manifest content derived from a scanned tree and a glob pattern.

use crate::config::Config;
use crate::error::Result;
use crate::glob::GlobMatcher;
use crate::scanner::{Artifact, TreeScanner};

use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;

/// The only attribute this tool reads or writes
pub const EXPORT_IGNORE: &str = "export-ignore";

/// Artifacts that must not end up in a packaged archive, kept in byte order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(BTreeSet<Artifact>);

impl ExclusionSet {
    pub fn contains(&self, artifact: &Artifact) -> bool {
        self.0.contains(artifact)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Artifact> {
        self.0.iter()
    }
}

impl FromIterator<Artifact> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = Artifact>>(iter: I) -> Self {
        ExclusionSet(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ExclusionSet {
    type Item = &'a Artifact;
    type IntoIter = btree_set::Iter<'a, Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One `<artifact> export-ignore` entry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ManifestLine {
    pub artifact: Artifact,
}

impl fmt::Display for ManifestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.artifact, EXPORT_IGNORE)
    }
}

/// Canonical manifest text: optional header plus blank line, then one line
/// per excluded artifact in byte order, newline terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestContent {
    header: Option<String>,
    lines: Vec<ManifestLine>,
}

impl ManifestContent {
    pub fn new(header: Option<String>, exclusions: &ExclusionSet) -> Self {
        let lines = exclusions
            .iter()
            .map(|artifact| ManifestLine {
                artifact: artifact.clone(),
            })
            .collect();
        ManifestContent { header, lines }
    }

    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn lines(&self) -> &[ManifestLine] {
        &self.lines
    }

    /// True when nothing is export-ignored, whatever the header
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ManifestContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(header) = &self.header {
            writeln!(f, "{header}")?;
            writeln!(f)?;
        }
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Classifies scanned artifacts with a compiled pattern and renders the
/// expected manifest.
#[derive(Debug, Clone)]
pub struct ContentGenerator {
    config: Config,
    matcher: GlobMatcher,
}

impl ContentGenerator {
    pub fn new(config: Config, matcher: GlobMatcher) -> Self {
        ContentGenerator { config, matcher }
    }

    /// Generator using the configured default pattern
    pub fn with_default_pattern(config: Config) -> Result<Self> {
        let matcher = GlobMatcher::compile(&config.patterns.default)?;
        Ok(Self::new(config, matcher))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn matcher(&self) -> &GlobMatcher {
        &self.matcher
    }

    /// The manifest file itself, as an artifact of the scanned root
    pub fn manifest_artifact(&self) -> Artifact {
        Artifact::file(self.config.manifest.file_name.as_str())
    }

    /// Artifacts selected by the pattern, plus the manifest when it is part of
    /// the tree. Entries below an already selected directory are dropped.
    pub fn exclusion_set(&self, artifacts: &[Artifact]) -> ExclusionSet {
        let manifest = self.manifest_artifact();

        let mut candidates = artifacts.to_vec();
        candidates.sort();
        candidates.dedup();

        // A directory always sorts before its contents, so `selected` already
        // holds every ancestor that could cover a candidate
        let mut selected: Vec<Artifact> = Vec::new();
        for artifact in candidates {
            if selected.iter().any(|dir| artifact.is_within(dir)) {
                continue;
            }
            if artifact == manifest || self.matcher.matches(artifact.as_str()) {
                selected.push(artifact);
            }
        }

        selected.into_iter().collect()
    }

    /// Expected content, with the configured header
    pub fn generate(&self, artifacts: &[Artifact]) -> ManifestContent {
        self.generate_with_header(artifacts, true)
    }

    pub fn generate_with_header(&self, artifacts: &[Artifact], header: bool) -> ManifestContent {
        let header = header.then(|| self.config.manifest.header.clone());
        ManifestContent::new(header, &self.exclusion_set(artifacts))
    }

    /// Scan deep enough for the pattern. A manifest on disk shows up as a
    /// root entry and is thereby self-included; a missing one is not.
    pub fn scan(&self, scanner: &TreeScanner) -> Vec<Artifact> {
        scanner.scan_to_depth(self.matcher.depth())
    }

    /// Scan + generate in one step
    pub fn expected_for(&self, scanner: &TreeScanner, header: bool) -> ManifestContent {
        self.generate_with_header(&self.scan(scanner), header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glob::compile;

    fn artifacts(entries: &[&str]) -> Vec<Artifact> {
        entries.iter().map(|e| Artifact::parse(e)).collect()
    }

    fn default_generator() -> ContentGenerator {
        ContentGenerator::with_default_pattern(Config::load().unwrap()).unwrap()
    }

    #[test]
    fn test_default_pattern_canonical_content() {
        let tree = artifacts(&[
            "CONDUCT.md",
            ".travis.yml",
            ".buildignore",
            "phpspec.yml.dist",
            "specs/",
            "src/",
        ]);

        let content = default_generator().generate(&tree);
        assert_eq!(
            content.render(),
            "* text=auto eol=lf\n\n\
             .buildignore export-ignore\n\
             .travis.yml export-ignore\n\
             CONDUCT.md export-ignore\n\
             phpspec.yml.dist export-ignore\n\
             specs/ export-ignore\n"
        );
    }

    #[test]
    fn test_generate_is_deterministic() {
        let generator = default_generator();
        let tree = artifacts(&["specs/", ".travis.yml", "CONDUCT.md"]);
        let mut reversed = tree.clone();
        reversed.reverse();

        assert_eq!(
            generator.generate(&tree).render(),
            generator.generate(&tree).render()
        );
        assert_eq!(
            generator.generate(&tree).render(),
            generator.generate(&reversed).render()
        );
    }

    #[test]
    fn test_manifest_is_always_included() {
        let generator = ContentGenerator::new(Config::load().unwrap(), compile("{*.md,specs}").unwrap());
        let tree = artifacts(&[".gitattributes", "CONDUCT.md", "specs/", "src/"]);

        let set = generator.exclusion_set(&tree);
        assert!(set.contains(&Artifact::file(".gitattributes")));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_manifest_is_included_only_when_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("CONDUCT.md"), "").unwrap();
        let generator = default_generator();
        let scanner = TreeScanner::new(dir.path()).unwrap();

        assert_eq!(
            generator.expected_for(&scanner, false).render(),
            "CONDUCT.md export-ignore\n"
        );

        std::fs::write(dir.path().join(".gitattributes"), "").unwrap();
        assert_eq!(
            generator.expected_for(&scanner, false).render(),
            ".gitattributes export-ignore\nCONDUCT.md export-ignore\n"
        );
    }

    #[test]
    fn test_byte_order_puts_uppercase_before_lowercase() {
        let generator = ContentGenerator::new(Config::load().unwrap(), compile("*").unwrap());
        let tree = artifacts(&["phpspec.yml.dist", "Phulpfile", ".buildignore", "specs/"]);

        let lines: Vec<String> = generator
            .generate(&tree)
            .lines()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            lines,
            vec![
                ".buildignore export-ignore",
                "Phulpfile export-ignore",
                "phpspec.yml.dist export-ignore",
                "specs/ export-ignore",
            ]
        );
    }

    #[test]
    fn test_headerless_content() {
        let content = default_generator().generate_with_header(&artifacts(&["specs/"]), false);
        assert_eq!(content.header(), None);
        assert_eq!(content.render(), "specs/ export-ignore\n");
    }

    #[test]
    fn test_nothing_to_ignore() {
        let content = default_generator().generate(&artifacts(&["src/", "composer.json"]));
        assert!(content.is_empty());
        assert_eq!(content.render(), "* text=auto eol=lf\n\n");
    }

    #[test]
    fn test_entries_below_selected_directories_are_pruned() {
        let generator = ContentGenerator::new(
            Config::load().unwrap(),
            compile("{tests,src/fixtures,tests/data}").unwrap(),
        );
        let tree = artifacts(&[
            "src/",
            "src/Foo.php",
            "src/fixtures/",
            "tests/",
            "tests/data/",
            "tests/Test.php",
        ]);

        let exclusion_set = generator.exclusion_set(&tree);
        let set: Vec<&str> = exclusion_set
            .iter()
            .map(Artifact::as_str)
            .collect();
        assert_eq!(set, vec!["src/fixtures/", "tests/"]);
    }
}
