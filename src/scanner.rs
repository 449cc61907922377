//! Directory tree enumeration into relative artifacts.

use crate::error::{LeanError, Result};
use crate::vcs::VCS_INTERNALS;

use ignore::WalkBuilder;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A path relative to the scan root, `/`-separated.
/// Directories carry a trailing `/`, files do not.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Artifact(String);

impl Artifact {
    pub fn file(path: impl Into<String>) -> Self {
        Artifact(path.into())
    }

    pub fn dir(path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.ends_with('/') {
            path.push('/');
        }
        Artifact(path)
    }

    /// Build an artifact from a listing entry, where a trailing `/` marks a directory.
    pub fn parse(entry: &str) -> Self {
        Artifact(entry.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_dir(&self) -> bool {
        self.0.ends_with('/')
    }

    /// Whether `self` lies inside the directory artifact `dir`.
    pub fn is_within(&self, dir: &Artifact) -> bool {
        dir.is_dir() && self.0.len() > dir.0.len() && self.0.starts_with(&dir.0)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Walks a root directory and reports its entries as artifacts
#[derive(Debug, Clone)]
pub struct TreeScanner {
    root: PathBuf,
    verbose: bool,
}

impl TreeScanner {
    /// Fails with `DirectoryNotFound` when `root` is missing or not a directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(LeanError::DirectoryNotFound(root.to_path_buf()));
        }
        Ok(TreeScanner {
            root: root.to_path_buf(),
            verbose: false,
        })
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Immediate children of the root, in byte order.
    pub fn scan(&self) -> Vec<Artifact> {
        self.scan_to_depth(1)
    }

    /// Entries down to `depth` levels below the root, in byte order.
    pub fn scan_to_depth(&self, depth: usize) -> Vec<Artifact> {
        let depth = depth.max(1);

        if self.verbose {
            println!(
                "DEBUG: Scanning directory {} (depth {})",
                self.root.display(),
                depth
            );
        }

        let verbose = self.verbose;
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            // Every entry is a candidate, ignore files have no say here
            .git_ignore(false)
            .ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false)
            .follow_links(false)
            .max_depth(Some(depth))
            .filter_entry(move |entry| {
                // Never report or traverse VCS internals
                let name = entry.file_name().to_str().unwrap_or("");
                if entry.depth() > 0 && VCS_INTERNALS.contains(&name) {
                    if verbose {
                        println!("DEBUG: Skipping VCS directory {}", entry.path().display());
                    }
                    return false;
                }
                true
            })
            .build();

        let mut artifacts = Vec::new();
        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    eprintln!(
                        "Warning: Failed to access entry in {}: {}",
                        self.root.display(),
                        err
                    );
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let Some(relative) = relative_path(&self.root, entry.path()) else {
                continue;
            };

            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            let artifact = if is_dir {
                Artifact::dir(relative)
            } else {
                Artifact::file(relative)
            };

            if self.verbose {
                println!("DEBUG: Found {}", artifact);
            }
            artifacts.push(artifact);
        }

        artifacts.sort();
        artifacts
    }
}

/// Scan the immediate children of `root`.
pub fn scan(root: impl AsRef<Path>) -> Result<Vec<Artifact>> {
    Ok(TreeScanner::new(root)?.scan())
}

/// `/`-joined path of `path` below `root`, independent of the platform separator
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}
