//! Git repository detection and archive listing.

use crate::error::{LeanError, Result};
use crate::scanner::Artifact;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// VCS internal directories that are never scanned or export-ignored.
pub const VCS_INTERNALS: &[&str] = &[
    ".git", ".jj", ".svn", ".hg", ".bzr", "_darcs", ".pijul", "CVS", ".fossil",
];

/// Revision whose archive is inspected by default
pub const DEFAULT_REVISION: &str = "HEAD";

/// Walk up from `path` to the directory holding `.git`.
/// Relative paths are resolved first, `.` has no ancestors of its own.
pub fn find_git_root(path: &Path) -> Option<PathBuf> {
    let path = fs::canonicalize(path).ok()?;
    path.ancestors()
        .find(|ancestor| ancestor.join(".git").exists())
        .map(Path::to_path_buf)
}

/// List what `git archive <revision>` would package for `root`.
///
/// Runs `git archive --format=tar` and pipes it through `tar -tf -`, so the
/// listing honours the export-ignore attributes committed at `revision`.
pub fn list_archive_artifacts(root: &Path, revision: &str) -> Result<BTreeSet<Artifact>> {
    if find_git_root(root).is_none() {
        return Err(LeanError::ArchiveListing(format!(
            "{} is not inside a git repository",
            root.display()
        )));
    }

    let mut archive = Command::new("git")
        .arg("archive")
        .arg("--format=tar")
        .arg(revision)
        .current_dir(root)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| LeanError::ArchiveListing(format!("failed to run git: {e}")))?;

    let tar_input = archive
        .stdout
        .take()
        .ok_or_else(|| LeanError::ArchiveListing("git archive has no output".to_string()))?;

    let listing = match Command::new("tar")
        .arg("-tf")
        .arg("-")
        .stdin(Stdio::from(tar_input))
        .output()
    {
        Ok(listing) => listing,
        Err(e) => {
            // Reap git before bailing out
            let _ = archive.kill();
            let _ = archive.wait();
            return Err(LeanError::ArchiveListing(format!("failed to run tar: {e}")));
        }
    };

    let archived = archive
        .wait_with_output()
        .map_err(|e| LeanError::ArchiveListing(format!("git archive failed: {e}")))?;

    if !archived.status.success() {
        return Err(LeanError::ArchiveListing(format!(
            "git archive {} failed: {}",
            revision,
            String::from_utf8_lossy(&archived.stderr).trim()
        )));
    }
    if !listing.status.success() {
        return Err(LeanError::ArchiveListing(format!(
            "tar failed: {}",
            String::from_utf8_lossy(&listing.stderr).trim()
        )));
    }

    Ok(parse_archive_listing(&String::from_utf8_lossy(&listing.stdout)))
}

/// Turn `tar -t` output into artifacts. Directories keep their trailing `/`.
pub fn parse_archive_listing(listing: &str) -> BTreeSet<Artifact> {
    listing
        .lines()
        .map(str::trim)
        .map(|line| line.strip_prefix("./").unwrap_or(line))
        // git archive stores the commit id in a pax header some tars list
        .filter(|line| !line.is_empty() && *line != "pax_global_header")
        .map(Artifact::parse)
        .collect()
}
