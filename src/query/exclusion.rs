//! Folder exclusion
//!
//! Before the first record query, one scan over the store decides which
//! directories are hidden from the whole session: hidden dot-directories,
//! directories matching a configured ignore pattern, and directories marked
//! with a `.nomedia` file. The resolved prefixes become `NOT LIKE` clauses in
//! every subsequent record query.
//!
//! Resolution state lives in a per-scan [`ExclusionContext`]; nothing is
//! cached across scans, so a freshly created marker file takes effect on the
//! next resolution without any cache invalidation.

use std::fs;
use std::path::Path;

use crate::config::Configurations;
use crate::query::predicate::PredicateBuilder;
use crate::store::{columns, RangeWindow, SortOrder, Store, StoreError, Table};

/// Marker filename that excludes its directory from media listings
pub const MEDIA_IGNORE_FILENAME: &str = ".nomedia";

/// Resolve the excluded folder prefixes for one session
///
/// Scans every bucketed row in path order. Sorting ascending by path means a
/// directory is visited before its children, so once a prefix is excluded the
/// entire subtree short-circuits without further probing.
///
/// # Errors
/// Returns [`StoreError`] if the scan query fails. Marker probe failures are
/// not errors; they leave the directory visible.
pub fn resolve_excluded_folders<S: Store + ?Sized>(
    store: &S,
    configs: &Configurations,
) -> Result<Vec<String>, StoreError> {
    if !configs.needs_exclusion_scan() {
        return Ok(Vec::new());
    }

    let mut scan = PredicateBuilder::new();
    scan.push(format!("{} IS NOT NULL", columns::BUCKET_ID), []);
    let rows = store.query(
        Table::Files,
        &[columns::PATH],
        &scan.build(),
        SortOrder::PathAsc,
        RangeWindow::ALL,
    )?;

    let mut context = ExclusionContext::new(configs);
    for row in &rows {
        context.consider(&row.path);
    }
    Ok(context.into_folders())
}

/// Per-scan exclusion state
///
/// Holds the folders excluded so far; each candidate path is first checked
/// against those prefixes before any rule runs.
pub struct ExclusionContext<'c> {
    configs: &'c Configurations,
    folders: Vec<String>,
}

impl<'c> ExclusionContext<'c> {
    #[must_use]
    pub fn new(configs: &'c Configurations) -> Self {
        Self {
            configs,
            folders: Vec::new(),
        }
    }

    /// Feed one row path through the exclusion rules
    pub fn consider(&mut self, path: &str) {
        let parent = parent_of(path);
        if parent.is_empty() {
            return;
        }
        if self.folders.iter().any(|f| parent.starts_with(f.as_str())) {
            return;
        }
        if self.should_exclude(path, parent) {
            self.folders.push(parent.to_string());
        }
    }

    fn should_exclude(&self, path: &str, parent: &str) -> bool {
        if self.configs.ignore_hidden_directories() && file_name_of(parent).starts_with('.') {
            return true;
        }
        if self
            .configs
            .ignore_path_patterns()
            .iter()
            .any(|pattern| pattern.matches_fully(path))
        {
            return true;
        }
        if self.configs.ignore_no_media_marked_directories() {
            return marker_present(parent);
        }
        false
    }

    #[must_use]
    pub fn into_folders(self) -> Vec<String> {
        self.folders
    }
}

/// Probe for the marker file directly inside `dir`
///
/// Fail-open: any probe error (missing file, permission denied) leaves the
/// directory visible.
fn marker_present(dir: &str) -> bool {
    fs::metadata(Path::new(dir).join(MEDIA_IGNORE_FILENAME)).is_ok()
}

/// Parent of a `/`-separated path, at the string level
///
/// `"/a/b" -> "/a"`, `"/a" -> "/"`, `"a" -> ""`, `"/" -> ""`.
#[must_use]
pub fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) if path.len() > 1 => "/",
        Some(idx) if idx > 0 => &path[..idx],
        _ => "",
    }
}

/// Final segment of a `/`-separated path
#[must_use]
pub fn file_name_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}
