//! Store abstraction
//!
//! The Store is the external, queryable tabular index of file metadata
//! (paths, sizes, mime types, directory buckets). This module defines the
//! trait the rest of the crate is written against, the row shape returned by
//! queries, and the capability descriptor adapters use to describe what their
//! backing index can do.
//!
//! Core logic branches on [`StoreCapabilities`], never on platform identity:
//! an adapter for an index that keeps audio rows in a separate table reports
//! `has_unified_media_table = false`, and the query layer adjusts the target
//! table and projection accordingly.

use std::sync::mpsc;

use crate::query::Predicate;

mod error;

pub use error::StoreError;

/// Store-reported type tag for untyped rows
pub const MEDIA_TYPE_NONE: i64 = 0;
/// Store-reported type tag for images
pub const MEDIA_TYPE_IMAGE: i64 = 1;
/// Store-reported type tag for audio
pub const MEDIA_TYPE_AUDIO: i64 = 2;
/// Store-reported type tag for video; also the upper bound of the known range
pub const MEDIA_TYPE_VIDEO: i64 = 3;

/// Column names used in projections and predicate fragments
pub mod columns {
    pub const ID: &str = "id";
    pub const DISPLAY_NAME: &str = "display_name";
    pub const PATH: &str = "path";
    pub const SIZE: &str = "size";
    pub const DATE_ADDED: &str = "date_added";
    pub const MIME_TYPE: &str = "mime_type";
    pub const BUCKET_ID: &str = "bucket_id";
    pub const BUCKET_NAME: &str = "bucket_name";
    pub const HEIGHT: &str = "height";
    pub const WIDTH: &str = "width";
    pub const DURATION: &str = "duration";
    pub const MEDIA_TYPE: &str = "media_type";
    pub const ALBUM_ID: &str = "album_id";
    /// Synthetic count column for grouped directory queries
    pub const COUNT: &str = "count";
}

/// Queryable tables exposed by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// The unified table of all file rows
    Files,
    /// The dedicated audio table, present on stores without a unified table
    Audio,
}

impl Table {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Files => "files",
            Self::Audio => "audio",
        }
    }
}

/// One raw metadata row
///
/// Optional fields model columns that are absent from a given projection or
/// null in the index. `count` is only populated by grouped directory queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub id: i64,
    pub display_name: Option<String>,
    pub path: String,
    pub size: i64,
    pub date_added: i64,
    pub mime_type: Option<String>,
    pub bucket_id: Option<i64>,
    pub bucket_name: Option<String>,
    pub height: i64,
    pub width: i64,
    pub duration_ms: i64,
    pub media_type: Option<i64>,
    pub album_id: Option<i64>,
    pub count: Option<i64>,
}

/// What the backing index is capable of
///
/// Adapters fill this in once; the query builder and the directory source
/// branch on it instead of sniffing platform versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCapabilities {
    /// All media types live in one table with a `media_type` column
    pub has_unified_media_table: bool,
    /// The store can group directory rows and compute counts itself
    pub supports_grouped_directory_query: bool,
}

/// Sort orders the core issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first, the order of every record listing
    DateAddedDesc,
    /// Path ascending, used by the folder-exclusion scan so that parent
    /// directories are visited before their children
    PathAsc,
}

/// A `LIMIT`/`OFFSET` window over a sorted result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeWindow {
    pub offset: usize,
    pub limit: Option<usize>,
}

impl RangeWindow {
    /// The unbounded window
    pub const ALL: Self = Self {
        offset: 0,
        limit: None,
    };

    #[must_use]
    pub const fn window(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit: Some(limit),
        }
    }
}

/// Notification that rows in a table changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableChange {
    pub table: Table,
}

/// The external metadata index
///
/// Implementations are adapters over whatever actually holds the rows; the
/// core only ever calls these four methods. `query` applies the predicate's
/// positional arguments in order, sorts, then windows.
pub trait Store {
    /// Describe what this store can do
    fn capabilities(&self) -> StoreCapabilities;

    /// Run one windowed metadata query
    ///
    /// # Errors
    /// Returns [`StoreError`] when the underlying index cannot be queried.
    fn query(
        &self,
        table: Table,
        projection: &[&str],
        predicate: &Predicate,
        sort: SortOrder,
        window: RangeWindow,
    ) -> Result<Vec<Row>, StoreError>;

    /// Subscribe to change notifications for a table
    fn register_change_listener(&self, table: Table) -> mpsc::Receiver<TableChange>;

    /// Probe the real on-disk size of a path
    ///
    /// Used as a fallback when the store reports a stale zero size.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the path cannot be stat'ed.
    fn stat_file_size(&self, path: &str) -> Result<u64, StoreError>;
}
