//! Media model
//!
//! The value types the rest of the crate trades in: classified media records,
//! directory aggregates, and the opaque content locator handed to whatever
//! actually opens or renders a file.

mod classify;

pub use classify::classify_row;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::query::{file_name_of, parent_of};
use crate::store::{self, Table};

/// Classified media type
///
/// The first four variants map to the store's numeric type tags; the rest are
/// document refinements derived from file extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    File,
    Image,
    Audio,
    Video,
    Txt,
    Word,
    Excel,
    Ppt,
    Pdf,
    Zip,
}

impl MediaType {
    /// Map a store type tag to a media type; tags outside the known range
    /// yield `None`
    #[must_use]
    pub fn from_store_code(code: i64) -> Option<Self> {
        match code {
            store::MEDIA_TYPE_NONE => Some(Self::File),
            store::MEDIA_TYPE_IMAGE => Some(Self::Image),
            store::MEDIA_TYPE_AUDIO => Some(Self::Audio),
            store::MEDIA_TYPE_VIDEO => Some(Self::Video),
            _ => None,
        }
    }
}

/// Opaque locator for a record's content
///
/// The core never opens files itself; it hands these to the embedding layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    /// Locator for a row's primary content
    #[must_use]
    pub fn for_record(table: Table, id: i64) -> Self {
        Self(format!("media://{}/{id}", table.name()))
    }

    /// Locator for the album art attached to an audio album
    #[must_use]
    pub fn album_art(album_id: i64) -> Self {
        Self(format!("media://audio/albumart/{album_id}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One classified media record
///
/// Identity is the path: two records with the same path are the same item for
/// selection and diffing purposes, even across reloads that change the store
/// row id. [`content_key`](Self::content_key) is the weaker "looks the same"
/// comparison used by the list differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: i64,
    pub path: String,
    pub display_name: String,
    pub size_bytes: i64,
    pub date_added: i64,
    pub mime_type: Option<String>,
    pub media_type: MediaType,
    pub bucket_id: Option<i64>,
    pub bucket_name: Option<String>,
    pub width: i64,
    pub height: i64,
    pub duration_ms: i64,
    pub thumbnail: Option<ContentRef>,
    pub content: ContentRef,
}

impl MediaRecord {
    /// The value the list differ compares to decide "changed in place"
    #[must_use]
    pub fn content_key(&self) -> &str {
        &self.display_name
    }

    /// `date_added` as a UTC timestamp, when it is a valid epoch value
    #[must_use]
    pub fn date_added_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.date_added, 0)
    }
}

impl PartialEq for MediaRecord {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for MediaRecord {}

impl Hash for MediaRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

/// One directory (bucket) aggregate for the folder view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub id: i64,
    pub name: String,
    pub preview: Option<ContentRef>,
    pub count: u64,
}

/// Group records by bucket in first-seen order
///
/// The first record of each bucket supplies the directory's name and preview;
/// subsequent records only bump the count. Records with no bucket are
/// skipped. Must agree with the store-grouped directory query on identical
/// input rows.
#[must_use]
pub fn aggregate_directories(records: &[MediaRecord]) -> Vec<Directory> {
    let mut dirs: Vec<Directory> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for record in records {
        let Some(bucket) = record.bucket_id else {
            continue;
        };
        match index.entry(bucket) {
            Entry::Occupied(slot) => dirs[*slot.get()].count += 1,
            Entry::Vacant(slot) => {
                slot.insert(dirs.len());
                dirs.push(Directory {
                    id: bucket,
                    name: record
                        .bucket_name
                        .clone()
                        .unwrap_or_else(|| file_name_of(parent_of(&record.path)).to_string()),
                    preview: Some(record.content.clone()),
                    count: 1,
                });
            }
        }
    }

    dirs
}
