//! Testing utilities for pickr
//!
//! In-memory [`Store`] implementation with programmable rows, capability
//! variants, failure injection, and change-notification plumbing, plus
//! fixture builders for rows, records, and a recording selection listener.
//! Only compiled for tests.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Mutex};

use crate::media::{ContentRef, MediaRecord, MediaType};
use crate::query::{file_name_of, Predicate};
use crate::selection::SelectionListener;
use crate::store::{
    columns, RangeWindow, Row, SortOrder, Store, StoreCapabilities, StoreError, Table, TableChange,
};

/// In-memory store for tests
///
/// Interprets the subset of predicate fragments the query layer actually
/// emits (path LIKE / NOT LIKE, bucket equality, media-type and
/// display-name alternatives, the non-null bucket and positive-size
/// guards); mime-type fragments are ignored. Grouped directory queries are
/// recognized by the presence of the count column in the projection.
pub struct TestStore {
    caps: StoreCapabilities,
    files: Vec<Row>,
    audio: Vec<Row>,
    sizes: HashMap<String, u64>,
    fail: AtomicBool,
    listeners: Mutex<Vec<(Table, mpsc::Sender<TableChange>)>>,
}

impl TestStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capabilities(StoreCapabilities {
            has_unified_media_table: true,
            supports_grouped_directory_query: false,
        })
    }

    #[must_use]
    pub fn with_capabilities(caps: StoreCapabilities) -> Self {
        Self {
            caps,
            files: Vec::new(),
            audio: Vec::new(),
            sizes: HashMap::new(),
            fail: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// A store whose every query fails
    #[must_use]
    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn add_row(&mut self, row: Row) {
        self.files.push(row);
    }

    pub fn add_audio_row(&mut self, row: Row) {
        self.audio.push(row);
    }

    /// Program the size returned by `stat_file_size` for a path
    pub fn set_file_size(&mut self, path: &str, size: u64) {
        self.sizes.insert(path.to_string(), size);
    }

    /// Push a change notification to every listener of `table`
    pub fn emit_change(&self, table: Table) {
        let listeners = self.listeners.lock().expect("listener lock");
        for (t, tx) in listeners.iter() {
            if *t == table {
                let _ = tx.send(TableChange { table });
            }
        }
    }

    fn rows_for(&self, table: Table) -> &[Row] {
        match table {
            Table::Files => &self.files,
            Table::Audio => &self.audio,
        }
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for TestStore {
    fn capabilities(&self) -> StoreCapabilities {
        self.caps
    }

    fn query(
        &self,
        table: Table,
        projection: &[&str],
        predicate: &Predicate,
        sort: SortOrder,
        window: RangeWindow,
    ) -> Result<Vec<Row>, StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Query("injected failure".to_string()));
        }

        let view = PredicateView::parse(predicate);
        let mut rows: Vec<Row> = self
            .rows_for(table)
            .iter()
            .filter(|row| view.allows(row))
            .cloned()
            .collect();

        match sort {
            SortOrder::DateAddedDesc => {
                rows.sort_by(|a, b| b.date_added.cmp(&a.date_added).then(b.id.cmp(&a.id)));
            }
            SortOrder::PathAsc => rows.sort_by(|a, b| a.path.cmp(&b.path)),
        }

        if projection.contains(&columns::COUNT) {
            rows = group_by_bucket(rows);
        }

        let end = window
            .limit
            .map_or(rows.len(), |l| (window.offset + l).min(rows.len()));
        let start = window.offset.min(rows.len());
        Ok(rows[start..end.max(start)].to_vec())
    }

    fn register_change_listener(&self, table: Table) -> mpsc::Receiver<TableChange> {
        let (tx, rx) = mpsc::channel();
        self.listeners
            .lock()
            .expect("listener lock")
            .push((table, tx));
        rx
    }

    fn stat_file_size(&self, path: &str) -> Result<u64, StoreError> {
        self.sizes.get(path).copied().ok_or_else(|| StoreError::Stat {
            path: path.to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}

/// One grouped row per bucket, count populated, first-seen order preserved
fn group_by_bucket(rows: Vec<Row>) -> Vec<Row> {
    let mut grouped: Vec<Row> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    for row in rows {
        let Some(bucket) = row.bucket_id else {
            continue;
        };
        match index.entry(bucket) {
            Entry::Occupied(slot) => {
                let existing = &mut grouped[*slot.get()];
                existing.count = Some(existing.count.unwrap_or(0) + 1);
            }
            Entry::Vacant(slot) => {
                slot.insert(grouped.len());
                let mut first = row;
                first.count = Some(1);
                grouped.push(first);
            }
        }
    }
    grouped
}

/// The interpreted subset of a predicate
#[derive(Debug, Default)]
struct PredicateView {
    require_like: Vec<String>,
    forbid_like: Vec<String>,
    bucket: Option<i64>,
    type_codes: Vec<i64>,
    name_likes: Vec<String>,
    untyped_alternative: bool,
    require_bucket: bool,
    require_positive_size: bool,
}

impl PredicateView {
    fn parse(predicate: &Predicate) -> Self {
        let expr = predicate.expression();
        let mut view = Self {
            require_bucket: expr.contains("bucket_id IS NOT NULL"),
            require_positive_size: expr.contains("size > 0"),
            ..Self::default()
        };

        for (arg_idx, (pos, _)) in expr.match_indices('?').enumerate() {
            let before = &expr[..pos];
            let arg = &predicate.args()[arg_idx];
            if before.ends_with("path NOT LIKE ") {
                view.forbid_like.push(arg.clone());
            } else if before.ends_with("path LIKE ") {
                view.require_like.push(arg.clone());
            } else if before.ends_with("display_name LIKE ") {
                view.name_likes.push(arg.clone());
            } else if before.ends_with("bucket_id = ") {
                view.bucket = arg.parse().ok();
            } else if before.ends_with("media_type = ") {
                match arg.parse::<i64>() {
                    Ok(0) => view.untyped_alternative = true,
                    Ok(code) => view.type_codes.push(code),
                    Err(_) => {}
                }
            } else if before.ends_with("media_type > ") {
                view.untyped_alternative = true;
            }
            // mime_type fragments are not interpreted
        }
        view
    }

    fn allows(&self, row: &Row) -> bool {
        if !self.require_like.iter().all(|p| like_match(p, &row.path)) {
            return false;
        }
        if self.forbid_like.iter().any(|p| like_match(p, &row.path)) {
            return false;
        }
        if let Some(bucket) = self.bucket {
            if row.bucket_id != Some(bucket) {
                return false;
            }
        }
        if self.require_bucket && row.bucket_id.is_none() {
            return false;
        }
        if self.require_positive_size && row.size <= 0 {
            return false;
        }
        if !self.type_codes.is_empty() || !self.name_likes.is_empty() || self.untyped_alternative {
            let by_code = row
                .media_type
                .is_some_and(|code| self.type_codes.contains(&code));
            let by_untyped = self.untyped_alternative
                && row.media_type.is_none_or(|code| code == 0 || code > 3);
            let by_name = row.display_name.as_deref().is_some_and(|name| {
                self.name_likes.iter().any(|p| like_match(p, name))
            });
            if !(by_code || by_untyped || by_name) {
                return false;
            }
        }
        true
    }
}

/// SQL LIKE with `%` wildcards only
fn like_match(pattern: &str, value: &str) -> bool {
    fn matches(p: &[u8], v: &[u8]) -> bool {
        match p.first() {
            None => v.is_empty(),
            Some(b'%') => matches(&p[1..], v) || (!v.is_empty() && matches(p, &v[1..])),
            Some(c) => v.first() == Some(c) && matches(&p[1..], &v[1..]),
        }
    }
    matches(pattern.as_bytes(), value.as_bytes())
}

/// Fluent [`Row`] fixture
pub struct RowFixture {
    row: Row,
}

impl RowFixture {
    #[must_use]
    pub fn new(id: i64, path: &str) -> Self {
        Self {
            row: Row {
                id,
                display_name: Some(file_name_of(path).to_string()),
                path: path.to_string(),
                size: 100,
                date_added: id,
                ..Row::default()
            },
        }
    }

    #[must_use]
    pub fn image(id: i64, path: &str) -> Self {
        Self::new(id, path).media_type(Some(1)).mime("image/jpeg")
    }

    #[must_use]
    pub fn video(id: i64, path: &str) -> Self {
        Self::new(id, path).media_type(Some(3)).mime("video/mp4")
    }

    #[must_use]
    pub fn audio(id: i64, path: &str) -> Self {
        Self::new(id, path).media_type(Some(2)).mime("audio/mpeg")
    }

    #[must_use]
    pub fn size(mut self, size: i64) -> Self {
        self.row.size = size;
        self
    }

    #[must_use]
    pub fn mime(mut self, mime: &str) -> Self {
        self.row.mime_type = Some(mime.to_string());
        self
    }

    #[must_use]
    pub fn mime_none(mut self) -> Self {
        self.row.mime_type = None;
        self
    }

    #[must_use]
    pub fn media_type(mut self, code: Option<i64>) -> Self {
        self.row.media_type = code;
        self
    }

    #[must_use]
    pub fn named(mut self, name: Option<&str>) -> Self {
        self.row.display_name = name.map(str::to_string);
        self
    }

    #[must_use]
    pub fn bucket(mut self, id: i64, name: &str) -> Self {
        self.row.bucket_id = Some(id);
        self.row.bucket_name = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn date_added(mut self, ts: i64) -> Self {
        self.row.date_added = ts;
        self
    }

    #[must_use]
    pub fn album(mut self, album_id: i64) -> Self {
        self.row.album_id = Some(album_id);
        self
    }

    #[must_use]
    pub fn build(self) -> Row {
        self.row
    }
}

/// A ready-made classified record for selection and diff tests
#[must_use]
pub fn media_record(id: i64, path: &str) -> MediaRecord {
    MediaRecord {
        id,
        path: path.to_string(),
        display_name: file_name_of(path).to_string(),
        size_bytes: 100,
        date_added: id,
        mime_type: None,
        media_type: MediaType::Image,
        bucket_id: None,
        bucket_name: None,
        width: 0,
        height: 0,
        duration_ms: 0,
        thumbnail: None,
        content: ContentRef::for_record(Table::Files, id),
    }
}

/// Selection events as recorded by [`RecordingListener`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    Begin,
    Selected(String),
    Unselected(String),
    SelectAll,
    UnselectAll,
    End,
    MaxReached,
}

/// Listener that records every event, keyed by record path
#[derive(Debug, Default)]
pub struct RecordingListener {
    pub events: Vec<SelectionEvent>,
}

impl SelectionListener for RecordingListener {
    fn on_selection_begin(&mut self) {
        self.events.push(SelectionEvent::Begin);
    }

    fn on_selected(&mut self, record: &MediaRecord) {
        self.events.push(SelectionEvent::Selected(record.path.clone()));
    }

    fn on_unselected(&mut self, record: &MediaRecord) {
        self.events
            .push(SelectionEvent::Unselected(record.path.clone()));
    }

    fn on_select_all(&mut self) {
        self.events.push(SelectionEvent::SelectAll);
    }

    fn on_unselect_all(&mut self) {
        self.events.push(SelectionEvent::UnselectAll);
    }

    fn on_selection_end(&mut self) {
        self.events.push(SelectionEvent::End);
    }

    fn on_max_reached(&mut self) {
        self.events.push(SelectionEvent::MaxReached);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PredicateBuilder;

    #[test]
    fn test_like_match_wildcards() {
        assert!(like_match("/sdcard/%", "/sdcard/DCIM/a.jpg"));
        assert!(like_match("%.pdf", "report.pdf"));
        assert!(!like_match("%.pdf", "report.pdfx"));
        assert!(like_match("a%b%c", "aXXbYYc"));
        assert!(!like_match("/sdcard/%", "/data/a.jpg"));
    }

    #[test]
    fn test_store_applies_not_like_filters() {
        let mut store = TestStore::new();
        store.add_row(RowFixture::image(1, "/sdcard/DCIM/a.jpg").build());
        store.add_row(RowFixture::image(2, "/sdcard/.cache/b.jpg").build());

        let mut builder = PredicateBuilder::new();
        builder.push("path NOT LIKE ?", ["/sdcard/.cache%".to_string()]);
        let rows = store
            .query(
                Table::Files,
                &[columns::PATH],
                &builder.build(),
                SortOrder::PathAsc,
                RangeWindow::ALL,
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].path, "/sdcard/DCIM/a.jpg");
    }

    #[test]
    fn test_store_windows_after_sorting() {
        let mut store = TestStore::new();
        for id in 1..=5 {
            store.add_row(RowFixture::image(id, &format!("/sdcard/{id}.jpg")).build());
        }
        let rows = store
            .query(
                Table::Files,
                &[columns::ID],
                &Predicate::all(),
                SortOrder::DateAddedDesc,
                RangeWindow::window(1, 2),
            )
            .unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![4, 3]);
    }
}
