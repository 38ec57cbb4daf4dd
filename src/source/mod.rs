//! Paginated data sources
//!
//! [`MediaDataSource`] is the windowed view over the record query: it loads
//! `LIMIT`/`OFFSET` pages from the store, classifies them in parallel, and
//! publishes diffable list updates. Loads are split into three phases so the
//! fetch can run on a worker thread: [`ticket`](MediaDataSource::ticket)
//! captures the current generation, [`fetch`](MediaDataSource::fetch) runs
//! the query, and [`publish`](MediaDataSource::publish) applies the batch,
//! unless an [`invalidate`](MediaDataSource::invalidate) bumped the
//! generation in between, in which case the batch is discarded whole.
//!
//! [`DirectorySource`] is the folder view over the same store, with two
//! counting strategies selected by store capability.

mod diff;

pub use diff::{diff_records, ListUpdate};

use std::sync::mpsc::Receiver;

use rayon::prelude::*;

use crate::config::Configurations;
use crate::media::{aggregate_directories, classify_row, Directory, MediaRecord};
use crate::query::{
    build_dir_query, build_file_query, resolve_excluded_folders, DirQuery, FileQuery,
};
use crate::store::{RangeWindow, Row, Store, StoreError, TableChange};

/// A load permit carrying the generation it was issued under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    offset: usize,
    size: usize,
    position: usize,
}

/// A fetched, classified window awaiting publication
#[derive(Debug, Clone)]
pub struct LoadBatch {
    generation: u64,
    position: usize,
    records: Vec<MediaRecord>,
}

impl LoadBatch {
    #[must_use]
    pub fn records(&self) -> &[MediaRecord] {
        &self.records
    }
}

/// Windowed, classified view over the record query
pub struct MediaDataSource<'s, S: Store> {
    store: &'s S,
    configs: Configurations,
    query: Option<FileQuery>,
    records: Vec<MediaRecord>,
    generation: u64,
}

impl<'s, S: Store + Sync> MediaDataSource<'s, S> {
    /// Build the session query and its exclusion list
    ///
    /// When no media type is enabled this is the empty-query case: the store
    /// is not touched at all, and every load yields an empty window.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the exclusion scan fails.
    pub fn new(
        store: &'s S,
        configs: Configurations,
        dir_id: Option<i64>,
    ) -> Result<Self, StoreError> {
        let query = if configs.any_type_enabled() {
            let excluded = resolve_excluded_folders(store, &configs)?;
            build_file_query(&configs, store.capabilities(), dir_id, &excluded)
        } else {
            None
        };
        Ok(Self {
            store,
            configs,
            query,
            records: Vec::new(),
            generation: 0,
        })
    }

    /// True when the configuration enables nothing
    #[must_use]
    pub fn is_empty_query(&self) -> bool {
        self.query.is_none()
    }

    /// The currently published list
    #[must_use]
    pub fn records(&self) -> &[MediaRecord] {
        &self.records
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Issue a load permit for a window at `start`
    #[must_use]
    pub fn ticket(&self, start: usize, size: usize) -> LoadTicket {
        LoadTicket {
            generation: self.generation,
            offset: start,
            size,
            position: start,
        }
    }

    /// Issue the initial-load permit: the fetch honors `start` as the query
    /// offset, but the batch lands at list position zero
    #[must_use]
    pub fn initial_ticket(&self, start: usize, size: usize) -> LoadTicket {
        LoadTicket {
            generation: self.generation,
            offset: start,
            size,
            position: 0,
        }
    }

    /// Run the query and classification for a permit
    ///
    /// Safe to call from a worker thread; it never touches the published
    /// list. Classification runs in parallel and preserves row order.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store query fails; the published list
    /// is unaffected.
    pub fn fetch(&self, ticket: &LoadTicket) -> Result<LoadBatch, StoreError> {
        let records = match &self.query {
            None => Vec::new(),
            Some(query) => {
                let rows = self.store.query(
                    query.table,
                    &query.projection,
                    &query.predicate,
                    query.sort,
                    RangeWindow::window(ticket.offset, ticket.size),
                )?;
                self.classify_all(query, &rows)
            }
        };
        Ok(LoadBatch {
            generation: ticket.generation,
            position: ticket.position,
            records,
        })
    }

    /// Apply a fetched batch to the published list
    ///
    /// Returns `None` when the batch's generation is stale; stale batches
    /// are discarded whole, never merged. On success the list beyond the
    /// batch position is replaced and the diff against the previous list is
    /// returned.
    pub fn publish(&mut self, batch: LoadBatch) -> Option<Vec<ListUpdate>> {
        if batch.generation != self.generation {
            return None;
        }
        let keep = batch.position.min(self.records.len());
        let mut next = self.records[..keep].to_vec();
        next.extend(batch.records);
        let updates = diff_records(&self.records, &next);
        self.records = next;
        Some(updates)
    }

    /// Inline initial load; returns the records and the computed list
    /// position, which is always zero for an initial load
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store query fails.
    pub fn load_initial(
        &mut self,
        start: usize,
        size: usize,
    ) -> Result<(Vec<MediaRecord>, usize), StoreError> {
        let ticket = self.initial_ticket(start, size);
        let batch = self.fetch(&ticket)?;
        let records = batch.records.clone();
        self.publish(batch);
        Ok((records, 0))
    }

    /// Inline range load at `start`
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store query fails.
    pub fn load_range(
        &mut self,
        start: usize,
        size: usize,
    ) -> Result<Vec<MediaRecord>, StoreError> {
        let ticket = self.ticket(start, size);
        let batch = self.fetch(&ticket)?;
        let records = batch.records.clone();
        self.publish(batch);
        Ok(records)
    }

    /// Invalidate the current generation; in-flight batches become stale
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Entry point for externally captured content (a new photo or video
    /// recorded mid-session): the store changed under us, reload everything
    pub fn notify_external_change(&mut self) {
        self.invalidate();
    }

    /// Drain pending store change notifications; returns whether anything
    /// was invalidated
    pub fn drain_changes(&mut self, changes: &Receiver<TableChange>) -> bool {
        let mut any = false;
        while changes.try_recv().is_ok() {
            any = true;
        }
        if any {
            self.invalidate();
        }
        any
    }

    fn classify_all(&self, query: &FileQuery, rows: &[Row]) -> Vec<MediaRecord> {
        rows.par_iter()
            .filter_map(|row| classify_row(row, query.table, &self.configs, self.store))
            .collect()
    }
}

/// Folder listing over the same store
///
/// Two strategies, chosen by store capability: a grouped store computes
/// bucket counts itself and supports windowing; an ungrouped store is read
/// in full (offsets beyond zero yield nothing) and aggregated in one pass.
/// Both produce identical directories for the same underlying rows.
pub struct DirectorySource<'s, S: Store> {
    store: &'s S,
    configs: Configurations,
    query: Option<DirQuery>,
}

impl<'s, S: Store + Sync> DirectorySource<'s, S> {
    #[must_use]
    pub fn new(store: &'s S, configs: Configurations) -> Self {
        let query = build_dir_query(&configs, store.capabilities());
        Self {
            store,
            configs,
            query,
        }
    }

    /// Load one window of directories
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store query fails.
    pub fn load(&self, start: usize, size: usize) -> Result<Vec<Directory>, StoreError> {
        let Some(query) = &self.query else {
            return Ok(Vec::new());
        };

        if query.grouped {
            let rows = self.store.query(
                query.table,
                &query.projection,
                &query.predicate,
                query.sort,
                RangeWindow::window(start, size),
            )?;
            return Ok(rows.iter().map(|row| grouped_directory(query, row)).collect());
        }

        // Without store-side grouping the whole result is aggregated at
        // once; only the first window carries data.
        if start != 0 {
            return Ok(Vec::new());
        }
        let rows = self.store.query(
            query.table,
            &query.projection,
            &query.predicate,
            query.sort,
            RangeWindow::ALL,
        )?;
        let records: Vec<MediaRecord> = rows
            .par_iter()
            .filter_map(|row| classify_row(row, query.table, &self.configs, self.store))
            .collect();
        Ok(aggregate_directories(&records))
    }
}

fn grouped_directory(query: &DirQuery, row: &Row) -> Directory {
    Directory {
        id: row.bucket_id.unwrap_or_default(),
        name: row.bucket_name.clone().unwrap_or_else(|| {
            crate::query::file_name_of(crate::query::parent_of(&row.path)).to_string()
        }),
        preview: Some(crate::media::ContentRef::for_record(query.table, row.id)),
        count: u64::try_from(row.count.unwrap_or(1)).unwrap_or(0),
    }
}
