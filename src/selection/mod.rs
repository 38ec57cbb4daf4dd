//! Selection state machine
//!
//! A [`SelectionSession`] tracks the ordered set of selected records across
//! every loaded window and reports transitions to a [`SelectionListener`].
//! The session is either idle or selecting: the first selection emits
//! `on_selection_begin`, and emptying the set returns to idle with
//! `on_selection_end`. Single-choice mode is the exception: there the session
//! conceptually always has a current choice and no end event is emitted.
//!
//! Bound violations are not errors: selecting past `max_selection` rejects
//! the record and emits `on_max_reached`.

use serde::{Deserialize, Serialize};

use crate::config::Configurations;
use crate::media::MediaRecord;

/// Observer for selection transitions; every method defaults to a no-op
pub trait SelectionListener {
    fn on_selection_begin(&mut self) {}
    fn on_selected(&mut self, _record: &MediaRecord) {}
    fn on_unselected(&mut self, _record: &MediaRecord) {}
    fn on_select_all(&mut self) {}
    fn on_unselect_all(&mut self) {}
    fn on_selection_end(&mut self) {}
    fn on_max_reached(&mut self) {}
}

/// Listener that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullListener;

impl SelectionListener for NullListener {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Selecting,
}

/// Persistable selection snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub records: Vec<MediaRecord>,
}

/// One selection session
///
/// Selected records keep their selection order. Record identity is path
/// identity, so a selection survives reloads that reassign store row ids.
pub struct SelectionSession<L: SelectionListener> {
    selected: Vec<MediaRecord>,
    max_selection: i32,
    single_choice: bool,
    phase: Phase,
    listener: L,
}

impl<L: SelectionListener> SelectionSession<L> {
    /// Start a session bounded by the configuration, seeded with its
    /// pre-selected records
    #[must_use]
    pub fn new(configs: &Configurations, listener: L) -> Self {
        let selected = configs.selected_records().to_vec();
        let phase = if selected.is_empty() {
            Phase::Idle
        } else {
            Phase::Selecting
        };
        Self {
            selected,
            max_selection: configs.max_selection(),
            single_choice: configs.single_choice_mode(),
            phase,
            listener,
        }
    }

    /// Restore a session from a snapshot
    #[must_use]
    pub fn from_snapshot(configs: &Configurations, snapshot: SelectionSnapshot, listener: L) -> Self {
        let mut session = Self::new(configs, listener);
        if !session.single_choice {
            session.selected = snapshot.records;
            session.phase = if session.selected.is_empty() {
                Phase::Idle
            } else {
                Phase::Selecting
            };
        }
        session
    }

    #[must_use]
    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            records: self.selected.clone(),
        }
    }

    #[must_use]
    pub fn selected(&self) -> &[MediaRecord] {
        &self.selected
    }

    /// Borrow the listener, e.g. to inspect what it accumulated
    #[must_use]
    pub fn listener(&self) -> &L {
        &self.listener
    }

    #[must_use]
    pub fn is_selected(&self, record: &MediaRecord) -> bool {
        self.selected.iter().any(|r| r.path == record.path)
    }

    #[must_use]
    pub fn is_selecting(&self) -> bool {
        self.phase == Phase::Selecting
    }

    /// Select one record
    ///
    /// Already-selected records are a no-op. In single-choice mode the
    /// previous choice is evicted first (with `on_unselected`, but no end
    /// event). In bounded multi-choice a full set rejects the record with
    /// `on_max_reached`.
    pub fn select(&mut self, record: &MediaRecord) {
        if self.is_selected(record) {
            return;
        }

        if self.single_choice {
            if let Some(previous) = self.selected.pop() {
                self.listener.on_unselected(&previous);
            }
        } else if self.at_capacity() {
            self.listener.on_max_reached();
            return;
        }

        if self.phase == Phase::Idle {
            self.phase = Phase::Selecting;
            self.listener.on_selection_begin();
        }
        self.selected.push(record.clone());
        self.listener.on_selected(record);
    }

    /// Unselect one record; a no-op when it is not selected
    pub fn unselect(&mut self, record: &MediaRecord) {
        let Some(idx) = self.selected.iter().position(|r| r.path == record.path) else {
            return;
        };
        let removed = self.selected.remove(idx);
        self.listener.on_unselected(&removed);
        self.finish_if_empty();
    }

    /// Toggle a record's selection
    pub fn toggle(&mut self, record: &MediaRecord) {
        if self.is_selected(record) {
            self.unselect(record);
        } else {
            self.select(record);
        }
    }

    /// Replace the selection with every loaded record
    ///
    /// An explicit bulk action: it is not subject to `max_selection`, and it
    /// is ignored entirely in single-choice mode.
    pub fn select_all(&mut self, loaded: &[MediaRecord]) {
        if self.single_choice {
            return;
        }
        if self.phase == Phase::Idle && !loaded.is_empty() {
            self.phase = Phase::Selecting;
            self.listener.on_selection_begin();
        }
        self.selected = loaded.to_vec();
        self.listener.on_select_all();
        self.finish_if_empty();
    }

    /// Unselect everything, one record at a time from the end
    pub fn unselect_all(&mut self) {
        while let Some(record) = self.selected.pop() {
            self.listener.on_unselected(&record);
        }
        self.listener.on_unselect_all();
        self.finish_if_empty();
    }

    /// Drop selected records that are no longer in the loaded list
    ///
    /// Called after a published list update; each pruned record emits
    /// `on_unselected`.
    pub fn prune_missing(&mut self, loaded: &[MediaRecord]) {
        let mut idx = 0;
        while idx < self.selected.len() {
            if loaded.iter().any(|r| r.path == self.selected[idx].path) {
                idx += 1;
            } else {
                let removed = self.selected.remove(idx);
                self.listener.on_unselected(&removed);
            }
        }
        self.finish_if_empty();
    }

    /// Drop one record that was removed from the list
    pub fn handle_removed(&mut self, record: &MediaRecord) {
        self.unselect(record);
    }

    fn at_capacity(&self) -> bool {
        self.max_selection > 0 && self.selected.len() >= self.max_selection as usize
    }

    fn finish_if_empty(&mut self) {
        if self.selected.is_empty() && self.phase == Phase::Selecting {
            self.phase = Phase::Idle;
            if !self.single_choice {
                self.listener.on_selection_end();
            }
        }
    }
}
