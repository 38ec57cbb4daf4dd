//! List diffing
//!
//! Computes the minimal-ish set of updates between two published record
//! lists. Rows are matched by store id; matched rows whose
//! [`content_key`](crate::media::MediaRecord::content_key) differs are
//! reported as changed in place. Ids present in both lists but not on the
//! longest common subsequence are reported as moves.

use std::collections::{HashMap, HashSet};

use crate::media::MediaRecord;

/// One list mutation event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListUpdate {
    Inserted { position: usize, count: usize },
    Removed { position: usize, count: usize },
    Moved { from: usize, to: usize },
    Changed { position: usize, count: usize },
}

/// Diff two record lists
///
/// Removals are emitted first (old coordinates, later runs first), then
/// moves, then insertions and in-place changes (new coordinates).
#[must_use]
pub fn diff_records(old: &[MediaRecord], new: &[MediaRecord]) -> Vec<ListUpdate> {
    if old.is_empty() && new.is_empty() {
        return Vec::new();
    }
    if old.is_empty() {
        return vec![ListUpdate::Inserted {
            position: 0,
            count: new.len(),
        }];
    }
    if new.is_empty() {
        return vec![ListUpdate::Removed {
            position: 0,
            count: old.len(),
        }];
    }

    let old_index: HashMap<i64, usize> = old.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
    let new_index: HashMap<i64, usize> = new.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
    let stable = lcs_ids(old, new);

    let mut updates = Vec::new();

    let removed: Vec<usize> = old
        .iter()
        .enumerate()
        .filter(|(_, r)| !new_index.contains_key(&r.id))
        .map(|(i, _)| i)
        .collect();
    for (position, count) in coalesce(&removed).into_iter().rev() {
        updates.push(ListUpdate::Removed { position, count });
    }

    for (from, record) in old.iter().enumerate() {
        if let Some(&to) = new_index.get(&record.id) {
            if !stable.contains(&record.id) {
                updates.push(ListUpdate::Moved { from, to });
            }
        }
    }

    let inserted: Vec<usize> = new
        .iter()
        .enumerate()
        .filter(|(_, r)| !old_index.contains_key(&r.id))
        .map(|(i, _)| i)
        .collect();
    for (position, count) in coalesce(&inserted) {
        updates.push(ListUpdate::Inserted { position, count });
    }

    let changed: Vec<usize> = new
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            old_index
                .get(&r.id)
                .is_some_and(|&i| old[i].content_key() != r.content_key())
        })
        .map(|(i, _)| i)
        .collect();
    for (position, count) in coalesce(&changed) {
        updates.push(ListUpdate::Changed { position, count });
    }

    updates
}

/// Ids on one longest common subsequence of the two lists
fn lcs_ids(old: &[MediaRecord], new: &[MediaRecord]) -> HashSet<i64> {
    let n = old.len();
    let m = new.len();
    let mut lengths = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lengths[i][j] = if old[i].id == new[j].id {
                lengths[i + 1][j + 1] + 1
            } else {
                lengths[i + 1][j].max(lengths[i][j + 1])
            };
        }
    }

    let mut ids = HashSet::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i].id == new[j].id {
            ids.insert(old[i].id);
            i += 1;
            j += 1;
        } else if lengths[i + 1][j] >= lengths[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    ids
}

/// Collapse sorted positions into `(start, count)` runs
fn coalesce(positions: &[usize]) -> Vec<(usize, usize)> {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for &p in positions {
        match runs.last_mut() {
            Some((start, count)) if *start + *count == p => *count += 1,
            _ => runs.push((p, 1)),
        }
    }
    runs
}
