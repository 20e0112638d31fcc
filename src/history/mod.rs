//! Linear undo/redo log of placement mutations.
//!
//! Each entry carries full before/after snapshots of the placement list, so
//! undo and redo restore state rather than replaying operations. Appending
//! while the cursor is behind the tip discards the redo branch.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::placement::Placement;

pub const DEFAULT_MAX_HISTORY_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HistoryKind {
    Created,
    Updated,
    Deleted,
    Moved,
    Copied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub kind: HistoryKind,
    pub timestamp: u64,
    /// Placements touched by the mutation, as they are after it.
    pub placements: Vec<Placement>,
    pub previous_placements: Vec<Placement>,
    pub resulting_placements: Vec<Placement>,
}

impl HistoryEntry {
    pub fn new(
        kind: HistoryKind,
        placements: Vec<Placement>,
        previous_placements: Vec<Placement>,
        resulting_placements: Vec<Placement>,
    ) -> Self {
        Self {
            kind,
            timestamp: now_millis(),
            placements,
            previous_placements,
            resulting_placements,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    /// `-1` when nothing is applied; otherwise index of the last applied entry.
    index: isize,
    max_size: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::with_max_size(DEFAULT_MAX_HISTORY_SIZE)
    }
}

impl HistoryLog {
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: -1,
            max_size: max_size.max(1),
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub const fn index(&self) -> isize {
        self.index
    }

    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.index >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.index < self.tip()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.applied_len());
        self.entries.push(entry);
        if self.entries.len() > self.max_size {
            self.entries.remove(0);
        }
        self.index = self.tip();
        tracing::debug!(
            kind = ?self.entries.last().map(|entry| entry.kind),
            len = self.entries.len(),
            index = self.index,
            "history entry recorded"
        );
    }

    /// Steps back and returns the snapshot to restore.
    pub fn undo(&mut self) -> Option<&[Placement]> {
        let current = usize::try_from(self.index).ok()?;
        self.index -= 1;
        Some(&self.entries[current].previous_placements)
    }

    /// Steps forward and returns the snapshot to restore.
    pub fn redo(&mut self) -> Option<&[Placement]> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        let next = usize::try_from(self.index).ok()?;
        Some(&self.entries[next].resulting_placements)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = -1;
    }

    fn applied_len(&self) -> usize {
        usize::try_from(self.index + 1).unwrap_or(0)
    }

    fn tip(&self) -> isize {
        isize::try_from(self.entries.len()).unwrap_or(isize::MAX) - 1
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::test_placement;

    fn entry(tag: &str) -> HistoryEntry {
        let placement = test_placement(tag, 0, 0);
        HistoryEntry::new(
            HistoryKind::Created,
            vec![placement.clone()],
            Vec::new(),
            vec![placement],
        )
    }

    fn last_id(log: &HistoryLog) -> Option<String> {
        log.entries()
            .last()
            .and_then(|entry| entry.placements.first())
            .map(|placement| placement.id.clone())
    }

    #[test]
    fn empty_log_cannot_undo_or_redo() {
        let mut log = HistoryLog::default();
        assert_eq!(log.index(), -1);
        assert!(!log.can_undo());
        assert!(!log.can_redo());
        assert!(log.undo().is_none());
        assert!(log.redo().is_none());
        assert_eq!(log.index(), -1);
    }

    #[test]
    fn undo_and_redo_move_cursor_within_bounds() {
        let mut log = HistoryLog::default();
        log.push(entry("a"));
        log.push(entry("b"));
        assert_eq!(log.index(), 1);

        assert!(log.undo().is_some());
        assert!(log.undo().is_some());
        assert_eq!(log.index(), -1);
        assert!(log.undo().is_none());

        let redone = log.redo().expect("redo first entry").to_vec();
        assert_eq!(redone[0].id, "a");
        assert!(log.redo().is_some());
        assert_eq!(log.index(), 1);
        assert!(log.redo().is_none());
    }

    #[test]
    fn push_behind_tip_discards_redo_branch() {
        let mut log = HistoryLog::default();
        log.push(entry("a"));
        log.push(entry("b"));
        log.push(entry("c"));
        log.undo();
        log.undo();
        let index_before = log.index();

        log.push(entry("d"));
        assert_eq!(log.len(), usize::try_from(index_before + 2).expect("non-negative"));
        assert_eq!(last_id(&log).as_deref(), Some("d"));
        assert!(!log.can_redo());
    }

    #[test]
    fn overflow_evicts_oldest_and_keeps_cursor_at_tip() {
        let mut log = HistoryLog::with_max_size(3);
        for tag in ["a", "b", "c", "d", "e"] {
            log.push(entry(tag));
            assert!(log.len() <= 3);
            assert!(log.index() >= -1 && log.index() < log.len() as isize);
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.index(), 2);
        assert_eq!(
            log.entries()[0].placements[0].id,
            "c",
            "two oldest entries should be evicted"
        );
    }

    #[test]
    fn zero_max_size_still_keeps_one_entry() {
        let mut log = HistoryLog::with_max_size(0);
        log.push(entry("a"));
        log.push(entry("b"));
        assert_eq!(log.len(), 1);
        assert_eq!(log.max_size(), 1);
    }
}
