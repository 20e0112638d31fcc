//! Background persistence and per-region write tracking.
//!
//! Region writes are queued to a single worker thread and tracked in a
//! [`SyncLedger`] so the UI can show pending writes, retry failed ones, or roll
//! them back. Loads carry a request number so only the newest result lands.

mod status;
mod worker;

use std::collections::HashMap;

use crate::persistence::PersistenceResult;
use crate::placement::Placement;
use crate::region::Region;

pub use status::{next_status, transition, SyncError, SyncEvent, SyncResult, SyncStatus};
pub(crate) use worker::SyncWorker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
}

impl WriteOp {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "create region",
            Self::Update => "update region",
        }
    }
}

#[derive(Debug)]
pub(crate) enum SyncJob {
    LoadRegions {
        request: u64,
        map_id: String,
    },
    LoadPlacements {
        request: u64,
        map_id: String,
    },
    WriteRegion {
        op: WriteOp,
        attempt: u64,
        region: Region,
    },
}

#[derive(Debug)]
pub(crate) enum SyncMessage {
    RegionsLoaded {
        request: u64,
        map_id: String,
        result: PersistenceResult<Vec<Region>>,
    },
    PlacementsLoaded {
        request: u64,
        map_id: String,
        result: PersistenceResult<Vec<Placement>>,
    },
    RegionWritten {
        op: WriteOp,
        attempt: u64,
        region: Region,
        result: PersistenceResult<()>,
    },
}

/// Issues monotonically increasing load request numbers.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub(crate) fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub(crate) fn is_latest(&self, request: u64) -> bool {
        request == self.latest
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRecord {
    pub status: SyncStatus,
    /// Last version confirmed by the backend; `None` if it never was.
    pub baseline: Option<Region>,
    pub attempt: u64,
    pub last_error: Option<String>,
}

impl SyncRecord {
    /// Writes against an unconfirmed region must recreate it.
    pub fn retry_op(&self) -> WriteOp {
        if self.baseline.is_some() {
            WriteOp::Update
        } else {
            WriteOp::Create
        }
    }
}

/// Outcome of feeding a write result into the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WriteOutcome {
    Synced,
    Failed(String),
    /// Result for an attempt that has since been superseded.
    Superseded,
    Untracked,
}

#[derive(Debug, Clone, Default)]
pub struct SyncLedger {
    records: HashMap<String, SyncRecord>,
}

impl SyncLedger {
    pub fn status(&self, region_id: &str) -> Option<SyncStatus> {
        self.records.get(region_id).map(|record| record.status)
    }

    pub fn record(&self, region_id: &str) -> Option<&SyncRecord> {
        self.records.get(region_id)
    }

    pub fn pending_count(&self) -> usize {
        self.count(SyncStatus::Pending)
    }

    pub fn failed_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self
            .records
            .iter()
            .filter(|(_, record)| record.status == SyncStatus::Failed)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Marks a new write. `confirmed` is the version the backend holds, if
    /// any; it becomes the rollback target unless an unconfirmed write is
    /// already outstanding.
    pub(crate) fn submit(
        &mut self,
        region_id: &str,
        confirmed: Option<Region>,
    ) -> SyncResult<u64> {
        self.advance(region_id, SyncEvent::Submit, confirmed)
    }

    pub(crate) fn retry(&mut self, region_id: &str) -> SyncResult<(u64, WriteOp)> {
        let attempt = self.advance(region_id, SyncEvent::Retry, None)?;
        let op = self
            .records
            .get(region_id)
            .map(SyncRecord::retry_op)
            .unwrap_or(WriteOp::Create);
        Ok((attempt, op))
    }

    pub(crate) fn apply_result(
        &mut self,
        region: &Region,
        attempt: u64,
        result: &PersistenceResult<()>,
    ) -> WriteOutcome {
        let Some(record) = self.records.get_mut(&region.id) else {
            return WriteOutcome::Untracked;
        };

        if attempt != record.attempt {
            if result.is_ok() {
                record.baseline = Some(region.clone());
            }
            return WriteOutcome::Superseded;
        }

        let event = if result.is_ok() {
            SyncEvent::Succeed
        } else {
            SyncEvent::Fail
        };
        let Ok(next) = transition(&region.id, Some(record.status), event) else {
            return WriteOutcome::Superseded;
        };
        record.status = next;
        match result {
            Ok(()) => {
                record.baseline = Some(region.clone());
                record.last_error = None;
                WriteOutcome::Synced
            }
            Err(err) => {
                let message = err.to_string();
                record.last_error = Some(message.clone());
                WriteOutcome::Failed(message)
            }
        }
    }

    /// Records a write that could not even be queued.
    pub(crate) fn mark_failed(&mut self, region_id: &str, message: String) {
        if let Some(record) = self.records.get_mut(region_id) {
            record.status = SyncStatus::Failed;
            record.last_error = Some(message);
        }
    }

    /// Forgets a failed write and returns the confirmed version to restore
    /// (`None` means the region never reached the backend).
    pub(crate) fn take_failed(&mut self, region_id: &str) -> SyncResult<Option<Region>> {
        match self.records.get(region_id) {
            Some(record) if record.status == SyncStatus::Failed => Ok(self
                .records
                .remove(region_id)
                .and_then(|record| record.baseline)),
            _ => Err(SyncError::NotFailed {
                entity_id: region_id.to_string(),
            }),
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    fn advance(
        &mut self,
        region_id: &str,
        event: SyncEvent,
        confirmed: Option<Region>,
    ) -> SyncResult<u64> {
        let current = self.records.get(region_id).map(|record| record.status);
        let next = transition(region_id, current, event)?;
        let record = self
            .records
            .entry(region_id.to_string())
            .or_insert_with(|| SyncRecord {
                status: next,
                baseline: confirmed.clone(),
                attempt: 0,
                last_error: None,
            });
        if record.status == SyncStatus::Synced {
            record.baseline = confirmed;
        }
        record.status = next;
        record.attempt += 1;
        Ok(record.attempt)
    }

    fn count(&self, status: SyncStatus) -> usize {
        self.records
            .values()
            .filter(|record| record.status == status)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::PersistenceError;

    fn region(name: &str) -> Region {
        Region::new("r", "map", name, 0, 0, 2)
    }

    fn failure() -> PersistenceResult<()> {
        Err(PersistenceError::Unavailable {
            message: "offline".to_string(),
        })
    }

    #[test]
    fn request_sequence_only_accepts_latest() {
        let mut sequence = RequestSequence::default();
        let first = sequence.issue();
        let second = sequence.issue();
        assert!(second > first);
        assert!(!sequence.is_latest(first));
        assert!(sequence.is_latest(second));
    }

    #[test]
    fn successful_write_becomes_synced() {
        let mut ledger = SyncLedger::default();
        let attempt = ledger.submit("r", None).expect("submit");
        assert_eq!(ledger.status("r"), Some(SyncStatus::Pending));
        assert_eq!(ledger.pending_count(), 1);

        let outcome = ledger.apply_result(&region("A"), attempt, &Ok(()));
        assert_eq!(outcome, WriteOutcome::Synced);
        assert_eq!(ledger.status("r"), Some(SyncStatus::Synced));
        assert_eq!(ledger.pending_count(), 0);
        assert_eq!(
            ledger.record("r").and_then(|r| r.baseline.clone()).map(|r| r.name),
            Some("A".to_string())
        );
    }

    #[test]
    fn superseded_attempts_do_not_change_status() {
        let mut ledger = SyncLedger::default();
        let first = ledger.submit("r", None).expect("first submit");
        let second = ledger.submit("r", None).expect("second submit");

        let outcome = ledger.apply_result(&region("A"), first, &Ok(()));
        assert_eq!(outcome, WriteOutcome::Superseded);
        assert_eq!(ledger.status("r"), Some(SyncStatus::Pending));
        assert_eq!(ledger.record("r").map(SyncRecord::retry_op), Some(WriteOp::Update));

        let outcome = ledger.apply_result(&region("B"), second, &failure());
        assert!(matches!(outcome, WriteOutcome::Failed(_)));
        assert_eq!(ledger.failed_ids(), vec!["r".to_string()]);
    }

    #[test]
    fn retry_uses_create_until_backend_confirms() {
        let mut ledger = SyncLedger::default();
        let attempt = ledger.submit("r", None).expect("submit");
        ledger.apply_result(&region("A"), attempt, &failure());

        let (retry_attempt, op) = ledger.retry("r").expect("retry failed write");
        assert_eq!(op, WriteOp::Create);
        assert!(retry_attempt > attempt);
        assert_eq!(ledger.status("r"), Some(SyncStatus::Pending));
        assert!(ledger.retry("r").is_err());
    }

    #[test]
    fn take_failed_returns_confirmed_version() {
        let mut ledger = SyncLedger::default();
        let attempt = ledger.submit("r", Some(region("Confirmed"))).expect("submit");
        ledger.apply_result(&region("Edited"), attempt, &failure());

        let baseline = ledger.take_failed("r").expect("failed write");
        assert_eq!(baseline.map(|r| r.name), Some("Confirmed".to_string()));
        assert!(ledger.status("r").is_none());
        assert!(matches!(
            ledger.take_failed("r"),
            Err(SyncError::NotFailed { .. })
        ));
    }
}
