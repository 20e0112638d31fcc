use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use super::{SyncJob, SyncMessage, SyncError, SyncResult};
use crate::persistence::{PersistenceAdapter, PersistenceError, PersistenceResult};

/// Background thread that runs persistence calls in submission order and
/// hands results back over a channel. The owner drains results on its own
/// thread, so store state is only ever touched by one writer.
pub(crate) struct SyncWorker {
    jobs: Sender<SyncJob>,
    results: Receiver<SyncMessage>,
    in_flight: usize,
}

impl SyncWorker {
    pub(crate) fn spawn(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<SyncJob>();
        let (result_tx, result_rx) = mpsc::channel::<SyncMessage>();
        std::thread::spawn(move || {
            for job in job_rx {
                let message = run_job(adapter.as_ref(), job);
                if result_tx.send(message).is_err() {
                    break;
                }
            }
            tracing::debug!("sync worker stopped");
        });
        Self {
            jobs: job_tx,
            results: result_rx,
            in_flight: 0,
        }
    }

    pub(crate) fn submit(&mut self, job: SyncJob) -> SyncResult<()> {
        self.jobs.send(job).map_err(|_| SyncError::WorkerStopped)?;
        self.in_flight += 1;
        Ok(())
    }

    pub(crate) const fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub(crate) fn try_next(&mut self) -> Option<SyncMessage> {
        let message = self.results.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(message)
    }

    pub(crate) fn next_within(&mut self, timeout: Duration) -> Option<SyncMessage> {
        match self.results.recv_timeout(timeout) {
            Ok(message) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(message)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                tracing::warn!(in_flight = self.in_flight, "sync worker disconnected");
                self.in_flight = 0;
                None
            }
        }
    }
}

fn run_job(adapter: &dyn PersistenceAdapter, job: SyncJob) -> SyncMessage {
    match job {
        SyncJob::LoadRegions { request, map_id } => {
            let result = guarded("list regions", || adapter.list_regions(&map_id));
            SyncMessage::RegionsLoaded {
                request,
                map_id,
                result,
            }
        }
        SyncJob::LoadPlacements { request, map_id } => {
            let result = guarded("list placements", || adapter.list_placements(&map_id));
            SyncMessage::PlacementsLoaded {
                request,
                map_id,
                result,
            }
        }
        SyncJob::WriteRegion {
            op,
            attempt,
            region,
        } => {
            let result = guarded(op.label(), || match op {
                super::WriteOp::Create => adapter.create_region(&region),
                super::WriteOp::Update => adapter.update_region(&region),
            });
            SyncMessage::RegionWritten {
                op,
                attempt,
                region,
                result,
            }
        }
    }
}

fn guarded<T>(
    operation: &'static str,
    call: impl FnOnce() -> PersistenceResult<T>,
) -> PersistenceResult<T> {
    panic::catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|_| {
        Err(PersistenceError::Unavailable {
            message: format!("{operation} panicked"),
        })
    })
}
