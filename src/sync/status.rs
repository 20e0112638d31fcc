use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncStatus {
    Pending,
    Synced,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    Submit,
    Succeed,
    Fail,
    Retry,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("invalid sync transition for {entity_id}: from {from:?} using event {event:?}")]
    InvalidTransition {
        entity_id: String,
        from: Option<SyncStatus>,
        event: SyncEvent,
    },
    #[error("no failed sync recorded for {entity_id}")]
    NotFailed { entity_id: String },
    #[error("sync worker is no longer running")]
    WorkerStopped,
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// `None` stands for "never written in this session".
pub fn next_status(current: Option<SyncStatus>, event: SyncEvent) -> Option<SyncStatus> {
    use SyncEvent::*;
    match (current, event) {
        (None | Some(SyncStatus::Synced | SyncStatus::Failed), Submit) => Some(SyncStatus::Pending),
        (Some(SyncStatus::Pending), Submit) => Some(SyncStatus::Pending),
        (Some(SyncStatus::Pending), Succeed) => Some(SyncStatus::Synced),
        (Some(SyncStatus::Pending), Fail) => Some(SyncStatus::Failed),
        (Some(SyncStatus::Failed), Retry) => Some(SyncStatus::Pending),
        _ => None,
    }
}

pub fn transition(
    entity_id: &str,
    current: Option<SyncStatus>,
    event: SyncEvent,
) -> SyncResult<SyncStatus> {
    tracing::debug!(entity_id, from = ?current, event = ?event, "request sync transition");
    next_status(current, event).ok_or_else(|| {
        tracing::warn!(entity_id, from = ?current, event = ?event, "invalid sync transition requested");
        SyncError::InvalidTransition {
            entity_id: entity_id.to_string(),
            from: current,
            event,
        }
    })
}
