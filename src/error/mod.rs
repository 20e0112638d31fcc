use crate::persistence::PersistenceError;
use crate::placement::PlacementError;
use crate::region::RegionError;
use crate::store::StoreError;
use crate::sync::SyncError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Region(#[from] RegionError),
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid action on line {line}: {source}")]
    InvalidAction {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}
