pub mod config;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod logging;
pub mod persistence;
pub mod placement;
pub mod region;
pub mod selection;
pub mod store;
pub mod sync;
pub mod tool;
pub mod viewport;

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

pub use error::{AppError, AppResult};

use persistence::{InMemoryAdapter, PersistenceAdapter};
use store::{EditorAction, EditorStore};

const SYNC_TIMEOUT: Duration = Duration::from_secs(10);

/// Replays newline-delimited JSON actions from stdin against an in-memory
/// backend and prints the resulting snapshot to stdout.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!("starting cartographer");

    let config = config::load_editor_config();
    let adapter: Arc<dyn PersistenceAdapter> = Arc::new(InMemoryAdapter::new());
    let mut store = EditorStore::new(adapter, &config);

    let stdin = std::io::stdin();
    replay(&mut store, stdin.lock())?;

    if !store.wait_for_sync(SYNC_TIMEOUT) {
        tracing::warn!(pending = store.pending_sync_count(), "sync did not finish in time");
    }

    let snapshot = store.snapshot();
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &snapshot).map_err(AppError::Encode)?;
    writeln!(stdout)?;
    Ok(())
}

/// Applies each non-blank line as an [`EditorAction`]. Actions the store
/// rejects are logged and skipped; malformed lines abort the replay.
pub fn replay(store: &mut EditorStore, input: impl BufRead) -> AppResult<usize> {
    let mut applied = 0;
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let action: EditorAction = serde_json::from_str(&line).map_err(|source| {
            AppError::InvalidAction {
                line: index + 1,
                source,
            }
        })?;
        match store.dispatch(action) {
            Ok(()) => applied += 1,
            Err(err) => tracing::warn!(line = index + 1, %err, "action rejected"),
        }
        store.process_sync_messages();
    }
    tracing::info!(applied, "replay complete");
    Ok(applied)
}
