//! The editor store: one owned state object composing viewport, selection,
//! regions, placements, history and clipboard behind a single action API.
//!
//! All mutation is synchronous on the caller's thread. Persistence runs on a
//! background worker; its results are folded back in by
//! [`EditorStore::process_sync_messages`] or [`EditorStore::wait_for_sync`].

mod action;
mod snapshot;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::EditorConfig;
use crate::geometry::{CellBounds, CellCoordinate, CellIter, CoordinateConfig};
use crate::history::{HistoryEntry, HistoryKind, HistoryLog};
use crate::persistence::PersistenceAdapter;
use crate::placement::{
    ClampToImage, Clipboard, CoordinateTransform, Placement, PlacementError, PlacementRepository,
};
use crate::region::{
    self, resolve_environment, validation, MapEnvironment, Region, RegionError, RegionHierarchy,
    ResolvedEnvironment,
};
use crate::selection::{CellSelection, PlacementSelection, SelectionMode};
use crate::sync::{
    RequestSequence, SyncError, SyncJob, SyncLedger, SyncMessage, SyncRecord, SyncStatus,
    SyncWorker, WriteOp, WriteOutcome,
};
use crate::tool::ToolKind;
use crate::viewport::Viewport;

pub use action::EditorAction;
pub use snapshot::{EditorSnapshot, HistorySummary};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no map is open")]
    NoActiveMap,
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Region(#[from] RegionError),
    #[error(transparent)]
    Sync(#[from] SyncError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub struct EditorStore {
    map_id: Option<String>,
    coordinate_config: Option<CoordinateConfig>,
    map_environment: MapEnvironment,
    viewport: Viewport,
    tool: ToolKind,
    selection_mode: SelectionMode,
    cells: CellSelection,
    selected_placements: PlacementSelection,
    regions: RegionHierarchy,
    placements: PlacementRepository,
    history: HistoryLog,
    clipboard: Clipboard,
    transform: Box<dyn CoordinateTransform>,
    worker: SyncWorker,
    ledger: SyncLedger,
    region_requests: RequestSequence,
    placement_requests: RequestSequence,
}

impl std::fmt::Debug for EditorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorStore")
            .field("map_id", &self.map_id)
            .field("regions", &self.regions.regions().len())
            .field("placements", &self.placements.len())
            .field("history_index", &self.history.index())
            .field("in_flight", &self.worker.in_flight())
            .finish()
    }
}

impl EditorStore {
    pub fn new(adapter: Arc<dyn PersistenceAdapter>, config: &EditorConfig) -> Self {
        Self {
            map_id: None,
            coordinate_config: None,
            map_environment: MapEnvironment::default(),
            viewport: Viewport::with_defaults(
                config.default_zoom_percent,
                config.default_grid_size,
                config.show_grid,
                config.snap_to_grid,
            ),
            tool: ToolKind::default(),
            selection_mode: SelectionMode::default(),
            cells: CellSelection::new(),
            selected_placements: PlacementSelection::default(),
            regions: RegionHierarchy::new(),
            placements: PlacementRepository::new(),
            history: HistoryLog::with_max_size(config.max_history_size),
            clipboard: Clipboard::default(),
            transform: Box::new(ClampToImage),
            worker: SyncWorker::spawn(adapter),
            ledger: SyncLedger::default(),
            region_requests: RequestSequence::default(),
            placement_requests: RequestSequence::default(),
        }
    }

    pub fn with_transform(mut self, transform: Box<dyn CoordinateTransform>) -> Self {
        self.transform = transform;
        self
    }
}

impl EditorStore {
    pub fn current_map_id(&self) -> Option<&str> {
        self.map_id.as_deref()
    }

    pub fn coordinate_config(&self) -> Option<&CoordinateConfig> {
        self.coordinate_config.as_ref()
    }

    /// Makes `map_id` current. Switching maps drops all map-scoped state; the
    /// clipboard survives so placements can be pasted across maps.
    pub fn open_map(&mut self, map_id: &str, coordinate_config: Option<CoordinateConfig>) {
        if self.map_id.as_deref() != Some(map_id) {
            tracing::info!(map_id, previous = ?self.map_id, "opening map");
            self.map_id = Some(map_id.to_string());
            self.map_environment = MapEnvironment::default();
            self.regions.clear();
            self.placements.replace_all(Vec::new());
            self.history.clear();
            self.cells.clear();
            self.selected_placements.clear();
            self.ledger.clear();
        }
        self.coordinate_config = coordinate_config;
    }

    pub fn set_coordinate_config(&mut self, coordinate_config: Option<CoordinateConfig>) {
        self.coordinate_config = coordinate_config;
    }

    pub fn set_map_environment(&mut self, environment: MapEnvironment) {
        self.map_environment = environment;
    }

    pub fn map_environment(&self) -> &MapEnvironment {
        &self.map_environment
    }
}

impl EditorStore {
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_zoom(&mut self, zoom_percent: u16) {
        self.viewport.set_zoom_percent(zoom_percent);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn set_pan(&mut self, x: i32, y: i32) {
        self.viewport.set_pan(x, y);
    }

    pub fn toggle_grid(&mut self) {
        self.viewport.toggle_grid();
    }

    pub fn toggle_snap(&mut self) {
        self.viewport.toggle_snap();
    }

    pub fn set_grid_size(&mut self, grid_size: u32) {
        self.viewport.set_grid_size(grid_size);
    }

    pub fn reset_viewport(&mut self) {
        self.viewport.reset();
    }
}

impl EditorStore {
    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
        self.selection_mode = tool.selection_mode();
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.selection_mode = mode;
    }
}

impl EditorStore {
    pub fn selected_cell_bounds(&self) -> Option<CellBounds> {
        self.cells.bounds()
    }

    pub fn is_selecting_cells(&self) -> bool {
        self.cells.is_selecting()
    }

    pub fn select_cell(&mut self, x: i32, y: i32, add_to_selection: bool) {
        self.cells
            .select_cell(CellCoordinate::new(x, y), add_to_selection);
    }

    pub fn select_cell_range(&mut self, start: CellCoordinate, end: CellCoordinate) {
        self.cells.select_range(start, end);
    }

    pub fn select_cell_square(&mut self, start: CellCoordinate, end: CellCoordinate) {
        self.cells.select_square(start, end);
    }

    pub fn start_cell_selection(&mut self, cell: CellCoordinate) {
        self.cells.start_drag(cell);
    }

    pub fn update_cell_selection(&mut self, cell: CellCoordinate) {
        self.cells.update_drag(cell);
    }

    pub fn end_cell_selection(&mut self) {
        self.cells.end_drag();
    }

    pub fn select_all_cells(&mut self) {
        if !self.cells.select_all(self.coordinate_config.as_ref()) {
            tracing::warn!(map_id = ?self.map_id, "select all cells needs a usable coordinate config");
        }
    }

    pub fn clear_cell_selection(&mut self) {
        self.cells.clear();
    }

    /// Lazily enumerates the selected cells row by row. The iterator is
    /// `Clone`, so callers can restart it without touching the selection.
    pub fn selected_cells(&self) -> Option<CellIter> {
        self.cells.cells()
    }
}

impl EditorStore {
    pub fn regions(&self) -> &[Region] {
        self.regions.regions()
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.get(id)
    }

    pub fn selected_region_id(&self) -> Option<&str> {
        self.regions.selected_region_id()
    }

    pub fn selected_region(&self) -> Option<&Region> {
        self.regions.selected_region()
    }

    pub fn base_region(&self) -> Option<&Region> {
        self.regions.base_region()
    }

    pub fn visible_region_ids(&self) -> &Arc<BTreeSet<String>> {
        self.regions.visible_region_ids()
    }

    /// Queues a region fetch. Ignored unless `map_id` is the open map.
    pub fn load_regions(&mut self, map_id: &str) {
        if self.map_id.as_deref() != Some(map_id) {
            tracing::debug!(map_id, current = ?self.map_id, "skipping region load for inactive map");
            return;
        }
        let request = self.region_requests.issue();
        let job = SyncJob::LoadRegions {
            request,
            map_id: map_id.to_string(),
        };
        if let Err(err) = self.worker.submit(job) {
            tracing::warn!(map_id, ?err, "could not queue region load");
        }
    }

    /// Adds and selects `region`, then persists it in the background.
    pub fn add_region(&mut self, region: Region) -> StoreResult<()> {
        let map_id = self.require_map()?;
        ensure_region_on_map(&region, &map_id)?;
        validation::ensure_square(region.width, region.height)?;
        if self.regions.contains(&region.id) {
            return Err(RegionError::AlreadyExists { id: region.id }.into());
        }
        if region.is_base() {
            if let Some(base) = self.regions.base_region() {
                return Err(RegionError::BaseRegionExists {
                    id: region.id,
                    base_id: base.id.clone(),
                }
                .into());
            }
        }
        self.regions.insert(region.clone());
        tracing::debug!(region_id = %region.id, %map_id, "region added");
        self.submit_region_write(WriteOp::Create, region, None);
        Ok(())
    }

    /// Replaces `region` by id and moves the cell selection onto its square.
    pub fn update_region(&mut self, region: Region) -> StoreResult<()> {
        let map_id = self.require_map()?;
        ensure_region_on_map(&region, &map_id)?;
        validation::ensure_square(region.width, region.height)?;
        let existing = self
            .regions
            .get(&region.id)
            .ok_or_else(|| RegionError::NotFound {
                id: region.id.clone(),
            })?;
        if existing.is_base() != region.is_base() {
            return Err(RegionError::BaseRegionRenamed { id: region.id }.into());
        }
        if existing.is_base() && existing.bounds() != region.bounds() {
            return Err(RegionError::BaseRegionGeometry { id: region.id }.into());
        }

        let previous = self.regions.replace(region.clone());
        self.cells.set_bounds(Some(region.bounds()));
        tracing::debug!(region_id = %region.id, %map_id, "region updated");
        self.submit_region_write(WriteOp::Update, region, previous);
        Ok(())
    }

    /// Turns the current square cell selection into a new region.
    pub fn create_region_from_selection(
        &mut self,
        name: &str,
        parent_region_id: Option<&str>,
    ) -> StoreResult<String> {
        let map_id = self.require_map()?;
        let bounds = self.cells.bounds().ok_or(RegionError::NoSelection)?;
        let grid = self
            .coordinate_config
            .as_ref()
            .and_then(CoordinateConfig::grid_size);
        validation::validate_selection_square(&bounds, grid)?;
        if let Some(parent_id) = parent_region_id {
            validation::validate_parent(parent_id, &map_id, self.regions.regions())?;
        }

        let id = format!("region-{}", uuid::Uuid::new_v4());
        let mut region = Region::new(
            id.clone(),
            map_id,
            name,
            bounds.min_x,
            bounds.min_y,
            bounds.width(),
        );
        region.parent_region_id = parent_region_id.map(str::to_string);
        if !validation::is_nested_within_parent(&region, self.regions.regions()) {
            tracing::warn!(region_id = %id, parent = ?parent_region_id, "new region extends past its parent");
        }
        self.add_region(region)?;
        Ok(id)
    }

    pub fn select_region(&mut self, id: &str) {
        if !self.regions.select(id) {
            tracing::debug!(region_id = id, "unknown region selected; clearing selection");
        }
        self.cells.set_bounds(None);
    }

    pub fn clear_region_selection(&mut self) {
        self.regions.clear_selection();
    }

    pub fn toggle_region_visibility(&mut self, id: &str) {
        self.regions.toggle_visibility(id);
    }

    pub fn set_region_visibility(&mut self, id: &str, visible: bool) {
        self.regions.set_visibility(id, visible);
    }

    pub fn resolved_environment(&self, region_id: &str) -> Option<ResolvedEnvironment> {
        resolve_environment(region_id, self.regions.regions(), &self.map_environment)
    }

    /// Advisory: whether the region sits inside its parent's square.
    pub fn validate_nesting(&self, region_id: &str) -> StoreResult<bool> {
        let region = self
            .regions
            .get(region_id)
            .ok_or_else(|| RegionError::NotFound {
                id: region_id.to_string(),
            })?;
        Ok(validation::is_nested_within_parent(
            region,
            self.regions.regions(),
        ))
    }
}

impl EditorStore {
    pub fn placements(&self) -> &[Placement] {
        self.placements.all()
    }

    pub fn placement(&self, id: &str) -> Option<&Placement> {
        self.placements.get(id)
    }

    pub fn selected_placement_ids(&self) -> &[String] {
        self.selected_placements.ids()
    }

    /// Queues a placement fetch for the open map; applying it resets history.
    pub fn load_placements(&mut self, map_id: &str) {
        if self.map_id.as_deref() != Some(map_id) {
            tracing::debug!(map_id, current = ?self.map_id, "skipping placement load for inactive map");
            return;
        }
        let request = self.placement_requests.issue();
        let job = SyncJob::LoadPlacements {
            request,
            map_id: map_id.to_string(),
        };
        if let Err(err) = self.worker.submit(job) {
            tracing::warn!(map_id, ?err, "could not queue placement load");
        }
    }

    pub fn add_placement(&mut self, placement: Placement) -> StoreResult<()> {
        let before = self.placements.snapshot();
        self.placements.add(placement.clone())?;
        self.record(HistoryKind::Created, vec![placement], before);
        Ok(())
    }

    pub fn update_placement(&mut self, placement: Placement) -> StoreResult<()> {
        let before = self.placements.snapshot();
        self.placements.update(placement.clone())?;
        self.record(HistoryKind::Updated, vec![placement], before);
        Ok(())
    }

    pub fn delete_placement(&mut self, id: &str) -> StoreResult<()> {
        let before = self.placements.snapshot();
        let removed = self.placements.remove(id)?;
        self.selected_placements.deselect(id);
        self.record(HistoryKind::Deleted, vec![removed], before);
        Ok(())
    }

    /// Deletes each selected placement as its own undo step.
    pub fn delete_selected_placements(&mut self) -> usize {
        let ids = self.selected_placements.ids().to_vec();
        let mut deleted = 0;
        for id in ids {
            match self.delete_placement(&id) {
                Ok(()) => deleted += 1,
                Err(err) => tracing::warn!(placement_id = %id, ?err, "skipping selected placement"),
            }
        }
        deleted
    }

    /// Moves the named placements by a pixel delta as one undo step.
    pub fn move_placements(&mut self, ids: &[String], delta_x: i32, delta_y: i32) -> usize {
        if delta_x == 0 && delta_y == 0 {
            return 0;
        }
        let before = self.placements.snapshot();
        let moved = self.placements.translate(
            ids,
            delta_x,
            delta_y,
            self.transform.as_ref(),
            self.coordinate_config.as_ref(),
        );
        let count = moved.len();
        if count > 0 {
            self.record(HistoryKind::Moved, moved, before);
        }
        count
    }

    pub fn select_placement(&mut self, id: &str, add_to_selection: bool) {
        if self.placements.contains(id) {
            self.selected_placements.select(id, add_to_selection);
        } else {
            tracing::debug!(placement_id = id, "unknown placement selected; clearing selection");
            self.selected_placements.clear();
        }
    }

    pub fn deselect_placement(&mut self, id: &str) {
        self.selected_placements.deselect(id);
    }

    pub fn select_all_placements(&mut self) {
        let ids = self.placements.all().iter().map(|p| p.id.clone());
        self.selected_placements.replace(ids);
    }

    pub fn clear_placement_selection(&mut self) {
        self.selected_placements.clear();
    }

    /// Clears cell, placement and region selection together.
    pub fn clear_all_selections(&mut self) {
        self.cells.clear();
        self.selected_placements.clear();
        self.regions.clear_selection();
    }
}

impl EditorStore {
    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    pub fn history_index(&self) -> isize {
        self.history.index()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().map(<[Placement]>::to_vec) else {
            return false;
        };
        self.restore_placements(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().map(<[Placement]>::to_vec) else {
            return false;
        };
        self.restore_placements(snapshot);
        true
    }
}

impl EditorStore {
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Copies the selected placements; returns how many were copied.
    pub fn copy_selected(&mut self) -> usize {
        let selected = self
            .placements
            .all()
            .iter()
            .filter(|placement| self.selected_placements.contains(&placement.id));
        self.clipboard.copy_from(selected);
        self.clipboard.entries().len()
    }

    pub fn cut_selected(&mut self) -> usize {
        let copied = self.copy_selected();
        self.delete_selected_placements();
        copied
    }

    /// Pastes the clipboard at an offset as one undo step and selects the copies.
    pub fn paste(&mut self, offset_x: i32, offset_y: i32) -> Vec<String> {
        let Some(map_id) = self.map_id.clone() else {
            tracing::warn!("paste ignored: no map is open");
            return Vec::new();
        };
        if self.clipboard.is_empty() {
            return Vec::new();
        }

        let pasted = self.clipboard.paste(
            &map_id,
            offset_x,
            offset_y,
            self.transform.as_ref(),
            self.coordinate_config.as_ref(),
            |id| self.placements.contains(id),
        );
        let before = self.placements.snapshot();
        let mut accepted = Vec::with_capacity(pasted.len());
        for placement in pasted {
            match self.placements.add(placement.clone()) {
                Ok(()) => accepted.push(placement),
                Err(err) => tracing::warn!(?err, "pasted placement rejected"),
            }
        }
        let ids: Vec<String> = accepted.iter().map(|placement| placement.id.clone()).collect();
        if !accepted.is_empty() {
            self.record(HistoryKind::Copied, accepted, before);
            self.selected_placements.replace(ids.iter().cloned());
        }
        ids
    }

    pub fn clear_clipboard(&mut self) {
        self.clipboard.clear();
    }
}

impl EditorStore {
    pub fn sync_status(&self, region_id: &str) -> Option<SyncStatus> {
        self.ledger.status(region_id)
    }

    pub fn sync_record(&self, region_id: &str) -> Option<&SyncRecord> {
        self.ledger.record(region_id)
    }

    pub fn pending_sync_count(&self) -> usize {
        self.ledger.pending_count()
    }

    pub fn failed_syncs(&self) -> Vec<String> {
        self.ledger.failed_ids()
    }

    /// Applies every result the worker has produced so far.
    pub fn process_sync_messages(&mut self) -> usize {
        let mut applied = 0;
        while let Some(message) = self.worker.try_next() {
            self.apply_sync_message(message);
            applied += 1;
        }
        applied
    }

    /// Blocks until all queued work has been applied or `timeout` elapses.
    /// Returns whether the queue drained.
    pub fn wait_for_sync(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.process_sync_messages();
        while self.worker.in_flight() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            if let Some(message) = self.worker.next_within(remaining) {
                self.apply_sync_message(message);
            }
        }
        self.worker.in_flight() == 0
    }

    /// Resubmits every failed region write with the region's current state.
    pub fn retry_failed_syncs(&mut self) -> StoreResult<usize> {
        let mut retried = 0;
        for id in self.ledger.failed_ids() {
            let Some(region) = self.regions.get(&id).cloned() else {
                tracing::warn!(region_id = %id, "failed write has no region left; dropping");
                self.ledger.take_failed(&id)?;
                continue;
            };
            let (attempt, op) = self.ledger.retry(&id)?;
            tracing::info!(region_id = %id, attempt, op = op.label(), "retrying region write");
            self.queue_write(op, attempt, region);
            retried += 1;
        }
        Ok(retried)
    }

    /// Undoes a failed write in memory: a never-confirmed region is removed,
    /// otherwise the last confirmed version is restored.
    pub fn rollback_failed_sync(&mut self, region_id: &str) -> StoreResult<()> {
        match self.ledger.take_failed(region_id)? {
            Some(confirmed) => {
                tracing::info!(region_id, "restoring last confirmed region");
                self.regions.replace(confirmed);
            }
            None => {
                tracing::info!(region_id, "removing region that never persisted");
                self.regions.remove(region_id);
            }
        }
        Ok(())
    }

    pub(crate) fn apply_sync_message(&mut self, message: SyncMessage) {
        match message {
            SyncMessage::RegionsLoaded {
                request,
                map_id,
                result,
            } => {
                if !self.region_requests.is_latest(request) || !self.is_current_map(&map_id) {
                    tracing::debug!(%map_id, request, "discarding stale region load");
                    return;
                }
                match result {
                    Ok(regions) => self.apply_loaded_regions(&map_id, regions),
                    Err(err) => tracing::warn!(%map_id, ?err, "region load failed"),
                }
            }
            SyncMessage::PlacementsLoaded {
                request,
                map_id,
                result,
            } => {
                if !self.placement_requests.is_latest(request) || !self.is_current_map(&map_id) {
                    tracing::debug!(%map_id, request, "discarding stale placement load");
                    return;
                }
                match result {
                    Ok(placements) => {
                        tracing::info!(%map_id, count = placements.len(), "placements loaded");
                        self.placements.replace_all(placements);
                        self.history.clear();
                        self.selected_placements.clear();
                    }
                    Err(err) => tracing::warn!(%map_id, ?err, "placement load failed"),
                }
            }
            SyncMessage::RegionWritten {
                op,
                attempt,
                region,
                result,
            } => match self.ledger.apply_result(&region, attempt, &result) {
                WriteOutcome::Synced => {
                    tracing::debug!(region_id = %region.id, op = op.label(), "region persisted");
                }
                WriteOutcome::Failed(message) => {
                    tracing::warn!(
                        region_id = %region.id,
                        op = op.label(),
                        error = %message,
                        "region write failed; keeping in-memory state"
                    );
                }
                WriteOutcome::Superseded | WriteOutcome::Untracked => {
                    tracing::debug!(region_id = %region.id, attempt, "ignoring outdated write result");
                }
            },
        }
    }

    fn apply_loaded_regions(&mut self, map_id: &str, mut loaded: Vec<Region>) {
        loaded.retain(|region| match accept_loaded_region(region, map_id) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(region_id = %region.id, %err, "skipping invalid loaded region");
                false
            }
        });

        // Local writes still in flight win over what the backend returned.
        for local in self.regions.regions() {
            let unconfirmed = matches!(
                self.ledger.status(&local.id),
                Some(SyncStatus::Pending | SyncStatus::Failed)
            );
            if !unconfirmed {
                continue;
            }
            match loaded.iter_mut().find(|region| region.id == local.id) {
                Some(slot) => *slot = local.clone(),
                None => loaded.push(local.clone()),
            }
        }

        let mut base_id: Option<String> = None;
        loaded.retain(|region| {
            if !region.is_base() {
                return true;
            }
            match &base_id {
                Some(kept) => {
                    tracing::warn!(region_id = %region.id, base_id = %kept, "skipping duplicate base region");
                    false
                }
                None => {
                    base_id = Some(region.id.clone());
                    true
                }
            }
        });

        let mut synthesized = None;
        if base_id.is_none() {
            match region::synthesize_base_region(map_id, self.coordinate_config.as_ref()) {
                Ok(base) => {
                    tracing::info!(map_id, region_id = %base.id, size = base.width, "creating base region");
                    loaded.push(base.clone());
                    synthesized = Some(base);
                }
                Err(err) => {
                    tracing::warn!(map_id, %err, "base region not created");
                }
            }
        }

        tracing::info!(map_id, count = loaded.len(), "regions loaded");
        self.regions.replace_all(loaded);
        if let Some(base) = synthesized {
            self.submit_region_write(WriteOp::Create, base, None);
        }
    }

    fn submit_region_write(&mut self, op: WriteOp, region: Region, confirmed: Option<Region>) {
        match self.ledger.submit(&region.id, confirmed) {
            Ok(attempt) => self.queue_write(op, attempt, region),
            Err(err) => tracing::warn!(region_id = %region.id, ?err, "region write not tracked"),
        }
    }

    fn queue_write(&mut self, op: WriteOp, attempt: u64, region: Region) {
        let region_id = region.id.clone();
        let job = SyncJob::WriteRegion {
            op,
            attempt,
            region,
        };
        if let Err(err) = self.worker.submit(job) {
            tracing::warn!(region_id = %region_id, ?err, "could not queue region write");
            self.ledger.mark_failed(&region_id, err.to_string());
        }
    }

    fn record(&mut self, kind: HistoryKind, affected: Vec<Placement>, before: Vec<Placement>) {
        let after = self.placements.snapshot();
        self.history
            .push(HistoryEntry::new(kind, affected, before, after));
    }

    fn restore_placements(&mut self, snapshot: Vec<Placement>) {
        self.placements.replace_all(snapshot);
        let placements = &self.placements;
        self.selected_placements
            .retain_existing(|id| placements.contains(id));
    }

    fn require_map(&self) -> StoreResult<String> {
        self.map_id.clone().ok_or(StoreError::NoActiveMap)
    }

    fn is_current_map(&self, map_id: &str) -> bool {
        self.map_id.as_deref() == Some(map_id)
    }
}

fn accept_loaded_region(region: &Region, map_id: &str) -> StoreResult<()> {
    ensure_region_on_map(region, map_id)?;
    validation::ensure_square(region.width, region.height)?;
    Ok(())
}

fn ensure_region_on_map(region: &Region, map_id: &str) -> StoreResult<()> {
    if region.map_id == map_id {
        Ok(())
    } else {
        Err(RegionError::WrongMap {
            id: region.id.clone(),
            region_map_id: region.map_id.clone(),
            map_id: map_id.to_string(),
        }
        .into())
    }
}
