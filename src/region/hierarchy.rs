use std::collections::BTreeSet;
use std::sync::Arc;

use super::Region;

/// In-memory region list for the current map plus selection and visibility.
///
/// `visible_region_ids` is copy-on-write: every change installs a fresh `Arc`,
/// so observers can detect changes with [`Arc::ptr_eq`].
#[derive(Debug, Clone, Default)]
pub struct RegionHierarchy {
    regions: Vec<Region>,
    selected_region_id: Option<String>,
    visible_region_ids: Arc<BTreeSet<String>>,
}

impl RegionHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn get(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|region| region.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn base_region(&self) -> Option<&Region> {
        self.regions.iter().find(|region| region.is_base())
    }

    pub fn selected_region_id(&self) -> Option<&str> {
        self.selected_region_id.as_deref()
    }

    pub fn selected_region(&self) -> Option<&Region> {
        self.selected_region_id
            .as_deref()
            .and_then(|id| self.get(id))
    }

    pub fn visible_region_ids(&self) -> &Arc<BTreeSet<String>> {
        &self.visible_region_ids
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible_region_ids.contains(id)
    }

    /// Installs a freshly loaded set. The selection survives only if its id is
    /// still present; every loaded region becomes visible.
    pub fn replace_all(&mut self, mut regions: Vec<Region>) {
        for region in &mut regions {
            region.normalize_color();
        }
        if let Some(selected) = self.selected_region_id.as_deref() {
            if !regions.iter().any(|region| region.id == selected) {
                self.selected_region_id = None;
            }
        }
        self.visible_region_ids = Arc::new(regions.iter().map(|region| region.id.clone()).collect());
        self.regions = regions;
    }

    /// Appends `region`, selects it and makes it visible.
    pub fn insert(&mut self, mut region: Region) {
        region.normalize_color();
        let id = region.id.clone();
        self.regions.push(region);
        self.selected_region_id = Some(id.clone());
        self.update_visibility(|visible| {
            visible.insert(id);
        });
    }

    /// Swaps in `region` by id and returns the previous version.
    pub fn replace(&mut self, mut region: Region) -> Option<Region> {
        region.normalize_color();
        let slot = self.regions.iter_mut().find(|existing| existing.id == region.id)?;
        Some(std::mem::replace(slot, region))
    }

    pub fn remove(&mut self, id: &str) -> Option<Region> {
        let index = self.regions.iter().position(|region| region.id == id)?;
        let removed = self.regions.remove(index);
        if self.selected_region_id.as_deref() == Some(id) {
            self.selected_region_id = None;
        }
        if self.visible_region_ids.contains(id) {
            self.update_visibility(|visible| {
                visible.remove(id);
            });
        }
        Some(removed)
    }

    /// Returns `false` (and clears the selection) when `id` is unknown.
    pub fn select(&mut self, id: &str) -> bool {
        if self.contains(id) {
            self.selected_region_id = Some(id.to_string());
            true
        } else {
            self.selected_region_id = None;
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_region_id = None;
    }

    pub fn toggle_visibility(&mut self, id: &str) {
        let visible = self.is_visible(id);
        self.set_visibility(id, !visible);
    }

    pub fn set_visibility(&mut self, id: &str, visible: bool) {
        if self.is_visible(id) == visible {
            return;
        }
        self.update_visibility(|set| {
            if visible {
                set.insert(id.to_string());
            } else {
                set.remove(id);
            }
        });
    }

    pub fn clear(&mut self) {
        self.regions.clear();
        self.selected_region_id = None;
        self.visible_region_ids = Arc::new(BTreeSet::new());
    }

    fn update_visibility(&mut self, change: impl FnOnce(&mut BTreeSet<String>)) {
        let mut next = BTreeSet::clone(&self.visible_region_ids);
        change(&mut next);
        self.visible_region_ids = Arc::new(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(id: &str) -> Region {
        Region::new(id, "map", id.to_uppercase(), 0, 0, 2)
    }

    #[test]
    fn replace_all_keeps_selection_only_if_still_present() {
        let mut hierarchy = RegionHierarchy::new();
        hierarchy.replace_all(vec![region("a"), region("b")]);
        assert!(hierarchy.select("b"));

        hierarchy.replace_all(vec![region("b"), region("c")]);
        assert_eq!(hierarchy.selected_region_id(), Some("b"));

        hierarchy.replace_all(vec![region("c")]);
        assert_eq!(hierarchy.selected_region_id(), None);
    }

    #[test]
    fn replace_all_marks_every_region_visible() {
        let mut hierarchy = RegionHierarchy::new();
        hierarchy.replace_all(vec![region("a"), region("b")]);
        let visible: Vec<_> = hierarchy.visible_region_ids().iter().cloned().collect();
        assert_eq!(visible, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn visibility_changes_install_new_set() {
        let mut hierarchy = RegionHierarchy::new();
        hierarchy.replace_all(vec![region("a")]);
        let before = Arc::clone(hierarchy.visible_region_ids());

        hierarchy.toggle_visibility("a");
        assert!(!hierarchy.is_visible("a"));
        assert!(!Arc::ptr_eq(&before, hierarchy.visible_region_ids()));
        assert!(before.contains("a"));

        hierarchy.toggle_visibility("a");
        assert!(hierarchy.is_visible("a"));
    }

    #[test]
    fn set_visibility_to_current_value_keeps_same_set() {
        let mut hierarchy = RegionHierarchy::new();
        hierarchy.replace_all(vec![region("a")]);
        let before = Arc::clone(hierarchy.visible_region_ids());
        hierarchy.set_visibility("a", true);
        assert!(Arc::ptr_eq(&before, hierarchy.visible_region_ids()));
    }

    #[test]
    fn selecting_unknown_region_clears_selection() {
        let mut hierarchy = RegionHierarchy::new();
        hierarchy.insert(region("a"));
        assert_eq!(hierarchy.selected_region_id(), Some("a"));
        assert!(!hierarchy.select("missing"));
        assert_eq!(hierarchy.selected_region_id(), None);
    }

    #[test]
    fn replace_and_remove_report_previous_state() {
        let mut hierarchy = RegionHierarchy::new();
        hierarchy.insert(region("a"));
        let mut renamed = region("a");
        renamed.name = "Renamed".to_string();

        let previous = hierarchy.replace(renamed).expect("a should exist");
        assert_eq!(previous.name, "A");
        assert_eq!(hierarchy.get("a").map(|r| r.name.as_str()), Some("Renamed"));
        assert!(hierarchy.replace(region("zzz")).is_none());

        let removed = hierarchy.remove("a").expect("a should be removed");
        assert_eq!(removed.id, "a");
        assert!(hierarchy.selected_region_id().is_none());
        assert!(!hierarchy.is_visible("a"));
    }
}
