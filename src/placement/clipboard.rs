use std::collections::HashSet;

use super::{CoordinateTransform, Placement};
use crate::geometry::CoordinateConfig;
use crate::history::now_millis;

const PASTE_SUFFIX_LEN: usize = 6;

/// Value copies of placements waiting to be pasted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clipboard {
    entries: Vec<Placement>,
}

impl Clipboard {
    pub fn entries(&self) -> &[Placement] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn copy_from<'a>(&mut self, placements: impl IntoIterator<Item = &'a Placement>) {
        self.entries = placements.into_iter().cloned().collect();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Produces fresh placements for `map_id`, offset by `(offset_x, offset_y)`.
    /// New ids never collide with each other, with the clipboard ids, or with
    /// any id for which `is_taken` returns true.
    pub fn paste(
        &self,
        map_id: &str,
        offset_x: i32,
        offset_y: i32,
        transform: &dyn CoordinateTransform,
        config: Option<&CoordinateConfig>,
        is_taken: impl Fn(&str) -> bool,
    ) -> Vec<Placement> {
        let timestamp = now_millis();
        let mut issued: HashSet<String> = self.entries.iter().map(|p| p.id.clone()).collect();
        let mut pasted = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            let id = loop {
                let candidate = paste_id(&entry.id, timestamp);
                if !issued.contains(&candidate) && !is_taken(&candidate) {
                    break candidate;
                }
            };
            issued.insert(id.clone());

            let mut placement = transform.apply_delta(entry, offset_x, offset_y, config);
            placement.id = id;
            placement.map_id = map_id.to_string();
            pasted.push(placement);
        }
        pasted
    }
}

fn paste_id(original: &str, timestamp: u64) -> String {
    let suffix: String = std::iter::repeat_with(fastrand::alphanumeric)
        .take(PASTE_SUFFIX_LEN)
        .collect();
    format!("{original}-{timestamp}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MapPoint;
    use crate::placement::{test_placement, ClampToImage};

    #[test]
    fn copy_takes_value_snapshots() {
        let mut source = vec![test_placement("a", 1, 1)];
        let mut clipboard = Clipboard::default();
        clipboard.copy_from(&source);
        source[0].position = MapPoint::new(50, 50);
        assert_eq!(clipboard.entries()[0].position, MapPoint::new(1, 1));
    }

    #[test]
    fn paste_issues_distinct_ids_and_applies_offset() {
        let originals = vec![
            test_placement("a", 0, 0),
            test_placement("b", 10, 10),
            test_placement("c", 20, 20),
        ];
        let mut clipboard = Clipboard::default();
        clipboard.copy_from(&originals);

        let pasted = clipboard.paste("map-2", 5, 5, &ClampToImage, None, |_| false);
        assert_eq!(pasted.len(), 3);
        let ids: HashSet<_> = pasted.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        for (copy, original) in pasted.iter().zip(&originals) {
            assert_ne!(copy.id, original.id);
            assert!(copy.id.starts_with(&format!("{}-", original.id)));
            assert_eq!(copy.map_id, "map-2");
            assert_eq!(copy.position.x, original.position.x + 5);
            assert_eq!(copy.payload, original.payload);
        }
    }

    #[test]
    fn clear_empties_clipboard() {
        let mut clipboard = Clipboard::default();
        clipboard.copy_from(&[test_placement("a", 0, 0)]);
        assert!(!clipboard.is_empty());
        clipboard.clear();
        assert!(clipboard.is_empty());
        assert!(clipboard
            .paste("map-1", 0, 0, &ClampToImage, None, |_| false)
            .is_empty());
    }
}
