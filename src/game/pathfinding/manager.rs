use bevy::prelude::*;
use rustc_hash::FxHashMap;

use crate::game::grid::{GridLocation, GridMap, GridRect};

use super::flow_field::FlowField;

/// Cache of flow fields keyed by target cell.
///
/// Fields stay valid as long as the map's obstacle layout does not change.
/// Every lookup re-reads the obstacle list and compares it (order
/// independent) against the snapshot taken when the cache was last valid;
/// any difference drops the whole cache. There is no partial eviction, so
/// the cache grows with the number of distinct targets seen between
/// obstacle changes.
#[derive(Resource, Default)]
pub struct FlowFieldManager {
    fields: FxHashMap<GridLocation, FlowField>,
    cached_obstacles: Vec<GridRect>,
    builds: usize,
}

impl FlowFieldManager {
    /// Serve the field for `target`, building it on first request under the
    /// current obstacle layout.
    pub fn get_flow_field(&mut self, target: GridLocation, map: &GridMap) -> &FlowField {
        let current = map.obstacles();
        if !same_obstacle_layout(&current, &self.cached_obstacles) {
            debug!(
                "obstacle layout changed, dropping {} cached flow fields",
                self.fields.len()
            );
            self.fields.clear();
            self.cached_obstacles = current.clone();
        }

        let builds = &mut self.builds;
        let size = map.size();
        self.fields.entry(target).or_insert_with(|| {
            *builds += 1;
            debug!("building flow field for target ({}, {})", target.x, target.y);
            FlowField::build(target, size, &current)
        })
    }

    /// Explicit full-cache clear. The next lookup per target rebuilds.
    pub fn invalidate_flow_fields(&mut self) {
        self.fields.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.fields.len()
    }

    /// Total fields built over the manager's lifetime. Lets tests and perf
    /// logs distinguish cache hits from rebuilds.
    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn cached_targets(&self) -> Vec<GridLocation> {
        self.fields.keys().copied().collect()
    }
}

/// Unordered multiset comparison of obstacle footprints.
fn same_obstacle_layout(a: &[GridRect], b: &[GridRect]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    fn sort_key(rect: &GridRect) -> (i32, i32, i32, i32) {
        (rect.origin.x, rect.origin.y, rect.size.w, rect.size.h)
    }
    let mut sorted_a = a.to_vec();
    let mut sorted_b = b.to_vec();
    sorted_a.sort_by_key(sort_key);
    sorted_b.sort_by_key(sort_key);
    sorted_a == sorted_b
}
