use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use rampart_macros::profile;

use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::grid::{GridLocation, GridMap, GridRect, GridSize};

/// Sentinel distance for unreachable cells. Fixed-point has no IEEE
/// infinity; `MAX` plays the same role and is never produced by relaxation.
pub const UNREACHABLE: FixedNum = FixedNum::MAX;

/// sqrt(2) in I48F16 fixed point.
const DIAGONAL_COST: FixedNum = FixedNum::from_bits(92682);
const CARDINAL_COST: FixedNum = FixedNum::ONE;

/// 8-connected neighborhood with step costs, in the fixed scan order the
/// direction field tie-breaks on.
const NEIGHBORS: [(i32, i32, FixedNum); 8] = [
    (-1, -1, DIAGONAL_COST),
    (-1, 0, CARDINAL_COST),
    (-1, 1, DIAGONAL_COST),
    (0, -1, CARDINAL_COST),
    (0, 1, CARDINAL_COST),
    (1, -1, DIAGONAL_COST),
    (1, 0, CARDINAL_COST),
    (1, 1, DIAGONAL_COST),
];

/// Precomputed many-to-one navigation field for a single target cell.
///
/// A flow field guides any number of agents toward the same target without
/// per-agent pathfinding: a distance grid holds the shortest 8-connected
/// path cost to the target, and a direction grid holds the unit vector each
/// cell should move along to descend that distance.
///
/// The field is immutable once built; [`super::FlowFieldManager`] owns
/// construction and invalidation.
#[derive(Clone, Debug)]
pub struct FlowField {
    target: GridLocation,
    size: GridSize,
    distance: Vec<FixedNum>,
    direction: Vec<FixedVec2>,
}

impl FlowField {
    /// Build the field for `target` over `size` with the given obstacle
    /// footprints.
    ///
    /// Distances come from a FIFO repeated-relaxation flood fill: correct at
    /// fixpoint for the non-negative step costs used here, though a cell may
    /// be revisited when a cheaper diagonal route lands later. Directions
    /// are steepest-descent over the 8 neighbors with ties broken by scan
    /// order, so output is deterministic.
    #[profile(2)]
    pub fn build(target: GridLocation, size: GridSize, obstacles: &[GridRect]) -> Self {
        let cells = (size.w.max(0) as usize) * (size.h.max(0) as usize);
        let bounds = GridRect::new(GridLocation::new(0, 0), size);

        let mut blocked = FixedBitSet::with_capacity(cells);
        for rect in obstacles {
            for loc in rect.locations() {
                if bounds.contains(loc) {
                    blocked.insert(cell_index(loc, size));
                }
            }
        }

        let distance = relax_distances(target, size, &blocked);
        let direction = descend_directions(&distance, size);

        Self { target, size, distance, direction }
    }

    pub fn target(&self) -> GridLocation {
        self.target
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    fn index(&self, loc: GridLocation) -> Option<usize> {
        if loc.x >= 0 && loc.x < self.size.w && loc.y >= 0 && loc.y < self.size.h {
            Some(cell_index(loc, self.size))
        } else {
            None
        }
    }

    /// Shortest-path cost from `loc` to the target, `UNREACHABLE` for
    /// blocked, cut-off, or out-of-range cells.
    pub fn distance_at(&self, loc: GridLocation) -> FixedNum {
        match self.index(loc) {
            Some(idx) => self.distance[idx],
            None => UNREACHABLE,
        }
    }

    /// Unit descent direction at `loc`; zero for the target cell and for
    /// unreachable or out-of-range cells.
    pub fn direction_at(&self, loc: GridLocation) -> FixedVec2 {
        match self.index(loc) {
            Some(idx) => self.direction[idx],
            None => FixedVec2::ZERO,
        }
    }

    /// World-point lookup through the map's grid transform.
    pub fn distance_at_world(&self, point: FixedVec2, map: &GridMap) -> FixedNum {
        self.distance_at(map.grid_for(point))
    }

    /// World-point lookup through the map's grid transform.
    pub fn direction_at_world(&self, point: FixedVec2, map: &GridMap) -> FixedVec2 {
        self.direction_at(map.grid_for(point))
    }

    pub fn is_reachable(&self, loc: GridLocation) -> bool {
        self.distance_at(loc) != UNREACHABLE
    }
}

fn cell_index(loc: GridLocation, size: GridSize) -> usize {
    loc.y as usize * size.w as usize + loc.x as usize
}

/// FIFO flood fill from the target. A popped entry whose recorded distance
/// beats its carried distance is stale and skipped; everything else relaxes
/// its 8 neighbors. Blocked cells are never relaxed, so they keep the
/// sentinel no matter how many open sides they have.
fn relax_distances(target: GridLocation, size: GridSize, blocked: &FixedBitSet) -> Vec<FixedNum> {
    let cells = (size.w.max(0) as usize) * (size.h.max(0) as usize);
    let mut distance = vec![UNREACHABLE; cells];
    let mut queue: VecDeque<(GridLocation, FixedNum)> = VecDeque::new();

    if target.x >= 0 && target.x < size.w && target.y >= 0 && target.y < size.h {
        distance[cell_index(target, size)] = FixedNum::ZERO;
        queue.push_back((target, FixedNum::ZERO));
    }

    while let Some((current, current_dist)) = queue.pop_front() {
        if current_dist > distance[cell_index(current, size)] {
            continue;
        }

        for (dx, dy, cost) in NEIGHBORS {
            let next = current.offset(dx, dy);
            if next.x < 0 || next.x >= size.w || next.y < 0 || next.y >= size.h {
                continue;
            }
            let next_idx = cell_index(next, size);
            if blocked.contains(next_idx) {
                continue;
            }
            let candidate = current_dist + cost;
            if candidate < distance[next_idx] {
                distance[next_idx] = candidate;
                queue.push_back((next, candidate));
            }
        }
    }

    distance
}

/// Steepest descent per cell over the fixed-order neighborhood. Strict
/// improvement only, so equal-distance neighbors resolve to the first one
/// in scan order. The target has no smaller neighbor and keeps zero.
fn descend_directions(distance: &[FixedNum], size: GridSize) -> Vec<FixedVec2> {
    let cells = (size.w.max(0) as usize) * (size.h.max(0) as usize);
    let mut direction = vec![FixedVec2::ZERO; cells];

    for y in 0..size.h {
        for x in 0..size.w {
            let loc = GridLocation::new(x, y);
            let idx = cell_index(loc, size);
            let current = distance[idx];
            if current == UNREACHABLE {
                continue;
            }

            let mut best_dist = current;
            let mut best_dir = FixedVec2::ZERO;
            for (dx, dy, _) in NEIGHBORS {
                let next = loc.offset(dx, dy);
                if next.x < 0 || next.x >= size.w || next.y < 0 || next.y >= size.h {
                    continue;
                }
                let next_dist = distance[cell_index(next, size)];
                if next_dist < best_dist {
                    best_dist = next_dist;
                    best_dir = FixedVec2::new(FixedNum::from_num(dx), FixedNum::from_num(dy))
                        .normalize();
                }
            }

            direction[idx] = best_dir;
        }
    }

    direction
}
