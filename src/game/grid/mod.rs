//! Occupancy grid and world<->grid coordinate mapping.
//!
//! The [`GridMap`] resource owns which cells are covered by placed
//! buildings. It is the single source of truth the flow-field cache reads
//! its obstacle list from, and the placement commands mutate.

use bevy::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::game::config::InitialConfig;
use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::simulation::{SimPosition, SimSet};


// ============================================================================
// Grid Value Types
// ============================================================================

/// Integer cell address. Equality and hashing are by value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridLocation {
    pub x: i32,
    pub y: i32,
}

impl GridLocation {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// Width/height of a footprint in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub w: i32,
    pub h: i32,
}

impl GridSize {
    pub const ONE: Self = Self { w: 1, h: 1 };

    pub fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    pub fn area(self) -> i32 {
        self.w * self.h
    }

    pub fn is_positive(self) -> bool {
        self.w > 0 && self.h > 0
    }
}

/// Rectangular set of cells: a building footprint or the map bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub origin: GridLocation,
    pub size: GridSize,
}

impl GridRect {
    pub fn new(origin: GridLocation, size: GridSize) -> Self {
        Self { origin, size }
    }

    pub fn from_xywh(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            origin: GridLocation::new(x, y),
            size: GridSize::new(w, h),
        }
    }

    pub fn min_x(self) -> i32 {
        self.origin.x
    }

    pub fn min_y(self) -> i32 {
        self.origin.y
    }

    pub fn max_x_exclusive(self) -> i32 {
        self.origin.x + self.size.w
    }

    pub fn max_y_exclusive(self) -> i32 {
        self.origin.y + self.size.h
    }

    pub fn contains(self, loc: GridLocation) -> bool {
        loc.x >= self.min_x()
            && loc.y >= self.min_y()
            && loc.x < self.max_x_exclusive()
            && loc.y < self.max_y_exclusive()
    }

    pub fn contains_rect(self, rect: GridRect) -> bool {
        rect.min_x() >= self.min_x()
            && rect.min_y() >= self.min_y()
            && rect.max_x_exclusive() <= self.max_x_exclusive()
            && rect.max_y_exclusive() <= self.max_y_exclusive()
    }

    /// Covered cells in row-major order.
    pub fn locations(self) -> Vec<GridLocation> {
        if !self.size.is_positive() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(self.size.area() as usize);
        for y in self.min_y()..self.max_y_exclusive() {
            for x in self.min_x()..self.max_x_exclusive() {
                out.push(GridLocation::new(x, y));
            }
        }
        out
    }
}

// ============================================================================
// Building Components
// ============================================================================

/// Footprint in grid cells claimed when the entity is placed on the map.
#[derive(Component, Debug, Clone, Copy)]
pub struct Footprint(pub GridSize);

impl Default for Footprint {
    fn default() -> Self {
        Self(GridSize::ONE)
    }
}

/// Marker for placeable structures.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Building;

// ============================================================================
// GridMap Resource
// ============================================================================

/// Occupancy grid plus the world<->grid affine transform.
///
/// World origin sits at the map center; cell (0,0) is the bottom-left
/// corner. Cells are square with side `cell_size`.
#[derive(Resource)]
pub struct GridMap {
    columns: i32,
    rows: i32,
    cell_size: FixedNum,
    occupied: FxHashMap<GridLocation, Entity>,
    footprints: FxHashMap<Entity, GridRect>,
}

impl GridMap {
    /// Negative or zero dimensions are programmer misuse, not a runtime
    /// condition.
    pub fn new(columns: i32, rows: i32, cell_size: FixedNum) -> Self {
        assert!(columns > 0 && rows > 0, "map dimensions must be positive");
        assert!(cell_size > FixedNum::ZERO, "cell size must be positive");
        Self {
            columns,
            rows,
            cell_size,
            occupied: FxHashMap::default(),
            footprints: FxHashMap::default(),
        }
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cell_size(&self) -> FixedNum {
        self.cell_size
    }

    pub fn size(&self) -> GridSize {
        GridSize::new(self.columns, self.rows)
    }

    pub fn bounds(&self) -> GridRect {
        GridRect::from_xywh(0, 0, self.columns, self.rows)
    }

    // ------------------------------------------------------------------
    // Coordinate mapping
    // ------------------------------------------------------------------

    fn total_width(&self) -> FixedNum {
        FixedNum::from_num(self.columns) * self.cell_size
    }

    fn total_height(&self) -> FixedNum {
        FixedNum::from_num(self.rows) * self.cell_size
    }

    /// Cell containing `point`. Points outside the map yield out-of-bounds
    /// locations; callers that care check against `bounds()`.
    pub fn grid_for(&self, point: FixedVec2) -> GridLocation {
        let half = FixedNum::from_num(2);
        let gx = ((point.x + self.total_width() / half) / self.cell_size).floor();
        let gy = ((point.y + self.total_height() / half) / self.cell_size).floor();
        GridLocation::new(gx.to_num(), gy.to_num())
    }

    /// World center of a single cell. Exact inverse of `grid_for` there.
    pub fn center_point_for(&self, location: GridLocation) -> FixedVec2 {
        self.center_point_for_rect(GridRect::new(location, GridSize::ONE))
    }

    /// World center of a footprint rect.
    pub fn center_point_for_rect(&self, rect: GridRect) -> FixedVec2 {
        let half = FixedNum::from_num(2);
        let ox = FixedNum::from_num(rect.origin.x);
        let oy = FixedNum::from_num(rect.origin.y);
        let w = FixedNum::from_num(rect.size.w);
        let h = FixedNum::from_num(rect.size.h);
        let px = (ox + w / half) * self.cell_size - self.total_width() / half;
        let py = (oy + h / half) * self.cell_size - self.total_height() / half;
        FixedVec2::new(px, py)
    }

    // ------------------------------------------------------------------
    // Occupancy
    // ------------------------------------------------------------------

    pub fn is_occupied(&self, location: GridLocation) -> bool {
        self.occupied.contains_key(&location)
    }

    pub fn entity_at(&self, location: GridLocation) -> Option<Entity> {
        self.occupied.get(&location).copied()
    }

    /// True iff no cell in `rect` is occupied.
    pub fn is_free(&self, rect: GridRect) -> bool {
        rect.locations().iter().all(|loc| !self.occupied.contains_key(loc))
    }

    /// Claim every cell of `rect` for `entity`. All-or-nothing: fails with
    /// no side effect when the rect leaves the map or any cell is taken.
    pub fn place_footprint(&mut self, entity: Entity, rect: GridRect) -> bool {
        if !self.bounds().contains_rect(rect) || !self.is_free(rect) {
            return false;
        }
        for loc in rect.locations() {
            self.occupied.insert(loc, entity);
        }
        self.footprints.insert(entity, rect);
        true
    }

    /// Free every cell claimed by `entity`. No-op for unknown entities.
    pub fn remove_entity(&mut self, entity: Entity) {
        if let Some(rect) = self.footprints.remove(&entity) {
            for loc in rect.locations() {
                if self.occupied.get(&loc) == Some(&entity) {
                    self.occupied.remove(&loc);
                }
            }
        }
    }

    /// Current occupied footprints. Order is not meaningful; the flow-field
    /// cache compares these as an unordered multiset.
    pub fn obstacles(&self) -> Vec<GridRect> {
        self.footprints.values().copied().collect()
    }

    pub fn footprint_of(&self, entity: Entity) -> Option<GridRect> {
        self.footprints.get(&entity).copied()
    }
}

// ============================================================================
// Placement Commands
// ============================================================================

/// Command to place an already-spawned building entity at a grid location.
/// The footprint comes from the entity's [`Footprint`] component.
#[derive(Event, Message, Debug, Clone)]
pub struct PlaceBuildingCommand {
    pub entity: Entity,
    pub location: GridLocation,
}

/// Command to remove an entity from the map, freeing its cells and
/// despawning it.
#[derive(Event, Message, Debug, Clone)]
pub struct RemoveEntityCommand {
    pub entity: Entity,
}

/// Emitted after a successful placement.
#[derive(Event, Message, Debug, Clone)]
pub struct BuildingPlaced {
    pub entity: Entity,
    pub location: GridLocation,
}

// ============================================================================
// Plugin & Systems
// ============================================================================

pub struct GridPlugin;

impl Plugin for GridPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PlaceBuildingCommand>();
        app.add_message::<RemoveEntityCommand>();
        app.add_message::<BuildingPlaced>();

        app.add_systems(
            Startup,
            init_grid_map.after(crate::game::config::load_initial_config),
        );

        app.add_systems(
            FixedUpdate,
            (process_placements, process_removals).chain().in_set(SimSet::Input),
        );
    }
}

/// Build the occupancy grid from the loaded initial configuration.
pub fn init_grid_map(mut commands: Commands, config: Res<InitialConfig>) {
    let map = GridMap::new(
        config.map_columns,
        config.map_rows,
        FixedNum::from_num(config.cell_size),
    );
    info!(
        "GridMap initialized: {}x{} cells, cell size {}",
        config.map_columns, config.map_rows, config.cell_size
    );
    commands.insert_resource(map);
}

/// Resolve placement commands against the occupancy grid.
///
/// A successful placement claims the footprint, snaps the entity to the
/// footprint's world center, and emits [`BuildingPlaced`]. A rejected
/// placement leaves the map and the entity untouched.
pub fn process_placements(
    mut requests: MessageReader<PlaceBuildingCommand>,
    mut placed: MessageWriter<BuildingPlaced>,
    mut map: ResMut<GridMap>,
    mut query: Query<(&Footprint, &mut SimPosition)>,
) {
    for request in requests.read() {
        let Ok((footprint, mut pos)) = query.get_mut(request.entity) else {
            warn!(
                "placement for {:?} dropped: entity has no footprint",
                request.entity
            );
            continue;
        };
        let rect = GridRect::new(request.location, footprint.0);
        if map.place_footprint(request.entity, rect) {
            pos.0 = map.center_point_for_rect(rect);
            placed.write(BuildingPlaced {
                entity: request.entity,
                location: request.location,
            });
        } else {
            warn!(
                "placement for {:?} rejected at ({}, {})",
                request.entity, request.location.x, request.location.y
            );
        }
    }
}

/// Free cells and despawn for removal commands.
pub fn process_removals(
    mut requests: MessageReader<RemoveEntityCommand>,
    mut map: ResMut<GridMap>,
    mut commands: Commands,
) {
    for request in requests.read() {
        map.remove_entity(request.entity);
        if let Ok(mut entity) = commands.get_entity(request.entity) {
            entity.despawn();
        }
    }
}
