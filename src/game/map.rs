//! Map layout persistence.
//!
//! A layout is the authored part of a map: grid dimensions plus building
//! sites. Computed flow fields are never saved; they are rebuilt from the
//! layout on demand.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::game::fixed_math::FixedNum;
use crate::game::grid::{GridLocation, GridSize};

pub const LAYOUT_VERSION: u32 = 1;

/// One building footprint in a layout.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildingSite {
    pub location: GridLocation,
    pub size: GridSize,
}

/// Serializable map description.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MapLayout {
    pub version: u32,
    pub columns: i32,
    pub rows: i32,
    pub cell_size: FixedNum,
    pub buildings: Vec<BuildingSite>,
}

pub fn save_layout(path: &str, layout: &MapLayout) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let mut encoder = ZlibEncoder::new(writer, Compression::default());
    bincode::serialize_into(&mut encoder, layout)?;
    encoder.finish()?;
    Ok(())
}

pub fn load_layout(path: &str) -> Result<MapLayout, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut decoder = ZlibDecoder::new(reader);
    let layout: MapLayout = bincode::deserialize_from(&mut decoder)?;
    if layout.version != LAYOUT_VERSION {
        return Err(format!(
            "unsupported layout version {} (expected {})",
            layout.version, LAYOUT_VERSION
        )
        .into());
    }
    Ok(layout)
}

/// The built-in demo map: a 24x16 field split by a wall with a single gap,
/// and a 2x2 stronghold on the far side.
pub fn demo_layout() -> MapLayout {
    let mut buildings = Vec::new();

    // Wall at x=10 with a two-cell gap at rows 7-8.
    buildings.push(BuildingSite {
        location: GridLocation::new(10, 0),
        size: GridSize::new(1, 7),
    });
    buildings.push(BuildingSite {
        location: GridLocation::new(10, 9),
        size: GridSize::new(1, 7),
    });

    // Stronghold the demo wave routes toward.
    buildings.push(BuildingSite {
        location: GridLocation::new(20, 7),
        size: GridSize::new(2, 2),
    });

    MapLayout {
        version: LAYOUT_VERSION,
        columns: 24,
        rows: 16,
        cell_size: FixedNum::ONE,
        buildings,
    }
}
