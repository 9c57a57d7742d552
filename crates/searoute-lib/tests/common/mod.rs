#![allow(dead_code)]

use std::path::PathBuf;

use searoute_lib::{Grid, GridSpec, LandMask, PolygonLand};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// 21×21 grid covering ±10° at one-degree spacing.
pub fn regional_grid() -> Grid {
    Grid::new(GridSpec {
        lon_min: -10.0,
        lon_max: 10.0,
        lat_min: -10.0,
        lat_max: 10.0,
        resolution: 1.0,
    })
    .expect("valid bounds")
}

/// Land mask with the square island from `island.json` (±3° around the origin).
pub fn island_mask(grid: &Grid) -> LandMask {
    let land = PolygonLand::from_path(&fixtures_dir().join("island.json"))
        .expect("load fixture island.json");
    LandMask::build(grid, &land)
}
