//! Land/obstacle occupancy over a [`Grid`].
//!
//! A [`LandMask`] is built once per grid from a [`LandOracle`] (the geometry
//! collaborator) and is read-only afterwards, so it can be shared between
//! concurrent searches behind an `Arc` without locking.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::grid::{Grid, Node};

/// Point-containment test supplied by a geometry source.
///
/// Implementations may be expensive; [`LandMask::build`] calls them exactly
/// once per grid node.
pub trait LandOracle {
    /// Returns `true` when `(lon, lat)` lies on land.
    fn is_land(&self, lon: f64, lat: f64) -> bool;
}

impl<F> LandOracle for F
where
    F: Fn(f64, f64) -> bool,
{
    fn is_land(&self, lon: f64, lat: f64) -> bool {
        self(lon, lat)
    }
}

/// W×H boolean matrix where `true` marks a non-navigable node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandMask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl LandMask {
    /// Evaluate `oracle` at every grid node.
    pub fn build<O>(grid: &Grid, oracle: &O) -> Self
    where
        O: LandOracle + ?Sized,
    {
        let mut cells = Vec::with_capacity(grid.len());
        for &lat in grid.lats() {
            for &lon in grid.lons() {
                cells.push(oracle.is_land(lon, lat));
            }
        }

        let mask = Self {
            width: grid.width(),
            height: grid.height(),
            cells,
        };

        info!(
            width = mask.width,
            height = mask.height,
            land_cells = mask.land_count(),
            "built land mask"
        );
        mask
    }

    /// Mask with every node navigable.
    pub fn open_ocean(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            cells: vec![false; grid.len()],
        }
    }

    /// Wrap a precomputed row-major (`j·W + i`) occupancy matrix.
    pub fn from_cells(grid: &Grid, cells: Vec<bool>) -> Result<Self> {
        if cells.len() != grid.len() {
            return Err(Error::GridDimensionMismatch {
                layer: "land mask",
                expected: grid.len(),
                actual: cells.len(),
            });
        }

        Ok(Self {
            width: grid.width(),
            height: grid.height(),
            cells,
        })
    }

    /// Open ocean except for the listed nodes. Nodes outside the grid are ignored.
    pub fn from_nodes<I>(grid: &Grid, land: I) -> Self
    where
        I: IntoIterator<Item = Node>,
    {
        let mut cells = vec![false; grid.len()];
        for node in land {
            if grid.contains(node) {
                cells[grid.index(node)] = true;
            } else {
                debug!(i = node.i, j = node.j, "ignoring land node outside grid");
            }
        }

        Self {
            width: grid.width(),
            height: grid.height(),
            cells,
        }
    }

    /// Whether `node` is non-navigable.
    pub fn is_land(&self, node: Node) -> bool {
        self.cells[node.j * self.width + node.i]
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of land nodes.
    pub fn land_count(&self) -> usize {
        self.cells.iter().filter(|&&land| land).count()
    }

    /// Whether the mask was built for a grid with `grid`'s dimensions.
    pub fn matches(&self, grid: &Grid) -> bool {
        self.width == grid.width() && self.height == grid.height()
    }
}

/// Single polygon with an exterior ring and optional holes.
///
/// Vertices are `[lon, lat]` pairs; rings may be open or closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub exterior: Vec<[f64; 2]>,
    #[serde(default)]
    pub holes: Vec<Vec<[f64; 2]>>,
}

impl Polygon {
    pub fn new(exterior: Vec<[f64; 2]>) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    /// Even-odd containment test. Points inside a hole are outside the polygon.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        if !ring_contains(&self.exterior, lon, lat) {
            return false;
        }
        !self.holes.iter().any(|hole| ring_contains(hole, lon, lat))
    }
}

/// Land geometry made of polygons, typically loaded from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolygonLand {
    pub polygons: Vec<Polygon>,
}

impl PolygonLand {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    /// Load polygons from a JSON file shaped like `{"polygons": [{"exterior": [[lon, lat], ...]}]}`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let land = Self::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            polygons = land.polygons.len(),
            "loaded land polygons"
        );
        Ok(land)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

impl LandOracle for PolygonLand {
    fn is_land(&self, lon: f64, lat: f64) -> bool {
        self.polygons.iter().any(|polygon| polygon.contains(lon, lat))
    }
}

fn ring_contains(ring: &[[f64; 2]], x: f64, y: f64) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
