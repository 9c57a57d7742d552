//! Discretised world grid and node/coordinate mapping.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::GeoPoint;

/// Default grid spacing in degrees for global routing.
pub const DEFAULT_GRID_RESOLUTION: f64 = 0.5;

/// Slack added to the upper bound so it is included despite float stepping.
const STEP_EPSILON: f64 = 1e-9;

/// Bounds and spacing used to build a [`Grid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
    pub resolution: f64,
}

impl GridSpec {
    /// Whole-world bounds at the given resolution.
    pub fn global(resolution: f64) -> Self {
        Self {
            lon_min: -180.0,
            lon_max: 180.0,
            lat_min: -90.0,
            lat_max: 90.0,
            resolution,
        }
    }

    fn validate(&self) -> Result<()> {
        let finite = [
            self.lon_min,
            self.lon_max,
            self.lat_min,
            self.lat_max,
            self.resolution,
        ]
        .iter()
        .all(|v| v.is_finite());

        if !finite
            || self.lon_min >= self.lon_max
            || self.lat_min >= self.lat_max
            || self.resolution <= 0.0
        {
            return Err(Error::InvalidGridBounds {
                lon_min: self.lon_min,
                lon_max: self.lon_max,
                lat_min: self.lat_min,
                lat_max: self.lat_max,
                resolution: self.resolution,
            });
        }
        Ok(())
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::global(DEFAULT_GRID_RESOLUTION)
    }
}

/// Integer grid cell `(i, j)` indexing `lons[i]` and `lats[j]`.
///
/// Ordering is lexicographic on `(i, j)`; the search uses it only to make
/// frontier ordering deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Node {
    pub i: usize,
    pub j: usize,
}

impl Node {
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }

    /// Chebyshev (king-move) distance between two nodes.
    pub fn chebyshev(&self, other: &Node) -> usize {
        self.i.abs_diff(other.i).max(self.j.abs_diff(other.j))
    }
}

/// Regular longitude/latitude sampling of the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    lons: Vec<f64>,
    lats: Vec<f64>,
    resolution: f64,
}

impl Grid {
    /// Build a grid stepping `resolution` degrees from each minimum up to and
    /// including the maximum.
    pub fn new(spec: GridSpec) -> Result<Self> {
        spec.validate()?;

        let lons = axis(spec.lon_min, spec.lon_max, spec.resolution);
        let lats = axis(spec.lat_min, spec.lat_max, spec.resolution);

        Ok(Self {
            lons,
            lats,
            resolution: spec.resolution,
        })
    }

    /// Number of longitude samples (W).
    pub fn width(&self) -> usize {
        self.lons.len()
    }

    /// Number of latitude samples (H).
    pub fn height(&self) -> usize {
        self.lats.len()
    }

    /// Total number of nodes (W·H).
    pub fn len(&self) -> usize {
        self.lons.len() * self.lats.len()
    }

    /// Grids always hold at least one node per axis.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Row-major offset (`j·W + i`) for dense per-node storage.
    pub fn index(&self, node: Node) -> usize {
        node.j * self.lons.len() + node.i
    }

    /// Inverse of [`Grid::index`].
    pub fn node_from_index(&self, index: usize) -> Node {
        let width = self.lons.len();
        Node::new(index % width, index / width)
    }

    pub fn contains(&self, node: Node) -> bool {
        node.i < self.lons.len() && node.j < self.lats.len()
    }

    /// Geographic position of a node.
    pub fn position(&self, node: Node) -> GeoPoint {
        GeoPoint::new(self.lons[node.i], self.lats[node.j])
    }

    /// Node nearest to `(lon, lat)`, snapping each axis independently.
    ///
    /// Ties resolve toward the lower index.
    pub fn node_at(&self, lon: f64, lat: f64) -> Node {
        Node::new(nearest_index(&self.lons, lon), nearest_index(&self.lats, lat))
    }

    /// Moore neighbourhood of `node` clipped to the grid bounds.
    pub fn neighbours(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        const OFFSETS: [(isize, isize); 8] = [
            (0, 1),
            (0, -1),
            (1, 0),
            (-1, 0),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];

        OFFSETS.iter().filter_map(move |&(di, dj)| {
            let i = node.i.checked_add_signed(di)?;
            let j = node.j.checked_add_signed(dj)?;
            let next = Node::new(i, j);
            self.contains(next).then_some(next)
        })
    }
}

fn axis(min: f64, max: f64, step: f64) -> Vec<f64> {
    let count = ((max - min) / step + STEP_EPSILON).floor() as usize + 1;
    (0..count).map(|k| min + k as f64 * step).collect()
}

fn nearest_index(values: &[f64], target: f64) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|a, b| (a.1 - target).abs().total_cmp(&(b.1 - target).abs()))
        .map(|(index, _)| index)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> Grid {
        Grid::new(GridSpec {
            lon_min: -10.0,
            lon_max: 10.0,
            lat_min: -10.0,
            lat_max: 10.0,
            resolution: 1.0,
        })
        .expect("valid bounds")
    }

    #[test]
    fn axes_include_upper_bound() {
        let grid = small_grid();
        assert_eq!(grid.width(), 21);
        assert_eq!(grid.height(), 21);
        assert_eq!(grid.lons().first(), Some(&-10.0));
        assert_eq!(grid.lons().last(), Some(&10.0));
    }

    #[test]
    fn global_half_degree_grid_dimensions() {
        let grid = Grid::new(GridSpec::default()).expect("global grid");
        assert_eq!(grid.width(), 721);
        assert_eq!(grid.height(), 361);
    }

    #[test]
    fn node_at_snaps_each_axis() {
        let grid = small_grid();
        assert_eq!(grid.node_at(-9.0, -9.0), Node::new(1, 1));
        assert_eq!(grid.node_at(3.4, -2.6), Node::new(13, 7));
        // Out-of-range coordinates clamp to the nearest edge.
        assert_eq!(grid.node_at(50.0, -50.0), Node::new(20, 0));
    }

    #[test]
    fn node_at_breaks_ties_toward_lower_index() {
        let grid = small_grid();
        assert_eq!(grid.node_at(0.5, -0.5), Node::new(10, 9));
    }

    #[test]
    fn rejects_malformed_bounds() {
        let spec = GridSpec {
            lon_min: 5.0,
            lon_max: 5.0,
            ..GridSpec::default()
        };
        assert!(matches!(
            Grid::new(spec),
            Err(Error::InvalidGridBounds { .. })
        ));

        let spec = GridSpec {
            resolution: 0.0,
            ..GridSpec::default()
        };
        assert!(Grid::new(spec).is_err());
    }

    #[test]
    fn corner_nodes_have_three_neighbours() {
        let grid = small_grid();
        assert_eq!(grid.neighbours(Node::new(0, 0)).count(), 3);
        assert_eq!(grid.neighbours(Node::new(5, 5)).count(), 8);
        assert_eq!(grid.neighbours(Node::new(20, 7)).count(), 5);
    }

    #[test]
    fn index_round_trips() {
        let grid = small_grid();
        let node = Node::new(4, 17);
        assert_eq!(grid.node_from_index(grid.index(node)), node);
    }
}
