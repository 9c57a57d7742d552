//! Relocation of land-locked query nodes to nearby navigable water.
//!
//! The search scans square rings of growing Chebyshev radius around the
//! query node and returns the first water node in scan order. Within a ring
//! the result is not necessarily the closest by true distance.

use tracing::debug;

use crate::grid::{Grid, Node};
use crate::land::LandMask;

/// Return `node` itself when navigable, otherwise the first water node found
/// on rings of radius `1, 2, …` below `max(W, H)`.
///
/// Returns `None` when every scanned ring is land.
pub fn find_nearest_water(grid: &Grid, land: &LandMask, node: Node) -> Option<Node> {
    if !land.is_land(node) {
        return Some(node);
    }

    let width = grid.width() as isize;
    let height = grid.height() as isize;
    let limit = width.max(height);
    let (ci, cj) = (node.i as isize, node.j as isize);

    for radius in 1..limit {
        for i in (ci - radius)..=(ci + radius) {
            for j in (cj - radius)..=(cj + radius) {
                // Interior cells were covered by smaller rings.
                if (i - ci).abs() != radius && (j - cj).abs() != radius {
                    continue;
                }
                if i < 0 || j < 0 || i >= width || j >= height {
                    continue;
                }

                let candidate = Node::new(i as usize, j as usize);
                if !land.is_land(candidate) {
                    debug!(
                        from_i = node.i,
                        from_j = node.j,
                        to_i = candidate.i,
                        to_j = candidate.j,
                        radius,
                        "relocated land node to water"
                    );
                    return Some(candidate);
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSpec;

    fn grid(size: f64) -> Grid {
        Grid::new(GridSpec {
            lon_min: 0.0,
            lon_max: size,
            lat_min: 0.0,
            lat_max: size,
            resolution: 1.0,
        })
        .expect("valid bounds")
    }

    #[test]
    fn water_node_is_returned_unchanged() {
        let grid = grid(4.0);
        let land = LandMask::open_ocean(&grid);
        let node = Node::new(2, 2);
        assert_eq!(find_nearest_water(&grid, &land, node), Some(node));
    }

    #[test]
    fn finds_water_on_first_ring() {
        let grid = grid(4.0);
        let land = LandMask::from_nodes(&grid, [Node::new(2, 2)]);
        let found = find_nearest_water(&grid, &land, Node::new(2, 2)).expect("water nearby");
        assert_eq!(found.chebyshev(&Node::new(2, 2)), 1);
        // Scan order visits the lowest i, then lowest j first.
        assert_eq!(found, Node::new(1, 1));
    }

    #[test]
    fn skips_fully_land_rings() {
        let grid = grid(10.0);
        let centre = Node::new(5, 5);
        let land = LandMask::build(&grid, &|lon: f64, lat: f64| {
            (lon - 5.0).abs() <= 2.0 && (lat - 5.0).abs() <= 2.0
        });
        let found = find_nearest_water(&grid, &land, centre).expect("water beyond island");
        assert_eq!(found.chebyshev(&centre), 3);
        assert!(!land.is_land(found));
    }

    #[test]
    fn reports_none_when_grid_is_all_land() {
        let grid = grid(3.0);
        let land = LandMask::build(&grid, &|_: f64, _: f64| true);
        assert_eq!(find_nearest_water(&grid, &land, Node::new(1, 1)), None);
    }
}
