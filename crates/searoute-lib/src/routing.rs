//! End-to-end route planning.
//!
//! [`plan_route`] runs the full pipeline for one request:
//!
//! 1. snap both endpoints to their nearest grid nodes,
//! 2. relocate land-locked endpoints with [`find_nearest_water`],
//! 3. search the sea grid with [`find_route_a_star`],
//! 4. replace the snapped endpoints with the literal request coordinates,
//! 5. smooth the result with [`smooth_path`],
//! 6. measure the smoothed route along great circles.
//!
//! # Example
//!
//! ```
//! use searoute_lib::{
//!     plan_route, CostField, GeoPoint, Grid, GridSpec, LandMask, RouteRequest, VesselClass,
//! };
//!
//! let grid = Grid::new(GridSpec {
//!     lon_min: -10.0,
//!     lon_max: 10.0,
//!     lat_min: -10.0,
//!     lat_max: 10.0,
//!     resolution: 1.0,
//! })?;
//! let land = LandMask::open_ocean(&grid);
//! let weather = CostField::calm(&grid);
//!
//! let request = RouteRequest::new(
//!     GeoPoint::new(-9.0, -9.0),
//!     GeoPoint::new(9.0, 9.0),
//!     VesselClass::Tanker,
//! );
//! let plan = plan_route(&grid, &land, &weather, &request)?;
//! assert_eq!(plan.num_steps, 100);
//! # Ok::<(), searoute_lib::Error>(())
//! ```

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::escape::find_nearest_water;
use crate::geo::{path_length_km, GeoPoint};
use crate::grid::{Grid, Node};
use crate::land::LandMask;
use crate::search::{find_route_a_star, Heuristic, SearchSpace};
use crate::smooth::{smooth_path, DEFAULT_SMOOTHED_POINTS, MIN_SMOOTHED_POINTS};
use crate::vessel::VesselClass;
use crate::weather::{CostField, WeatherSummary};

/// High-level route planning request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub vessel: VesselClass,
    /// Number of points in the smoothed route.
    pub smoothed_points: usize,
    pub heuristic: Heuristic,
}

impl RouteRequest {
    /// Request with the default smoothing size and heuristic.
    pub fn new(start: GeoPoint, end: GeoPoint, vessel: VesselClass) -> Self {
        Self {
            start,
            end,
            vessel,
            smoothed_points: DEFAULT_SMOOTHED_POINTS,
            heuristic: Heuristic::default(),
        }
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    pub vessel: VesselClass,
    pub start: GeoPoint,
    pub end: GeoPoint,
    /// Smoothed route, starting and ending at the requested coordinates.
    pub route: Vec<GeoPoint>,
    /// Great-circle length of `route` in kilometres.
    pub distance_km: f64,
    /// Number of points in `route`.
    pub num_steps: usize,
    /// Number of grid nodes in the searched path.
    pub node_path_len: usize,
    /// Accumulated weighted cost at the goal.
    pub search_cost: f64,
    pub weather: WeatherSummary,
}

/// Compute a weather-aware sea route for `request`.
///
/// Fails with [`Error::EndpointOnLand`] when an endpoint cannot be moved to
/// water, with [`Error::RouteNotFound`] when the goal is unreachable, and
/// with [`Error::InvalidPointCount`] when fewer than two smoothed points are
/// requested.
pub fn plan_route(
    grid: &Grid,
    land: &LandMask,
    weather: &CostField,
    request: &RouteRequest,
) -> Result<RoutePlan> {
    if request.smoothed_points < MIN_SMOOTHED_POINTS {
        return Err(Error::InvalidPointCount {
            requested: request.smoothed_points,
            minimum: MIN_SMOOTHED_POINTS,
        });
    }
    if !land.matches(grid) {
        return Err(Error::GridDimensionMismatch {
            layer: "land mask",
            expected: grid.len(),
            actual: land.width() * land.height(),
        });
    }
    if !weather.matches(grid) {
        return Err(Error::GridDimensionMismatch {
            layer: "weather field",
            expected: grid.len(),
            actual: weather.cell_count(),
        });
    }

    let start = navigable_node(grid, land, request.start, "start")?;
    let goal = navigable_node(grid, land, request.end, "end")?;

    let space = SearchSpace::new(grid, land, weather);
    let outcome = find_route_a_star(
        &space,
        start,
        goal,
        request.vessel.speed(),
        request.heuristic,
    )
    .ok_or_else(|| Error::RouteNotFound {
        start: request.start.to_string(),
        goal: request.end.to_string(),
    })?;

    let control = control_points(grid, &outcome.path, request.start, request.end);
    let route = smooth_path(&control, request.smoothed_points);
    let distance_km = path_length_km(&route);

    info!(
        vessel = %request.vessel,
        nodes = outcome.path.len(),
        expanded = outcome.expanded,
        cost = outcome.cost,
        distance_km,
        "planned route"
    );

    Ok(RoutePlan {
        vessel: request.vessel,
        start: request.start,
        end: request.end,
        num_steps: route.len(),
        route,
        distance_km,
        node_path_len: outcome.path.len(),
        search_cost: outcome.cost,
        weather: weather.summary(),
    })
}

fn navigable_node(
    grid: &Grid,
    land: &LandMask,
    point: GeoPoint,
    endpoint: &'static str,
) -> Result<Node> {
    let snapped = grid.node_at(point.lon, point.lat);
    let node = find_nearest_water(grid, land, snapped).ok_or(Error::EndpointOnLand {
        endpoint,
        lon: point.lon,
        lat: point.lat,
    })?;

    if node != snapped {
        debug!(endpoint, from = ?snapped, to = ?node, "moved endpoint off land");
    }
    Ok(node)
}

/// Node coordinates with the snapped endpoints replaced by the literal ones.
///
/// A single-node path yields exactly `[start, end]`.
fn control_points(grid: &Grid, path: &[Node], start: GeoPoint, end: GeoPoint) -> Vec<GeoPoint> {
    let interior = path
        .iter()
        .skip(1)
        .take(path.len().saturating_sub(2))
        .map(|&node| grid.position(node));

    std::iter::once(start)
        .chain(interior)
        .chain(std::iter::once(end))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSpec;

    fn grid() -> Grid {
        Grid::new(GridSpec {
            lon_min: 0.0,
            lon_max: 5.0,
            lat_min: 0.0,
            lat_max: 5.0,
            resolution: 1.0,
        })
        .expect("valid bounds")
    }

    #[test]
    fn control_points_substitute_true_endpoints() {
        let grid = grid();
        let path = [Node::new(0, 0), Node::new(1, 1), Node::new(2, 2)];
        let start = GeoPoint::new(0.2, 0.1);
        let end = GeoPoint::new(2.3, 1.9);
        let points = control_points(&grid, &path, start, end);
        assert_eq!(points, vec![start, GeoPoint::new(1.0, 1.0), end]);
    }

    #[test]
    fn single_node_path_yields_both_endpoints() {
        let grid = grid();
        let start = GeoPoint::new(2.1, 2.1);
        let end = GeoPoint::new(1.9, 2.0);
        let points = control_points(&grid, &[Node::new(2, 2)], start, end);
        assert_eq!(points, vec![start, end]);
    }

    #[test]
    fn misaligned_layers_are_rejected() {
        let grid = grid();
        let other = Grid::new(GridSpec {
            lon_min: 0.0,
            lon_max: 3.0,
            lat_min: 0.0,
            lat_max: 5.0,
            resolution: 1.0,
        })
        .expect("valid bounds");
        let land = LandMask::open_ocean(&other);
        let weather = CostField::calm(&grid);
        let request = RouteRequest::new(
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(5.0, 5.0),
            VesselClass::CargoShip,
        );
        let err = plan_route(&grid, &land, &weather, &request).expect_err("layer mismatch");
        assert!(matches!(
            err,
            Error::GridDimensionMismatch {
                layer: "land mask",
                ..
            }
        ));
    }

    #[test]
    fn fewer_than_two_smoothed_points_are_rejected() {
        let grid = grid();
        let land = LandMask::open_ocean(&grid);
        let weather = CostField::calm(&grid);
        let mut request = RouteRequest::new(
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(5.0, 5.0),
            VesselClass::CargoShip,
        );
        request.smoothed_points = 1;
        let err = plan_route(&grid, &land, &weather, &request).expect_err("one point");
        assert!(matches!(
            err,
            Error::InvalidPointCount {
                requested: 1,
                minimum: 2
            }
        ));

        request.smoothed_points = 2;
        let plan = plan_route(&grid, &land, &weather, &request).expect("two points");
        assert_eq!(plan.route, vec![request.start, request.end]);
    }
}
