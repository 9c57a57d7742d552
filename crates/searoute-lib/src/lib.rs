//! Searoute library entry points.
//!
//! This crate discretises a lon/lat region into a navigation grid, masks land
//! from a geometry source, weights traversal by wave height and wind speed,
//! and finds vessel routes with A*. Routes are smoothed into continuous
//! polylines, and a KD-tree port index answers nearest-port queries.
//! Higher-level consumers (the CLI) should only depend on the items exported
//! here instead of reimplementing behavior.

#![deny(warnings)]

pub mod error;
pub mod escape;
pub mod geo;
pub mod grid;
pub mod land;
pub mod ports;
pub mod routing;
pub mod search;
pub mod smooth;
pub mod vessel;
pub mod weather;

pub use error::{Error, Result};
pub use escape::find_nearest_water;
pub use geo::{haversine_km, path_length_km, GeoPoint};
pub use grid::{Grid, GridSpec, Node, DEFAULT_GRID_RESOLUTION};
pub use land::{LandMask, LandOracle, Polygon, PolygonLand};
pub use ports::{NearestPort, Port, PortIndex};
pub use routing::{plan_route, RoutePlan, RouteRequest};
pub use search::{find_route_a_star, Heuristic, SearchOutcome, SearchSpace};
pub use smooth::{smooth_path, DEFAULT_SMOOTHED_POINTS, MIN_SMOOTHED_POINTS};
pub use vessel::VesselClass;
pub use weather::{simulate_weather, CostField, WeatherSummary};
