//! Route command handler for computing sea routes between two positions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::Args;

use searoute_lib::{
    plan_route, simulate_weather, CostField, Error as RouteError, GeoPoint, Grid, GridSpec,
    Heuristic, LandMask, PolygonLand, RouteRequest, VesselClass, DEFAULT_GRID_RESOLUTION,
    DEFAULT_SMOOTHED_POINTS, MIN_SMOOTHED_POINTS,
};
use tracing::info;

use crate::commands::ports::{load_port_index, resolve_port};
use crate::output::OutputFormat;

/// Arguments for the route command.
#[derive(Debug, Clone, Args)]
pub struct RouteArgs {
    /// Start position as LON,LAT.
    #[arg(
        long,
        allow_hyphen_values = true,
        required_unless_present = "from_port",
        conflicts_with = "from_port"
    )]
    pub from: Option<GeoPoint>,
    /// Start at a named port (name or UN/LOCODE).
    #[arg(long)]
    pub from_port: Option<String>,
    /// Destination as LON,LAT.
    #[arg(
        long,
        allow_hyphen_values = true,
        required_unless_present = "to_port",
        conflicts_with = "to_port"
    )]
    pub to: Option<GeoPoint>,
    /// Finish at a named port (name or UN/LOCODE).
    #[arg(long)]
    pub to_port: Option<String>,
    /// Vessel class: passenger ship, cargo ship or tanker.
    #[arg(long, default_value = "cargo ship")]
    pub vessel: VesselClass,
    /// Grid spacing in degrees.
    #[arg(long, default_value_t = DEFAULT_GRID_RESOLUTION)]
    pub resolution: f64,
    /// Grid bounds as LON_MIN,LON_MAX,LAT_MIN,LAT_MAX (default: whole world).
    #[arg(long, allow_hyphen_values = true, value_parser = parse_bounds)]
    pub bounds: Option<[f64; 4]>,
    /// Land polygons JSON file. Without it every node is navigable.
    #[arg(long)]
    pub land: Option<PathBuf>,
    /// Weather layers JSON file.
    #[arg(long, conflicts_with_all = ["calm", "seed"])]
    pub weather: Option<PathBuf>,
    /// Ignore weather entirely.
    #[arg(long, conflicts_with = "seed")]
    pub calm: bool,
    /// Seed for the simulated weather field.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Number of points in the smoothed route (at least 2).
    #[arg(
        long,
        default_value_t = DEFAULT_SMOOTHED_POINTS,
        value_parser = RangedU64ValueParser::<usize>::new().range(MIN_SMOOTHED_POINTS as u64..)
    )]
    pub points: usize,
    /// Use the exact (zero) heuristic instead of the great-circle estimate.
    #[arg(long)]
    pub exact: bool,
    /// Port data file used by --from-port/--to-port. Falls back to SEAROUTE_PORTS.
    #[arg(long)]
    pub ports: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl RouteArgs {
    /// Grid bounds selected by `--bounds` and `--resolution`.
    pub fn grid_spec(&self) -> GridSpec {
        match self.bounds {
            Some([lon_min, lon_max, lat_min, lat_max]) => GridSpec {
                lon_min,
                lon_max,
                lat_min,
                lat_max,
                resolution: self.resolution,
            },
            None => GridSpec::global(self.resolution),
        }
    }

    pub fn heuristic(&self) -> Heuristic {
        if self.exact {
            Heuristic::Zero
        } else {
            Heuristic::GreatCircle
        }
    }
}

/// Handle the route subcommand.
pub fn handle_route(args: &RouteArgs) -> Result<()> {
    let (start, end) = resolve_endpoints(args)?;

    let grid = Grid::new(args.grid_spec()).context("failed to build the navigation grid")?;
    info!(
        width = grid.width(),
        height = grid.height(),
        resolution = grid.resolution(),
        "built navigation grid"
    );

    let land = match &args.land {
        Some(path) => {
            let polygons = PolygonLand::from_path(path)
                .with_context(|| format!("failed to load land polygons from {}", path.display()))?;
            LandMask::build(&grid, &polygons)
        }
        None => LandMask::open_ocean(&grid),
    };

    let weather = match &args.weather {
        Some(path) => CostField::from_path(&grid, path)
            .with_context(|| format!("failed to load weather layers from {}", path.display()))?,
        None if args.calm => CostField::calm(&grid),
        None => simulate_weather(&grid, args.seed),
    };

    let request = RouteRequest {
        start,
        end,
        vessel: args.vessel,
        smoothed_points: args.points,
        heuristic: args.heuristic(),
    };

    let plan = match plan_route(&grid, &land, &weather, &request) {
        Ok(plan) => plan,
        Err(err) => return Err(handle_route_failure(args, err)),
    };

    args.format.render_route(&plan)
}

fn resolve_endpoints(args: &RouteArgs) -> Result<(GeoPoint, GeoPoint)> {
    let index = if args.from_port.is_some() || args.to_port.is_some() {
        Some(load_port_index(args.ports.as_deref())?)
    } else {
        None
    };

    let endpoint = |point: Option<GeoPoint>, port: Option<&str>, flag: &str| -> Result<GeoPoint> {
        match (point, port, &index) {
            (Some(point), _, _) => Ok(point),
            (None, Some(name), Some(index)) => resolve_port(index, name),
            _ => anyhow::bail!("missing {flag} position"),
        }
    };

    let start = endpoint(args.from, args.from_port.as_deref(), "--from")?;
    let end = endpoint(args.to, args.to_port.as_deref(), "--to")?;
    Ok((start, end))
}

fn handle_route_failure(args: &RouteArgs, err: RouteError) -> anyhow::Error {
    match err {
        RouteError::RouteNotFound { start, goal } => {
            anyhow::anyhow!(format_route_not_found_message(&start, &goal, args))
        }
        RouteError::EndpointOnLand {
            endpoint,
            lon,
            lat,
        } => anyhow::anyhow!(
            "The {} position ({}, {}) is on land and no navigable water could be reached. \
             Check the --land file or move the position offshore.",
            endpoint,
            lon,
            lat
        ),
        other => anyhow::Error::new(other),
    }
}

fn format_route_not_found_message(start: &str, goal: &str, args: &RouteArgs) -> String {
    let mut message = format!("No viable route found between {} and {}.", start, goal);
    let mut tips = Vec::new();
    if args.bounds.is_some() {
        tips.push("widen --bounds");
    }
    if args.land.is_some() {
        tips.push("check that the --land polygons leave a sea passage");
    }
    if args.resolution > DEFAULT_GRID_RESOLUTION {
        tips.push("use a finer --resolution");
    }
    if tips.is_empty() {
        message.push_str(" The endpoints are in disconnected bodies of water.");
    } else {
        message.push(' ');
        message.push_str(&format!("Try to {}.", tips.join(", ")));
    }
    message
}

fn parse_bounds(value: &str) -> std::result::Result<[f64; 4], String> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|err| format!("bounds must be four numbers: {err}"))?;

    <[f64; 4]>::try_from(parts).map_err(|parts| {
        format!(
            "expected LON_MIN,LON_MAX,LAT_MIN,LAT_MAX but got {} values",
            parts.len()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        route: RouteArgs,
    }

    fn parse(args: &[&str]) -> RouteArgs {
        Harness::try_parse_from(std::iter::once("route").chain(args.iter().copied()))
            .expect("valid arguments")
            .route
    }

    #[test]
    fn parses_bounds() {
        assert_eq!(parse_bounds("-10, 10,-5,5"), Ok([-10.0, 10.0, -5.0, 5.0]));
        assert!(parse_bounds("1,2,3").is_err());
        assert!(parse_bounds("a,b,c,d").is_err());
    }

    #[test]
    fn defaults_to_global_grid_and_cargo_ship() {
        let args = parse(&["--from", "-9,38", "--to", "4,52"]);
        assert_eq!(args.vessel, VesselClass::CargoShip);
        assert_eq!(args.grid_spec(), GridSpec::default());
        assert_eq!(args.heuristic(), Heuristic::GreatCircle);
        assert_eq!(args.points, DEFAULT_SMOOTHED_POINTS);
    }

    #[test]
    fn accepts_negative_coordinates_and_bounds() {
        let args = parse(&[
            "--from",
            "-9.5,-3.25",
            "--to",
            "5,5",
            "--bounds",
            "-20,20,-10,10",
            "--resolution",
            "1",
            "--exact",
        ]);
        assert_eq!(args.from, Some(GeoPoint::new(-9.5, -3.25)));
        assert_eq!(args.grid_spec().lon_min, -20.0);
        assert_eq!(args.grid_spec().resolution, 1.0);
        assert_eq!(args.heuristic(), Heuristic::Zero);
    }

    #[test]
    fn start_is_required() {
        let result = Harness::try_parse_from(["route", "--to", "1,1"]);
        assert!(result.is_err());
    }

    #[test]
    fn point_count_below_two_is_rejected() {
        for points in ["0", "1"] {
            let result = Harness::try_parse_from([
                "route", "--from", "0,0", "--to", "1,1", "--points", points,
            ]);
            assert!(result.is_err(), "--points {points} should be rejected");
        }
        assert_eq!(parse(&["--from", "0,0", "--to", "1,1", "--points", "2"]).points, 2);
    }

    #[test]
    fn weather_sources_are_exclusive() {
        let result = Harness::try_parse_from([
            "route", "--from", "0,0", "--to", "1,1", "--calm", "--seed", "3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn route_not_found_message_suggests_relaxing_inputs() {
        let args = parse(&[
            "--from",
            "0,0",
            "--to",
            "1,1",
            "--bounds",
            "-5,5,-5,5",
            "--resolution",
            "1",
        ]);
        let message = format_route_not_found_message("(0, 0)", "(1, 1)", &args);
        assert!(message.starts_with("No viable route found between (0, 0) and (1, 1)."));
        assert!(message.contains("widen --bounds"));
        assert!(message.contains("finer --resolution"));
    }
}
