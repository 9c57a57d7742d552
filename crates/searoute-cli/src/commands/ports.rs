//! Port data loading and the nearest-port command.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use searoute_lib::{Error as SearouteError, GeoPoint, PortIndex};

use crate::output::OutputFormat;

/// Environment variable naming the default port data file.
pub const PORTS_ENV_VAR: &str = "SEAROUTE_PORTS";

/// Arguments for the nearest-port command.
#[derive(Debug, Clone, Args)]
pub struct NearestPortArgs {
    /// Query latitude in decimal degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,
    /// Query longitude in decimal degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,
    /// Port data file (.csv or .json). Falls back to SEAROUTE_PORTS.
    #[arg(long)]
    pub ports: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Handle the nearest-port subcommand.
pub fn handle_nearest_port(args: &NearestPortArgs) -> Result<()> {
    if !(-90.0..=90.0).contains(&args.lat) || !args.lon.is_finite() {
        bail!(
            "invalid query position lat {}, lon {}; latitude must be within [-90, 90]",
            args.lat,
            args.lon
        );
    }

    let index = load_port_index(args.ports.as_deref())?;
    let nearest = index.nearest(args.lat, args.lon).map_err(port_failure)?;
    args.format.render_nearest_port(&nearest)
}

/// Load the port index from `explicit`, or from the file named by
/// `SEAROUTE_PORTS` when no path was given.
pub fn load_port_index(explicit: Option<&Path>) -> Result<PortIndex> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match std::env::var(PORTS_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
            _ => bail!(
                "No ports available: pass --ports FILE or set {} to a .csv or .json port file.",
                PORTS_ENV_VAR
            ),
        },
    };

    PortIndex::from_path(&path)
        .with_context(|| format!("failed to load port data from {}", path.display()))
}

/// Position of the port called `name`.
pub fn resolve_port(index: &PortIndex, name: &str) -> Result<GeoPoint> {
    if index.is_empty() {
        return Err(port_failure(SearouteError::NoPortsAvailable));
    }
    let port = index.find(name).map_err(port_failure)?;
    Ok(GeoPoint::new(port.lon, port.lat))
}

fn port_failure(err: SearouteError) -> anyhow::Error {
    match err {
        SearouteError::NoPortsAvailable => anyhow::anyhow!(
            "No ports available. The port file is empty; provide one with --ports or {}.",
            PORTS_ENV_VAR
        ),
        SearouteError::UnknownPort { name, suggestions } => {
            anyhow::anyhow!(format_unknown_port_message(&name, &suggestions))
        }
        other => anyhow::Error::new(other),
    }
}

fn format_unknown_port_message(name: &str, suggestions: &[String]) -> String {
    let mut message = format!("Unknown port '{}'.", name);
    match suggestions {
        [] => {}
        [only] => message.push_str(&format!(" Did you mean '{only}'?")),
        many => {
            let joined = many
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ");
            message.push_str(&format!(" Did you mean one of: {}?", joined));
        }
    }
    message
}
