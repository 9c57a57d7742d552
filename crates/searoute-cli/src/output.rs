//! Rendering of command results to stdout.

use std::io::{self, Write};

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use searoute_lib::{NearestPort, RoutePlan, VesselClass};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

#[derive(Debug, Serialize)]
struct VesselInfo {
    class: VesselClass,
    name: &'static str,
    speed: f64,
}

impl OutputFormat {
    pub fn render_route(self, plan: &RoutePlan) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_route(&mut out, plan)
    }

    pub fn write_route<W: Write>(self, out: &mut W, plan: &RoutePlan) -> Result<()> {
        match self {
            OutputFormat::Json => write_json(out, plan),
            OutputFormat::Text => {
                writeln!(
                    out,
                    "Route for {} (speed {})",
                    plan.vessel,
                    plan.vessel.speed()
                )?;
                writeln!(out, "  From:     {}", plan.start)?;
                writeln!(out, "  To:       {}", plan.end)?;
                writeln!(
                    out,
                    "  Distance: {:.2} km over {} points ({} grid nodes)",
                    plan.distance_km, plan.num_steps, plan.node_path_len
                )?;
                writeln!(
                    out,
                    "  Weather:  avg wave {:.2} m, avg wind {:.2} kn, avg current {:.2} kn{}",
                    plan.weather.avg_wave_height,
                    plan.weather.avg_wind_speed,
                    plan.weather.avg_current_speed,
                    if plan.weather.adverse_weather {
                        ", adverse conditions"
                    } else {
                        ""
                    }
                )?;
                writeln!(out, "Waypoints:")?;
                writeln!(out, "{:>5} {:>10} {:>10}", "#", "Lon", "Lat")?;
                for (index, point) in plan.route.iter().enumerate() {
                    writeln!(out, "{:>5} {:>10.4} {:>10.4}", index, point.lon, point.lat)?;
                }
                Ok(())
            }
        }
    }

    pub fn render_nearest_port(self, port: &NearestPort) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_nearest_port(&mut out, port)
    }

    pub fn write_nearest_port<W: Write>(self, out: &mut W, port: &NearestPort) -> Result<()> {
        match self {
            OutputFormat::Json => write_json(out, port),
            OutputFormat::Text => {
                let mut label = port.name.clone();
                if let Some(code) = &port.unlocode {
                    label.push_str(&format!(" [{code}]"));
                }
                if let Some(country) = &port.country {
                    label.push_str(&format!(", {country}"));
                }
                writeln!(out, "Nearest port: {label}")?;
                writeln!(out, "  Position: lat {:.4}, lon {:.4}", port.lat, port.lon)?;
                writeln!(out, "  Distance: {:.2} km", port.distance_km)?;
                Ok(())
            }
        }
    }

    pub fn render_vessels(self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_vessels(&mut out)
    }

    pub fn write_vessels<W: Write>(self, out: &mut W) -> Result<()> {
        let vessels: Vec<VesselInfo> = VesselClass::ALL
            .iter()
            .map(|&class| VesselInfo {
                class,
                name: class.label(),
                speed: class.speed(),
            })
            .collect();

        match self {
            OutputFormat::Json => write_json(out, &vessels),
            OutputFormat::Text => {
                writeln!(out, "Vessel classes ({}):", vessels.len())?;
                writeln!(out, "{:<16} {:>6}", "Name", "Speed")?;
                for vessel in &vessels {
                    writeln!(out, "{:<16} {:>6.0}", vessel.name, vessel.speed)?;
                }
                Ok(())
            }
        }
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_vessels(format: OutputFormat) -> String {
        let mut buffer = Vec::new();
        format.write_vessels(&mut buffer).expect("render");
        String::from_utf8(buffer).expect("utf-8")
    }

    #[test]
    fn vessel_table_lists_every_class() {
        let text = render_vessels(OutputFormat::Text);
        assert!(text.starts_with("Vessel classes (3):"));
        assert!(text.contains("passenger ship"));
        assert!(text.contains("tanker"));
    }

    #[test]
    fn vessel_json_uses_snake_case_keys() {
        let json = render_vessels(OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value[1]["class"], "cargo_ship");
        assert_eq!(value[1]["speed"], 15.0);
    }

    #[test]
    fn nearest_port_text_includes_code_and_distance() {
        let port = NearestPort {
            name: "Lisbon".to_string(),
            country: Some("Portugal".to_string()),
            unlocode: Some("PTLIS".to_string()),
            lat: 38.7,
            lon: -9.14,
            distance_km: 12.5,
        };
        let mut buffer = Vec::new();
        OutputFormat::Text
            .write_nearest_port(&mut buffer, &port)
            .expect("render");
        let text = String::from_utf8(buffer).expect("utf-8");
        assert!(text.contains("Nearest port: Lisbon [PTLIS], Portugal"));
        assert!(text.contains("Distance: 12.50 km"));
    }
}
