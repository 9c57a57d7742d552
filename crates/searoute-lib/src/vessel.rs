//! Vessel classes and their fixed routing speeds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{fuzzy_matches, Error, Result};

/// Supported vessel classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VesselClass {
    PassengerShip,
    #[default]
    CargoShip,
    Tanker,
}

impl VesselClass {
    pub const ALL: [VesselClass; 3] = [
        VesselClass::PassengerShip,
        VesselClass::CargoShip,
        VesselClass::Tanker,
    ];

    /// Speed scalar dividing every edge cost during the search.
    pub fn speed(self) -> f64 {
        match self {
            VesselClass::PassengerShip => 20.0,
            VesselClass::CargoShip => 15.0,
            VesselClass::Tanker => 10.0,
        }
    }

    /// Canonical human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            VesselClass::PassengerShip => "passenger ship",
            VesselClass::CargoShip => "cargo ship",
            VesselClass::Tanker => "tanker",
        }
    }
}

impl fmt::Display for VesselClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VesselClass {
    type Err = Error;

    /// Case-insensitive; spaces, hyphens and underscores are interchangeable
    /// and the trailing "ship" may be omitted.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s
            .trim()
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        match normalized.as_str() {
            "passenger ship" | "passenger" => Ok(VesselClass::PassengerShip),
            "cargo ship" | "cargo" => Ok(VesselClass::CargoShip),
            "tanker" | "tanker ship" => Ok(VesselClass::Tanker),
            _ => Err(Error::UnknownVesselClass {
                name: s.to_string(),
                suggestions: fuzzy_matches(s, VesselClass::ALL.iter().map(|v| v.label()), 3),
            }),
        }
    }
}
