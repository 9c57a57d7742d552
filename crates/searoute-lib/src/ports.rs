//! Named port collection with nearest-port lookup.
//!
//! Ports are embedded on the unit sphere and stored in a KD-tree (k = 3), so
//! a Euclidean nearest-neighbour query returns the great-circle nearest port.
//! Reported distances are always haversine kilometres, never the chord
//! length used to pick the candidate. Ports sharing a position are stored
//! once in the tree, and queries resolve to the first of them.
//!
//! # Example
//!
//! ```
//! use searoute_lib::{Port, PortIndex};
//!
//! let index = PortIndex::new(vec![
//!     Port::new("Lisbon", 38.70, -9.14),
//!     Port::new("Rotterdam", 51.95, 4.14),
//! ]);
//! let nearest = index.nearest(38.70, -9.14).unwrap();
//! assert_eq!(nearest.name, "Lisbon");
//! assert_eq!(nearest.distance_km, 0.0);
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{fuzzy_matches, Error, Result};
use crate::geo::{haversine_km, round2, unit_sphere};

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Unit-sphere KD-tree over distinct port positions.
struct PortTree {
    tree: ImmutableKdTree<f64, u32, 3, BUCKET_SIZE>,
    /// Offset into the port list for each tree item.
    port_offsets: Vec<usize>,
}

impl PortTree {
    fn build(ports: &[Port]) -> Self {
        let mut seen = HashSet::new();
        let mut positions = Vec::with_capacity(ports.len());
        let mut port_offsets = Vec::with_capacity(ports.len());
        for (offset, port) in ports.iter().enumerate() {
            let position = unit_sphere(port.lat, port.lon);
            // `+ 0.0` folds -0.0 into 0.0 so both hash alike.
            if seen.insert(position.map(|c| (c + 0.0).to_bits())) {
                positions.push(position);
                port_offsets.push(offset);
            }
        }

        let tree = ImmutableKdTree::new_from_slice(&positions);
        if positions.len() < ports.len() {
            debug!(
                ports = ports.len(),
                distinct = positions.len(),
                "collapsed ports sharing a position"
            );
        }
        Self { tree, port_offsets }
    }

    fn nearest(&self, lat: f64, lon: f64) -> usize {
        let neighbour = self
            .tree
            .nearest_one::<SquaredEuclidean>(&unit_sphere(lat, lon));
        self.port_offsets[neighbour.item as usize]
    }
}

/// A named port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocode: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl Port {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            country: None,
            unlocode: None,
            lat,
            lon,
        }
    }
}

/// Result of a nearest-port query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestPort {
    pub name: String,
    pub country: Option<String>,
    pub unlocode: Option<String>,
    pub lat: f64,
    pub lon: f64,
    /// Haversine distance from the query point, rounded to two decimals.
    pub distance_km: f64,
}

/// Immutable port collection with a unit-sphere KD-tree.
pub struct PortIndex {
    ports: Vec<Port>,
    /// Items are offsets into `ports`. Absent when built with [`PortIndex::linear`].
    tree: Option<PortTree>,
}

impl PortIndex {
    /// Build an index over `ports`, with a KD-tree when non-empty.
    pub fn new(ports: Vec<Port>) -> Self {
        let tree = if ports.is_empty() {
            None
        } else {
            Some(PortTree::build(&ports))
        };

        info!(port_count = ports.len(), "built port index");
        Self { ports, tree }
    }

    /// Build an index that answers queries with a linear haversine scan.
    pub fn linear(ports: Vec<Port>) -> Self {
        debug!(port_count = ports.len(), "built linear port index");
        Self { ports, tree: None }
    }

    /// Load ports from a `.csv` or `.json` file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let index = if is_json {
            Self::from_json_reader(reader)?
        } else {
            Self::from_csv_reader(reader)?
        };
        debug!(path = %path.display(), ports = index.len(), "loaded port data");
        Ok(index)
    }

    /// Load ports from a JSON array of port objects.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let ports: Vec<Port> = serde_json::from_reader(reader)?;
        Ok(Self::new(ports))
    }

    /// Load ports from CSV with a header row.
    ///
    /// Header matching is case-insensitive and accepts common synonyms
    /// (`latitude`, `longitude`, `lng`, `port_name`, `locode`). Rows whose
    /// coordinates do not parse are skipped.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::Fields).from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .collect();

        let synonyms: &[(&str, &[&str])] = &[
            ("name", &["name", "port_name", "port"]),
            ("lat", &["lat", "latitude"]),
            ("lon", &["lon", "longitude", "lng", "long"]),
            ("country", &["country", "country_name"]),
            ("unlocode", &["unlocode", "locode", "un_locode"]),
        ];

        let mut columns: BTreeMap<&str, usize> = BTreeMap::new();
        for (canon, alts) in synonyms {
            if let Some(index) = alts
                .iter()
                .find_map(|alt| normalized.iter().position(|h| h == alt))
            {
                columns.insert(*canon, index);
            }
        }

        let missing: Vec<&str> = ["lat", "lon"]
            .into_iter()
            .filter(|c| !columns.contains_key(c))
            .collect();
        if !missing.is_empty() {
            return Err(Error::PortDataValidation {
                message: format!(
                    "port data missing required columns: {}. Available: {}",
                    missing.join(", "),
                    headers.iter().collect::<Vec<_>>().join(", ")
                ),
            });
        }

        let mut ports = Vec::new();
        for (row, result) in csv_reader.records().enumerate() {
            let record = result?;
            let get = |name: &str| field(&record, &columns, name);

            let coords = get("lat")
                .and_then(|v| v.parse::<f64>().ok())
                .zip(get("lon").and_then(|v| v.parse::<f64>().ok()));
            let Some((lat, lon)) = coords else {
                // Header is line 1.
                warn!(line = row + 2, "skipping port row with invalid coordinates");
                continue;
            };

            ports.push(Port {
                name: get("name").unwrap_or("Unknown").to_string(),
                country: get("country").map(str::to_string),
                unlocode: get("unlocode").map(str::to_string),
                lat,
                lon,
            });
        }

        Ok(Self::new(ports))
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Port nearest to `(lat, lon)` by great-circle distance.
    pub fn nearest(&self, lat: f64, lon: f64) -> Result<NearestPort> {
        if self.ports.is_empty() {
            return Err(Error::NoPortsAvailable);
        }

        let (port, distance) = match &self.tree {
            Some(tree) => {
                let port = &self.ports[tree.nearest(lat, lon)];
                (port, haversine_km(lon, lat, port.lon, port.lat))
            }
            None => self.nearest_linear(lat, lon),
        };

        Ok(NearestPort {
            name: port.name.clone(),
            country: port.country.clone(),
            unlocode: port.unlocode.clone(),
            lat: port.lat,
            lon: port.lon,
            distance_km: round2(distance),
        })
    }

    fn nearest_linear(&self, lat: f64, lon: f64) -> (&Port, f64) {
        let mut best = &self.ports[0];
        let mut best_distance = f64::INFINITY;
        for port in &self.ports {
            let distance = haversine_km(lon, lat, port.lon, port.lat);
            if distance < best_distance {
                best = port;
                best_distance = distance;
            }
        }
        (best, best_distance)
    }

    /// Look up a port by name (case-insensitive) or UN/LOCODE.
    pub fn find(&self, name: &str) -> Result<&Port> {
        let needle = name.trim();
        self.ports
            .iter()
            .find(|port| {
                port.name.eq_ignore_ascii_case(needle)
                    || port
                        .unlocode
                        .as_deref()
                        .is_some_and(|code| code.eq_ignore_ascii_case(needle))
            })
            .ok_or_else(|| Error::UnknownPort {
                name: name.to_string(),
                suggestions: fuzzy_matches(name, self.ports.iter().map(|p| p.name.as_str()), 3),
            })
    }
}

/// Non-empty value of a mapped CSV column.
fn field<'r>(
    record: &'r StringRecord,
    columns: &BTreeMap<&str, usize>,
    name: &str,
) -> Option<&'r str> {
    columns
        .get(name)
        .and_then(|&i| record.get(i))
        .filter(|s| !s.is_empty())
}

impl std::fmt::Debug for PortIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortIndex")
            .field("port_count", &self.ports.len())
            .field("has_tree", &self.tree.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_ports() -> Vec<Port> {
        vec![
            Port::new("Alpha", 0.0, 0.0),
            Port::new("Bravo", 40.0, 10.0),
            Port::new("Charlie", -30.0, 120.0),
        ]
    }

    #[test]
    fn tree_and_linear_agree() {
        let tree = PortIndex::new(sample_ports());
        let linear = PortIndex::linear(sample_ports());
        for (lat, lon) in [(1.0, 1.0), (35.0, 12.0), (-20.0, 100.0), (60.0, -170.0)] {
            assert_eq!(
                tree.nearest(lat, lon).unwrap(),
                linear.nearest(lat, lon).unwrap()
            );
        }
    }

    #[test]
    fn ports_sharing_a_position_resolve_to_the_first() {
        let mut ports: Vec<Port> = (0..40)
            .map(|k| Port::new(format!("Berth {k}"), 51.95, 4.14))
            .collect();
        ports.push(Port::new("Lisbon", 38.70, -9.14));

        let tree = PortIndex::new(ports.clone());
        let linear = PortIndex::linear(ports);
        assert_eq!(tree.len(), 41);

        let nearest = tree.nearest(52.0, 4.0).expect("non-empty index");
        assert_eq!(nearest.name, "Berth 0");
        assert_eq!(nearest, linear.nearest(52.0, 4.0).expect("non-empty index"));
        assert_eq!(tree.nearest(38.7, -9.1).expect("non-empty index").name, "Lisbon");
    }

    #[test]
    fn empty_index_reports_no_ports() {
        let index = PortIndex::new(Vec::new());
        assert!(matches!(index.nearest(0.0, 0.0), Err(Error::NoPortsAvailable)));
        let linear = PortIndex::linear(Vec::new());
        assert!(matches!(linear.nearest(0.0, 0.0), Err(Error::NoPortsAvailable)));
    }

    #[test]
    fn csv_headers_accept_synonyms() {
        let csv = "Port_Name,Latitude,Longitude,Country,LOCODE\n\
                   Lisbon,38.70,-9.14,Portugal,PTLIS\n\
                   Broken,north,-9.0,,\n\
                   ,51.95,4.14,,\n";
        let index = PortIndex::from_csv_reader(Cursor::new(csv)).expect("valid csv");
        assert_eq!(index.len(), 2);

        let lisbon = index.find("lisbon").expect("present");
        assert_eq!(lisbon.unlocode.as_deref(), Some("PTLIS"));
        assert_eq!(lisbon.country.as_deref(), Some("Portugal"));
        assert_eq!(index.ports()[1].name, "Unknown");
    }

    #[test]
    fn csv_without_coordinates_is_rejected() {
        let csv = "name,country\nLisbon,Portugal\n";
        let err = PortIndex::from_csv_reader(Cursor::new(csv)).expect_err("missing columns");
        assert!(err.to_string().contains("missing required columns: lat, lon"));
    }

    #[test]
    fn json_ports_load_with_optional_fields() {
        let json = r#"[
            {"name": "Santos", "lat": -23.96, "lon": -46.33, "unlocode": "BRSSZ"},
            {"name": "Durban", "lat": -29.87, "lon": 31.03}
        ]"#;
        let index = PortIndex::from_json_reader(json.as_bytes()).expect("valid json");
        assert_eq!(index.len(), 2);
        assert_eq!(index.find("BRSSZ").unwrap().name, "Santos");
        assert_eq!(index.find("durban").unwrap().country, None);
    }

    #[test]
    fn unknown_port_suggests_similar_names() {
        let index = PortIndex::new(sample_ports());
        let err = index.find("Bravu").expect_err("typo");
        assert!(err.to_string().contains("Did you mean 'Bravo'"));
    }
}
