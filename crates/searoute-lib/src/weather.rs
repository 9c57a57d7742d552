//! Weather-derived traversal cost over a [`Grid`].
//!
//! The cost field holds two aligned layers (significant wave height in
//! metres and wind speed in knots). Each edge ending at a node is scaled by
//! that node's [`CostField::traversal_multiplier`], which is never below one.
//! Optional surface-current layers (eastward `u` and northward `v`, knots)
//! are carried for reporting and do not change traversal cost.
//!
//! Layers are usually supplied by an external simulator. [`simulate_weather`]
//! provides a randomised stand-in producing smooth high-wave and high-wind
//! patches over a random background.

use std::fs::File;
use std::io::{BufReader, Read};
use std::f64::consts::TAU;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geo::round2;
use crate::grid::{Grid, Node};

/// Multiplier weight applied per metre of wave height.
pub const WAVE_HEIGHT_WEIGHT: f64 = 0.1;

/// Multiplier weight applied per knot of wind speed.
pub const WIND_SPEED_WEIGHT: f64 = 0.05;

/// Wave height above which conditions are reported as adverse (metres).
pub const ADVERSE_WAVE_HEIGHT_M: f64 = 3.0;

/// Wind speed above which conditions are reported as adverse (knots).
pub const ADVERSE_WIND_SPEED_KN: f64 = 25.0;

/// Read-only wave and wind layers aligned with a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CostField {
    width: usize,
    height: usize,
    wave_height: Vec<f64>,
    wind_speed: Vec<f64>,
    current_u: Vec<f64>,
    current_v: Vec<f64>,
}

/// On-disk layout for weather layers.
#[derive(Debug, Deserialize)]
struct WeatherLayers {
    wave_height: Vec<f64>,
    wind_speed: Vec<f64>,
    #[serde(default)]
    current_u: Option<Vec<f64>>,
    #[serde(default)]
    current_v: Option<Vec<f64>>,
}

impl CostField {
    /// Wrap row-major (`j·W + i`) wave-height and wind-speed layers.
    ///
    /// Surface currents start at rest; see [`CostField::with_currents`].
    pub fn new(grid: &Grid, wave_height: Vec<f64>, wind_speed: Vec<f64>) -> Result<Self> {
        check_layer(grid, "wave height layer", &wave_height)?;
        check_layer(grid, "wind speed layer", &wind_speed)?;

        Ok(Self {
            width: grid.width(),
            height: grid.height(),
            wave_height,
            wind_speed,
            current_u: vec![0.0; grid.len()],
            current_v: vec![0.0; grid.len()],
        })
    }

    /// Replace the eastward (`u`) and northward (`v`) current layers, in knots.
    pub fn with_currents(mut self, current_u: Vec<f64>, current_v: Vec<f64>) -> Result<Self> {
        for (layer, values) in [
            ("eastward current layer", &current_u),
            ("northward current layer", &current_v),
        ] {
            if values.len() != self.wave_height.len() {
                return Err(Error::GridDimensionMismatch {
                    layer,
                    expected: self.wave_height.len(),
                    actual: values.len(),
                });
            }
        }
        self.current_u = current_u;
        self.current_v = current_v;
        Ok(self)
    }

    /// Flat sea and no wind; every multiplier is exactly one.
    pub fn calm(grid: &Grid) -> Self {
        Self::uniform(grid, 0.0, 0.0)
    }

    /// The same conditions at every node.
    pub fn uniform(grid: &Grid, wave_height: f64, wind_speed: f64) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            wave_height: vec![wave_height; grid.len()],
            wind_speed: vec![wind_speed; grid.len()],
            current_u: vec![0.0; grid.len()],
            current_v: vec![0.0; grid.len()],
        }
    }

    /// Load layers from a JSON file shaped like `{"wave_height": [...], "wind_speed": [...]}`.
    ///
    /// `current_u` and `current_v` arrays are optional and must appear together.
    pub fn from_path(grid: &Grid, path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let field = Self::from_reader(grid, BufReader::new(file))?;
        debug!(path = %path.display(), "loaded weather layers");
        Ok(field)
    }

    pub fn from_reader<R: Read>(grid: &Grid, reader: R) -> Result<Self> {
        let layers: WeatherLayers = serde_json::from_reader(reader)?;
        let field = Self::new(grid, layers.wave_height, layers.wind_speed)?;
        match (layers.current_u, layers.current_v) {
            (Some(u), Some(v)) => field.with_currents(u, v),
            (None, None) => Ok(field),
            (Some(_), None) => Err(Error::GridDimensionMismatch {
                layer: "northward current layer",
                expected: grid.len(),
                actual: 0,
            }),
            (None, Some(_)) => Err(Error::GridDimensionMismatch {
                layer: "eastward current layer",
                expected: grid.len(),
                actual: 0,
            }),
        }
    }

    fn offset(&self, node: Node) -> usize {
        node.j * self.width + node.i
    }

    /// Significant wave height at `node` in metres.
    pub fn wave_height(&self, node: Node) -> f64 {
        self.wave_height[self.offset(node)]
    }

    /// Wind speed at `node` in knots.
    pub fn wind_speed(&self, node: Node) -> f64 {
        self.wind_speed[self.offset(node)]
    }

    /// Surface current speed at `node` in knots.
    pub fn current_speed(&self, node: Node) -> f64 {
        let offset = self.offset(node);
        self.current_u[offset].hypot(self.current_v[offset])
    }

    /// `1 + 0.1·wave_height + 0.05·wind_speed` for edges ending at `node`.
    pub fn traversal_multiplier(&self, node: Node) -> f64 {
        let offset = self.offset(node);
        1.0 + WAVE_HEIGHT_WEIGHT * self.wave_height[offset]
            + WIND_SPEED_WEIGHT * self.wind_speed[offset]
    }

    /// Number of cells in each layer.
    pub fn cell_count(&self) -> usize {
        self.wave_height.len()
    }

    /// Whether the field was built for a grid with `grid`'s dimensions.
    pub fn matches(&self, grid: &Grid) -> bool {
        self.width == grid.width() && self.height == grid.height()
    }

    /// Aggregate conditions over the whole field.
    pub fn summary(&self) -> WeatherSummary {
        let count = self.wave_height.len().max(1) as f64;
        let avg_wave = self.wave_height.iter().sum::<f64>() / count;
        let avg_wind = self.wind_speed.iter().sum::<f64>() / count;
        let max_wave = self.wave_height.iter().copied().fold(0.0, f64::max);
        let max_wind = self.wind_speed.iter().copied().fold(0.0, f64::max);
        let avg_current = self
            .current_u
            .iter()
            .zip(&self.current_v)
            .map(|(u, v)| u.hypot(*v))
            .sum::<f64>()
            / count;

        WeatherSummary {
            avg_wave_height: round2(avg_wave),
            avg_wind_speed: round2(avg_wind),
            avg_current_speed: round2(avg_current),
            adverse_weather: max_wave > ADVERSE_WAVE_HEIGHT_M || max_wind > ADVERSE_WIND_SPEED_KN,
        }
    }
}

/// Field-wide weather statistics reported alongside a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    /// Mean wave height in metres, rounded to two decimals.
    pub avg_wave_height: f64,
    /// Mean wind speed in knots, rounded to two decimals.
    pub avg_wind_speed: f64,
    /// Mean surface current speed in knots, rounded to two decimals.
    #[serde(default)]
    pub avg_current_speed: f64,
    /// Any node exceeds the adverse wave or wind threshold.
    pub adverse_weather: bool,
}

struct Patch {
    cx: f64,
    cy: f64,
    amplitude: f64,
    sigma_lon: f64,
    sigma_lat: f64,
}

impl Patch {
    fn random(
        rng: &mut StdRng,
        grid: &Grid,
        amplitude: (f64, f64),
        max_sigma_fraction: f64,
    ) -> Self {
        let (lon_min, lon_max) = axis_bounds(grid.lons());
        let (lat_min, lat_max) = axis_bounds(grid.lats());
        let lon_span = span(lon_min, lon_max);
        let lat_span = span(lat_min, lat_max);

        Self {
            cx: sample(rng, lon_min, lon_max),
            cy: sample(rng, lat_min, lat_max),
            amplitude: rng.random_range(amplitude.0..amplitude.1),
            sigma_lon: rng.random_range(0.05 * lon_span..max_sigma_fraction * lon_span),
            sigma_lat: rng.random_range(0.05 * lat_span..max_sigma_fraction * lat_span),
        }
    }

    fn value(&self, lon: f64, lat: f64) -> f64 {
        let dx = (lon - self.cx).powi(2) / (2.0 * self.sigma_lon.powi(2));
        let dy = (lat - self.cy).powi(2) / (2.0 * self.sigma_lat.powi(2));
        self.amplitude * (-(dx + dy)).exp()
    }
}

/// Generate a randomised cost field for `grid`.
///
/// Waves: uniform 0.2–1.2 m background plus 1–3 Gaussian patches of
/// 1.0–3.5 m. Wind: uniform 3–12 kn background plus 1–3 Gaussian patches of
/// 5–20 kn. Currents: a 0.5 kn east/west band varying with latitude and a
/// 0.2 kn north/south component varying with longitude, plus small uniform
/// eddies. Passing a seed reproduces the same field.
pub fn simulate_weather(grid: &Grid, seed: Option<u64>) -> CostField {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut wave_height: Vec<f64> = (0..grid.len())
        .map(|_| rng.random_range(0.2..1.2))
        .collect();
    let wave_patches = rng.random_range(1..4);
    for _ in 0..wave_patches {
        let patch = Patch::random(&mut rng, grid, (1.0, 3.5), 0.25);
        add_patch(grid, &mut wave_height, &patch);
    }

    let mut wind_speed: Vec<f64> = (0..grid.len())
        .map(|_| rng.random_range(3.0..12.0))
        .collect();
    let wind_patches = rng.random_range(1..4);
    for _ in 0..wind_patches {
        let patch = Patch::random(&mut rng, grid, (5.0, 20.0), 0.3);
        add_patch(grid, &mut wind_speed, &patch);
    }

    let (current_u, current_v) = simulate_currents(&mut rng, grid);

    let field = CostField {
        width: grid.width(),
        height: grid.height(),
        wave_height,
        wind_speed,
        current_u,
        current_v,
    };

    let summary = field.summary();
    info!(
        seed = ?seed,
        wave_patches,
        wind_patches,
        avg_wave_height = summary.avg_wave_height,
        avg_wind_speed = summary.avg_wind_speed,
        avg_current_speed = summary.avg_current_speed,
        adverse = summary.adverse_weather,
        "simulated weather field"
    );
    field
}

/// Eddy noise half-widths (knots) for the `u` and `v` components.
const CURRENT_EDDY_U: f64 = 0.35;
const CURRENT_EDDY_V: f64 = 0.17;

fn simulate_currents(rng: &mut StdRng, grid: &Grid) -> (Vec<f64>, Vec<f64>) {
    let (lon_min, lon_max) = axis_bounds(grid.lons());
    let (lat_min, lat_max) = axis_bounds(grid.lats());
    let lon_span = span(lon_min, lon_max);
    let lat_span = span(lat_min, lat_max);

    let mut current_u = Vec::with_capacity(grid.len());
    let mut current_v = Vec::with_capacity(grid.len());
    for &lat in grid.lats() {
        let lat_norm = (lat - lat_min) / lat_span;
        for &lon in grid.lons() {
            let lon_norm = (lon - lon_min) / lon_span;
            let eddy_u = rng.random_range(-CURRENT_EDDY_U..CURRENT_EDDY_U);
            let eddy_v = rng.random_range(-CURRENT_EDDY_V..CURRENT_EDDY_V);
            current_u.push(0.5 * (TAU * lat_norm).sin() + eddy_u);
            current_v.push(0.2 * (TAU * lon_norm).cos() + eddy_v);
        }
    }
    (current_u, current_v)
}

fn check_layer(grid: &Grid, layer: &'static str, values: &[f64]) -> Result<()> {
    if values.len() != grid.len() {
        return Err(Error::GridDimensionMismatch {
            layer,
            expected: grid.len(),
            actual: values.len(),
        });
    }
    Ok(())
}

fn add_patch(grid: &Grid, layer: &mut [f64], patch: &Patch) {
    let width = grid.width();
    for (j, &lat) in grid.lats().iter().enumerate() {
        for (i, &lon) in grid.lons().iter().enumerate() {
            layer[j * width + i] += patch.value(lon, lat);
        }
    }
}

fn axis_bounds(values: &[f64]) -> (f64, f64) {
    let first = values.first().copied().unwrap_or(0.0);
    let last = values.last().copied().unwrap_or(first);
    (first, last)
}

/// Axis extent, falling back to one degree for single-sample axes.
fn span(min: f64, max: f64) -> f64 {
    let span = max - min;
    if span > 0.0 {
        span
    } else {
        1.0
    }
}

fn sample(rng: &mut StdRng, min: f64, max: f64) -> f64 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}
