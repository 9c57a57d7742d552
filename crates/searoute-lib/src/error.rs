use thiserror::Error;

/// Convenient result alias for the sea routing library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Grid bounds were inverted, non-finite, or the resolution was not positive.
    #[error(
        "invalid grid bounds lon [{lon_min}, {lon_max}], lat [{lat_min}, {lat_max}] at resolution {resolution}"
    )]
    InvalidGridBounds {
        lon_min: f64,
        lon_max: f64,
        lat_min: f64,
        lat_max: f64,
        resolution: f64,
    },

    /// A land mask or weather layer does not cover the grid cell-for-cell.
    #[error("{layer} has {actual} cells but the grid has {expected}")]
    GridDimensionMismatch {
        layer: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Raised when a vessel class name does not map to a known speed.
    #[error("unknown vessel class: {name}{}", format_suggestions(.suggestions))]
    UnknownVesselClass {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when no navigable node could be found around a route endpoint.
    #[error("{endpoint} point ({lon}, {lat}) is on land and no navigable water is reachable")]
    EndpointOnLand {
        endpoint: &'static str,
        lon: f64,
        lat: f64,
    },

    /// Raised when the search frontier is exhausted before reaching the goal.
    #[error("no viable route found between {start} and {goal}")]
    RouteNotFound { start: String, goal: String },

    /// Raised when querying a port index that holds no ports.
    #[error("no ports available")]
    NoPortsAvailable,

    /// A smoothed route was requested with too few points to hold both endpoints.
    #[error("smoothed route needs at least {minimum} points, got {requested}")]
    InvalidPointCount { requested: usize, minimum: usize },

    /// Raised when a port name could not be found in the index.
    #[error("unknown port name: {name}{}", format_suggestions(.suggestions))]
    UnknownPort {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when port data fails validation.
    #[error("invalid port data: {message}")]
    PortDataValidation { message: String },

    /// Raised when a `lon,lat` pair could not be parsed.
    #[error("invalid coordinate '{input}'; expected LON,LAT in decimal degrees")]
    InvalidCoordinate { input: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for CSV decoding errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

/// Rank `candidates` by similarity to `query` and keep the best `limit` names.
///
/// Names scoring below a Jaro-Winkler similarity of 0.7 are dropped so very
/// different inputs produce no suggestions at all.
pub(crate) fn fuzzy_matches<'a, I>(query: &str, candidates: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = query.trim().to_lowercase();
    let mut scored: Vec<(f64, &str)> = candidates
        .into_iter()
        .map(|name| (strsim::jaro_winkler(&needle, &name.to_lowercase()), name))
        .filter(|(score, _)| *score >= 0.7)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, name)| name.to_string())
        .collect()
}
