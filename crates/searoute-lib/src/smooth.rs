//! Cubic-spline smoothing of discrete node paths into continuous routes.

use tracing::debug;

use crate::geo::GeoPoint;

/// Default number of points in a smoothed route.
pub const DEFAULT_SMOOTHED_POINTS: usize = 100;

/// Smallest resampled route size; both endpoints must fit.
pub const MIN_SMOOTHED_POINTS: usize = 2;

/// Fewest control points a cubic spline is fitted through.
const MIN_SPLINE_POINTS: usize = 4;

/// Resample `points` along a parametric cubic spline.
///
/// Inputs with fewer than four points, or a `samples` count below
/// [`MIN_SMOOTHED_POINTS`], are returned unchanged. Otherwise the result has
/// `samples` points, and its first and last points are exactly
/// the first and last input points.
pub fn smooth_path(points: &[GeoPoint], samples: usize) -> Vec<GeoPoint> {
    if points.len() < MIN_SPLINE_POINTS || samples < MIN_SMOOTHED_POINTS {
        return points.to_vec();
    }

    // Repeated points would give zero-length parameter intervals.
    let mut control: Vec<GeoPoint> = Vec::with_capacity(points.len());
    for point in points {
        if control.last() != Some(point) {
            control.push(*point);
        }
    }
    if control.len() < MIN_SPLINE_POINTS {
        return points.to_vec();
    }

    let params = chord_parameters(&control);
    let lons: Vec<f64> = control.iter().map(|p| p.lon).collect();
    let lats: Vec<f64> = control.iter().map(|p| p.lat).collect();
    let lon_spline = CubicSpline::natural(&params, &lons);
    let lat_spline = CubicSpline::natural(&params, &lats);

    let mut smoothed: Vec<GeoPoint> = (0..samples)
        .map(|k| {
            let t = k as f64 / (samples - 1) as f64;
            GeoPoint::new(lon_spline.evaluate(t), lat_spline.evaluate(t))
        })
        .collect();

    smoothed[0] = points[0];
    smoothed[samples - 1] = points[points.len() - 1];

    debug!(
        control_points = control.len(),
        samples, "smoothed path with cubic spline"
    );
    smoothed
}

/// Cumulative chord length normalised to `[0, 1]`.
fn chord_parameters(points: &[GeoPoint]) -> Vec<f64> {
    let mut params = Vec::with_capacity(points.len());
    let mut total = 0.0;
    params.push(0.0);
    for pair in points.windows(2) {
        total += (pair[1].lon - pair[0].lon).hypot(pair[1].lat - pair[0].lat);
        params.push(total);
    }
    params.iter().map(|t| t / total).collect()
}

/// Natural cubic interpolating spline over strictly increasing knots.
#[derive(Debug, Clone)]
struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    /// Second derivatives at each knot; zero at both ends.
    moments: Vec<f64>,
}

impl CubicSpline {
    fn natural(knots: &[f64], values: &[f64]) -> Self {
        let n = knots.len();
        let mut moments = vec![0.0; n];

        if n > 2 {
            // Tridiagonal system for interior moments, solved with the Thomas algorithm.
            let interior = n - 2;
            let mut diag = vec![0.0; interior];
            let mut upper = vec![0.0; interior];
            let mut rhs = vec![0.0; interior];

            for k in 0..interior {
                let i = k + 1;
                let h_prev = knots[i] - knots[i - 1];
                let h_next = knots[i + 1] - knots[i];
                diag[k] = 2.0 * (h_prev + h_next);
                upper[k] = h_next;
                rhs[k] = 6.0
                    * ((values[i + 1] - values[i]) / h_next
                        - (values[i] - values[i - 1]) / h_prev);
            }

            for k in 1..interior {
                let lower = knots[k + 1] - knots[k];
                let factor = lower / diag[k - 1];
                diag[k] -= factor * upper[k - 1];
                rhs[k] -= factor * rhs[k - 1];
            }

            moments[interior] = rhs[interior - 1] / diag[interior - 1];
            for k in (0..interior - 1).rev() {
                moments[k + 1] = (rhs[k] - upper[k] * moments[k + 2]) / diag[k];
            }
        }

        Self {
            knots: knots.to_vec(),
            values: values.to_vec(),
            moments,
        }
    }

    fn evaluate(&self, t: f64) -> f64 {
        let last = self.knots.len() - 1;
        let segment = match self.knots.partition_point(|&knot| knot <= t) {
            0 => 0,
            p => (p - 1).min(last - 1),
        };

        let (t0, t1) = (self.knots[segment], self.knots[segment + 1]);
        let (y0, y1) = (self.values[segment], self.values[segment + 1]);
        let (m0, m1) = (self.moments[segment], self.moments[segment + 1]);
        let h = t1 - t0;
        let a = t1 - t;
        let b = t - t0;

        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }
}
