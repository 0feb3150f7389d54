//! Synthetic walked loops for benchmarking and the CLI.
//!
//! Generates timestamped samples along simple shapes with optional GPS noise.
//! Output is deterministic for a given seed.
//!
//! Feature-gated behind `synthetic`.
//!
//! # Example
//!
//! ```rust
//! use geofence::synthetic::{LoopShape, SyntheticLoop};
//! use geofence::GeoPoint;
//!
//! let walk = SyntheticLoop {
//!     shape: LoopShape::Circle,
//!     size_m: 25.0,
//!     ..SyntheticLoop::new(GeoPoint::new(47.37, 8.55))
//! };
//! let samples = walk.generate();
//! assert!(samples.len() > 10);
//! ```

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geo_utils::{METERS_PER_DEGREE, meters_to_degrees};
use crate::{GeoPoint, Sample};

/// Shape of the generated walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopShape {
    /// Circle of radius `size_m`, starting due east of the origin.
    Circle,
    /// Axis-aligned square with half-side `size_m`, walked counter-clockwise.
    Square,
    /// Lemniscate of half-width `size_m`; crosses itself at the origin.
    FigureEight,
}

/// Configuration of one synthetic walk.
#[derive(Debug, Clone)]
pub struct SyntheticLoop {
    /// Center of the shape.
    pub origin: GeoPoint,
    pub shape: LoopShape,
    /// Radius, half-side or half-width in meters.
    pub size_m: f64,
    /// Distance between consecutive samples in meters.
    pub spacing_m: f64,
    /// Walking speed used to derive timestamps.
    pub speed_kmh: f64,
    /// GPS noise standard deviation in meters.
    pub noise_sigma_m: f64,
    /// Timestamp of the first sample (Unix seconds).
    pub start_time: f64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl SyntheticLoop {
    /// A noise-free 25 m circle walked at 5 km/h with 12 m spacing.
    pub fn new(origin: GeoPoint) -> Self {
        Self {
            origin,
            shape: LoopShape::Circle,
            size_m: 25.0,
            spacing_m: 12.0,
            speed_kmh: 5.0,
            noise_sigma_m: 0.0,
            start_time: 0.0,
            seed: 42,
        }
    }

    /// Generate the timestamped samples, ending back at the start.
    pub fn generate(&self) -> Vec<Sample> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let offsets = match self.shape {
            LoopShape::Circle => circle_offsets(self.size_m, self.spacing_m),
            LoopShape::Square => square_offsets(self.size_m, self.spacing_m),
            LoopShape::FigureEight => figure_eight_offsets(self.size_m, self.spacing_m),
        };

        let speed_ms = (self.speed_kmh / 3.6).max(f64::EPSILON);
        let mut samples = Vec::with_capacity(offsets.len());
        let mut walked = 0.0;
        let mut previous: Option<(f64, f64)> = None;

        for (east, north) in offsets {
            if let Some((pe, pn)) = previous {
                walked += ((east - pe).powi(2) + (north - pn).powi(2)).sqrt();
            }
            previous = Some((east, north));

            let (noise_e, noise_n) = gaussian_pair(&mut rng, self.noise_sigma_m);
            let point = offset_point(&self.origin, east + noise_e, north + noise_n);
            samples.push(Sample::new(point, self.start_time + walked / speed_ms));
        }

        samples
    }

    /// Generated points without timestamps.
    pub fn points(&self) -> Vec<GeoPoint> {
        self.generate().into_iter().map(|s| s.point).collect()
    }
}

/// Move `origin` by local east/north offsets in meters.
pub fn offset_point(origin: &GeoPoint, east_m: f64, north_m: f64) -> GeoPoint {
    GeoPoint::new(
        origin.latitude + north_m / METERS_PER_DEGREE,
        origin.longitude + meters_to_degrees(east_m, origin.latitude),
    )
}

fn gaussian_pair(rng: &mut StdRng, sigma: f64) -> (f64, f64) {
    if sigma <= 0.0 {
        return (0.0, 0.0);
    }
    // Box-Muller
    let u1: f64 = rng.gen_range(0.0001..1.0);
    let u2: f64 = rng.r#gen();
    let r = (-2.0 * u1.ln()).sqrt() * sigma;
    (r * (2.0 * PI * u2).cos(), r * (2.0 * PI * u2).sin())
}

fn circle_offsets(radius: f64, spacing: f64) -> Vec<(f64, f64)> {
    let n = ((2.0 * PI * radius) / spacing).ceil().max(3.0) as usize;
    (0..=n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64;
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

fn square_offsets(half_side: f64, spacing: f64) -> Vec<(f64, f64)> {
    let corners = [
        (-half_side, -half_side),
        (half_side, -half_side),
        (half_side, half_side),
        (-half_side, half_side),
    ];
    let steps = ((2.0 * half_side) / spacing).ceil().max(1.0) as usize;

    let mut offsets = Vec::with_capacity(steps * 4 + 1);
    for (k, &(x0, y0)) in corners.iter().enumerate() {
        let (x1, y1) = corners[(k + 1) % corners.len()];
        for s in 0..steps {
            let t = s as f64 / steps as f64;
            offsets.push((x0 + (x1 - x0) * t, y0 + (y1 - y0) * t));
        }
    }
    offsets.push(corners[0]);
    offsets
}

fn figure_eight_offsets(half_width: f64, spacing: f64) -> Vec<(f64, f64)> {
    // Lemniscate of Gerono: x = a sin t, y = a sin t cos t.
    // Starting at t = pi/2 puts the crossing at the middle of the walk.
    let approx_length = 6.1 * half_width;
    let n = (approx_length / spacing).ceil().max(8.0) as usize;
    (0..=n)
        .map(|i| {
            let t = PI / 2.0 + 2.0 * PI * i as f64 / n as f64;
            (half_width * t.sin(), half_width * t.sin() * t.cos())
        })
        .collect()
}
