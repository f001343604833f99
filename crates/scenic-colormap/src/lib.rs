// SPDX-License-Identifier: Apache-2.0
//! Scalar-to-color mapping for scenic viewers.
//!
//! This crate turns arrays of raw scalar samples (heights, velocities,
//! curve parameters) into pre-resolved RGB arrays that can cross the wire.
//! Colormap resolution always happens producer-side; renderers only ever
//! see RGB.
//!
//! # Design Principles
//!
//! - **Pure lookups** — the control-point tables are immutable, process-wide
//!   constants; every function here is safe to call from any thread.
//! - **Silent fallback** — an unknown colormap name resolves to `viridis`.
//!   This is deliberate compatibility behavior, not an error path.
//! - **Clamped output** — every emitted component lies in `[0, 1]` no matter
//!   how far outside the range the input scalars stray.
//!
//! # Crate Features
//!
//! - `std` (default): Enables std library. Disable for no_std contexts.

#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

use alloc::vec::Vec;

mod tables;

/// Built-in colormap names (case-sensitive), in registry order.
pub const SUPPORTED: &[&str] = &["viridis", "plasma", "turbo"];

/// A named control-point lookup table.
///
/// Each variant maps a normalized scalar in `[0, 1]` to an RGB triple by
/// linear interpolation between fixed control points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Colormap {
    /// Perceptually uniform blue-green-yellow ramp. The fallback table.
    #[default]
    Viridis,
    /// Perceptually uniform purple-orange-yellow ramp.
    Plasma,
    /// High-contrast rainbow ramp for dense line data.
    Turbo,
}

impl Colormap {
    /// Look up a table by name. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "viridis" => Some(Self::Viridis),
            "plasma" => Some(Self::Plasma),
            "turbo" => Some(Self::Turbo),
            _ => None,
        }
    }

    /// Resolve a name, silently falling back to [`Colormap::Viridis`] when
    /// the name is unknown.
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }

    /// The fixed control points backing this table.
    pub fn control_points(self) -> &'static [[f32; 3]] {
        match self {
            Self::Viridis => &tables::VIRIDIS,
            Self::Plasma => &tables::PLASMA,
            Self::Turbo => &tables::TURBO,
        }
    }

    /// Sample the table at a normalized position.
    ///
    /// `u` is clamped to `[0, 1]`; non-finite values sample the low end of
    /// the table. The result is a linear RGB interpolation between the two
    /// nearest control points.
    pub fn sample(self, u: f32) -> [f32; 3] {
        let points = self.control_points();
        let u = if u.is_finite() { u.clamp(0.0, 1.0) } else { 0.0 };

        let scaled = u * (points.len() - 1) as f32;
        let lo = (scaled as usize).min(points.len() - 2);
        let t = scaled - lo as f32;
        lerp_rgb(points[lo], points[lo + 1], t)
    }
}

/// Map a scalar array onto RGB triples using the named table and range.
///
/// Normalization is `u = (v - cmin) / (cmax - cmin)`, clamped to `[0, 1]`.
/// When `cmax == cmin` every value maps to `u = 0` exactly; the degenerate
/// range never divides by zero. Unknown names resolve to `viridis`.
///
/// The output always has the same length as `values` and every component
/// lies in `[0, 1]`.
pub fn apply(values: &[f32], colormap: &str, cmin: f32, cmax: f32) -> Vec<[f32; 3]> {
    let map = Colormap::resolve(colormap);
    let span = cmax - cmin;
    let degenerate = !(span.is_finite() && span != 0.0);

    values
        .iter()
        .map(|&v| {
            let u = if degenerate { 0.0 } else { (v - cmin) / span };
            map.sample(u)
        })
        .collect()
}

/// Observed `(min, max)` of the finite entries of a scalar array.
///
/// Used to default `cmin`/`cmax` when a caller omits them. Returns
/// `(0.0, 0.0)` when the array holds no finite value, which downstream
/// maps every sample to the low end of the table.
pub fn auto_range(values: &[f32]) -> (f32, f32) {
    let mut range: Option<(f32, f32)> = None;
    for &v in values {
        if !v.is_finite() {
            continue;
        }
        range = Some(match range {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }
    range.unwrap_or((0.0, 0.0))
}

/// Linear interpolation between two RGB triples.
///
/// The `(1 - t) * a + t * b` form is exact at both endpoints, so clamped
/// outliers land on the table's first and last control points bit-for-bit.
fn lerp_rgb(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] * (1.0 - t) + b[0] * t,
        a[1] * (1.0 - t) + b[1] * t,
        a[2] * (1.0 - t) + b[2] * t,
    ]
}
