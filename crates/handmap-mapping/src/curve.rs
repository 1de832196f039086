//! Normalization, curve shaping and output-range remapping.

use std::f64::consts::E;

use serde::{Deserialize, Serialize};

use crate::mapping::{InputSpec, OutputSpec, ValueRange};

/// Response curve applied to a normalized value in [0, 1].
///
/// Every curve maps 0 → 0 and 1 → 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveType {
    #[default]
    Linear,
    /// t²
    Exponential,
    /// ln(1 + t·(e−1))
    Logarithmic,
    /// t³
    EaseIn,
    /// 1 − (1−t)³
    EaseOut,
    EaseInOut,
    /// t²·(3 − 2t)
    SmoothStep,
}

impl CurveType {
    pub const ALL: [CurveType; 7] = [
        CurveType::Linear,
        CurveType::Exponential,
        CurveType::Logarithmic,
        CurveType::EaseIn,
        CurveType::EaseOut,
        CurveType::EaseInOut,
        CurveType::SmoothStep,
    ];

    pub fn apply(&self, t: f64) -> f64 {
        match self {
            CurveType::Linear => t,
            CurveType::Exponential => t * t,
            CurveType::Logarithmic => (1.0 + t * (E - 1.0)).ln() / E.ln(),
            CurveType::EaseIn => t * t * t,
            CurveType::EaseOut => 1.0 - (1.0 - t).powi(3),
            CurveType::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            CurveType::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Position of `value` within `range`, clamped to [0, 1].
///
/// A zero-width range acts as a step at `range.min`.
pub fn normalize(value: f64, range: &ValueRange) -> f64 {
    let span = range.span();
    if span == 0.0 {
        return if value < range.min { 0.0 } else { 1.0 };
    }
    ((value - range.min) / span).clamp(0.0, 1.0)
}

/// Map a shaped value in [0, 1] onto `range`, optionally mirrored
pub fn remap(shaped: f64, range: &ValueRange, invert: bool) -> f64 {
    let out = range.min + shaped * range.span();
    if invert {
        range.max - (out - range.min)
    } else {
        out
    }
}

/// Full curve mapping of one smoothed value for a mapping's specs
pub fn map_value(value: f64, input: &InputSpec, output: &OutputSpec) -> f64 {
    let t = normalize(value, &input.range);
    let shaped = input.curve.apply(t);
    remap(shaped, &output.range, output.invert)
}
