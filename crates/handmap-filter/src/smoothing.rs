//! Smoothing configuration and the per-mapping filter instance.

use serde::{Deserialize, Serialize};

use crate::filtering::{AdaptiveFilter, ExponentialFilter, LowPassFilter, MovingAverageFilter};

const MIN_ALPHA: f64 = 0.01;
const MIN_CUTOFF_HZ: f64 = 1e-3;

/// Filter selection plus filter-specific parameters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SmoothingSpec {
    #[default]
    Passthrough,
    LowPass {
        factor: f64,
    },
    Exponential {
        alpha: f64,
    },
    MovingAverage {
        window: usize,
    },
    Adaptive {
        min_cutoff: f64,
        beta: f64,
        #[serde(default = "default_d_cutoff")]
        d_cutoff: f64,
    },
}

fn default_d_cutoff() -> f64 {
    1.0
}

/// Replace NaN/inf with `fallback` before clamping
fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

impl SmoothingSpec {
    /// Adaptive filter with the default derivative cutoff of 1 Hz
    pub fn adaptive(min_cutoff: f64, beta: f64) -> Self {
        SmoothingSpec::Adaptive {
            min_cutoff,
            beta,
            d_cutoff: default_d_cutoff(),
        }
    }

    /// Same spec with every parameter clamped into its valid domain
    pub fn clamped(&self) -> Self {
        match *self {
            SmoothingSpec::Passthrough => SmoothingSpec::Passthrough,
            SmoothingSpec::LowPass { factor } => SmoothingSpec::LowPass {
                factor: finite_or(factor, 0.0).clamp(0.0, 1.0),
            },
            SmoothingSpec::Exponential { alpha } => SmoothingSpec::Exponential {
                alpha: finite_or(alpha, 1.0).clamp(MIN_ALPHA, 1.0),
            },
            SmoothingSpec::MovingAverage { window } => SmoothingSpec::MovingAverage {
                window: window.max(1),
            },
            SmoothingSpec::Adaptive {
                min_cutoff,
                beta,
                d_cutoff,
            } => SmoothingSpec::Adaptive {
                min_cutoff: finite_or(min_cutoff, 1.0).max(MIN_CUTOFF_HZ),
                beta: finite_or(beta, 0.0).max(0.0),
                d_cutoff: finite_or(d_cutoff, 1.0).max(MIN_CUTOFF_HZ),
            },
        }
    }

    /// Construct a fresh filter with clamped parameters
    pub fn build(&self) -> Smoother {
        match self.clamped() {
            SmoothingSpec::Passthrough => Smoother::Passthrough,
            SmoothingSpec::LowPass { factor } => Smoother::LowPass(LowPassFilter::new(factor)),
            SmoothingSpec::Exponential { alpha } => {
                Smoother::Exponential(ExponentialFilter::new(alpha))
            }
            SmoothingSpec::MovingAverage { window } => {
                Smoother::MovingAverage(MovingAverageFilter::new(window))
            }
            SmoothingSpec::Adaptive {
                min_cutoff,
                beta,
                d_cutoff,
            } => Smoother::Adaptive(AdaptiveFilter::new(min_cutoff, beta, d_cutoff)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SmoothingSpec::Passthrough => "passthrough",
            SmoothingSpec::LowPass { .. } => "low_pass",
            SmoothingSpec::Exponential { .. } => "exponential",
            SmoothingSpec::MovingAverage { .. } => "moving_average",
            SmoothingSpec::Adaptive { .. } => "adaptive",
        }
    }
}

/// One mapping's live filter
#[derive(Debug, Clone)]
pub enum Smoother {
    Passthrough,
    LowPass(LowPassFilter),
    Exponential(ExponentialFilter),
    MovingAverage(MovingAverageFilter),
    Adaptive(AdaptiveFilter),
}

impl Smoother {
    /// Filter one sample; `t` is the sample time in seconds
    pub fn apply(&mut self, value: f64, t: f64) -> f64 {
        match self {
            Smoother::Passthrough => value,
            Smoother::LowPass(f) => f.filter(value),
            Smoother::Exponential(f) => f.filter(value),
            Smoother::MovingAverage(f) => f.filter(value),
            Smoother::Adaptive(f) => f.filter(value, t),
        }
    }

    /// Drop all recursive history
    pub fn reset(&mut self) {
        match self {
            Smoother::Passthrough => {}
            Smoother::LowPass(f) => f.reset(),
            Smoother::Exponential(f) => f.reset(),
            Smoother::MovingAverage(f) => f.reset(),
            Smoother::Adaptive(f) => f.reset(),
        }
    }
}
