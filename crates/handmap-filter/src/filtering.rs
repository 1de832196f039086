//! Recursive smoothing filters for gesture signals.

use std::collections::VecDeque;
use std::f64::consts::PI;

/// Frame interval assumed before a second timestamp is known
pub const BOOTSTRAP_DT: f64 = 1.0 / 60.0;

/// Lower bound on the sampling interval (seconds)
pub const MIN_DT: f64 = 1e-6;

/// Smoothing factor of a first-order low-pass at `cutoff` Hz sampled every `dt` seconds
pub fn smoothing_factor(cutoff: f64, dt: f64) -> f64 {
    let tau = 1.0 / (2.0 * PI * cutoff);
    1.0 / (1.0 + tau / dt)
}

/// Low-pass filter where `factor` is the weight kept on the previous output
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    factor: f64,
    state: Option<f64>,
}

impl LowPassFilter {
    /// Create new low-pass filter
    ///
    /// # Arguments
    /// * `factor` - Retention factor (0-1). Higher = more smoothing
    pub fn new(factor: f64) -> Self {
        Self {
            factor: factor.clamp(0.0, 1.0),
            state: None,
        }
    }

    pub fn filter(&mut self, x: f64) -> f64 {
        let y = match self.state {
            Some(prev) => prev * self.factor + x * (1.0 - self.factor),
            None => x,
        };
        self.state = Some(y);
        y
    }

    pub fn reset(&mut self) {
        self.state = None;
    }
}

/// First-order recursive smoother, `y = a·x + (1−a)·y`.
///
/// The first sample passes through and seeds the state. Also serves as the
/// value and derivative stages of [`AdaptiveFilter`], which retune `a` on
/// every sample.
#[derive(Debug, Clone)]
pub struct ExponentialFilter {
    /// Weight of the newest sample, kept in [0, 1]
    weight: f64,
    last: Option<f64>,
}

impl ExponentialFilter {
    pub fn new(alpha: f64) -> Self {
        Self {
            weight: alpha.clamp(0.0, 1.0),
            last: None,
        }
    }

    pub fn filter(&mut self, x: f64) -> f64 {
        let y = self.last.map_or(x, |last| last + self.weight * (x - last));
        self.last = Some(y);
        y
    }

    /// Seed the state without filtering
    pub fn prime(&mut self, x: f64) {
        self.last = Some(x);
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.weight = alpha.clamp(0.0, 1.0);
    }

    pub fn alpha(&self) -> f64 {
        self.weight
    }

    pub fn state(&self) -> Option<f64> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Moving average filter for simple smoothing
#[derive(Debug, Clone)]
pub struct MovingAverageFilter {
    window_size: usize,
    buffer: VecDeque<f64>,
    sum: f64,
}

impl MovingAverageFilter {
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            buffer: VecDeque::with_capacity(window_size + 1),
            sum: 0.0,
        }
    }

    pub fn filter(&mut self, x: f64) -> f64 {
        self.buffer.push_back(x);
        self.sum += x;

        if self.buffer.len() > self.window_size {
            if let Some(oldest) = self.buffer.pop_front() {
                self.sum -= oldest;
            }
        }

        self.sum / self.buffer.len() as f64
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.sum = 0.0;
    }
}

/// Speed-adaptive low-pass filter.
///
/// Two exponential stages: one smooths the derivative, the other the value.
/// The value stage's cutoff is `min_cutoff + beta·|derivative|`, so jitter
/// at rest is heavily smoothed while fast motion passes with little lag.
#[derive(Debug, Clone)]
pub struct AdaptiveFilter {
    /// Minimum cutoff frequency (Hz) - lower = smoother at rest
    min_cutoff: f64,
    /// Speed coefficient - higher = less lag during fast motion
    beta: f64,
    /// Derivative cutoff frequency (Hz)
    d_cutoff: f64,

    value: ExponentialFilter,
    derivative: ExponentialFilter,
    last_raw: Option<f64>,
    last_time: Option<f64>,
}

impl AdaptiveFilter {
    pub fn new(min_cutoff: f64, beta: f64, d_cutoff: f64) -> Self {
        Self {
            min_cutoff,
            beta,
            d_cutoff,
            value: ExponentialFilter::new(1.0),
            derivative: ExponentialFilter::new(1.0),
            last_raw: None,
            last_time: None,
        }
    }

    /// Filter a single value
    ///
    /// - `x`: raw input value
    /// - `t`: timestamp in seconds
    pub fn filter(&mut self, x: f64, t: f64) -> f64 {
        let (Some(last_raw), Some(last_time)) = (self.last_raw, self.last_time) else {
            self.value.set_alpha(smoothing_factor(self.min_cutoff, BOOTSTRAP_DT));
            self.value.prime(x);
            self.derivative.prime(0.0);
            self.last_raw = Some(x);
            self.last_time = Some(t);
            return x;
        };

        let dt = (t - last_time).max(MIN_DT);

        // 1. Estimate derivative (velocity)
        let dx = (x - last_raw) / dt;
        self.derivative.set_alpha(smoothing_factor(self.d_cutoff, dt));
        let dx_hat = self.derivative.filter(dx);

        // 2. Adaptive cutoff
        let cutoff = self.min_cutoff + self.beta * dx_hat.abs();
        self.value.set_alpha(smoothing_factor(cutoff, dt));

        // 3. Apply filter
        let x_hat = self.value.filter(x);

        self.last_raw = Some(x);
        self.last_time = Some(t);
        x_hat
    }

    /// Smoothed derivative from the last call, 0 before the second sample
    pub fn derivative(&self) -> f64 {
        self.derivative.state().unwrap_or(0.0)
    }

    pub fn reset(&mut self) {
        self.value.reset();
        self.derivative.reset();
        self.last_raw = None;
        self.last_time = None;
    }
}
