//! Biquad (bi-quadratic) filter section.
//!
//! Provides the second-order IIR building block used by the crossover, and
//! the coefficient formulas it needs: Butterworth low-pass and high-pass
//! (bilinear transform with frequency pre-warping, RBJ cookbook form with
//! `Q = 1/√2`) and the second-order all-pass sharing their poles.
//!
//! Two identical Butterworth sections in series form a 4th-order
//! Linkwitz-Riley section. The sum of a Linkwitz-Riley low-pass and high-pass
//! at the same frequency equals [`BiquadCoefficients::allpass`].

use core::f64::consts::{FRAC_1_SQRT_2, PI};
use libm::{cos, sin};

/// Normalized biquad coefficients (`a0 = 1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    /// Feedforward coefficient for x[n].
    pub b0: f32,
    /// Feedforward coefficient for x[n-1].
    pub b1: f32,
    /// Feedforward coefficient for x[n-2].
    pub b2: f32,
    /// Feedback coefficient for y[n-1].
    pub a1: f32,
    /// Feedback coefficient for y[n-2].
    pub a2: f32,
}

impl BiquadCoefficients {
    /// `y[n] = x[n]`.
    pub const PASSTHROUGH: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// `y[n] = 0`. Used when the sample rate is unknown.
    pub const ZERO: Self = Self {
        b0: 0.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Normalizes raw coefficients by `a0`.
    pub fn from_raw(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        let a0_inv = 1.0 / a0;
        Self {
            b0: (b0 * a0_inv) as f32,
            b1: (b1 * a0_inv) as f32,
            b2: (b2 * a0_inv) as f32,
            a1: (a1 * a0_inv) as f32,
            a2: (a2 * a0_inv) as f32,
        }
    }

    /// Second-order Butterworth low-pass.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Cutoff frequency in Hz, clamped to `[0, sample_rate / 2]`
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Returns
    ///
    /// [`ZERO`](Self::ZERO) if `sample_rate` is not positive.
    pub fn butterworth_lowpass(frequency: f32, sample_rate: f32) -> Self {
        let Some((cos_omega, alpha)) = prewarp(frequency, sample_rate) else {
            return Self::ZERO;
        };

        Self::from_raw(
            (1.0 - cos_omega) / 2.0,
            1.0 - cos_omega,
            (1.0 - cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }

    /// Second-order Butterworth high-pass.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Cutoff frequency in Hz, clamped to `[0, sample_rate / 2]`
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Returns
    ///
    /// [`ZERO`](Self::ZERO) if `sample_rate` is not positive.
    pub fn butterworth_highpass(frequency: f32, sample_rate: f32) -> Self {
        let Some((cos_omega, alpha)) = prewarp(frequency, sample_rate) else {
            return Self::ZERO;
        };

        Self::from_raw(
            (1.0 + cos_omega) / 2.0,
            -(1.0 + cos_omega),
            (1.0 + cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }

    /// Second-order all-pass with the Butterworth poles at `frequency`.
    ///
    /// Equal to the summed response of the two 4th-order Linkwitz-Riley
    /// halves at the same frequency.
    pub fn allpass(frequency: f32, sample_rate: f32) -> Self {
        let Some((cos_omega, alpha)) = prewarp(frequency, sample_rate) else {
            return Self::ZERO;
        };

        Self::from_raw(
            1.0 - alpha,
            -2.0 * cos_omega,
            1.0 + alpha,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::PASSTHROUGH
    }
}

/// Returns `(cos ω, α)` for a Butterworth section, or `None` for a
/// degenerate sample rate.
fn prewarp(frequency: f32, sample_rate: f32) -> Option<(f64, f64)> {
    if sample_rate.is_nan() || sample_rate <= 0.0 {
        return None;
    }
    let sample_rate = f64::from(sample_rate);
    let frequency = f64::from(frequency).clamp(0.0, sample_rate / 2.0);
    let omega = 2.0 * PI * frequency / sample_rate;
    let alpha = sin(omega) / (2.0 * FRAC_1_SQRT_2);
    Some((cos(omega), alpha))
}

/// A single biquad section with its own state.
///
/// Implements the Direct Form I structure:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    coefficients: BiquadCoefficients,

    /// Input delay line: x[n-1], x[n-2]
    x1: f32,
    x2: f32,

    /// Output delay line: y[n-1], y[n-2]
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a pass-through section.
    pub fn new() -> Self {
        Self::with_coefficients(BiquadCoefficients::PASSTHROUGH)
    }

    /// Creates a section with the given coefficients and cleared state.
    pub fn with_coefficients(coefficients: BiquadCoefficients) -> Self {
        Self {
            coefficients,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Returns the current coefficients.
    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coefficients
    }

    /// Replaces the coefficients, keeping the delay lines.
    pub fn set_coefficients(&mut self, coefficients: BiquadCoefficients) {
        self.coefficients = coefficients;
    }

    /// Processes a single sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coefficients;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Filters a block in place.
    pub fn process_in_place(&mut self, samples: &mut [f32]) {
        for s in samples {
            *s = self.process(*s);
        }
    }

    /// Clears the delay lines.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}
