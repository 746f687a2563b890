//! # Signal Shaper Module
//!
//! Turns raw thumbstick deflection into locomotion output values.
//!
//! ## Deadzone
//!
//! Deflection at or below [`DEADZONE`] on an axis is treated as exactly zero,
//! so an idle stick sends clean zeros instead of drift.
//!
//! ## Threshold Scaling
//!
//! Outside the deadzone the value is divided by the threshold and clamped:
//!
//! `output = sign(v) * min(|v| / threshold, 1.0)`
//!
//! A threshold of `0.75` means three quarters of a full push already reads
//! as full speed. Thresholds below the deadzone amplify tiny inputs all the
//! way to ±1.0, which is allowed.
//!
//! ## Usage
//!
//! ```
//! use locomotion_bridge::controller::shaper::Shaper;
//! use locomotion_bridge::controller::provider::RawSample;
//!
//! let shaper = Shaper::new(0.75);
//!
//! let out = shaper.shape(&RawSample::new(0.0, 0.375));
//! assert_eq!(out.vertical, 0.5);
//! assert_eq!(out.horizontal, 0.0);
//! ```

use serde::Deserialize;

use super::provider::RawSample;

/// Axis magnitude treated as neutral.
pub const DEADZONE: f32 = 0.05;

/// How shaped values are turned into output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapingPolicy {
    /// Linear scaling up to the threshold.
    #[default]
    Analog,
    /// Only full deflection counts: output is -1, 0 or 1.
    Digital,
}

/// One shaped output pair, one value per axis, each in [-1.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OutputSignal {
    /// Stick X, sent to the horizontal channel.
    pub horizontal: f32,
    /// Stick Y, sent to the vertical channel.
    pub vertical: f32,
}

impl OutputSignal {
    /// Neutral output that stops any movement.
    pub const ZERO: OutputSignal = OutputSignal {
        horizontal: 0.0,
        vertical: 0.0,
    };
}

/// Shape a single axis value.
///
/// `threshold` must be positive; the config layer guarantees it.
///
/// # Examples
///
/// ```
/// use locomotion_bridge::controller::shaper::shape_axis;
///
/// assert_eq!(shape_axis(0.75, 0.75), 1.0);
/// assert_eq!(shape_axis(0.9, 0.75), 1.0);
/// assert_eq!(shape_axis(-0.375, 0.75), -0.5);
/// assert_eq!(shape_axis(0.05, 0.75), 0.0);
/// ```
#[must_use]
#[inline]
pub fn shape_axis(value: f32, threshold: f32) -> f32 {
    let magnitude = value.abs();
    if magnitude.is_nan() || magnitude <= DEADZONE {
        return 0.0;
    }
    value.signum() * (magnitude / threshold).min(1.0)
}

/// Shape an `(x, y)` pair with the analog policy.
#[must_use]
pub fn shape(raw: (f32, f32), threshold: f32) -> (f32, f32) {
    (shape_axis(raw.0, threshold), shape_axis(raw.1, threshold))
}

/// Deadzone and threshold scaling with a fixed policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shaper {
    threshold: f32,
    policy: ShapingPolicy,
}

impl Shaper {
    /// Creates an analog shaper.
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        Self::with_policy(threshold, ShapingPolicy::Analog)
    }

    #[must_use]
    pub fn with_policy(threshold: f32, policy: ShapingPolicy) -> Self {
        Self { threshold, policy }
    }

    /// Returns the configured threshold.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    #[must_use]
    pub fn policy(&self) -> ShapingPolicy {
        self.policy
    }

    /// Shapes both axes of a raw sample.
    #[must_use]
    pub fn shape(&self, sample: &RawSample) -> OutputSignal {
        OutputSignal {
            horizontal: self.apply(sample.x),
            vertical: self.apply(sample.y),
        }
    }

    /// Shapes one axis value under the configured policy.
    ///
    /// Digital output is non-zero only for deflection strictly past the
    /// threshold; a stick resting exactly on it reads as neutral.
    #[must_use]
    pub fn apply(&self, value: f32) -> f32 {
        let shaped = shape_axis(value, self.threshold);
        match self.policy {
            ShapingPolicy::Analog => shaped,
            ShapingPolicy::Digital => {
                if shaped != 0.0 && value.abs() > self.threshold {
                    shaped.signum()
                } else {
                    0.0
                }
            }
        }
    }
}
