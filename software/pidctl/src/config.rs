//! Controller configuration and its validation

#[cfg(feature = "ser")]
use serde::{Deserialize, Serialize};

use crate::error::PidError;

/// Choice of behavior while the error is inside the deadband
#[cfg_attr(feature = "ser", derive(Serialize, Deserialize))]
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeadbandPolicy {
    /// Freeze the output at its last active value and keep the integral,
    /// resuming from both when the error leaves the band
    #[default]
    Hold,

    /// Drive the output to rest and clear the integral.
    ///
    /// The resting output is zero, or the nearest output bound
    /// if zero is outside the output range.
    ZeroAndReset,
}

/// Gains, timing, output range, and deadband for one control loop.
///
/// `Default` gives a unit-gain proportional controller sampled once per
/// second with outputs in `[0, 100]` and a deadband of 0.5.
/// When deserialized, any omitted field takes its default value.
#[cfg_attr(feature = "ser", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "ser", serde(default))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PidConfig {
    pub gain_p: f64,
    pub gain_i: f64,
    pub gain_d: f64,

    /// Time assumed to elapse between consecutive updates
    pub sample_interval: f64,

    pub output_min: f64,
    pub output_max: f64,

    /// Half-width of the tolerance band around the target
    pub deadband: f64,
    pub deadband_policy: DeadbandPolicy,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            gain_p: 1.0,
            gain_i: 0.0,
            gain_d: 0.0,
            sample_interval: 1.0,
            output_min: 0.0,
            output_max: 100.0,
            deadband: 0.5,
            deadband_policy: DeadbandPolicy::Hold,
        }
    }
}

impl PidConfig {
    /// Check every construction constraint, reporting the first violation
    pub fn validate(&self) -> Result<(), PidError> {
        let fields = [
            ("gain_p", self.gain_p),
            ("gain_i", self.gain_i),
            ("gain_d", self.gain_d),
            ("sample_interval", self.sample_interval),
            ("output_min", self.output_min),
            ("output_max", self.output_max),
            ("deadband", self.deadband),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(PidError::config(
                    field,
                    format!("must be a finite number; got {value}"),
                ));
            }
        }

        if self.sample_interval <= 0.0 {
            return Err(PidError::config(
                "sample_interval",
                format!("must be > 0; got {}", self.sample_interval),
            ));
        }
        if self.output_min >= self.output_max {
            return Err(PidError::config(
                "output_min",
                format!(
                    "must be less than output_max; got {} >= {}",
                    self.output_min, self.output_max
                ),
            ));
        }
        if self.deadband < 0.0 {
            return Err(PidError::config(
                "deadband",
                format!("must be >= 0; got {}", self.deadband),
            ));
        }

        Ok(())
    }
}
