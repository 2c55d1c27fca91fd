//! The PID control law and its per-loop state

mod saturation;

use tracing::{debug, trace};

use crate::config::{DeadbandPolicy, PidConfig};
use crate::error::{PidError, finite_input};
use saturation::{Saturation, clamp_output};

/// Component values from the most recent active update
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Terms {
    pub p: f64,
    pub i: f64,
    pub d: f64,
}

/// A discrete-time PID controller.
///
/// The caller owns the sampling clock and calls [`Controller::update`]
/// once per `sample_interval` with the latest measurement.
/// The derivative acts on the measurement rather than the error,
/// so setpoint changes do not produce a derivative kick.
///
/// ```
/// use pidctl::Controller;
///
/// let mut pid = Controller::new(1.0, 0.0, 0.0, 1.0, 0.0, 100.0, 0.0).unwrap();
/// pid.set_target(10.0).unwrap();
/// assert_eq!(pid.update(0.0).unwrap(), 10.0);
/// ```
#[derive(Clone, Debug)]
pub struct Controller {
    // User inputs
    config: PidConfig,
    target: f64,

    // Internal state
    accumulated_error: f64,
    previous_measurement: f64,
    last_output: f64,
    terms: Terms,
    pending_first_active_step: bool,
}

impl Default for Controller {
    fn default() -> Self {
        Self::from_valid(PidConfig::default())
    }
}

impl Controller {
    /// Build a controller that holds its output inside the deadband.
    ///
    /// Fails with [`PidError::InvalidConfiguration`] if any value is non-finite,
    /// `sample_interval <= 0`, `output_min >= output_max`, or `deadband < 0`.
    pub fn new(
        gain_p: f64,
        gain_i: f64,
        gain_d: f64,
        sample_interval: f64,
        output_min: f64,
        output_max: f64,
        deadband: f64,
    ) -> Result<Self, PidError> {
        Self::from_config(PidConfig {
            gain_p,
            gain_i,
            gain_d,
            sample_interval,
            output_min,
            output_max,
            deadband,
            deadband_policy: DeadbandPolicy::Hold,
        })
    }

    /// Build a controller from a full configuration
    pub fn from_config(config: PidConfig) -> Result<Self, PidError> {
        config.validate()?;
        debug!(?config, "Built PID controller");
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: PidConfig) -> Self {
        Self {
            config,
            target: 0.0,

            accumulated_error: 0.0,
            previous_measurement: 0.0,
            last_output: resting_output(&config),
            terms: Terms::default(),
            pending_first_active_step: true,
        }
    }

    /// Replace the setpoint
    pub fn set_target(&mut self, target: f64) -> Result<(), PidError> {
        self.target = finite_input("target", target)?;
        Ok(())
    }

    /// Replace the deadband half-width without touching accumulated state
    pub fn set_deadband(&mut self, deadband: f64) -> Result<(), PidError> {
        let deadband = finite_input("deadband", deadband)?;
        if deadband < 0.0 {
            return Err(PidError::InvalidInput {
                field: "deadband",
                value: deadband,
                reason: "must be >= 0",
            });
        }
        self.config.deadband = deadband;
        Ok(())
    }

    /// Run one control step and return the clamped output.
    ///
    /// Inside the deadband, no control action is taken: the output is handled
    /// according to the configured [`DeadbandPolicy`], and the next step that
    /// leaves the band skips the derivative term.
    ///
    /// Fails with [`PidError::InvalidInput`] and leaves the state untouched if
    /// `measurement` is non-finite, or if it is so far from the target or the
    /// previous measurement that the error, the integral, or the summed
    /// output overflows.
    pub fn update(&mut self, measurement: f64) -> Result<f64, PidError> {
        let measurement = finite_input("measurement", measurement)?;
        let cfg = self.config;
        let error = self.target - measurement;

        if cfg.deadband > 0.0 && error.abs() <= cfg.deadband {
            return Ok(self.suppress(error));
        }

        let first_active_step = self.pending_first_active_step;

        let p = cfg.gain_p * error;

        let mut accumulated_error = self.accumulated_error + error * cfg.sample_interval;
        let mut i = cfg.gain_i * accumulated_error;

        // The stored measurement is undefined after reset and stale after a deadband hold
        let d = if first_active_step {
            0.0
        } else {
            cfg.gain_d * (measurement - self.previous_measurement) / cfg.sample_interval
        };

        // Any non-finite term or accumulator makes the sum non-finite
        let clamped = clamp_output(p, i, d, cfg.gain_i, cfg.output_min, cfg.output_max)
            .ok_or(PidError::InvalidInput {
                field: "measurement",
                value: measurement,
                reason: "drives the control terms out of the floating-point range",
            })?;
        if let Some(capped) = clamped.accumulated_error {
            debug!(
                saturation = ?clamped.saturation,
                from = accumulated_error,
                to = capped,
                "Output saturated; integral back-solved"
            );
            accumulated_error = capped;
            i = cfg.gain_i * capped;
        } else if clamped.saturation != Saturation::None {
            trace!(saturation = ?clamped.saturation, "Output saturated");
        }

        self.pending_first_active_step = false;
        self.accumulated_error = accumulated_error;
        self.previous_measurement = measurement;
        self.terms = Terms { p, i, d };
        self.last_output = clamped.output;
        trace!(error, p, i, d, output = clamped.output, "PID step");

        Ok(clamped.output)
    }

    /// Handle a step whose error is inside the deadband
    fn suppress(&mut self, error: f64) -> f64 {
        if !self.pending_first_active_step {
            self.pending_first_active_step = true;
            trace!(error, deadband = self.config.deadband, "Entered deadband");
        }

        match self.config.deadband_policy {
            DeadbandPolicy::Hold => self.last_output,
            DeadbandPolicy::ZeroAndReset => {
                self.accumulated_error = 0.0;
                self.last_output = resting_output(&self.config);
                self.last_output
            }
        }
    }

    /// Clear accumulated state so that the next update behaves
    /// like the first one on a fresh controller.
    /// Target, gains, bounds, and deadband are kept.
    pub fn reset(&mut self) {
        self.accumulated_error = 0.0;
        self.previous_measurement = 0.0;
        self.last_output = resting_output(&self.config);
        self.terms = Terms::default();
        self.pending_first_active_step = true;
        debug!(setpoint = self.target, "Reset PID controller");
    }

    /// Proportional term from the last active update
    pub fn p(&self) -> f64 {
        self.terms.p
    }

    /// Integral term from the last active update
    pub fn i(&self) -> f64 {
        self.terms.i
    }

    /// Derivative term from the last active update
    pub fn d(&self) -> f64 {
        self.terms.d
    }

    /// All three terms from the last active update
    pub fn terms(&self) -> Terms {
        self.terms
    }

    /// Current setpoint
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Half-width of the band around the target where no control action is taken
    pub fn deadband(&self) -> f64 {
        self.config.deadband
    }

    /// Most recent value returned by [`Controller::update`], or the resting output
    pub fn last_output(&self) -> f64 {
        self.last_output
    }

    /// Running sum of `error * sample_interval`, after any anti-windup cap
    pub fn accumulated_error(&self) -> f64 {
        self.accumulated_error
    }

    /// Current configuration, including the live deadband
    pub fn config(&self) -> &PidConfig {
        &self.config
    }
}

/// Output at rest: zero, or the nearest bound when zero is out of range
fn resting_output(config: &PidConfig) -> f64 {
    0.0_f64.clamp(config.output_min, config.output_max)
}
