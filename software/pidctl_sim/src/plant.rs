//! Process models standing in for the controlled system

use serde::{Deserialize, Serialize};

/// A simulated process that integrates a control input over one sample interval.
///
/// Plants are serialized as trait objects tagged by type name,
/// so scenario files can pick a model with `"type": "FirstOrderPlant"` and so on.
#[typetag::serde(tag = "type")]
pub trait Plant: Send + Sync + core::fmt::Debug {
    /// Current process value, as a sensor would report it
    fn value(&self) -> f64;

    /// Advance the process by `dt` while holding `input` constant
    fn step(&mut self, input: f64, dt: f64);

    /// Set the process value without advancing time
    fn reset(&mut self, value: f64);

    /// Check model parameters
    fn validate(&self) -> Result<(), String>;
}

/// First-order lag `tau * dy/dt = gain * u - y`, such as a heated mass
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FirstOrderPlant {
    gain: f64,
    time_constant: f64,

    #[serde(skip)]
    value: f64,
}

impl FirstOrderPlant {
    pub fn new(gain: f64, time_constant: f64) -> Self {
        Self {
            gain,
            time_constant,
            value: 0.0,
        }
    }
}

#[typetag::serde]
impl Plant for FirstOrderPlant {
    fn value(&self) -> f64 {
        self.value
    }

    /// Exact zero-order-hold discretization, stable for any `dt`
    fn step(&mut self, input: f64, dt: f64) {
        let steady_state = self.gain * input;
        let blend = 1.0 - (-dt / self.time_constant).exp();
        self.value += (steady_state - self.value) * blend;
    }

    fn reset(&mut self, value: f64) {
        self.value = value;
    }

    fn validate(&self) -> Result<(), String> {
        if !self.gain.is_finite() {
            return Err(format!("FirstOrderPlant gain must be finite; got {}", self.gain));
        }
        if !(self.time_constant.is_finite() && self.time_constant > 0.0) {
            return Err(format!(
                "FirstOrderPlant time_constant must be finite and > 0; got {}",
                self.time_constant
            ));
        }
        Ok(())
    }
}

/// Pure integrator `dy/dt = gain * u`, such as a position driven by a velocity command
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct IntegratorPlant {
    gain: f64,

    #[serde(skip)]
    value: f64,
}

impl IntegratorPlant {
    pub fn new(gain: f64) -> Self {
        Self { gain, value: 0.0 }
    }
}

#[typetag::serde]
impl Plant for IntegratorPlant {
    fn value(&self) -> f64 {
        self.value
    }

    fn step(&mut self, input: f64, dt: f64) {
        self.value += self.gain * input * dt;
    }

    fn reset(&mut self, value: f64) {
        self.value = value;
    }

    fn validate(&self) -> Result<(), String> {
        if self.gain.is_finite() {
            Ok(())
        } else {
            Err(format!("IntegratorPlant gain must be finite; got {}", self.gain))
        }
    }
}
