//! Scenario files describing a closed-loop simulation run

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pidctl::PidConfig;

use crate::SimError;
use crate::plant::Plant;

/// A scheduled setpoint change, applied before the update at `at_step`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SetpointChange {
    pub at_step: usize,
    pub target: f64,
}

/// Everything needed to run one simulation.
///
/// `controller` takes its defaults field-by-field when omitted,
/// and `plant` is tagged by model type name:
///
/// ```json
/// {
///   "name": "oven",
///   "controller": { "gain_p": 4.0, "gain_i": 0.2, "sample_interval": 0.5 },
///   "plant": { "type": "FirstOrderPlant", "gain": 1.0, "time_constant": 30.0 },
///   "initial_value": 20.0,
///   "setpoints": [ { "at_step": 0, "target": 180.0 } ],
///   "steps": 2000
/// }
/// ```
#[derive(Serialize, Deserialize, Debug)]
pub struct Scenario {
    /// Used as the name of the log and trace files,
    /// so must be usable as a file name
    #[serde(default = "default_op_name")]
    pub name: String,

    /// `tracing` filter directives for this run's log, such as `"pidctl=trace"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,

    #[serde(default)]
    pub controller: PidConfig,

    pub plant: Box<dyn Plant>,

    #[serde(default)]
    pub initial_value: f64,

    #[serde(default)]
    pub setpoints: Vec<SetpointChange>,

    pub steps: usize,
}

/// Current time with seconds, stripped of characters that are invalid in file names on Windows
pub fn default_op_name() -> String {
    DateTime::<Utc>::from(SystemTime::now())
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
        .replace(":", "")
}

impl Scenario {
    /// Parse and validate a scenario from a JSON string
    pub fn from_json_str(s: &str) -> Result<Self, SimError> {
        let scenario: Self = serde_json::from_str(s)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Read, parse, and validate a scenario file
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    pub fn to_json_string(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.controller.validate()?;
        self.plant.validate().map_err(SimError::InvalidScenario)?;

        if self.name.is_empty() {
            return Err(SimError::InvalidScenario("name must not be empty".into()));
        }
        if self.log_filter.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(SimError::InvalidScenario("log_filter must not be blank".into()));
        }
        if self.steps == 0 {
            return Err(SimError::InvalidScenario("steps must be > 0".into()));
        }
        if !self.initial_value.is_finite() {
            return Err(SimError::InvalidScenario(format!(
                "initial_value must be finite; got {}",
                self.initial_value
            )));
        }
        for change in &self.setpoints {
            if !change.target.is_finite() {
                return Err(SimError::InvalidScenario(format!(
                    "setpoint at step {} must be finite; got {}",
                    change.at_step, change.target
                )));
            }
            if change.at_step >= self.steps {
                return Err(SimError::InvalidScenario(format!(
                    "setpoint at step {} is past the end of a {}-step run",
                    change.at_step, self.steps
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVEN: &str = r#"{
        "name": "oven",
        "controller": { "gain_p": 4.0, "gain_i": 0.2, "sample_interval": 0.5 },
        "plant": { "type": "FirstOrderPlant", "gain": 1.0, "time_constant": 30.0 },
        "initial_value": 20.0,
        "setpoints": [ { "at_step": 0, "target": 180.0 } ],
        "steps": 2000
    }"#;

    #[test]
    fn parses_with_controller_defaults() {
        let scenario = Scenario::from_json_str(OVEN).unwrap();
        assert_eq!(scenario.name, "oven");
        assert_eq!(scenario.controller.gain_p, 4.0);
        assert_eq!(scenario.controller.gain_d, 0.0);
        assert_eq!(scenario.controller.deadband, 0.5);
        assert_eq!(scenario.controller.output_max, 100.0);
        assert_eq!(
            scenario.setpoints,
            vec![SetpointChange {
                at_step: 0,
                target: 180.0
            }]
        );
    }

    #[test]
    fn ser_roundtrip() {
        let scenario = Scenario::from_json_str(OVEN).unwrap();
        let serialized = scenario.to_json_string().unwrap();
        let deserialized = Scenario::from_json_str(&serialized).unwrap();
        let reserialized = deserialized.to_json_string().unwrap();

        assert_eq!(serialized, reserialized);
    }

    #[test]
    fn missing_name_gets_a_timestamp() {
        let s = r#"{"plant": {"type": "IntegratorPlant", "gain": 1.0}, "steps": 10}"#;
        let scenario = Scenario::from_json_str(s).unwrap();
        assert!(!scenario.name.is_empty());
        assert!(!scenario.name.contains(':'));
    }

    #[test]
    fn rejects_invalid_controller_config() {
        let s = r#"{
            "controller": { "output_min": 5.0, "output_max": 1.0 },
            "plant": {"type": "IntegratorPlant", "gain": 1.0},
            "steps": 10
        }"#;
        assert!(matches!(
            Scenario::from_json_str(s),
            Err(SimError::Controller(pidctl::PidError::InvalidConfiguration { .. }))
        ));
    }

    #[test]
    fn rejects_invalid_scenarios() {
        let cases = [
            r#"{"plant": {"type": "IntegratorPlant", "gain": 1.0}, "steps": 0}"#,
            r#"{"plant": {"type": "FirstOrderPlant", "gain": 1.0, "time_constant": -1.0}, "steps": 5}"#,
            r#"{"plant": {"type": "IntegratorPlant", "gain": 1.0}, "steps": 5,
                "setpoints": [{"at_step": 5, "target": 1.0}]}"#,
            r#"{"plant": {"type": "IntegratorPlant", "gain": 1.0}, "steps": 5, "log_filter": " "}"#,
        ];
        for s in cases {
            assert!(
                matches!(Scenario::from_json_str(s), Err(SimError::InvalidScenario(_))),
                "{s}"
            );
        }
    }

    #[test]
    fn rejects_unknown_plant_type() {
        let s = r#"{"plant": {"type": "Turbine"}, "steps": 5}"#;
        assert!(matches!(Scenario::from_json_str(s), Err(SimError::Parse(_))));
    }
}
