//! Fixed-step closed loop driving a controller against a plant

use tracing::{debug, info};

use pidctl::Controller;

use crate::SimError;
use crate::plant::Plant;
use crate::scenario::{Scenario, SetpointChange};

/// Longer runs grow the sample buffer as they go
const MAX_PREALLOCATED_SAMPLES: usize = 1 << 16;

/// One row of a simulation trace, recorded after the plant has been
/// measured and the controller updated for that step
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sample {
    pub step: usize,
    pub time: f64,
    pub target: f64,
    pub measurement: f64,
    pub output: f64,
    pub p: f64,
    pub i: f64,
    pub d: f64,
    pub accumulated_error: f64,
}

impl Sample {
    pub const CHANNEL_NAMES: [&'static str; 8] = [
        "time",
        "target",
        "measurement",
        "output",
        "p",
        "i",
        "d",
        "accumulated_error",
    ];

    /// Channel values in the order of [`Sample::CHANNEL_NAMES`]
    pub fn channel_values(&self) -> [f64; 8] {
        [
            self.time,
            self.target,
            self.measurement,
            self.output,
            self.p,
            self.i,
            self.d,
            self.accumulated_error,
        ]
    }
}

/// Owns the sampling clock: at each step it applies any scheduled setpoint change,
/// feeds the plant's value to the controller, and holds the controller output
/// on the plant for one sample interval.
#[derive(Debug)]
pub struct Runner {
    controller: Controller,
    plant: Box<dyn Plant>,

    /// Sorted by step, consumed from `next_change`
    schedule: Vec<SetpointChange>,
    next_change: usize,

    step: usize,
}

impl Runner {
    pub fn new(controller: Controller, plant: Box<dyn Plant>) -> Self {
        Self {
            controller,
            plant,
            schedule: Vec::new(),
            next_change: 0,
            step: 0,
        }
    }

    /// Replace the setpoint schedule. Changes at steps already run are skipped.
    pub fn with_schedule(mut self, mut schedule: Vec<SetpointChange>) -> Self {
        schedule.sort_by_key(|c| c.at_step);
        self.next_change = schedule.partition_point(|c| c.at_step < self.step);
        self.schedule = schedule;
        self
    }

    /// Build a runner from a validated scenario, returning the step count to run
    pub fn from_scenario(scenario: Scenario) -> Result<(Self, usize), SimError> {
        scenario.validate()?;
        let controller = Controller::from_config(scenario.controller)?;
        let mut plant = scenario.plant;
        plant.reset(scenario.initial_value);

        let runner = Self::new(controller, plant).with_schedule(scenario.setpoints);
        Ok((runner, scenario.steps))
    }

    /// Run `steps` more steps, continuing from where any previous run stopped
    pub fn run(&mut self, steps: usize) -> Result<Vec<Sample>, SimError> {
        let dt = self.controller.config().sample_interval;
        let end = self.step.checked_add(steps).ok_or_else(|| {
            SimError::InvalidScenario(format!(
                "cannot run {steps} more steps after step {}",
                self.step
            ))
        })?;
        info!(
            start = self.step,
            end,
            dt,
            plant = ?self.plant,
            "Starting closed-loop run"
        );

        let mut samples = Vec::with_capacity(steps.min(MAX_PREALLOCATED_SAMPLES));
        while self.step < end {
            self.apply_scheduled_changes()?;

            let measurement = self.plant.value();
            let output = self.controller.update(measurement)?;
            self.plant.step(output, dt);

            let terms = self.controller.terms();
            samples.push(Sample {
                step: self.step,
                time: self.step as f64 * dt,
                target: self.controller.target(),
                measurement,
                output,
                p: terms.p,
                i: terms.i,
                d: terms.d,
                accumulated_error: self.controller.accumulated_error(),
            });

            self.step += 1;
        }

        if let Some(last) = samples.last() {
            info!(
                step = last.step,
                target = last.target,
                measurement = last.measurement,
                output = last.output,
                "Finished closed-loop run"
            );
        }

        Ok(samples)
    }

    fn apply_scheduled_changes(&mut self) -> Result<(), SimError> {
        while let Some(change) = self.schedule.get(self.next_change) {
            if change.at_step > self.step {
                break;
            }
            debug!(step = self.step, setpoint = change.target, "Setpoint change");
            self.controller.set_target(change.target)?;
            self.next_change += 1;
        }
        Ok(())
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Mutable access for manual intervention between runs, such as a reset
    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    pub fn plant(&self) -> &dyn Plant {
        self.plant.as_ref()
    }
}
