//! A heater warming a thermal mass, with a setpoint step partway through.
//!
//! Demonstrated here:
//!   * Loading a scenario from JSON
//!   * Logging to the terminal and to a file
//!   * Running the loop and writing the trace to CSV

use std::path::PathBuf;

use pidctl_sim::{Runner, Scenario, logging, trace};

const SCENARIO: &str = r#"{
    "name": "temperature_example",
    "controller": {
        "gain_p": 8.0,
        "gain_i": 0.4,
        "gain_d": 0.0,
        "sample_interval": 0.5,
        "output_min": 0.0,
        "output_max": 100.0,
        "deadband": 0.25
    },
    "plant": { "type": "FirstOrderPlant", "gain": 2.0, "time_constant": 40.0 },
    "initial_value": 20.0,
    "setpoints": [
        { "at_step": 0, "target": 80.0 },
        { "at_step": 1200, "target": 120.0 }
    ],
    "steps": 2400
}"#;

fn main() {
    let scenario = Scenario::from_json_str(SCENARIO).unwrap();
    // std::fs::write("./temperature_example.json", scenario.to_json_string().unwrap()).unwrap();

    let op_dir: PathBuf = "./software/pidctl_sim/examples".into();
    let log = logging::init_logging(&op_dir, &scenario, true).unwrap();
    println!("Logging to {:?}", log.log_path());

    let trace_path = op_dir.join(format!("{}.csv", scenario.name));
    let (mut runner, steps) = Runner::from_scenario(scenario).unwrap();
    let samples = runner.run(steps).unwrap();
    trace::write_csv(&trace_path, &samples).unwrap();

    let last = samples.last().unwrap();
    println!(
        "t = {:.1}s: target {:.2}, measured {:.2}, output {:.2}; trace in {trace_path:?}",
        last.time, last.target, last.measurement, last.output
    );
}
