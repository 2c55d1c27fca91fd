#![doc = include_str!("../README.md")]

mod error;
pub mod logging;
pub mod plant;
pub mod runner;
pub mod scenario;
pub mod trace;

pub use error::SimError;
pub use plant::{FirstOrderPlant, IntegratorPlant, Plant};
pub use runner::{Runner, Sample};
pub use scenario::{Scenario, SetpointChange};
