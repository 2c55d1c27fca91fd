#![doc = include_str!("../README.md")]

mod config;
pub mod controller;
mod error;

pub use config::{DeadbandPolicy, PidConfig};
pub use controller::{Controller, Terms};
pub use error::PidError;
