//! Board-agnostic core logic for the irradiance station firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Component traits (display, current sensor, environment, publisher)
//! - Current/irradiance conversion and offset calibration math
//! - Periodic task scheduler and button edge detection
//! - Display layout and HTTP response rendering
//! - The acquisition loop ([`station::Station`])
//! - Configuration types and parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![allow(async_fn_in_trait)]

#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod http;
pub mod meter;
pub mod reading;
pub mod scheduler;
pub mod screen;
pub mod station;
pub mod traits;

pub use error::{LoopError, SensorError, TransportError};
pub use reading::{Reading, Snapshot};
pub use station::{Station, StepReport};
