//! Solmeter Hardware Abstraction Layer
//!
//! This crate defines the capabilities the meter consumes from the board:
//! chip-specific code (the Pico W firmware, or fakes in host tests)
//! implements them, the drivers in `solmeter-drivers` build on them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  solmeter-core (Station, traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  solmeter-drivers (LCD, sampler, ...)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  solmeter-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │   firmware    │       │  host fakes   │
//! │   (Pico W)    │       │   (tests)     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`adc::AdcReader`] - One analog channel
//! - [`hygrometer::Hygrometer`] - Temperature/humidity sensor
//! - [`net::StreamListener`] - Non-blocking TCP listener
//!
//! The two-wire bus, the calibration button and delays come straight from
//! `embedded-hal` / `embedded-hal-async`.

#![no_std]
#![deny(unsafe_code)]
#![allow(async_fn_in_trait)]

pub mod adc;
pub mod hygrometer;
pub mod net;

// Re-export key traits at crate root for convenience
pub use adc::AdcReader;
pub use hygrometer::{Hygrometer, Measurement};
pub use net::StreamListener;
