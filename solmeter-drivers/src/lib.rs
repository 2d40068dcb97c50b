//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in solmeter-core, built on the capabilities of solmeter-hal and
//! embedded-hal:
//!
//! - Character LCD (HD44780 behind a PCF8574 I2C backpack)
//! - Current sampler (Hall-effect sensor on an ADC channel)
//! - Environment reader (temperature/humidity with stale-value retention)
//! - HTTP snapshot publisher (single-connection stream listener)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![allow(async_fn_in_trait)]

#[macro_use]
mod fmt;

pub mod lcd;
pub mod net;
pub mod sensor;
