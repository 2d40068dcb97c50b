//! Measurement math
//!
//! Pure conversions from raw samples to physical quantities. The drivers
//! crate owns the ADC and feeds these.

pub mod current;
pub mod irradiance;

pub use current::{Calibration, CurrentModel};
pub use irradiance::{Panel, NOISE_FLOOR_A};
