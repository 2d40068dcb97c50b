//! Measurement snapshots
//!
//! A [`Reading`] is produced once per metrics tick and discarded after it
//! has been shown and published. Only the latest one is ever observable.

use crate::meter::NOISE_FLOOR_A;

/// One complete measurement
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Panel current (A), never negative
    pub current_a: f32,
    /// Estimated irradiance (W/m²)
    pub irradiance_w_m2: f32,
    /// Ambient temperature (°C)
    pub temperature_c: f32,
    /// Relative humidity (%)
    pub humidity_pct: f32,
}

impl Reading {
    /// Current in milliamps
    pub fn current_ma(&self) -> f32 {
        self.current_a * 1000.0
    }

    /// True when no meaningful panel current is flowing
    pub fn is_below_noise_floor(&self) -> bool {
        self.current_a < NOISE_FLOOR_A
    }
}

/// What network clients see: the reading in wire units
///
/// Overwritten wholesale on every publish.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    /// Panel current (mA)
    pub current_ma: f32,
    /// Irradiance (W/m²)
    pub irradiance: f32,
    /// Temperature (°C)
    pub temperature: f32,
    /// Relative humidity (%)
    pub humidity: f32,
}

impl From<&Reading> for Snapshot {
    fn from(reading: &Reading) -> Self {
        Self {
            current_ma: reading.current_ma(),
            irradiance: reading.irradiance_w_m2,
            temperature: reading.temperature_c,
            humidity: reading.humidity_pct,
        }
    }
}
