//! Temperature/humidity sensor abstraction
//!
//! Covers single-wire sensors like the DHT22/AM2302 whose protocol decode
//! lives in a third-party driver.

/// One complete temperature/humidity measurement
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Ambient temperature in °C
    pub temperature_c: f32,
    /// Relative humidity in %
    pub humidity_pct: f32,
}

/// Temperature/humidity sensor
///
/// A measurement either succeeds with both values or fails as a whole;
/// implementations never return half-decoded data.
pub trait Hygrometer {
    /// Error type for a failed measurement cycle
    type Error;

    /// Trigger one measurement cycle and return its result
    async fn measure(&mut self) -> Result<Measurement, Self::Error>;
}
