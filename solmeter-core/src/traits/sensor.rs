//! Sensor traits

use crate::error::SensorError;

/// Hall-effect panel current sensor with a software zero offset
pub trait CurrentSensor {
    /// Averaged, offset-corrected current in amps
    ///
    /// Never negative.
    async fn read_current(&mut self) -> Result<f32, SensorError>;

    /// Take a zero-current reference and store its negation as the offset
    ///
    /// Must only be called with no current flowing through the sensor. A
    /// failed calibration keeps the previous offset.
    async fn calibrate(&mut self) -> Result<(), SensorError>;

    /// Offset currently applied to readings (amps)
    fn offset(&self) -> f32;
}

/// Combined temperature/humidity sensor
///
/// Values from the last successful measurement stay available after a
/// failed one.
pub trait EnvironmentSensor {
    /// Run one measurement cycle
    async fn measure(&mut self) -> Result<(), SensorError>;

    /// Last measured temperature (°C)
    fn temperature(&self) -> f32;

    /// Last measured relative humidity (%)
    fn humidity(&self) -> f32;
}
