//! Temperature/humidity reader
//!
//! Wraps a [`Hygrometer`] and keeps the last good measurement, so a failed
//! cycle leaves the previously reported values in place.

use solmeter_core::error::SensorError;
use solmeter_core::traits::EnvironmentSensor;
use solmeter_hal::{Hygrometer, Measurement};


/// Environment sensor with stale-value retention
pub struct EnvironmentReader<H> {
    sensor: H,
    last: Measurement,
}

impl<H: Hygrometer> EnvironmentReader<H> {
    /// Values read as 0 °C / 0 % until the first successful measurement
    pub fn new(sensor: H) -> Self {
        Self {
            sensor,
            last: Measurement {
                temperature_c: 0.0,
                humidity_pct: 0.0,
            },
        }
    }
}

impl<H: Hygrometer> EnvironmentSensor for EnvironmentReader<H> {
    async fn measure(&mut self) -> Result<(), SensorError> {
        let measurement = self
            .sensor
            .measure()
            .await
            .map_err(|_| SensorError::Environment)?;
        debug!("environment: {}", measurement);
        self.last = measurement;
        Ok(())
    }

    fn temperature(&self) -> f32 {
        self.last.temperature_c
    }

    fn humidity(&self) -> f32 {
        self.last.humidity_pct
    }
}
