//! Error taxonomy
//!
//! Nothing here is fatal. Each error is recovered by the component that
//! detects it or, for [`LoopError`], at the acquisition loop boundary.

/// Bus or socket I/O failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Two-wire bus write failed
    Bus,
    /// Accepting an inbound connection failed
    Accept,
    /// Reading from a connection failed
    Read,
    /// Writing to a connection failed
    Write,
}

/// Sensor acquisition failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// ADC conversion failed
    Adc,
    /// Averaging was requested over zero samples
    NoSamples,
    /// Temperature/humidity measurement cycle failed
    Environment,
}

/// Failure escaping one iteration of the acquisition loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopError {
    /// Current sampling failed
    Sensor(SensorError),
    /// Calibration button could not be read
    Input,
}

impl From<SensorError> for LoopError {
    fn from(err: SensorError) -> Self {
        LoopError::Sensor(err)
    }
}
