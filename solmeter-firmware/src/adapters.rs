//! RP2040 implementations of the solmeter-hal capabilities

use defmt::*;
use dht_sensor::{dht22, DhtError, DhtReading};
use embassy_rp::adc::{self, Adc, Async, Channel};
use embassy_rp::gpio::OutputOpenDrain;
use embassy_time::{Delay, Instant};

use solmeter_core::traits::Clock;
use solmeter_hal::{AdcReader, Hygrometer, Measurement};

/// One ADC channel of the RP2040's 12-bit converter
pub struct RpAdc {
    adc: Adc<'static, Async>,
    channel: Channel<'static>,
}

impl RpAdc {
    pub fn new(adc: Adc<'static, Async>, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl AdcReader for RpAdc {
    type Error = adc::Error;

    async fn read(&mut self) -> Result<u16, adc::Error> {
        self.adc.read(&mut self.channel).await
    }
}

/// Why a DHT22 cycle failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum DhtFault {
    /// No response or a bit took too long
    Timeout,
    /// Checksum byte did not match the data
    Checksum,
    /// The data pin could not be driven or read
    Pin,
}

/// DHT22 on an open-drain data line
///
/// The single-wire exchange is timed by busy-waiting and takes about 5 ms.
pub struct Dht22Sensor {
    pin: OutputOpenDrain<'static>,
    delay: Delay,
}

impl Dht22Sensor {
    /// `pin` must idle high
    pub fn new(pin: OutputOpenDrain<'static>) -> Self {
        Self { pin, delay: Delay }
    }
}

impl Hygrometer for Dht22Sensor {
    type Error = DhtFault;

    async fn measure(&mut self) -> Result<Measurement, DhtFault> {
        match dht22::Reading::read(&mut self.delay, &mut self.pin) {
            Ok(reading) => Ok(Measurement {
                temperature_c: reading.temperature,
                humidity_pct: reading.relative_humidity,
            }),
            Err(e) => {
                let fault = match e {
                    DhtError::Timeout => DhtFault::Timeout,
                    DhtError::ChecksumMismatch => DhtFault::Checksum,
                    DhtError::PinError(_) => DhtFault::Pin,
                };
                debug!("DHT22 read failed: {}", fault);
                Err(fault)
            }
        }
    }
}

/// Milliseconds since boot from the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
