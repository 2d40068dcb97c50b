//! Configuration type definitions
//!
//! These types collect every tunable constant of the station. The firmware
//! embeds a `meter.toml` file and parses it with [`super::parse_config`];
//! any field left out keeps the value from `Default`.

use heapless::String;

/// Maximum SSID length (802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length
pub const MAX_PASSPHRASE_LEN: usize = 63;

/// Minimum WPA2 passphrase length
pub const MIN_PASSPHRASE_LEN: usize = 8;

/// Current sensor and ADC front-end
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    /// Sensor sensitivity (mV per A)
    pub mv_per_amp: f32,
    /// Sensor output at zero current (mV)
    pub middle_mv: f32,
    /// Sensor supply voltage (mV)
    pub supply_mv: f32,
    /// Largest ADC code
    pub adc_full_scale: u16,
    /// Samples averaged per reading
    pub sample_count: u16,
    /// Pause between two samples (ms)
    pub sample_interval_ms: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            mv_per_amp: 1000.0, // WCS2702, 2 A range
            middle_mv: 2500.0,
            supply_mv: 5000.0,
            adc_full_scale: 4095,
            sample_count: 1000,
            sample_interval_ms: 1,
        }
    }
}

/// Reference panel ratings at Standard Test Conditions
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelConfig {
    /// Short-circuit current at STC (A)
    pub short_circuit_current_a: f32,
    /// Irradiance at STC (W/m²)
    pub irradiance_stc: f32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            short_circuit_current_a: 0.300,
            irradiance_stc: 1000.0,
        }
    }
}

/// Loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScheduleConfig {
    /// Period of the current/irradiance/display update (ms)
    pub metrics_period_ms: u32,
    /// Period of the temperature/humidity measurement (ms)
    pub environment_period_ms: u32,
    /// Pause at the end of every loop iteration (ms)
    pub loop_pacing_ms: u32,
    /// Pause after a failed loop iteration (ms)
    pub error_backoff_ms: u32,
    /// How long boot and calibration messages stay on screen (ms)
    pub splash_ms: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            metrics_period_ms: 1000,
            environment_period_ms: 2000,
            loop_pacing_ms: 10,
            error_backoff_ms: 1000,
            splash_ms: 1000,
        }
    }
}

/// Wi-Fi access point and HTTP listener
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkConfig {
    /// Access point SSID
    pub ssid: String<MAX_SSID_LEN>,
    /// WPA2 passphrase
    pub passphrase: String<MAX_PASSPHRASE_LEN>,
    /// HTTP listening port
    pub port: u16,
    /// 2.4 GHz channel
    pub channel: u8,
    /// Station address on the AP subnet
    pub address: [u8; 4],
    /// Subnet prefix length
    pub prefix_len: u8,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ssid: truncated("SolarMeter"),
            passphrase: truncated("12345678"),
            port: 80,
            channel: 6,
            address: [192, 168, 4, 1],
            prefix_len: 24,
        }
    }
}

/// Character LCD
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// 7-bit address of the I2C backpack
    pub i2c_address: u8,
    /// Characters per line
    pub columns: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            i2c_address: 0x27,
            columns: 16,
        }
    }
}

/// Complete station configuration
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeterConfig {
    pub sensor: SensorConfig,
    pub panel: PanelConfig,
    pub schedule: ScheduleConfig,
    pub network: NetworkConfig,
    pub display: DisplayConfig,
}

/// Semantic configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `sample_count` is zero
    NoSamples,
    /// Sensitivity or supply voltage is not positive
    InvalidSensor,
    /// Short-circuit current or STC irradiance is not positive
    InvalidPanel,
    /// A schedule period is zero
    InvalidPeriod,
    /// SSID is empty
    EmptySsid,
    /// Passphrase is outside the WPA2 length range
    InvalidPassphrase,
    /// Display width is zero
    InvalidDisplay,
}

impl MeterConfig {
    /// Check values that parse fine but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sensor = &self.sensor;
        if sensor.sample_count == 0 {
            return Err(ConfigError::NoSamples);
        }
        if !(sensor.mv_per_amp > 0.0) || !(sensor.supply_mv > 0.0) || sensor.adc_full_scale == 0
        {
            return Err(ConfigError::InvalidSensor);
        }

        if !(self.panel.short_circuit_current_a > 0.0) || !(self.panel.irradiance_stc > 0.0) {
            return Err(ConfigError::InvalidPanel);
        }

        let schedule = &self.schedule;
        if schedule.metrics_period_ms == 0
            || schedule.environment_period_ms == 0
            || schedule.loop_pacing_ms == 0
        {
            return Err(ConfigError::InvalidPeriod);
        }

        if self.network.ssid.is_empty() {
            return Err(ConfigError::EmptySsid);
        }
        if self.network.passphrase.len() < MIN_PASSPHRASE_LEN {
            return Err(ConfigError::InvalidPassphrase);
        }

        if self.display.columns == 0 {
            return Err(ConfigError::InvalidDisplay);
        }

        Ok(())
    }
}

/// Copy as much of `text` as fits
pub(crate) fn truncated<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
