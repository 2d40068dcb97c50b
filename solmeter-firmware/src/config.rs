//! Station configuration
//!
//! `meter.toml` is compiled into the firmware and read at boot. The build
//! script has already checked it with a full TOML parser; this reads the
//! same file with the `no_std` subset parser from solmeter-core.

use defmt::*;

use solmeter_core::config::{parse_config, MeterConfig};

/// Embedded configuration (compiled into firmware)
/// Edit meter.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../meter.toml");

/// Parse and validate the embedded configuration
///
/// Falls back to the built-in defaults if either step fails.
pub fn load() -> MeterConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse embedded config: {}", e);
            error!("Using default configuration");
            return MeterConfig::default();
        }
    };

    if let Err(e) = config.validate() {
        error!("Embedded config rejected: {}", e);
        error!("Using default configuration");
        return MeterConfig::default();
    }

    info!(
        "Config: {} samples/reading, Isc={} A, metrics every {} ms",
        config.sensor.sample_count,
        config.panel.short_circuit_current_a,
        config.schedule.metrics_period_ms
    );
    config
}
