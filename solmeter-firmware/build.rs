//! Build script for solmeter-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates meter.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys accepted in each section of meter.toml
const SECTIONS: &[(&str, &[&str])] = &[
    (
        "sensor",
        &[
            "mv_per_amp",
            "middle_mv",
            "supply_mv",
            "adc_full_scale",
            "sample_count",
            "sample_interval_ms",
        ],
    ),
    ("panel", &["short_circuit_current_a", "irradiance_stc"]),
    (
        "schedule",
        &[
            "metrics_period_ms",
            "environment_period_ms",
            "loop_pacing_ms",
            "error_backoff_ms",
            "splash_ms",
        ],
    ),
    (
        "network",
        &["ssid", "passphrase", "port", "channel", "address", "prefix_len"],
    ),
    ("display", &["i2c_address", "columns"]),
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

/// Validate meter.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=meter.toml");

    let config_path = Path::new("meter.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read meter.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in meter.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    validate_keys(&config, &mut errors);
    validate_network(&config, &mut errors);
    validate_positive(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in meter.toml", &errors);
    }

    println!("cargo:warning=meter.toml validated successfully");
}

/// Only known sections and keys; nested tables are not supported
fn validate_keys(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        errors.push("top level must be a table".into());
        return;
    };

    for (name, section) in root {
        let Some(known) = SECTIONS.iter().find(|(s, _)| *s == name.as_str()).map(|(_, keys)| keys) else {
            errors.push(format!("unknown section [{}]", name));
            continue;
        };
        let Some(table) = section.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for (key, value) in table {
            if !known.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
            if value.is_table() || value.is_array() {
                errors.push(format!("[{}] {} must be a plain value", name, key));
            }
        }
    }
}

fn validate_network(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(network) = config.get("network") else {
        return;
    };

    if let Some(ssid) = network.get("ssid") {
        match ssid.as_str() {
            Some(s) if s.is_empty() || s.len() > 32 => {
                errors.push("[network] ssid must be 1-32 characters".into())
            }
            Some(_) => {}
            None => errors.push("[network] ssid must be a string".into()),
        }
    }

    if let Some(passphrase) = network.get("passphrase") {
        match passphrase.as_str() {
            Some(p) if p.len() < 8 || p.len() > 63 => {
                errors.push("[network] passphrase must be 8-63 characters".into())
            }
            Some(_) => {}
            None => errors.push("[network] passphrase must be a string".into()),
        }
    }

    if let Some(address) = network.get("address") {
        let valid = address
            .as_str()
            .map(|a| a.parse::<std::net::Ipv4Addr>().is_ok())
            .unwrap_or(false);
        if !valid {
            errors.push("[network] address must be a dotted IPv4 string".into());
        }
    }

    if let Some(prefix) = network.get("prefix_len").and_then(|p| p.as_integer()) {
        if !(1..=32).contains(&prefix) {
            errors.push("[network] prefix_len must be 1-32".into());
        }
    }

    if let Some(channel) = network.get("channel").and_then(|c| c.as_integer()) {
        if !(1..=13).contains(&channel) {
            errors.push("[network] channel must be 1-13".into());
        }
    }
}

/// Values the firmware divides by or waits on must be positive
fn validate_positive(config: &toml::Value, errors: &mut Vec<String>) {
    let checks = [
        ("sensor", "mv_per_amp"),
        ("sensor", "supply_mv"),
        ("sensor", "adc_full_scale"),
        ("sensor", "sample_count"),
        ("panel", "short_circuit_current_a"),
        ("panel", "irradiance_stc"),
        ("schedule", "metrics_period_ms"),
        ("schedule", "environment_period_ms"),
        ("schedule", "loop_pacing_ms"),
    ];

    for (section, key) in checks {
        let Some(value) = config.get(section).and_then(|s| s.get(key)) else {
            continue;
        };
        let positive = match value {
            toml::Value::Integer(v) => *v > 0,
            toml::Value::Float(v) => *v > 0.0,
            _ => false,
        };
        if !positive {
            errors.push(format!("[{}] {} must be a positive number", section, key));
        }
    }
}

fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| {
                let line = if line.chars().count() > 62 {
                    format!("{}...", line.chars().take(59).collect::<String>())
                } else {
                    line.clone()
                };
                format!("║  • {:<62}║", line)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}
