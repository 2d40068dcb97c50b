//! Irradiance estimate from short-circuit current
//!
//! A solar cell's short-circuit current is close to linear in incident
//! irradiance, so the panel's STC rating gives the scale:
//! `irradiance = current / isc_stc * irradiance_stc`.

use crate::config::PanelConfig;

/// Currents below this are noise or a disconnected panel (A)
pub const NOISE_FLOOR_A: f32 = 1e-4;

/// Reference panel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Panel {
    short_circuit_current_a: f32,
    irradiance_stc: f32,
}

impl Panel {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            short_circuit_current_a: config.short_circuit_current_a,
            irradiance_stc: config.irradiance_stc,
        }
    }

    /// Irradiance in W/m² for a measured current in A
    pub fn irradiance(&self, current_a: f32) -> f32 {
        if current_a < NOISE_FLOOR_A {
            return 0.0;
        }
        (current_a / self.short_circuit_current_a) * self.irradiance_stc
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::new(&PanelConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_below_noise_floor() {
        let panel = Panel::default();
        assert_eq!(panel.irradiance(0.0), 0.0);
        assert_eq!(panel.irradiance(0.99e-4), 0.0);
    }

    #[test]
    fn test_short_circuit_current_gives_stc() {
        let panel = Panel::default();
        assert_eq!(panel.irradiance(0.300), 1000.0);
    }

    #[test]
    fn test_half_current() {
        let panel = Panel::default();
        assert!((panel.irradiance(0.150) - 500.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_strictly_increasing(a in 1e-4f32..1.0, delta in 1e-4f32..1.0) {
            let panel = Panel::default();
            prop_assert!(panel.irradiance(a + delta) > panel.irradiance(a));
        }

        #[test]
        fn prop_linear(a in 1e-3f32..1.0) {
            let panel = Panel::default();
            let ratio = panel.irradiance(a) / a;
            prop_assert!((ratio - 1000.0 / 0.300).abs() < 1.0);
        }
    }
}
