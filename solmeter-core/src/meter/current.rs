//! Current conversion and offset calibration
//!
//! Raw ADC codes are centred on the sensor's zero-current output, averaged,
//! then scaled to amperes through the supply voltage and the sensor's
//! mV/A sensitivity:
//!
//! ```text
//! adjusted = raw - (middle_mv / supply_mv) * full_scale
//! amps     = (mean(adjusted) / full_scale) * supply_mv / mv_per_amp
//! current  = max(0, amps + offset)
//! ```

use crate::config::SensorConfig;

/// Conversion from averaged ADC codes to amperes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CurrentModel {
    /// Code the sensor outputs at zero current
    mid_scale_code: f32,
    /// Amperes per ADC code
    amps_per_code: f32,
}

impl CurrentModel {
    /// Build the conversion for a sensor front-end
    pub fn new(sensor: &SensorConfig) -> Self {
        let full_scale = sensor.adc_full_scale as f32;
        Self {
            mid_scale_code: (sensor.middle_mv / sensor.supply_mv) * full_scale,
            amps_per_code: sensor.supply_mv / full_scale / sensor.mv_per_amp,
        }
    }

    /// Code subtracted from every raw sample
    pub fn mid_scale_code(&self) -> f32 {
        self.mid_scale_code
    }

    /// Mean of `(raw - mid_scale_code)` given the sum of `count` raw codes
    ///
    /// Returns `None` for an empty sample set.
    pub fn adjusted_mean(&self, raw_sum: u32, count: u16) -> Option<f32> {
        if count == 0 {
            return None;
        }
        Some(raw_sum as f32 / count as f32 - self.mid_scale_code)
    }

    /// Convert an adjusted mean to amperes, without any offset
    pub fn amps(&self, adjusted_mean: f32) -> f32 {
        adjusted_mean * self.amps_per_code
    }
}

/// Additive correction that zeroes the no-load reading
///
/// Lives for the process lifetime; only [`Calibration::zero_at`] changes it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    offset_a: f32,
}

impl Calibration {
    /// Current offset in amperes
    pub fn offset(&self) -> f32 {
        self.offset_a
    }

    /// Define `raw_amps` as the zero point
    ///
    /// Must be taken with no panel current flowing.
    pub fn zero_at(&mut self, raw_amps: f32) {
        self.offset_a = -raw_amps;
    }

    /// Apply the offset and clamp to the physically meaningful range
    ///
    /// Negative results are treated as zero; NaN also reads as zero.
    pub fn apply(&self, raw_amps: f32) -> f32 {
        let amps = raw_amps + self.offset_a;
        if amps > 0.0 {
            amps
        } else {
            0.0
        }
    }
}
