//! Hall-effect current sampler
//!
//! Averages a burst of ADC conversions and converts the mean to amperes.
//! One burst is `sample_count` conversions spaced `sample_interval_ms`
//! apart, so a reading at the defaults blocks for about a second.

use embedded_hal_async::delay::DelayNs;
use solmeter_core::config::SensorConfig;
use solmeter_core::error::SensorError;
use solmeter_core::meter::{Calibration, CurrentModel};
use solmeter_core::traits::CurrentSensor;
use solmeter_hal::AdcReader;


/// Current sensor on one ADC channel
pub struct CurrentSampler<A, D> {
    adc: A,
    delay: D,
    model: CurrentModel,
    calibration: Calibration,
    sample_count: u16,
    sample_interval_ms: u32,
}

impl<A, D> CurrentSampler<A, D>
where
    A: AdcReader,
    D: DelayNs,
{
    /// Create a sampler with a zero offset
    pub fn new(adc: A, delay: D, config: &SensorConfig) -> Self {
        Self {
            adc,
            delay,
            model: CurrentModel::new(config),
            calibration: Calibration::default(),
            sample_count: config.sample_count,
            sample_interval_ms: config.sample_interval_ms,
        }
    }

    /// Mean of `(raw - mid_scale_code)` over one burst
    ///
    /// The first failed conversion aborts the burst.
    pub async fn read_raw_mean(&mut self) -> Result<f32, SensorError> {
        if self.sample_count == 0 {
            return Err(SensorError::NoSamples);
        }

        let mut sum: u32 = 0;
        for _ in 0..self.sample_count {
            let code = self.adc.read().await.map_err(|_| {
                debug!("adc conversion failed");
                SensorError::Adc
            })?;
            sum += code as u32;
            self.delay.delay_ms(self.sample_interval_ms).await;
        }

        self.model
            .adjusted_mean(sum, self.sample_count)
            .ok_or(SensorError::NoSamples)
    }

    /// One burst converted to amperes, before the offset
    pub async fn read_raw_amps(&mut self) -> Result<f32, SensorError> {
        let mean = self.read_raw_mean().await?;
        Ok(self.model.amps(mean))
    }
}

impl<A, D> CurrentSensor for CurrentSampler<A, D>
where
    A: AdcReader,
    D: DelayNs,
{
    async fn read_current(&mut self) -> Result<f32, SensorError> {
        let raw = self.read_raw_amps().await?;
        Ok(self.calibration.apply(raw))
    }

    async fn calibrate(&mut self) -> Result<(), SensorError> {
        let raw = self.read_raw_amps().await?;
        self.calibration.zero_at(raw);
        debug!("zeroed at {} A raw", raw);
        Ok(())
    }

    fn offset(&self) -> f32 {
        self.calibration.offset()
    }
}

/// Replays a fixed sequence of codes, repeating the last one
#[cfg(test)]
pub struct ScriptedAdc {
    pub codes: Vec<u16>,
    pub reads: usize,
    pub fail_at: Option<usize>,
}

#[cfg(test)]
impl ScriptedAdc {
    pub fn constant(code: u16) -> Self {
        Self {
            codes: vec![code],
            reads: 0,
            fail_at: None,
        }
    }
}

#[cfg(test)]
impl AdcReader for ScriptedAdc {
    type Error = ();

    async fn read(&mut self) -> Result<u16, ()> {
        let index = self.reads;
        self.reads += 1;
        if self.fail_at == Some(index) {
            return Err(());
        }
        let code = self.codes.get(index).or(self.codes.last()).copied();
        code.ok_or(())
    }
}
