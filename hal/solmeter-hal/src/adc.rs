//! Analog input abstraction
//!
//! The current sensor output is wired to a single 12-bit ADC channel.

/// One ADC channel with its attenuation/reference already configured
///
/// Implementations return raw right-aligned codes, `0..=4095` for the
/// 12-bit converters this firmware targets.
pub trait AdcReader {
    /// Error type for conversions
    type Error;

    /// Perform one conversion
    async fn read(&mut self) -> Result<u16, Self::Error>;
}
