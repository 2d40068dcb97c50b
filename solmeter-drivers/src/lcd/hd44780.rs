//! HD44780 character LCD behind a PCF8574 I2C backpack
//!
//! The backpack exposes the controller's pins as one I2C output byte:
//!
//! ```text
//! bit  7  6  5  4   3    2   1   0
//!     D7 D6 D5 D4  BL   EN  RW  RS
//! ```
//!
//! The controller runs in 4-bit mode. Each byte is sent as two nibbles,
//! high first, and each nibble is latched by the same three-step enable
//! strobe ([`STROBE`]). Commands and data differ only in the RS bit.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use solmeter_core::error::TransportError;
use solmeter_core::traits::CharacterDisplay;


/// Backlight always on
const BACKLIGHT: u8 = 0x08;

/// Enable (latch) line
const ENABLE: u8 = 0x04;

/// Register select: set for character data, clear for commands
const REGISTER_SELECT: u8 = 0x01;

/// One phase of the enable strobe
#[derive(Debug, Clone, Copy)]
struct StrobeStep {
    enable: bool,
    hold_us: u32,
}

/// Write the nibble with EN low, pulse EN high, drop it again
const STROBE: [StrobeStep; 3] = [
    StrobeStep {
        enable: false,
        hold_us: 5_000,
    },
    StrobeStep {
        enable: true,
        hold_us: 1_000,
    },
    StrobeStep {
        enable: false,
        hold_us: 1_000,
    },
];

/// Reset to 4-bit mode, 2 lines, display off, clear, entry mode, display on
const INIT_SEQUENCE: [u8; 9] = [0x03, 0x03, 0x03, 0x02, 0x28, 0x08, 0x01, 0x06, 0x0C];

const INIT_SETTLE_MS: u32 = 100;

const CMD_CLEAR: u8 = 0x01;
const CLEAR_SETTLE_US: u32 = 2_000;

/// Set DDRAM address, line 0 / line 1
const LINE_0_ADDRESS: u8 = 0x80;
const LINE_1_ADDRESS: u8 = 0xC0;

const CHAR_SETTLE_US: u32 = 1_000;

/// Shown for characters outside the controller's 8-bit range
const REPLACEMENT_CHAR: u8 = b'?';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Command,
    Data,
}

impl Mode {
    fn bits(self) -> u8 {
        match self {
            Mode::Command => 0,
            Mode::Data => REGISTER_SELECT,
        }
    }
}

/// Keep the first error of a multi-byte operation
fn keep_first(first: &mut Result<(), TransportError>, result: Result<(), TransportError>) {
    if first.is_ok() {
        *first = result;
    }
}

/// HD44780 driver over an async I2C bus
pub struct Hd44780<I, D> {
    i2c: I,
    delay: D,
    address: u8,
}

impl<I, D> Hd44780<I, D>
where
    I: I2c,
    D: DelayNs,
{
    /// Create the driver; call [`init`](Self::init) before use
    pub fn new(i2c: I, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    /// Put the controller into 4-bit, two-line mode and clear it
    ///
    /// Every step of the sequence is sent even if an earlier one failed.
    pub async fn init(&mut self) -> Result<(), TransportError> {
        let mut result = Ok(());
        for command in INIT_SEQUENCE {
            keep_first(&mut result, self.send(command, Mode::Command).await);
            self.delay.delay_ms(INIT_SETTLE_MS).await;
        }
        result
    }

    /// Send one byte as two strobed nibbles
    ///
    /// A bus failure abandons the rest of this byte.
    async fn send(&mut self, byte: u8, mode: Mode) -> Result<(), TransportError> {
        let control = mode.bits() | BACKLIGHT;
        self.strobe((byte & 0xF0) | control).await?;
        self.strobe(((byte & 0x0F) << 4) | control).await?;
        Ok(())
    }

    async fn strobe(&mut self, bits: u8) -> Result<(), TransportError> {
        for step in STROBE {
            let out = if step.enable { bits | ENABLE } else { bits };
            self.i2c.write(self.address, &[out]).await.map_err(|_| {
                debug!("lcd write {=u8:#x} failed", out);
                TransportError::Bus
            })?;
            self.delay.delay_us(step.hold_us).await;
        }
        Ok(())
    }
}

impl<I, D> CharacterDisplay for Hd44780<I, D>
where
    I: I2c,
    D: DelayNs,
{
    async fn clear(&mut self) -> Result<(), TransportError> {
        let result = self.send(CMD_CLEAR, Mode::Command).await;
        self.delay.delay_us(CLEAR_SETTLE_US).await;
        result
    }

    async fn set_cursor(&mut self, line: u8, col: u8) -> Result<(), TransportError> {
        let base = if line == 0 {
            LINE_0_ADDRESS
        } else {
            LINE_1_ADDRESS
        };
        self.send(base.wrapping_add(col), Mode::Command).await
    }

    async fn write(&mut self, text: &str) -> Result<(), TransportError> {
        let mut result = Ok(());
        for c in text.chars() {
            let byte = u8::try_from(c).unwrap_or(REPLACEMENT_CHAR);
            keep_first(&mut result, self.send(byte, Mode::Data).await);
            self.delay.delay_us(CHAR_SETTLE_US).await;
        }
        result
    }
}
