//! Character display layout
//!
//! The station uses a two-line character LCD. Every value is written as a
//! separate field with its own cursor position, so no field depends on the
//! controller's auto-increment after a previous write.
//!
//! ```text
//! col 0     6
//!     |     |
//!     25.0C  450.0W/m2      or     NO CURRENT
//!     60.0%   12.3mA
//! ```

use core::fmt::Write;

use heapless::{String, Vec};

use crate::reading::Reading;

/// Widest supported display line
pub const MAX_COLUMNS: usize = 20;

/// Column where the right-hand field of each line starts
pub const RIGHT_FIELD_COL: u8 = 6;

/// Shown while the boot splash is up
pub const SPLASH_TEXT: &str = "SOLAR STATION";

/// Shown while calibration samples are taken
pub const CALIBRATING_TEXT: &str = "INITIALIZING....";

/// Shown once the new offset is stored
pub const CALIBRATED_TEXT: &str = "OFFSET DONE";

/// Replaces the temperature/irradiance line when no current flows
pub const NO_CURRENT_TEXT: &str = "NO CURRENT";

/// Text placed at a cursor position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Display line (0 or 1)
    pub line: u8,
    /// Starting column
    pub col: u8,
    /// Text, padded or cut to exactly the width of its slot
    pub text: String<MAX_COLUMNS>,
}

impl Field {
    fn new(line: u8, col: u8, width: usize, args: core::fmt::Arguments<'_>) -> Self {
        // Large enough for any f32 printed with one decimal
        let mut scratch: String<48> = String::new();
        let _ = scratch.write_fmt(args);

        let width = width.min(MAX_COLUMNS);
        let mut text = String::new();
        for c in scratch.chars().chain(core::iter::repeat(' ')).take(width) {
            let _ = text.push(c);
        }

        Self { line, col, text }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Field {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Field[{},{}: {}]", self.line, self.col, self.text.as_str());
    }
}

/// Fields that show `reading` on a display `columns` characters wide
///
/// Each line is split into a left slot up to [`RIGHT_FIELD_COL`] and a right
/// slot for the rest of the line. Every field fills its slot, so a redraw
/// overwrites whatever the previous one left behind.
pub fn layout_reading(reading: &Reading, columns: u8) -> Vec<Field, 4> {
    let columns = (columns as usize).min(MAX_COLUMNS);
    let left = columns.min(RIGHT_FIELD_COL as usize);
    let right = columns.saturating_sub(RIGHT_FIELD_COL as usize);
    let mut fields = Vec::new();

    if reading.is_below_noise_floor() {
        let _ = fields.push(Field::new(0, 0, columns, format_args!("{}", NO_CURRENT_TEXT)));
    } else {
        let _ = fields.push(Field::new(
            0,
            0,
            left,
            format_args!("{:>4.1}C", reading.temperature_c),
        ));
        let _ = fields.push(Field::new(
            0,
            RIGHT_FIELD_COL,
            right,
            format_args!("{:>6.1}W/m2", reading.irradiance_w_m2),
        ));
    }

    let _ = fields.push(Field::new(
        1,
        0,
        left,
        format_args!("{:>4.1}%", reading.humidity_pct),
    ));
    let _ = fields.push(Field::new(
        1,
        RIGHT_FIELD_COL,
        right,
        format_args!("{:>6.1}mA", reading.current_ma()),
    ));

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(current_a: f32) -> Reading {
        Reading {
            current_a,
            irradiance_w_m2: 450.0,
            temperature_c: 25.0,
            humidity_pct: 60.0,
        }
    }

    #[test]
    fn test_normal_layout() {
        let fields = layout_reading(&reading(0.135), 16);
        assert_eq!(fields.len(), 4);

        assert_eq!((fields[0].line, fields[0].col), (0, 0));
        assert_eq!(fields[0].text.as_str(), "25.0C ");

        assert_eq!((fields[1].line, fields[1].col), (0, 6));
        assert_eq!(fields[1].text.as_str(), " 450.0W/m2");

        assert_eq!((fields[2].line, fields[2].col), (1, 0));
        assert_eq!(fields[2].text.as_str(), "60.0% ");

        assert_eq!((fields[3].line, fields[3].col), (1, 6));
        assert_eq!(fields[3].text.as_str(), " 135.0mA  ");
    }

    #[test]
    fn test_no_current_layout() {
        let fields = layout_reading(&reading(0.0), 16);
        assert_eq!(fields.len(), 3);
        assert_eq!((fields[0].line, fields[0].col), (0, 0));
        assert_eq!(fields[0].text.as_str(), "NO CURRENT      ");
        assert_eq!(fields[0].text.len(), 16);
        // Line 1 is always shown
        assert_eq!(fields[1].text.as_str(), "60.0% ");
        assert_eq!(fields[2].text.as_str(), "   0.0mA  ");
    }

    #[test]
    fn test_single_digit_values_are_right_aligned() {
        let r = Reading {
            current_a: 0.0012,
            irradiance_w_m2: 4.0,
            temperature_c: 5.0,
            humidity_pct: 9.5,
        };
        let fields = layout_reading(&r, 16);
        assert_eq!(fields[0].text.as_str(), " 5.0C ");
        assert_eq!(fields[1].text.as_str(), "   4.0W/m2");
        assert_eq!(fields[2].text.as_str(), " 9.5% ");
        assert_eq!(fields[3].text.as_str(), "   1.2mA  ");
    }

    #[test]
    fn test_oversized_value_is_cut_to_line() {
        let mut r = reading(0.2);
        r.irradiance_w_m2 = 1.0e9;
        let fields = layout_reading(&r, 16);
        assert_eq!(fields[1].text.len(), 10);
        assert!(fields[1].text.as_str().starts_with("1000000000"));
    }

    #[test]
    fn test_wide_left_value_stays_in_its_slot() {
        let mut r = reading(0.2);
        r.temperature_c = -105.5;
        let fields = layout_reading(&r, 16);
        assert_eq!(fields[0].text.as_str(), "-105.5");
    }

    #[test]
    fn test_every_line_is_fully_covered() {
        for current in [0.0, 0.2] {
            let fields = layout_reading(&reading(current), 16);
            for line in 0..2u8 {
                let covered: usize = fields
                    .iter()
                    .filter(|f| f.line == line)
                    .map(|f| f.text.len())
                    .sum();
                assert_eq!(covered, 16);
            }
        }
    }

    #[test]
    fn test_narrow_display() {
        let fields = layout_reading(&reading(0.0), 8);
        assert_eq!(fields[0].text.as_str(), "NO CURRE");
        assert_eq!(fields[1].text.as_str(), "60.0% ");
        // Only two columns left after the right-hand field start
        assert_eq!(fields[2].text.as_str(), "  ");
    }
}
