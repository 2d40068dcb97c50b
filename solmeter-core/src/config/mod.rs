//! Configuration types
//!
//! Board-agnostic configuration structures and the `meter.toml` reader.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
