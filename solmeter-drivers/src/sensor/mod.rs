//! Sensor drivers

pub mod current;
pub mod environment;

pub use current::CurrentSampler;
pub use environment::EnvironmentReader;
