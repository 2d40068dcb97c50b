//! Component traits
//!
//! These traits define the interface between the acquisition loop and the
//! drivers that talk to real hardware. Host tests substitute fakes.

pub mod clock;
pub mod display;
pub mod publisher;
pub mod sensor;

pub use clock::Clock;
pub use display::CharacterDisplay;
pub use publisher::{ServiceOutcome, SnapshotPublisher};
pub use sensor::{CurrentSensor, EnvironmentSensor};
