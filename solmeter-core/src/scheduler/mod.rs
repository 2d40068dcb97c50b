//! Cooperative scheduling primitives
//!
//! Time-sliced activities of the acquisition loop and button debouncing.

pub mod button;
pub mod periodic;

pub use button::EdgeDetector;
pub use periodic::PeriodicTask;
