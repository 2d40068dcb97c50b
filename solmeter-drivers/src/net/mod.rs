//! Network publishers

pub mod publisher;

pub use publisher::{HttpPublisher, PublisherState};
