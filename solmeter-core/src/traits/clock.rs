//! Monotonic time source

/// Milliseconds since boot
///
/// Only differences between readings are meaningful.
pub trait Clock {
    fn now_ms(&self) -> u64;
}
