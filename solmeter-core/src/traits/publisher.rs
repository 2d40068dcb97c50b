//! Snapshot publishing trait

use crate::error::TransportError;
use crate::http::Route;
use crate::reading::Snapshot;

/// Result of one service pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceOutcome {
    /// No client was waiting
    Idle,
    /// One request was answered
    Served(Route),
}

/// Makes the latest snapshot available to network clients
pub trait SnapshotPublisher {
    /// Replace the stored snapshot; later requests see only this one
    fn broadcast(&mut self, snapshot: Snapshot);

    /// Answer at most one pending request, without waiting for one
    async fn service(&mut self) -> Result<ServiceOutcome, TransportError>;
}
