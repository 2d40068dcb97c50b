//! HTTP snapshot publisher
//!
//! Serves the latest snapshot over a [`StreamListener`]. Each service pass
//! handles at most one connection: accept, read the request once, answer,
//! close. A pass never waits for a client to show up.

use solmeter_core::error::TransportError;
use solmeter_core::http::{
    render_snapshot_json, response_head, Route, INDEX_HTML, MAX_REQUEST_SIZE,
};
use solmeter_core::reading::Snapshot;
use solmeter_core::traits::{ServiceOutcome, SnapshotPublisher};
use solmeter_hal::StreamListener;


/// Whether a connection is currently being answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublisherState {
    /// Listening, no connection held
    Idle,
    /// A connection was accepted and is being answered
    Serving,
}

/// Single-connection HTTP server for the latest snapshot
pub struct HttpPublisher<L> {
    listener: L,
    state: PublisherState,
    snapshot: Option<Snapshot>,
    request: [u8; MAX_REQUEST_SIZE],
}

impl<L: StreamListener> HttpPublisher<L> {
    /// Nothing is published until the first [`broadcast`](SnapshotPublisher::broadcast)
    pub fn new(listener: L) -> Self {
        Self {
            listener,
            state: PublisherState::Idle,
            snapshot: None,
            request: [0; MAX_REQUEST_SIZE],
        }
    }

    pub fn state(&self) -> PublisherState {
        self.state
    }

    /// The snapshot requests are currently answered with
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    async fn respond(&mut self) -> Result<ServiceOutcome, TransportError> {
        let len = self
            .listener
            .read(&mut self.request)
            .await
            .map_err(|_| TransportError::Read)?;
        // An empty request is answered with the page like any other
        let route = Route::classify(&self.request[..len]);
        match route {
            Route::Data => {
                let body = render_snapshot_json(self.snapshot.as_ref());
                self.send(route, body.as_bytes()).await?;
            }
            Route::Page => self.send(route, INDEX_HTML.as_bytes()).await?,
        }
        Ok(ServiceOutcome::Served(route))
    }

    async fn send(&mut self, route: Route, body: &[u8]) -> Result<(), TransportError> {
        let head = response_head(route, body.len());
        self.listener
            .write_all(head.as_bytes())
            .await
            .map_err(|_| TransportError::Write)?;
        self.listener
            .write_all(body)
            .await
            .map_err(|_| TransportError::Write)?;
        self.listener
            .flush()
            .await
            .map_err(|_| TransportError::Write)
    }
}

impl<L: StreamListener> SnapshotPublisher for HttpPublisher<L> {
    fn broadcast(&mut self, snapshot: Snapshot) {
        self.snapshot = Some(snapshot);
    }

    async fn service(&mut self) -> Result<ServiceOutcome, TransportError> {
        let accepted = self
            .listener
            .poll_accept()
            .await
            .map_err(|_| TransportError::Accept)?;
        if !accepted {
            return Ok(ServiceOutcome::Idle);
        }

        debug!("client connected");
        self.state = PublisherState::Serving;
        let result = self.respond().await;
        self.listener.close().await;
        self.state = PublisherState::Idle;
        result
    }
}
