//! Network listener abstraction
//!
//! Models a single listening stream socket as exposed by small embedded
//! TCP stacks: the socket is either listening or holds one accepted
//! connection, which is read and written through `embedded-io-async`.

use embedded_io_async::{Read, Write};

/// Listening stream socket that never waits for a client
pub trait StreamListener: Read + Write {
    /// Check for a pending inbound connection without blocking
    ///
    /// Returns `Ok(true)` when a connection was accepted; it is then the
    /// target of subsequent reads and writes until [`close`] is called.
    /// Returns `Ok(false)` when no client is waiting.
    ///
    /// [`close`]: StreamListener::close
    async fn poll_accept(&mut self) -> Result<bool, Self::Error>;

    /// Close the accepted connection and go back to listening
    async fn close(&mut self);
}
