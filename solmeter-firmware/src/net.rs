//! Wi-Fi access point plumbing
//!
//! Runner tasks for the CYW43439 radio and the embassy-net stack, the
//! static address configuration of the AP, and [`ApListener`], the one
//! TCP socket the HTTP publisher answers on.

use cyw43_pio::PioSpi;
use defmt::*;
use embassy_net::tcp::{State, TcpSocket};
use embassy_net::{Ipv4Address, Ipv4Cidr, StaticConfigV4};
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_time::{with_timeout, Duration};
use embedded_io_async::{ErrorType, Read, Write};

use solmeter_core::config::NetworkConfig;
use solmeter_hal::StreamListener;

/// How long one service pass waits for a client to show up
const ACCEPT_POLL: Duration = Duration::from_millis(1);

/// Read timeout once a client is connected
const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Socket-level inactivity timeout
const SOCKET_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound for draining queued data on close
const CLOSE_TIMEOUT: Duration = Duration::from_millis(100);

/// Radio runner, must be spawned before the radio is used
#[embassy_executor::task]
pub async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

/// Network stack runner
#[embassy_executor::task]
pub async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Fixed address of the access point; there is no gateway and no DNS
pub fn static_config(network: &NetworkConfig) -> embassy_net::Config {
    let [a, b, c, d] = network.address;
    embassy_net::Config::ipv4_static(StaticConfigV4 {
        address: Ipv4Cidr::new(Ipv4Address::new(a, b, c, d), network.prefix_len),
        gateway: None,
        dns_servers: heapless::Vec::new(),
    })
}

/// Failures of the AP socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum NetError {
    /// The socket could not start listening
    Accept,
    /// The client sent nothing in time
    Timeout,
    /// The connection was reset
    Connection,
}

impl embedded_io::Error for NetError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            NetError::Accept => embedded_io::ErrorKind::AddrNotAvailable,
            NetError::Timeout => embedded_io::ErrorKind::TimedOut,
            NetError::Connection => embedded_io::ErrorKind::ConnectionReset,
        }
    }
}

/// Single TCP socket listening on the publisher port
pub struct ApListener {
    socket: TcpSocket<'static>,
    port: u16,
}

impl ApListener {
    pub fn new(mut socket: TcpSocket<'static>, port: u16) -> Self {
        socket.set_timeout(Some(SOCKET_TIMEOUT));
        Self { socket, port }
    }
}

impl ErrorType for ApListener {
    type Error = NetError;
}

impl Read for ApListener {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, NetError> {
        match with_timeout(READ_TIMEOUT, self.socket.read(buf)).await {
            Ok(Ok(len)) => Ok(len),
            Ok(Err(_)) => Err(NetError::Connection),
            Err(_) => Err(NetError::Timeout),
        }
    }
}

impl Write for ApListener {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, NetError> {
        self.socket
            .write(buf)
            .await
            .map_err(|_| NetError::Connection)
    }

    async fn flush(&mut self) -> Result<(), NetError> {
        self.socket.flush().await.map_err(|_| NetError::Connection)
    }
}

impl StreamListener for ApListener {
    async fn poll_accept(&mut self) -> Result<bool, NetError> {
        match self.socket.state() {
            State::Established => Ok(true),
            State::Closed | State::Listen => {
                // Re-listening on an already listening socket is a no-op,
                // so an expired poll leaves the socket listening
                match with_timeout(ACCEPT_POLL, self.socket.accept(self.port)).await {
                    Ok(Ok(())) => {
                        if let Some(remote) = self.socket.remote_endpoint() {
                            debug!("connection from {}", remote);
                        }
                        Ok(true)
                    }
                    Ok(Err(_)) => Err(NetError::Accept),
                    Err(_) => Ok(false),
                }
            }
            // Handshake in progress, or a previous connection still closing
            _ => Ok(false),
        }
    }

    async fn close(&mut self) {
        self.socket.close();
        let _ = with_timeout(CLOSE_TIMEOUT, self.socket.flush()).await;
        self.socket.abort();
        let _ = with_timeout(CLOSE_TIMEOUT, self.socket.flush()).await;
    }
}
