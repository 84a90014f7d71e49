use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::time::Instant;

use crate::domain::errors::{DomainError, Result};

const LOOPBACK: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Ephemeral loopback ports; no pooling, each reservation is independent
pub struct PortAllocator;

impl PortAllocator {
    /// Bind a UDP socket on an ephemeral port, ready to receive
    pub async fn reserve_udp_port() -> Result<ReservedUdpPort> {
        let socket = UdpSocket::bind(SocketAddr::from((LOOPBACK, 0)))
            .await
            .map_err(DomainError::PortReservationFailed)?;
        let port = socket
            .local_addr()
            .map_err(DomainError::PortReservationFailed)?
            .port();

        tracing::debug!(port, "Reserved UDP port");
        Ok(ReservedUdpPort { socket, port })
    }

    /// Pick a free TCP port for a process that will listen on it itself
    pub async fn reserve_tcp_port() -> Result<u16> {
        let listener = TcpListener::bind(SocketAddr::from((LOOPBACK, 0)))
            .await
            .map_err(DomainError::PortReservationFailed)?;
        let port = listener
            .local_addr()
            .map_err(DomainError::PortReservationFailed)?
            .port();

        tracing::debug!(port, "Reserved TCP port");
        Ok(port)
    }

    /// Bind a TCP listener that accepts at most one client within `timeout` of opening
    pub async fn open_single_client_listener(timeout: Duration) -> Result<SingleClientListener> {
        let deadline = Instant::now() + timeout;
        let listener = TcpListener::bind(SocketAddr::from((LOOPBACK, 0)))
            .await
            .map_err(DomainError::PortReservationFailed)?;
        let port = listener
            .local_addr()
            .map_err(DomainError::PortReservationFailed)?
            .port();

        Ok(SingleClientListener {
            listener,
            port,
            timeout,
            deadline,
        })
    }
}

#[derive(Debug)]
pub struct ReservedUdpPort {
    socket: UdpSocket,
    port: u16,
}

impl ReservedUdpPort {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn into_socket(self) -> UdpSocket {
        self.socket
    }
}

/// One-shot acceptor used to pass a session description to the transcoder
#[derive(Debug)]
pub struct SingleClientListener {
    listener: TcpListener,
    port: u16,
    timeout: Duration,
    deadline: Instant,
}

impl SingleClientListener {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The listener gives up at this instant, however long setup took before `accept`
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn url(&self) -> String {
        format!("tcp://{}:{}", LOOPBACK, self.port)
    }

    /// First inbound connection or `HandoffTimeout`; the listener is closed either way
    pub async fn accept(self) -> Result<TcpStream> {
        let Self {
            listener,
            port,
            timeout,
            deadline,
        } = self;

        let accepted = tokio::time::timeout_at(deadline, listener.accept()).await;
        drop(listener);

        match accepted {
            Ok(Ok((stream, peer))) => {
                tracing::debug!(port, %peer, "Handoff client connected");
                Ok(stream)
            }
            Ok(Err(e)) => Err(DomainError::Io(e)),
            Err(_) => {
                tracing::warn!(port, ?timeout, "Timed out waiting for handoff client");
                Err(DomainError::HandoffTimeout(timeout))
            }
        }
    }

    /// Accept the single client, write `payload` and close the connection
    pub async fn hand_off(self, payload: &str) -> Result<()> {
        let mut client = self.accept().await?;
        client.write_all(payload.as_bytes()).await?;
        client.shutdown().await?;
        Ok(())
    }
}
