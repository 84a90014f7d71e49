use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

use crate::domain::ports::VendorSession;

/// Largest RTP datagram we expect from the intercom transcoder
const MAX_DATAGRAM: usize = 2048;

/// Relays locally received SRTP datagrams into a vendor call
pub struct AudioRelay {
    task: JoinHandle<()>,
    forwarded: Arc<AtomicU64>,
    local_port: u16,
}

impl AudioRelay {
    pub fn start(socket: UdpSocket, session: Arc<dyn VendorSession>, destination: SocketAddr) -> Self {
        let local_port = socket.local_addr().map(|a| a.port()).unwrap_or_default();
        let forwarded = Arc::new(AtomicU64::new(0));
        let task = tokio::spawn(relay_loop(socket, session, destination, forwarded.clone()));

        Self {
            task,
            forwarded,
            local_port,
        }
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    pub fn forwarded(&self) -> u64 {
        self.forwarded.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }

    pub fn close(&self) {
        self.task.abort();
    }
}

impl Drop for AudioRelay {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn relay_loop(
    socket: UdpSocket,
    session: Arc<dyn VendorSession>,
    destination: SocketAddr,
    forwarded: Arc<AtomicU64>,
) {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    let mut speaker_active = false;

    loop {
        let len = match socket.recv(&mut buf).await {
            Ok(len) => len,
            Err(e) => {
                tracing::warn!(error = %e, "Intercom relay socket failed");
                break;
            }
        };

        if !speaker_active {
            speaker_active = true;
            let session = session.clone();
            tokio::spawn(async move {
                if let Err(e) = session.activate_speaker().await {
                    tracing::warn!(session_id = %session.id(), error = %e, "Camera speaker activation failed");
                }
            });
        }

        if let Err(e) = session.send_audio(&buf[..len], destination).await {
            tracing::warn!(%destination, error = %e, "Failed to forward intercom audio");
            continue;
        }
        forwarded.fetch_add(1, Ordering::Relaxed);
    }
}
