use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::session_state::{CameraSessionState, SessionSlot};
use crate::domain::errors::{DomainError, Result};
use crate::domain::ports::{CallEnded, MetricsReporter, TranscoderLauncher, TranscoderProcess, VendorSession};
use crate::domain::value_objects::{RtpDescription, TranscoderArgs, TranscoderInput};
use crate::infrastructure::network::{AudioRelay, PortAllocator};

/// Two-way audio for the camera's live view call
pub struct IntercomController {
    state: Arc<CameraSessionState>,
}

impl IntercomController {
    pub(crate) fn new(state: Arc<CameraSessionState>) -> Self {
        Self { state }
    }

    /// Feed `source` into the active call's speaker, replacing any intercom already running
    pub async fn start(&self, source: TranscoderInput) -> Result<()> {
        let mut slot = self.state.slot.lock().await;
        let SessionSlot::LiveView(session) = &mut *slot else {
            return Err(DomainError::NoActiveCall);
        };
        if session.vendor.call_ended().has_ended() {
            return Err(DomainError::NoActiveCall);
        }

        if let Some(mut previous) = session.intercom.take() {
            previous.stop().await;
        }

        let forwarder = IntercomForwarder::start(
            session.vendor.clone(),
            &session.description,
            &source,
            self.state.launcher.as_ref(),
            self.state.metrics.clone(),
        )
        .await?;

        tracing::info!(
            camera_id = %self.state.camera_id(),
            session_id = %session.vendor.id(),
            local_port = forwarder.local_port(),
            "Two way audio started"
        );

        session.intercom = Some(forwarder);
        Ok(())
    }

    /// No-op when no intercom is running
    pub async fn stop(&self) {
        let mut slot = self.state.slot.lock().await;
        if let SessionSlot::LiveView(session) = &mut *slot {
            if let Some(mut forwarder) = session.intercom.take() {
                forwarder.stop().await;
            }
        }
    }

    pub async fn is_active(&self) -> bool {
        match &*self.state.slot.lock().await {
            SessionSlot::LiveView(session) => session.intercom.as_ref().is_some_and(|f| f.is_active()),
            _ => false,
        }
    }
}

/// A running intercom: transcoder subprocess plus the UDP relay into the call.
///
/// A supervisor task tears both down on the first stop condition it sees.
/// Dropping the forwarder counts as a stop.
pub(crate) struct IntercomForwarder {
    stop_tx: Option<oneshot::Sender<()>>,
    supervisor: Option<JoinHandle<()>>,
    local_port: u16,
}

impl IntercomForwarder {
    pub(crate) async fn start(
        vendor: Arc<dyn VendorSession>,
        description: &RtpDescription,
        source: &TranscoderInput,
        launcher: &dyn TranscoderLauncher,
        metrics: Arc<dyn MetricsReporter>,
    ) -> Result<Self> {
        let reserved = PortAllocator::reserve_udp_port().await?;
        let local_port = reserved.port();

        let arguments = TranscoderArgs::intercom(source, &vendor.audio_srtp(), local_port);
        let process = launcher.spawn(arguments).await?;

        let relay = AudioRelay::start(reserved.into_socket(), vendor.clone(), description.audio_destination());
        let (stop_tx, stop_rx) = oneshot::channel();
        let supervisor = tokio::spawn(supervise(
            vendor.id().to_string(),
            process,
            relay,
            stop_rx,
            vendor.call_ended(),
            metrics.clone(),
        ));
        metrics.report_intercom_started();

        Ok(Self {
            stop_tx: Some(stop_tx),
            supervisor: Some(supervisor),
            local_port,
        })
    }

    pub(crate) fn local_port(&self) -> u16 {
        self.local_port
    }

    pub(crate) fn is_active(&self) -> bool {
        self.supervisor.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Idempotent; returns once the subprocess is gone and the relay closed
    pub(crate) async fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(supervisor) = self.supervisor.take() {
            if let Err(e) = supervisor.await {
                tracing::warn!(error = %e, "Intercom supervisor failed");
            }
        }
    }
}

async fn supervise(
    session_id: String,
    mut process: Box<dyn TranscoderProcess>,
    relay: AudioRelay,
    stop: oneshot::Receiver<()>,
    call_ended: CallEnded,
    metrics: Arc<dyn MetricsReporter>,
) {
    let cause = tokio::select! {
        exit = process.wait() => {
            match exit {
                Ok(exit) if exit.success() => {}
                Ok(exit) => tracing::warn!(session_id = %session_id, code = ?exit.code, "Intercom transcoder exited with failure"),
                Err(e) => tracing::warn!(session_id = %session_id, error = %e, "Lost track of intercom transcoder"),
            }
            "transcoder exited"
        }
        _ = call_ended.wait() => "call ended",
        _ = stop => "stopped",
    };

    relay.close();
    if let Err(e) = process.kill().await {
        tracing::warn!(session_id = %session_id, error = %e, "Failed to kill intercom transcoder");
    }
    metrics.report_intercom_stopped();

    tracing::info!(
        session_id = %session_id,
        forwarded = relay.forwarded(),
        cause,
        "Two way audio ended"
    );
}
