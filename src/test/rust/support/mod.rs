#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::watch;

use pipeline_doorbell::{
    CallEnded, CallEndedNotifier, CameraId, DomainError, EndReason, MediaEndpoint, MetricsReporter, ProcessExit,
    Result, RtpDescription, SensorFlag, SessionKind, SessionOptions, SrtpOptions, TranscoderLauncher,
    TranscoderProcess, TranscoderSpec, VendorCamera, VendorSession,
};

pub const REMOTE_AUDIO_PORT: u16 = 40000;
pub const REMOTE_VIDEO_PORT: u16 = 40002;

/// Ordered record of vendor calls, shared by a camera and its sessions
#[derive(Default)]
pub struct CallLog(Mutex<Vec<String>>);

impl CallLog {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
}

/// Counts vendor calls that are open right now and the most ever open at once
#[derive(Default)]
pub struct OpenCalls {
    open: AtomicUsize,
    peak: AtomicUsize,
}

impl OpenCalls {
    fn opened(&self) {
        let now = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn closed(&self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct MockCamera {
    id: CameraId,
    pub log: Arc<CallLog>,
    pub calls: Arc<OpenCalls>,
    sessions: Mutex<Vec<Arc<MockSession>>>,
    pub fail_create: AtomicBool,
    pub fail_start: AtomicBool,
    pub start_delay: Mutex<Duration>,
}

impl MockCamera {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: CameraId::new(id).unwrap(),
            log: Arc::new(CallLog::default()),
            calls: Arc::new(OpenCalls::default()),
            sessions: Mutex::new(Vec::new()),
            fail_create: AtomicBool::new(false),
            fail_start: AtomicBool::new(false),
            start_delay: Mutex::new(Duration::ZERO),
        })
    }

    pub fn sessions_created(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn session(&self, index: usize) -> Arc<MockSession> {
        self.sessions.lock().unwrap()[index].clone()
    }

    pub fn last_session(&self) -> Arc<MockSession> {
        self.sessions.lock().unwrap().last().unwrap().clone()
    }
}

#[async_trait]
impl VendorCamera for MockCamera {
    fn id(&self) -> &CameraId {
        &self.id
    }

    async fn create_session(&self, _options: SessionOptions) -> Result<Arc<dyn VendorSession>> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(DomainError::VendorRequestFailed("account offline".to_string()));
        }

        let mut sessions = self.sessions.lock().unwrap();
        let session = Arc::new(MockSession::new(
            format!("s{}", sessions.len() + 1),
            self.log.clone(),
            self.calls.clone(),
            self.fail_start.load(Ordering::SeqCst),
            *self.start_delay.lock().unwrap(),
        ));
        sessions.push(session.clone());
        self.log.push(format!("create:{}", session.id));
        Ok(session)
    }

    async fn start_realtime_session(&self, session_id: &str, offer_sdp: &str) -> Result<String> {
        self.log.push(format!("realtime_start:{}", session_id));
        self.calls.opened();
        Ok(format!("answer-to:{}", offer_sdp))
    }

    async fn end_realtime_session(&self, session_id: &str) -> Result<()> {
        self.log.push(format!("realtime_end:{}", session_id));
        self.calls.closed();
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<u8>> {
        Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
    }

    fn has_light(&self) -> bool {
        true
    }

    async fn set_light(&self, on: bool) -> Result<()> {
        self.log.push(format!("light:{}", on));
        Ok(())
    }
}

pub struct MockSession {
    pub id: String,
    log: Arc<CallLog>,
    calls: Arc<OpenCalls>,
    fail_start: bool,
    start_delay: Duration,
    started: AtomicBool,
    stop_calls: AtomicUsize,
    speaker_activations: AtomicUsize,
    next_port: AtomicUsize,
    notifier: CallEndedNotifier,
    sent: Mutex<Vec<(Vec<u8>, SocketAddr)>>,
}

impl MockSession {
    fn new(id: String, log: Arc<CallLog>, calls: Arc<OpenCalls>, fail_start: bool, start_delay: Duration) -> Self {
        let (notifier, _) = CallEnded::channel();
        Self {
            id,
            log,
            calls,
            fail_start,
            start_delay,
            started: AtomicBool::new(false),
            stop_calls: AtomicUsize::new(0),
            speaker_activations: AtomicUsize::new(0),
            next_port: AtomicUsize::new(50000),
            notifier,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn speaker_activations(&self) -> usize {
        self.speaker_activations.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        self.sent.lock().unwrap().clone()
    }

    /// Remote hangup: the vendor reports the call over without a local stop
    pub fn hang_up(&self) {
        self.notifier.notify();
    }

    pub fn srtp() -> SrtpOptions {
        SrtpOptions::new(SrtpOptions::DEFAULT_SUITE, "dGVzdC1rZXktcGFyYW1z")
    }
}

#[async_trait]
impl VendorSession for MockSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn start(&self) -> Result<RtpDescription> {
        if !self.start_delay.is_zero() {
            tokio::time::sleep(self.start_delay).await;
        }
        self.log.push(format!("start:{}", self.id));
        if self.fail_start {
            return Err(DomainError::VendorRequestFailed("call rejected".to_string()));
        }

        self.started.store(true, Ordering::SeqCst);
        self.calls.opened();
        Ok(RtpDescription {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            audio: MediaEndpoint {
                port: REMOTE_AUDIO_PORT,
                srtp: Self::srtp(),
            },
            video: MediaEndpoint {
                port: REMOTE_VIDEO_PORT,
                srtp: Self::srtp(),
            },
        })
    }

    async fn reserve_port(&self, count: u16) -> Result<u16> {
        let port = self.next_port.fetch_add(count as usize * 2, Ordering::SeqCst);
        Ok(port as u16)
    }

    fn prepare_transcoder(
        &self,
        _include_video: bool,
        extra_args: &[String],
        _description: &RtpDescription,
        audio_port: u16,
        video_port: u16,
        handoff_url: &str,
    ) -> TranscoderSpec {
        let mut args: Vec<String> = vec![
            "-protocol_whitelist".to_string(),
            "pipe,udp,rtp,file,crypto,tcp".to_string(),
            "-f".to_string(),
            "sdp".to_string(),
        ];
        args.extend(extra_args.iter().cloned());
        args.push("-i".to_string());
        args.push(handoff_url.to_string());

        TranscoderSpec::new(
            args,
            vec![
                "v=0".to_string(),
                format!("s={}", self.id),
                String::new(),
                format!("m=audio {} RTP/SAVP 0", audio_port),
                format!("m=video {} RTP/SAVP 99", video_port),
            ],
        )
    }

    async fn stop(&self) {
        if self.stop_calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.log.push(format!("stop:{}", self.id));
            if self.started.load(Ordering::SeqCst) {
                self.calls.closed();
            }
            self.notifier.notify();
        }
    }

    async fn activate_speaker(&self) -> Result<()> {
        self.speaker_activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_audio(&self, datagram: &[u8], destination: SocketAddr) -> Result<()> {
        self.sent.lock().unwrap().push((datagram.to_vec(), destination));
        Ok(())
    }

    fn audio_srtp(&self) -> SrtpOptions {
        Self::srtp()
    }

    fn call_ended(&self) -> CallEnded {
        self.notifier.subscribe()
    }
}

/// State of one spawned transcoder, observable after the orchestrator owns the process
pub struct ProcessRecord {
    pub args: Vec<String>,
    killed: AtomicBool,
    exit: watch::Sender<Option<i32>>,
}

impl ProcessRecord {
    pub fn is_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }

    /// The subprocess exits on its own
    pub fn finish(&self, code: i32) {
        self.exit.send_replace(Some(code));
    }

    pub fn value_after(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// Local port the intercom transcoder sends its SRTP output to
    pub fn forward_port(&self) -> Option<u16> {
        let url = self.args.iter().find(|a| a.starts_with("srtp://127.0.0.1:"))?;
        let rest = url.trim_start_matches("srtp://127.0.0.1:");
        rest.split('?').next()?.parse().ok()
    }
}

struct MockProcess {
    record: Arc<ProcessRecord>,
    exit: watch::Receiver<Option<i32>>,
}

#[async_trait]
impl TranscoderProcess for MockProcess {
    fn pid(&self) -> Option<u32> {
        None
    }

    async fn wait(&mut self) -> Result<ProcessExit> {
        let code = *self
            .exit
            .wait_for(|code| code.is_some())
            .await
            .map_err(|_| DomainError::TranscoderSpawnFailed("process record dropped".to_string()))?;
        Ok(ProcessExit { code })
    }

    async fn kill(&mut self) -> Result<()> {
        self.record.killed.store(true, Ordering::SeqCst);
        if self.record.exit.borrow().is_none() {
            self.record.exit.send_replace(Some(-9));
        }
        Ok(())
    }
}

/// Launcher that records every invocation. When `connects` is set, a spawned
/// live-view transcoder dials the handoff URL and keeps what it reads.
pub struct MockLauncher {
    connects: bool,
    processes: Mutex<Vec<Arc<ProcessRecord>>>,
    received: Arc<Mutex<Vec<String>>>,
}

impl MockLauncher {
    pub fn connecting() -> Arc<Self> {
        Arc::new(Self {
            connects: true,
            processes: Mutex::new(Vec::new()),
            received: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn silent() -> Arc<Self> {
        Arc::new(Self {
            connects: false,
            processes: Mutex::new(Vec::new()),
            received: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn processes(&self) -> Vec<Arc<ProcessRecord>> {
        self.processes.lock().unwrap().clone()
    }

    pub fn last_process(&self) -> Arc<ProcessRecord> {
        self.processes.lock().unwrap().last().unwrap().clone()
    }

    pub fn received_descriptions(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscoderLauncher for MockLauncher {
    async fn spawn(&self, arguments: Vec<String>) -> Result<Box<dyn TranscoderProcess>> {
        let (exit, exit_rx) = watch::channel(None);
        let record = Arc::new(ProcessRecord {
            args: arguments,
            killed: AtomicBool::new(false),
            exit,
        });
        self.processes.lock().unwrap().push(record.clone());

        let handoff = record
            .value_after("-i")
            .and_then(|url| url.strip_prefix("tcp://"))
            .map(str::to_string);
        if let (true, Some(addr)) = (self.connects, handoff) {
            let received = self.received.clone();
            tokio::spawn(async move {
                let mut stream = TcpStream::connect(addr).await.unwrap();
                let mut description = String::new();
                stream.read_to_string(&mut description).await.unwrap();
                received.lock().unwrap().push(description);
            });
        }

        Ok(Box::new(MockProcess { record, exit: exit_rx }))
    }
}

#[derive(Default)]
pub struct MockMetrics {
    pub started: Mutex<Vec<SessionKind>>,
    pub ended: Mutex<Vec<(SessionKind, EndReason)>>,
    pub refreshed: AtomicUsize,
    pub handoff_timeouts: AtomicUsize,
    pub intercoms_started: AtomicUsize,
    pub intercoms_stopped: AtomicUsize,
    pub sensor_triggers: Mutex<Vec<SensorFlag>>,
}

impl MockMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ended(&self) -> Vec<(SessionKind, EndReason)> {
        self.ended.lock().unwrap().clone()
    }
}

impl MetricsReporter for MockMetrics {
    fn report_session_started(&self, kind: SessionKind) {
        self.started.lock().unwrap().push(kind);
    }

    fn report_session_ended(&self, kind: SessionKind, reason: EndReason) {
        self.ended.lock().unwrap().push((kind, reason));
    }

    fn report_session_refreshed(&self) {
        self.refreshed.fetch_add(1, Ordering::SeqCst);
    }

    fn report_handoff_timeout(&self) {
        self.handoff_timeouts.fetch_add(1, Ordering::SeqCst);
    }

    fn report_intercom_started(&self) {
        self.intercoms_started.fetch_add(1, Ordering::SeqCst);
    }

    fn report_intercom_stopped(&self) {
        self.intercoms_stopped.fetch_add(1, Ordering::SeqCst);
    }

    fn report_sensor_triggered(&self, flag: SensorFlag) {
        self.sensor_triggers.lock().unwrap().push(flag);
    }
}

/// Poll `condition` until it holds or two seconds pass
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
