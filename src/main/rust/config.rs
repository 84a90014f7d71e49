use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::domain::value_objects::{CameraId, SessionTimeouts};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "pipeline-doorbell",
    version = "0.1.0",
    author = "Doorbell Video Pipeline",
    about = "Streaming session orchestrator for cloud doorbell cameras"
)]
pub struct Config {
    /// Comma separated camera identities to expose
    #[arg(long, env = "CAMERAS", value_delimiter = ',', default_value = "front-door")]
    pub cameras: Vec<String>,

    /// HTTP port for the camera API, metrics and health probes
    #[arg(long, env = "HTTP_PORT", default_value = "9003")]
    pub http_port: u16,

    /// Transcoder binary, resolved through PATH unless absolute
    #[arg(long, env = "FFMPEG_PATH", default_value = "ffmpeg")]
    pub ffmpeg_path: PathBuf,

    /// Seconds a live view stays up without a refresh
    #[arg(long, env = "STREAM_TIMEOUT_SECS", default_value = "120")]
    pub stream_timeout_secs: u64,

    /// Seconds to wait for the transcoder to fetch the session description
    #[arg(long, env = "HANDOFF_TIMEOUT_SECS", default_value = "30")]
    pub handoff_timeout_secs: u64,

    /// Seconds before motion and doorbell flags clear themselves (0 = never)
    #[arg(long, env = "EVENT_RESET_SECS", default_value = "10")]
    pub event_reset_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Minimum allowed port (ports below 1024 are privileged)
const MIN_USER_PORT: u16 = 1024;

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        Self::validate_port(self.http_port, "HTTP")?;

        if self.cameras.is_empty() {
            anyhow::bail!("At least one camera must be configured");
        }

        let mut seen = HashSet::new();
        for id in self.camera_ids()? {
            if !seen.insert(id.clone()) {
                anyhow::bail!("Camera {} is configured more than once", id);
            }
        }

        if self.stream_timeout_secs == 0 {
            anyhow::bail!("Stream timeout cannot be 0");
        }

        if self.handoff_timeout_secs == 0 {
            anyhow::bail!("Handoff timeout cannot be 0");
        }

        if self.ffmpeg_path.is_absolute() && !self.ffmpeg_path.is_file() {
            anyhow::bail!("Transcoder binary not found: {:?}", self.ffmpeg_path);
        }

        Ok(())
    }

    fn validate_port(port: u16, name: &str) -> anyhow::Result<()> {
        if port == 0 {
            anyhow::bail!("Invalid {} port: port cannot be 0", name);
        }
        if port < MIN_USER_PORT {
            anyhow::bail!(
                "Invalid {} port: {} is a privileged port (< {}). Use a port >= {}",
                name,
                port,
                MIN_USER_PORT,
                MIN_USER_PORT
            );
        }
        Ok(())
    }

    pub fn camera_ids(&self) -> crate::domain::errors::Result<Vec<CameraId>> {
        self.cameras.iter().map(|id| CameraId::new(id.as_str())).collect()
    }

    pub fn to_session_timeouts(&self) -> crate::domain::errors::Result<SessionTimeouts> {
        SessionTimeouts::new(
            Duration::from_secs(self.stream_timeout_secs),
            Duration::from_secs(self.handoff_timeout_secs),
            Duration::from_secs(self.event_reset_secs),
        )
    }
}
