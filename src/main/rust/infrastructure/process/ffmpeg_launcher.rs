use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};

use crate::domain::errors::{DomainError, Result};
use crate::domain::ports::{ProcessExit, TranscoderLauncher, TranscoderProcess};

/// Launches the transcoder as a child process, relaying its stderr to the log
pub struct FfmpegLauncher {
    ffmpeg_path: PathBuf,
}

impl FfmpegLauncher {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }
}

#[async_trait]
impl TranscoderLauncher for FfmpegLauncher {
    async fn spawn(&self, arguments: Vec<String>) -> Result<Box<dyn TranscoderProcess>> {
        tracing::debug!(
            path = %self.ffmpeg_path.display(),
            args = %arguments.join(" "),
            "Spawning transcoder"
        );

        let mut child = Command::new(&self.ffmpeg_path)
            .args(&arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DomainError::TranscoderSpawnFailed(format!("{}: {}", self.ffmpeg_path.display(), e))
            })?;

        let pid = child.id();
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(log_stderr(pid, stderr));
        }

        tracing::info!(pid = ?pid, "Transcoder started");
        Ok(Box::new(FfmpegProcess { child, pid }))
    }
}

async fn log_stderr(pid: Option<u32>, stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(pid = ?pid, "transcoder: {}", line);
    }
}

pub struct FfmpegProcess {
    child: Child,
    pid: Option<u32>,
}

#[async_trait]
impl TranscoderProcess for FfmpegProcess {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    async fn wait(&mut self) -> Result<ProcessExit> {
        let status = self.child.wait().await?;
        Ok(ProcessExit {
            code: status.code(),
        })
    }

    async fn kill(&mut self) -> Result<()> {
        if self.child.try_wait()?.is_some() {
            return Ok(());
        }
        self.child.kill().await?;
        tracing::debug!(pid = ?self.pid, "Transcoder killed");
        Ok(())
    }
}
