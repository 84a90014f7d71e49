use async_trait::async_trait;

use crate::domain::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub code: Option<i32>,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Port for launching the external transcoder
#[async_trait]
pub trait TranscoderLauncher: Send + Sync {
    async fn spawn(&self, arguments: Vec<String>) -> Result<Box<dyn TranscoderProcess>>;
}

/// A running transcoder, exclusively owned by whoever spawned it
#[async_trait]
pub trait TranscoderProcess: Send {
    fn pid(&self) -> Option<u32>;

    /// Wait for the process to exit on its own
    async fn wait(&mut self) -> Result<ProcessExit>;

    /// Forcibly terminate; safe to call after exit
    async fn kill(&mut self) -> Result<()>;
}
