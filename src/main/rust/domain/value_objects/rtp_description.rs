use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Crypto parameters for one encrypted RTP direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrtpOptions {
    crypto_suite: String,
    key_params: String,
}

impl SrtpOptions {
    pub const DEFAULT_SUITE: &'static str = "AES_CM_128_HMAC_SHA1_80";

    /// `key_params` is the base64 of master key followed by master salt
    pub fn new(crypto_suite: impl Into<String>, key_params: impl Into<String>) -> Self {
        Self {
            crypto_suite: crypto_suite.into(),
            key_params: key_params.into(),
        }
    }

    pub fn crypto_suite(&self) -> &str {
        &self.crypto_suite
    }

    pub fn key_params(&self) -> &str {
        &self.key_params
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEndpoint {
    pub port: u16,
    pub srtp: SrtpOptions,
}

/// Remote media description negotiated by the vendor session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtpDescription {
    pub address: IpAddr,
    pub audio: MediaEndpoint,
    pub video: MediaEndpoint,
}

impl RtpDescription {
    pub fn audio_destination(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.audio.port)
    }

    pub fn video_destination(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.video.port)
    }
}
