use serde::{Deserialize, Serialize};

use super::CameraId;

/// Describes one way of getting video out of a camera
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStreamOptions {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    /// Audio codec hint; `pcm` tells consumers the audio needs transcoding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    pub source: String,
    pub user_configurable: bool,
}

impl MediaStreamOptions {
    pub fn sip() -> Self {
        Self {
            id: "sip".to_string(),
            name: "SIP".to_string(),
            container: None,
            video_codec: Some("h264".to_string()),
            audio_codec: Some("pcm".to_string()),
            source: "cloud".to_string(),
            user_configurable: false,
        }
    }

    pub fn realtime(camera_id: &CameraId) -> Self {
        Self {
            id: "webrtc".to_string(),
            name: "WebRTC".to_string(),
            container: Some(camera_id.signaling_mime()),
            video_codec: None,
            audio_codec: None,
            source: "cloud".to_string(),
            user_configurable: false,
        }
    }

    pub fn is_realtime(&self) -> bool {
        self.id == "webrtc"
    }
}

/// Input description handed to a transcoder: either a URL or raw input arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscoderInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub input_arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_stream_options: Option<MediaStreamOptions>,
}

impl TranscoderInput {
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            input_arguments: vec!["-i".to_string(), url.clone()],
            url: Some(url),
            media_stream_options: None,
        }
    }

    pub fn with_options(mut self, options: MediaStreamOptions) -> Self {
        self.media_stream_options = Some(options);
        self
    }

    /// Arguments a transcoder needs to read this input, falling back to the URL
    pub fn arguments(&self) -> Vec<String> {
        if !self.input_arguments.is_empty() {
            return self.input_arguments.clone();
        }
        match &self.url {
            Some(url) => vec!["-i".to_string(), url.clone()],
            None => Vec::new(),
        }
    }
}
