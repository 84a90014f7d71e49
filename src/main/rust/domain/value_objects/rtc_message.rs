use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtcSessionDescription {
    pub sdp: String,
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
}

/// Peer-connection signaling message exchanged with browser-side consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtcAvMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub description: RtcSessionDescription,
    #[serde(default)]
    pub candidates: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<serde_json::Value>,
}

impl RtcAvMessage {
    pub fn answer(sdp: String) -> Self {
        Self {
            id: None,
            description: RtcSessionDescription {
                sdp,
                sdp_type: SdpType::Answer,
            },
            candidates: Vec::new(),
            configuration: None,
        }
    }

    pub fn is_offer(&self) -> bool {
        self.description.sdp_type == SdpType::Offer
    }
}
