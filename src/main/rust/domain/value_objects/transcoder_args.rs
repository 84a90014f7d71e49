use super::{SrtpOptions, TranscoderInput, TranscoderSpec};

/// Output side of the live-view transcoder: MPEG-TS served to a single local reader
const LIVE_VIEW_OUTPUT: [&str; 6] = ["-vcodec", "copy", "-acodec", "aac", "-f", "mpegts"];

/// Fixed intercom encoding: mono 8 kHz mu-law over SRTP
#[rustfmt::skip]
const INTERCOM_CODEC: [&str; 13] = [
    "-vn", "-dn", "-sn",
    "-acodec", "pcm_mulaw",
    "-flags", "+global_header",
    "-ac", "1",
    "-ar", "8k",
    "-f", "rtp",
];

/// RTP packet size used when relaying intercom audio
const INTERCOM_PACKET_SIZE: u16 = 188;

pub struct TranscoderArgs;

impl TranscoderArgs {
    /// Arguments for the live-view transcoder reading the vendor session
    pub fn live_view(spec: &TranscoderSpec, output_url: &str) -> Vec<String> {
        let mut args: Vec<String> = spec.input_arguments().to_vec();
        args.extend(LIVE_VIEW_OUTPUT.iter().map(|s| s.to_string()));
        args.push(format!("{}?listen=1", output_url));
        args
    }

    /// Arguments for the intercom transcoder sending audio to the local forwarder port
    pub fn intercom(source: &TranscoderInput, srtp: &SrtpOptions, forward_port: u16) -> Vec<String> {
        let mut args = source.arguments();
        args.extend(INTERCOM_CODEC.iter().map(|s| s.to_string()));
        args.push("-srtp_out_suite".to_string());
        args.push(srtp.crypto_suite().to_string());
        args.push("-srtp_out_params".to_string());
        args.push(srtp.key_params().to_string());
        args.push(format!(
            "srtp://127.0.0.1:{}?pkt_size={}",
            forward_port, INTERCOM_PACKET_SIZE
        ));
        args
    }
}
