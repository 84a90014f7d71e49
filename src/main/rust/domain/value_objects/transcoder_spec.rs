/// Transcoder invocation prepared by the vendor session for one live view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscoderSpec {
    input_arguments: Vec<String>,
    input_sdp_lines: Vec<String>,
}

impl TranscoderSpec {
    pub fn new(input_arguments: Vec<String>, input_sdp_lines: Vec<String>) -> Self {
        Self {
            input_arguments,
            input_sdp_lines,
        }
    }

    pub fn input_arguments(&self) -> &[String] {
        &self.input_arguments
    }

    pub fn input_sdp_lines(&self) -> &[String] {
        &self.input_sdp_lines
    }

    /// Session description written to the handoff connection
    pub fn sdp_payload(&self) -> String {
        self.input_sdp_lines
            .iter()
            .filter(|line| !line.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drop the `-protocol_whitelist <value>` pair so the transcoder can read the handoff URL
    pub fn without_protocol_whitelist(mut self) -> Self {
        if let Some(index) = self
            .input_arguments
            .iter()
            .position(|arg| arg == "-protocol_whitelist")
        {
            let end = (index + 2).min(self.input_arguments.len());
            self.input_arguments.drain(index..end);
        }
        self.input_arguments.retain(|arg| !arg.is_empty());
        self
    }
}
