//! Multiplexed stdout/stderr framing.
//!
//! Non-TTY exec and log streams prefix every chunk with an 8 byte header:
//! stream type (0, 1 or 2), three zero bytes, then the payload length as a
//! big-endian u32.

use bollard::container::LogOutput;

pub const FRAME_HEADER_LEN: usize = 8;

/// Payload of a single framed chunk. Chunks shorter than the header are empty.
pub fn strip_frame_header(chunk: &[u8]) -> &[u8] {
    chunk.get(FRAME_HEADER_LEN..).unwrap_or(&[])
}

pub fn has_frame_header(chunk: &[u8]) -> bool {
    chunk.len() >= FRAME_HEADER_LEN && chunk[0] <= 2 && chunk[1..4] == [0, 0, 0]
}

/// Concatenated payloads of a raw multiplexed buffer. A truncated trailing
/// frame contributes what is present; a trailing fragment shorter than a
/// header contributes nothing.
pub fn demux(mut raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    while !raw.is_empty() {
        let payload = strip_frame_header(raw);
        if payload.is_empty() {
            break;
        }
        let declared = u32::from_be_bytes([raw[4], raw[5], raw[6], raw[7]]) as usize;
        let take = declared.min(payload.len());
        out.extend_from_slice(&payload[..take]);
        raw = &payload[take..];
    }
    out
}

/// Text carried by one runtime output chunk.
pub fn chunk_text(chunk: LogOutput) -> String {
    match chunk {
        LogOutput::Console { message } if has_frame_header(&message) => {
            String::from_utf8_lossy(&demux(&message)).into_owned()
        }
        other => String::from_utf8_lossy(&other.into_bytes()).into_owned(),
    }
}

/// Reassembles lines that the runtime split across output chunks.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    /// Appends `text` and returns every line it completed.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.pending.push_str(text);

        let Some(last_newline) = self.pending.rfind('\n') else {
            return Vec::new();
        };
        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        complete
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect()
    }

    /// The unterminated tail, once the stream has ended.
    pub fn finish(self) -> Option<String> {
        Some(self.pending).filter(|rest| !rest.is_empty())
    }
}
