//! The 5-byte frame envelope that every message is wrapped in:
//! `[flags:u8][length:u32 big-endian][payload]`.

use bytes::Bytes;
use bytes::BytesMut;

pub const ENVELOPE_HEADER_LEN: usize = 5;

/// Set on a frame that carries textual trailer metadata (including a
/// grpc-status) instead of an `AgentServerMessage`.
pub const FLAG_TRAILER: u8 = 0x80;

/// Set, on endpoints that use it, to mark an in-band error whose payload is
/// UTF-8 text rather than a protobuf message.
pub const FLAG_ERROR: u8 = 0x02;

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub flags: u8,
    pub payload: Bytes,
}

impl Frame {
    pub fn is_trailer(&self) -> bool {
        self.flags & FLAG_TRAILER != 0
    }

    pub fn is_error(&self) -> bool {
        self.flags & FLAG_ERROR != 0
    }
}

/// Encodes a single frame: `flags | len_be32 | payload`.
pub fn encode_frame(flags: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(ENVELOPE_HEADER_LEN + payload.len());
    out.push(flags);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// Streams bytes off an HTTP body, yielding complete frames as soon as they
/// accumulate, and holding any trailing partial frame for the next push.
#[derive(Debug, Default)]
pub struct FrameReader {
    buf: BytesMut,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pops the next complete frame out of the buffer, if one is fully
    /// present. Returns `None` when only a partial frame (or nothing) is
    /// buffered — the caller should `push` more bytes and try again.
    pub fn next_frame(&mut self) -> Option<Frame> {
        if self.buf.len() < ENVELOPE_HEADER_LEN {
            return None;
        }
        let flags = self.buf[0];
        let len = u32::from_be_bytes([self.buf[1], self.buf[2], self.buf[3], self.buf[4]]) as usize;
        if self.buf.len() < ENVELOPE_HEADER_LEN + len {
            return None;
        }

        let mut frame_bytes = self.buf.split_to(ENVELOPE_HEADER_LEN + len);
        let payload = frame_bytes.split_off(ENVELOPE_HEADER_LEN).freeze();
        Some(Frame { flags, payload })
    }

    /// Drains every complete frame currently buffered.
    pub fn drain_frames(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame() {
            frames.push(frame);
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn parses_a_single_frame() {
        let bytes = encode_frame(0, b"hello");
        let mut reader = FrameReader::new();
        reader.push(&bytes);
        let frame = reader.next_frame().unwrap();
        assert_eq!(frame.flags, 0);
        assert_eq!(frame.payload.as_ref(), b"hello");
        assert!(reader.next_frame().is_none());
    }

    #[test]
    fn streaming_split_at_arbitrary_offsets_matches_one_shot_parse() {
        let mut all_bytes = Vec::new();
        all_bytes.extend(encode_frame(0, b"one"));
        all_bytes.extend(encode_frame(FLAG_TRAILER, b"grpc-status: 0"));
        all_bytes.extend(encode_frame(0, b"three-longer-payload"));

        let one_shot = {
            let mut reader = FrameReader::new();
            reader.push(&all_bytes);
            reader.drain_frames()
        };

        for split in 0..=all_bytes.len() {
            let (first, second) = all_bytes.split_at(split);
            let mut reader = FrameReader::new();
            reader.push(first);
            let mut frames = reader.drain_frames();
            reader.push(second);
            frames.extend(reader.drain_frames());
            assert_eq!(frames, one_shot, "mismatch splitting at offset {split}");
        }
    }

    #[test]
    fn trailer_flag_is_detected() {
        let bytes = encode_frame(FLAG_TRAILER, b"grpc-status: 7");
        let mut reader = FrameReader::new();
        reader.push(&bytes);
        let frame = reader.next_frame().unwrap();
        assert!(frame.is_trailer());
    }
}
