/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Encode / decode boundary between wire frames and [`Envelope`]s.
//!
//! Decoding is total: a frame that does not parse as a structured envelope
//! is reinterpreted as legacy newline-delimited text rather than an error.

use crate::envelope::{Envelope, MessageType};
use serde::Deserialize;

/// The result of decoding one inbound frame.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedFrame {
    /// The frame parsed as a structured envelope.
    Structured(Envelope),
    /// The frame did not parse; its payload split on line feeds, in
    /// original order. Empty segments are preserved.
    Legacy(Vec<String>),
}

/// Serialize an envelope to its wire form.
pub fn encode(envelope: &Envelope) -> Result<String, serde_json::Error> {
    serde_json::to_string(envelope)
}

/// Decode one inbound frame, falling back to the legacy representation on
/// any structured-parse failure. Never errors.
pub fn decode_frame(raw: &str) -> DecodedFrame {
    match serde_json::from_str::<Envelope>(raw) {
        Ok(envelope) => DecodedFrame::Structured(envelope),
        Err(_) => DecodedFrame::Legacy(raw.split('\n').map(str::to_string).collect()),
    }
}

/// Probe a frame for its message type without decoding the full envelope.
///
/// Returns `None` when the frame is not structured at all.
pub fn peek_message_type(raw: &str) -> Option<MessageType> {
    #[derive(Deserialize)]
    struct EnvelopeKind {
        message: MessageKind,
    }
    #[derive(Deserialize)]
    struct MessageKind {
        #[serde(rename = "type")]
        kind: MessageType,
    }
    serde_json::from_str::<EnvelopeKind>(raw)
        .ok()
        .map(|e| e.message.kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{MessageType, Source};

    fn sample() -> Envelope {
        Envelope::outgoing(
            Source {
                uid: "u1".into(),
                name: "alice".into(),
            },
            MessageType::Text,
            "hello there",
            Some("room-7".into()),
        )
    }

    #[test]
    fn encode_then_decode_preserves_fields() {
        let original = sample();
        let wire = encode(&original).unwrap();
        match decode_frame(&wire) {
            DecodedFrame::Structured(envelope) => {
                assert_eq!(envelope.source, original.source);
                assert_eq!(envelope.message.kind, original.message.kind);
                assert_eq!(envelope.message.content.text, original.message.content.text);
                assert_eq!(envelope.destination, original.destination);
            }
            DecodedFrame::Legacy(lines) => panic!("expected structured frame, got {lines:?}"),
        }
    }

    #[test]
    fn malformed_frame_splits_into_legacy_lines() {
        match decode_frame("hello\nworld") {
            DecodedFrame::Legacy(lines) => assert_eq!(lines, vec!["hello", "world"]),
            DecodedFrame::Structured(e) => panic!("expected legacy frame, got {e:?}"),
        }
    }

    #[test]
    fn legacy_split_preserves_empty_segments() {
        match decode_frame("a\n\nb\n") {
            DecodedFrame::Legacy(lines) => assert_eq!(lines, vec!["a", "", "b", ""]),
            DecodedFrame::Structured(e) => panic!("expected legacy frame, got {e:?}"),
        }
    }

    #[test]
    fn json_that_is_not_an_envelope_is_legacy() {
        // A JSON string and a JSON object missing `message` both fall back.
        assert!(matches!(
            decode_frame(r#""just a string""#),
            DecodedFrame::Legacy(_)
        ));
        assert!(matches!(
            decode_frame(r#"{"source":{"uid":"u1","name":"alice"}}"#),
            DecodedFrame::Legacy(_)
        ));
    }

    #[test]
    fn structured_frame_with_numeric_timestamp_parses() {
        let wire = r#"{
            "source": {"uid": "u2", "name": "bob"},
            "message": {"type": "system", "content": {"text": "joined"}},
            "timestamp": 1714000000000.0
        }"#;
        match decode_frame(wire) {
            DecodedFrame::Structured(envelope) => {
                assert_eq!(envelope.message.kind, MessageType::System);
                assert_eq!(envelope.timestamp, Some(1714000000000.0));
            }
            DecodedFrame::Legacy(lines) => panic!("expected structured frame, got {lines:?}"),
        }
    }

    #[test]
    fn peek_reads_only_the_type() {
        let wire = encode(&sample()).unwrap();
        assert_eq!(peek_message_type(&wire), Some(MessageType::Text));
        assert_eq!(peek_message_type("not json"), None);
    }
}
