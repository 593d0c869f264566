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

//! The chat envelope data model.
//!
//! Mirrors the backend's message schema: every structured frame is an
//! [`Envelope`] wrapping one [`DataMessage`]. Optional fields are omitted
//! from the serialized form when absent.

use serde::{Deserialize, Serialize};

/// Discriminant of a [`DataMessage`], serialized lowercase on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    Video,
    File,
    /// Server-generated notification, not authored by a participant.
    System,
    /// Any tag this client does not know. Kept so newer servers do not
    /// break older clients at the decode boundary.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MessageType::Text => write!(f, "text"),
            MessageType::Image => write!(f, "image"),
            MessageType::Video => write!(f, "video"),
            MessageType::File => write!(f, "file"),
            MessageType::System => write!(f, "system"),
            MessageType::Unknown => write!(f, "unknown"),
        }
    }
}

/// The participant a message originated from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uid: String,
    pub name: String,
}

/// A file or media attachment referenced by a message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// The payload of a message. `text` is the primary field; `data` carries
/// arbitrary structured extensions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

/// A typed message body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub content: Content,
}

/// Read receipts for a message, tracked per participant uid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadStatus {
    pub read_by: Vec<String>,
    pub unread_by: Vec<String>,
}

/// One structured wire frame.
///
/// `source` and `message` are mandatory; a frame missing either does not
/// parse as structured and falls back to legacy decoding. `timestamp` is
/// milliseconds since the Unix epoch, set by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub source: Source,
    pub message: DataMessage,
    #[serde(
        rename = "readStatus",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub read_status: Option<ReadStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl Envelope {
    /// Build an outbound envelope. Constructed fresh per send and
    /// serialized immediately; the timestamp is left to the server.
    pub fn outgoing(
        source: Source,
        kind: MessageType,
        text: impl Into<String>,
        destination: Option<String>,
    ) -> Self {
        Self {
            source,
            message: DataMessage {
                kind,
                content: Content {
                    text: text.into(),
                    ..Content::default()
                },
            },
            read_status: None,
            destination,
            timestamp: None,
        }
    }

    /// Build a server-style notification envelope addressed to everyone.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            source: Source {
                uid: crate::SYSTEM_UID.to_string(),
                name: crate::SYSTEM_NAME.to_string(),
            },
            message: DataMessage {
                kind: MessageType::System,
                content: Content {
                    text: text.into(),
                    ..Content::default()
                },
            },
            read_status: None,
            destination: Some("all".to_string()),
            timestamp: None,
        }
    }

    /// Whether this envelope was authored by the given local identity,
    /// decided by uid comparison. Blank uids never match.
    pub fn is_from(&self, identity: &Identity) -> bool {
        match identity.trimmed_uid() {
            Some(uid) => self.source.uid == uid,
            None => false,
        }
    }
}

/// The caller-supplied local participant. Both fields are optional; blank
/// values are treated as absent everywhere they are consumed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Identity {
    pub uid: Option<String>,
    pub username: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            username: Some(username.into()),
        }
    }

    /// The uid, trimmed, or `None` when unset or blank.
    pub fn trimmed_uid(&self) -> Option<&str> {
        self.uid
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The username, trimmed, or `None` when unset or blank.
    pub fn trimmed_username(&self) -> Option<&str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The [`Source`] this identity stamps on outbound envelopes.
    pub fn source(&self) -> Source {
        Source {
            uid: self.trimmed_uid().unwrap_or_default().to_string(),
            name: self.trimmed_username().unwrap_or_default().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_is_omitted_when_absent() {
        let envelope = Envelope::outgoing(
            Source {
                uid: "u1".into(),
                name: "alice".into(),
            },
            MessageType::Text,
            "hi",
            None,
        );
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(!json.contains("destination"));
        assert!(!json.contains("timestamp"));
        assert!(!json.contains("readStatus"));
    }

    #[test]
    fn destination_is_present_when_supplied() {
        let envelope = Envelope::outgoing(
            Source::default(),
            MessageType::Text,
            "hi",
            Some("room-7".into()),
        );
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains(r#""destination":"room-7""#));
    }

    #[test]
    fn unknown_message_type_round_trips_to_unknown() {
        let kind: MessageType = serde_json::from_str(r#""sticker""#).unwrap();
        assert_eq!(kind, MessageType::Unknown);
    }

    #[test]
    fn system_envelope_is_addressed_to_all() {
        let envelope = Envelope::system("server restarting");
        assert_eq!(envelope.source.uid, crate::SYSTEM_UID);
        assert_eq!(envelope.message.kind, MessageType::System);
        assert_eq!(envelope.destination.as_deref(), Some("all"));
    }

    #[test]
    fn is_from_matches_on_uid_only() {
        let envelope = Envelope::outgoing(
            Source {
                uid: "u1".into(),
                name: "alice".into(),
            },
            MessageType::Text,
            "hi",
            None,
        );
        assert!(envelope.is_from(&Identity::new("u1", "someone-else")));
        assert!(!envelope.is_from(&Identity::new("u2", "alice")));
        assert!(!envelope.is_from(&Identity::default()));
        // A blank identity uid never matches, even against a blank source.
        let anonymous = Envelope::outgoing(Source::default(), MessageType::Text, "hi", None);
        assert!(!anonymous.is_from(&Identity::new("  ", "alice")));
    }

    #[test]
    fn identity_source_trims_fields() {
        let identity = Identity::new(" u1 ", " alice ");
        let source = identity.source();
        assert_eq!(source.uid, "u1");
        assert_eq!(source.name, "alice");
    }
}
