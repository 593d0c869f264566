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

//! Shared wire types for the wirechat messaging protocol.
//!
//! This crate defines the contract between the chat backend and its
//! consumers (clients, bots, integration tests). It is intentionally
//! framework-agnostic — no transport types, no UI types.
//!
//! The wire format is JSON text frames carrying an [`Envelope`]. Frames
//! that predate the structured format are plain newline-delimited text;
//! [`codec::decode_frame`] degrades to that representation instead of
//! erroring.

pub mod codec;
pub mod envelope;

pub use codec::{decode_frame, encode, peek_message_type, DecodedFrame};
pub use envelope::{
    Attachment, Content, DataMessage, Envelope, Identity, MessageType, ReadStatus, Source,
};

/// Uid used as the source of server-generated notifications. This is not
/// a real user and should be filtered out in peer management.
pub const SYSTEM_UID: &str = "system";

/// Display name attached to server-generated notifications.
pub const SYSTEM_NAME: &str = "System";
