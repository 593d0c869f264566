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

//! Error types for the chat session client.

use thiserror::Error;
use wirechat_transport::WebSocketConnectError;

/// Errors returned by [`ChatSession`](crate::ChatSession) methods.
///
/// All of these are synchronous precondition or setup failures; malformed
/// inbound data is never an error (it degrades to
/// [`SessionEvent::LegacyLine`](crate::SessionEvent::LegacyLine)).
#[derive(Debug, Error)]
pub enum SessionError {
    /// `connect` was called while a connection is already live. The
    /// existing connection is never replaced.
    #[error("Already connected; disconnect first")]
    AlreadyConnected,

    /// `send` or `disconnect` was called with no live connection.
    #[error("Not connected")]
    NotConnected,

    /// The message text was empty after trimming; nothing was sent.
    #[error("Message is empty")]
    EmptyMessage,

    /// The configured endpoint is not something a WebSocket can be opened
    /// to (bad scheme or unparseable URL).
    #[error("WebSocket transport unavailable: {0}")]
    TransportUnsupported(String),

    /// The transport-level connection attempt failed.
    #[error("Connection failed: {0}")]
    Connect(#[from] WebSocketConnectError),

    /// An outbound envelope failed to serialize.
    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}
