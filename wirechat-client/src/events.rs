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

//! Framework-agnostic event types for the chat session.
//!
//! These events are emitted on the session's broadcast channel and can be
//! consumed by any frontend (terminal, GUI, bot logic, tests).

use wirechat_types::Envelope;

/// Events emitted by a [`ChatSession`](crate::ChatSession).
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    // === Connection Events ===
    /// Connection to the server was established successfully.
    Connected,

    /// The connection was closed, by either side.
    Closed,

    /// The configured endpoint cannot be opened as a WebSocket.
    TransportUnsupported(String),

    // === Message Events ===
    /// A structured chat envelope arrived.
    Message(Envelope),

    /// A structured envelope flagged as a server notification
    /// (`message.type == "system"`).
    System(Envelope),

    /// One segment of a frame that did not parse as an envelope,
    /// in original order.
    LegacyLine(String),
}
