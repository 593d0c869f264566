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

//! Native transport layer for wirechat clients.
//!
//! Wraps `tokio-tungstenite` in a small message-oriented client. The chat
//! protocol is JSON over text frames, so this layer deals in `String`s;
//! framing, pings, and TLS are handled underneath.

pub mod websocket;

pub use websocket::{WebSocketClient, WebSocketConnectError};
