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

//! Chat session client for wirechat servers.
//!
//! Owns exactly one WebSocket connection at a time and translates between
//! caller intent (connect, send, disconnect) and the wire protocol.
//! Rendering is left to the caller — this crate only handles the
//! **protocol layer**: lifecycle, the envelope codec, and event delivery.
//!
//! # Example
//!
//! ```no_run
//! use wirechat_client::{ChatSession, SessionEvent, SessionOptions};
//! use wirechat_types::{Identity, MessageType};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut session = ChatSession::new(SessionOptions {
//!         url: "ws://127.0.0.1:8080/api/v1/chat/connect".into(),
//!     });
//!
//!     let mut events = session.subscribe();
//!     session.connect(Identity::new("u1", "alice")).await?;
//!
//!     session.send("hello everyone", MessageType::Text, None).await?;
//!
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             SessionEvent::Message(envelope) => {
//!                 println!("{}: {}", envelope.source.name, envelope.message.content.text)
//!             }
//!             SessionEvent::Closed => break,
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod events;
pub mod session;

pub use error::SessionError;
pub use events::SessionEvent;
pub use session::{ChatSession, ConnectionState, SessionOptions};
