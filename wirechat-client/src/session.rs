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

//! The chat session: one transport connection, an explicit lifecycle, and
//! the encode/decode boundary between caller-level chat semantics and wire
//! frames.
//!
//! State transitions happen in response to caller commands or transport
//! notifications, never spontaneously. A superseded connection (one
//! replaced by a later `connect`) can no longer update state or emit
//! events: each connection carries a generation number checked by its
//! event pump.

use crate::error::SessionError;
use crate::events::SessionEvent;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use url::Url;
use wirechat_transport::WebSocketClient;
use wirechat_types::{decode_frame, encode, DecodedFrame, Envelope, Identity, MessageType};

/// Capacity of the session event channel. When full, the oldest event is
/// dropped to make room.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Lifecycle of the session's transport connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection has been attempted yet.
    Disconnected,
    /// A transport connection is being established.
    Connecting,
    /// The transport is open; `send` is permitted.
    Connected,
    /// The transport has closed. A fresh `connect` is permitted.
    Closed,
}

/// Configuration for a [`ChatSession`].
#[derive(Clone, Debug)]
pub struct SessionOptions {
    /// The chat endpoint, e.g. `"ws://host:port/api/v1/chat/connect"`.
    /// Identity fields are appended as query parameters at connect time.
    pub url: String,
}

/// A chat session owning exactly one WebSocket connection at a time.
///
/// Commands (`connect`, `send`, `disconnect`) either fail a precondition
/// synchronously or take effect on the transport; outcomes that depend on
/// the other side (open, close, inbound messages) surface as
/// [`SessionEvent`]s on the channel returned by [`subscribe`](Self::subscribe).
pub struct ChatSession {
    options: SessionOptions,
    identity: Identity,
    state: Arc<Mutex<ConnectionState>>,
    /// Bumped on every successful connect; the event pump of an older
    /// connection sees the mismatch and goes silent.
    generation: Arc<AtomicU64>,
    transport: Option<WebSocketClient>,
    events_tx: async_broadcast::Sender<SessionEvent>,
    /// Keeps the event channel open while no subscriber is attached.
    _events_keepalive: async_broadcast::InactiveReceiver<SessionEvent>,
}

impl ChatSession {
    /// Create a new session. No connection is attempted until
    /// [`connect`](Self::connect).
    pub fn new(options: SessionOptions) -> Self {
        let (mut events_tx, events_rx) = async_broadcast::broadcast(EVENT_CHANNEL_CAPACITY);
        events_tx.set_overflow(true);
        Self {
            options,
            identity: Identity::default(),
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            generation: Arc::new(AtomicU64::new(0)),
            transport: None,
            events_tx,
            _events_keepalive: events_rx.deactivate(),
        }
    }

    /// Subscribe to session events. Each subscriber receives all future
    /// events independently (broadcast pattern).
    pub fn subscribe(&self) -> async_broadcast::Receiver<SessionEvent> {
        self.events_tx.new_receiver()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *lock_state(&self.state)
    }

    /// Whether the session holds an open connection.
    pub fn is_connected(&self) -> bool {
        self.transport.is_some() && self.state() == ConnectionState::Connected
    }

    /// The identity supplied at the last `connect`.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Open the transport connection as the given identity.
    ///
    /// Trimmed, non-empty identity fields are appended to the endpoint as
    /// percent-encoded query parameters; when both are blank the address
    /// carries no query string at all.
    ///
    /// Returns [`SessionError::AlreadyConnected`] while a connection is
    /// live — the existing connection is never silently replaced. An
    /// endpoint no WebSocket can be opened to fails with
    /// [`SessionError::TransportUnsupported`] and leaves state untouched.
    /// A transport-level failure lands the session in
    /// [`ConnectionState::Closed`] with a [`SessionEvent::Closed`].
    pub async fn connect(&mut self, identity: Identity) -> Result<(), SessionError> {
        {
            let state = lock_state(&self.state);
            if matches!(
                *state,
                ConnectionState::Connecting | ConnectionState::Connected
            ) {
                debug!("connect ignored: session is {:?}", *state);
                return Err(SessionError::AlreadyConnected);
            }
        }

        let url = match build_connect_url(&self.options.url, &identity) {
            Ok(url) => url,
            Err(reason) => {
                self.emit(SessionEvent::TransportUnsupported(reason.clone()));
                return Err(SessionError::TransportUnsupported(reason));
            }
        };

        self.identity = identity;
        *lock_state(&self.state) = ConnectionState::Connecting;
        info!("ChatSession connecting to {url}");

        match WebSocketClient::try_connect(url.as_str()).await {
            Ok((client, inbound_rx)) => {
                let my_generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
                self.transport = Some(client.clone());
                *lock_state(&self.state) = ConnectionState::Connected;
                self.emit(SessionEvent::Connected);
                self.spawn_event_pump(client, inbound_rx, my_generation);
                Ok(())
            }
            Err(e) => {
                warn!("ChatSession connect failed: {e}");
                *lock_state(&self.state) = ConnectionState::Closed;
                self.emit(SessionEvent::Closed);
                Err(SessionError::Connect(e))
            }
        }
    }

    /// Send a chat message to the server.
    ///
    /// The text is trimmed before both the emptiness check and
    /// transmission. A blank `destination` is treated as absent. Fails
    /// without side effect when the text is empty or the session is not
    /// connected — no bytes reach the transport in either case.
    pub async fn send(
        &self,
        text: &str,
        kind: MessageType,
        destination: Option<&str>,
    ) -> Result<(), SessionError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        if self.state() != ConnectionState::Connected {
            return Err(SessionError::NotConnected);
        }
        let transport = self.transport.as_ref().ok_or(SessionError::NotConnected)?;

        let destination = destination
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let envelope = Envelope::outgoing(self.identity.source(), kind, trimmed, destination);
        let wire = encode(&envelope)?;
        debug!("Sending {} message ({} bytes)", envelope.message.kind, wire.len());

        transport.send(wire).await.map_err(|e| {
            warn!("Send failed: {e}");
            SessionError::NotConnected
        })
    }

    /// Convenience for plain text messages.
    pub async fn send_text(
        &self,
        text: &str,
        destination: Option<&str>,
    ) -> Result<(), SessionError> {
        self.send(text, MessageType::Text, destination).await
    }

    /// Request transport closure.
    ///
    /// Closure is asynchronous: the state transitions to
    /// [`ConnectionState::Closed`] only when the transport's close
    /// notification arrives, surfaced as [`SessionEvent::Closed`]. Inbound
    /// frames still in flight after this call are discarded.
    pub async fn disconnect(&mut self) -> Result<(), SessionError> {
        if !matches!(
            self.state(),
            ConnectionState::Connecting | ConnectionState::Connected
        ) {
            return Err(SessionError::NotConnected);
        }
        let transport = self.transport.take().ok_or(SessionError::NotConnected)?;
        info!("ChatSession disconnect requested");
        if let Err(e) = transport.close().await {
            warn!("Error closing transport: {e}");
        }
        Ok(())
    }

    fn emit(&self, event: SessionEvent) {
        // Overflow is enabled, so this only fails once the channel itself
        // is gone.
        let _ = self.events_tx.try_broadcast(event);
    }

    /// Spawn the event pump for one connection. The pump is the only task
    /// that transitions the session to `Closed`, and only while its
    /// generation is current.
    fn spawn_event_pump(
        &self,
        client: WebSocketClient,
        mut inbound_rx: mpsc::Receiver<String>,
        my_generation: u64,
    ) {
        let generation = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            while let Some(frame) = inbound_rx.recv().await {
                if generation.load(Ordering::Relaxed) != my_generation {
                    debug!("Frame for superseded connection dropped");
                    return;
                }
                // After disconnect() the handle is closed; late or
                // buffered frames must not surface.
                if !client.is_connected() {
                    debug!("Frame after disconnect dropped");
                    continue;
                }
                match decode_frame(&frame) {
                    DecodedFrame::Structured(envelope) => {
                        let event = if envelope.message.kind == MessageType::System {
                            SessionEvent::System(envelope)
                        } else {
                            SessionEvent::Message(envelope)
                        };
                        let _ = events_tx.try_broadcast(event);
                    }
                    DecodedFrame::Legacy(lines) => {
                        for line in lines {
                            let _ = events_tx.try_broadcast(SessionEvent::LegacyLine(line));
                        }
                    }
                }
            }
            if generation.load(Ordering::Relaxed) == my_generation {
                *lock_state(&state) = ConnectionState::Closed;
                info!("ChatSession connection closed");
                let _ = events_tx.try_broadcast(SessionEvent::Closed);
            } else {
                debug!("Superseded connection ended quietly");
            }
        });
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("url", &self.options.url)
            .field("state", &self.state())
            .finish()
    }
}

fn lock_state(state: &Mutex<ConnectionState>) -> MutexGuard<'_, ConnectionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Build the connect address: the configured endpoint plus trimmed,
/// non-empty identity fields as encoded query parameters.
fn build_connect_url(base: &str, identity: &Identity) -> Result<Url, String> {
    let mut url =
        Url::parse(base).map_err(|e| format!("'{base}' is not a valid endpoint: {e}"))?;
    match url.scheme() {
        "ws" | "wss" => {}
        other => return Err(format!("'{other}' is not a WebSocket scheme")),
    }
    let uid = identity.trimmed_uid();
    let username = identity.trimmed_username();
    if uid.is_some() || username.is_some() {
        let mut pairs = url.query_pairs_mut();
        if let Some(uid) = uid {
            pairs.append_pair("uid", uid);
        }
        if let Some(username) = username {
            pairs.append_pair("username", username);
        }
    }
    Ok(url)
}
