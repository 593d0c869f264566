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

//! Minimal terminal chat client.
//!
//! Connects to a wirechat server, prints received events, and sends each
//! stdin line as a text message. An empty line exits.
//!
//! ```sh
//! cargo run --example terminal_chat -- ws://127.0.0.1:8080/api/v1/chat/connect u1 alice
//! ```

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::level_filters::LevelFilter;
use wirechat_client::{ChatSession, SessionEvent, SessionOptions};
use wirechat_types::Identity;

#[tokio::main]
async fn main() -> Result<()> {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .finish(),
    )
    .unwrap();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .unwrap_or_else(|| "ws://127.0.0.1:8080/api/v1/chat/connect".to_string());
    let uid = args.next().unwrap_or_default();
    let username = args.next().unwrap_or_default();

    let mut session = ChatSession::new(SessionOptions { url });
    let mut events = session.subscribe();
    session
        .connect(Identity {
            uid: Some(uid),
            username: Some(username),
        })
        .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(SessionEvent::Connected) => println!("** connected **"),
                Ok(SessionEvent::Closed) => {
                    println!("** connection closed **");
                    return Ok(());
                }
                Ok(SessionEvent::TransportUnsupported(reason)) => {
                    println!("** transport unavailable: {reason} **");
                    return Ok(());
                }
                Ok(SessionEvent::Message(envelope)) => {
                    let who = if envelope.is_from(session.identity()) {
                        "you".to_string()
                    } else {
                        envelope.source.name.clone()
                    };
                    println!("{who}: {}", envelope.message.content.text);
                }
                Ok(SessionEvent::System(envelope)) => {
                    println!("** {} **", envelope.message.content.text);
                }
                Ok(SessionEvent::LegacyLine(line)) => println!("{line}"),
                Err(_) => return Ok(()),
            },
            line = lines.next_line() => match line? {
                Some(line) if !line.trim().is_empty() => {
                    if let Err(e) = session.send_text(&line, None).await {
                        eprintln!("send failed: {e}");
                    }
                }
                _ => break,
            },
        }
    }

    session.disconnect().await?;
    // Wait for the close notification before exiting.
    while let Ok(event) = events.recv().await {
        if event == SessionEvent::Closed {
            break;
        }
    }
    Ok(())
}
