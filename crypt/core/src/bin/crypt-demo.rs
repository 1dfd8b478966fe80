//! Crypt Demo
//!
//! Headless driver for the haunted-editor core: runs the scripted demo and
//! prints every outbound effect as a JSON line, so the whole behavior of
//! the widget can be observed (and piped around) without any UI attached.
//!
//! # Usage
//!
//! ```bash
//! # Run the default 20-second showcase
//! crypt-demo
//!
//! # Run the 10-second quick variant
//! crypt-demo quick
//!
//! # With verbose logging
//! RUST_LOG=debug crypt-demo
//! ```
//!
//! # Environment Variables
//!
//! - `CRYPT_TYPING_DELAY_MS`: typing-replay speed override
//! - `CRYPT_AMBIENT`: enable/disable ambient glitches (`1`/`0`)
//! - `RUST_LOG`: log level (trace, debug, info, warn, error)
//!
//! Configuration is otherwise read from
//! `$XDG_CONFIG_HOME/code-crypt/crypt.toml`.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use crypt_core::{load_config, Crypt, CryptEffect, EditorEvent, SoundEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("crypt_demo=info".parse()?)
                .add_directive("crypt_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let (config, source) = load_config();
    info!(?source, "configuration loaded");

    let script = std::env::args().nth(1);
    info!(script = script.as_deref().unwrap_or("spooky"), "starting demo run");

    let (tx, mut rx) = mpsc::channel::<CryptEffect>(256);
    let mut crypt = Crypt::new(config, tx);
    crypt.start().await;

    // Null audio backend, built lazily on the first cue. A real surface
    // would inject its own driver here.
    let sound = SoundEngine::default();

    crypt
        .handle_event(EditorEvent::DemoStartRequested { script })
        .await;
    if !crypt.is_demo_running() {
        // The start request already reported why on the effect stream.
        while let Ok(effect) = rx.try_recv() {
            println!("{}", serde_json::to_string(&effect)?);
        }
        anyhow::bail!("demo did not start");
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(10));
    let mut done = false;
    while !done {
        tokio::select! {
            maybe_effect = rx.recv() => match maybe_effect {
                Some(effect) => {
                    if let CryptEffect::PlaySound { cue } = &effect {
                        sound.play(*cue).await;
                    }
                    println!("{}", serde_json::to_string(&effect)?);
                    if matches!(effect, CryptEffect::DemoStopped { .. }) {
                        done = true;
                    }
                }
                None => done = true,
            },
            _ = ticker.tick() => {
                crypt.poll().await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping demo");
                crypt.handle_event(EditorEvent::DemoStopRequested).await;
            }
        }
    }

    crypt.shutdown();
    let status = crypt.status();
    info!(
        lines = status.lines,
        monsters = status.monsters,
        exorcised = status.exorcised,
        "demo run finished"
    );
    Ok(())
}
