//! Crypt Core - Headless Haunted-Editor Orchestration for The Code Crypt
//!
//! This crate is the brain of the haunted code editor, completely
//! independent of any UI framework. It can drive a web view, a TUI, a
//! native GUI, or run headless for testing and demos.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         UI Surfaces                            │
//! │   ┌─────────┐   ┌─────────┐   ┌──────────────────────────┐    │
//! │   │  WebUI  │   │   TUI   │   │   Headless (crypt-demo)  │    │
//! │   └────┬────┘   └────┬────┘   └────────────┬─────────────┘    │
//! │        └─────────────┴─────────────────────┘                  │
//! │                        │                                      │
//! │                 EditorEvent (up)                              │
//! │                 CryptEffect (down)                            │
//! │                        │                                      │
//! └────────────────────────┼──────────────────────────────────────┘
//!                          │
//! ┌────────────────────────┼──────────────────────────────────────┐
//! │                     CRYPT CORE                                │
//! │  ┌─────────────────────┴─────────────────────────────────┐    │
//! │  │                      Crypt                            │    │
//! │  │  ┌─────────┐ ┌─────────┐ ┌────────┐ ┌─────────────┐   │    │
//! │  │  │ Scanner │ │Exorcism │ │ Ghosts │ │    Demo     │   │    │
//! │  │  │         │ │ Engine  │ │        │ │Orchestrator │   │    │
//! │  │  └─────────┘ └─────────┘ └────────┘ └──────┬──────┘   │    │
//! │  │        ┌─────────┐              ┌──────────┴───────┐  │    │
//! │  │        │ Buffer  │              │    Scheduler     │  │    │
//! │  │        └─────────┘              └──────────────────┘  │    │
//! │  └───────────────────────────────────────────────────────┘    │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Crypt`]: the orchestration core that owns everything
//! - [`EditorEvent`]: events sent from a surface to the core
//! - [`CryptEffect`]: effect messages sent from the core to a surface
//! - [`scanner::Finding`]: one detected syntax anomaly (a "monster")
//! - [`ExorcismEngine`]: cursed-line riddle state machine
//! - [`DemoController`]: the cancellable 20-second scripted demo
//! - [`Scheduler`]: explicit home for every delayed action
//!
//! # Quick Start
//!
//! ```ignore
//! use crypt_core::{Crypt, CryptConfig, EditorEvent};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (tx, mut rx) = mpsc::channel(100);
//!     let mut crypt = Crypt::new(CryptConfig::default(), tx);
//!     crypt.start().await;
//!
//!     crypt
//!         .handle_event(EditorEvent::BufferEdited {
//!             text: "const x = 5".to_string(),
//!         })
//!         .await;
//!
//!     // Main loop: render effects, apply fired timers.
//!     loop {
//!         while let Ok(effect) = rx.try_recv() {
//!             // Render the effect.
//!         }
//!         crypt.poll().await;
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`buffer`]: the line-oriented text buffer
//! - [`scanner`]: heuristic syntax-anomaly detection
//! - [`curses`]: the fixed line-to-riddle registry
//! - [`exorcism`]: cursed-line challenge state machine
//! - [`ghosts`]: resident ghost personalities and moods
//! - [`demo`]: the scripted, cancellable demo orchestrator
//! - [`scheduler`]: timer scheduling with first-class cancellation
//! - [`sound`]: sound cue descriptors and the audio driver seam
//! - [`resurrection`]: legacy-code modernization ritual
//! - [`events`] / [`effects`]: the surface-facing interfaces
//! - [`config`]: TOML + environment configuration
//! - [`editor`]: the `Crypt` orchestrator
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on any rendering or audio
//! framework. Sounds are described as data and handed to an injected
//! driver; visuals are requested as effect messages.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod config;
pub mod curses;
pub mod demo;
pub mod editor;
pub mod effects;
pub mod events;
pub mod exorcism;
pub mod ghosts;
pub mod resurrection;
pub mod scanner;
pub mod scheduler;
pub mod sound;

// Re-exports for convenience
pub use buffer::{ScriptBuffer, DEFAULT_SCRIPT};
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigSource,
    CryptConfig,
};
pub use curses::{CurseEntry, CurseRegistry, Difficulty};
pub use demo::{DemoAction, DemoController, DemoScript, DemoStep, DEMO_CODE};
pub use editor::{Crypt, CryptStatus};
pub use effects::{CryptEffect, NotifyLevel};
pub use events::EditorEvent;
pub use exorcism::{ChallengeSession, ExorcismEngine, ExorcismOutcome};
pub use ghosts::{Ghost, GhostMood, GhostPersonality, GhostRoster};
pub use resurrection::{ResurrectionError, ResurrectionStats};
pub use scanner::{Finding, FindingKind};
pub use scheduler::{Scheduler, TimerKey};
pub use sound::{NullDriver, SoundCue, SoundDriver, SoundEngine, SoundSpec};
