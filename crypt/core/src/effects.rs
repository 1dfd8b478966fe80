//! Crypt Effects
//!
//! Messages from the core to whatever surface is attached. Every effect is
//! fire-and-forget: the core never waits for, or consumes, a reply. A
//! surface that ignores an effect merely loses some atmosphere.
//!
//! # Design Philosophy
//!
//! The core owns all state; surfaces render what they are told. The effect
//! stream is the complete outward interface — sounds to play, visuals to
//! trigger, findings to display, riddles to pose — so a headless run can
//! log the stream as JSON lines and still observe everything the widget
//! would have done.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::exorcism::ChallengeSession;
use crate::ghosts::{GhostMood, GhostPersonality};
use crate::scanner::Finding;
use crate::sound::SoundCue;

/// Severity for surface notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    /// Informational.
    Info,
    /// Something the user should see but nothing is broken.
    Warning,
}

/// Messages from the core to a surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CryptEffect {
    // ============================================
    // Buffer & findings
    // ============================================
    /// The buffer was replaced by the core itself (demo typing, error
    /// injection, resurrection). User edits never echo back as this.
    BufferReplaced {
        /// The new full buffer text.
        text: String,
    },

    /// The deduplicated finding list changed; supersedes the previous list
    /// wholesale.
    FindingsChanged {
        /// At most one finding per line, in scan order.
        findings: Vec<Finding>,
    },

    // ============================================
    // Sound & visual atmosphere
    // ============================================
    /// Ask the surface to play a sound cue.
    PlaySound {
        /// Which cue.
        cue: SoundCue,
    },

    /// Distort the screen briefly.
    VisualGlitch {
        /// How long the distortion lasts.
        duration_ms: u64,
    },

    /// Flicker the editor chrome (wrong-answer punishment).
    Flicker {
        /// How long the flicker lasts.
        duration_ms: u64,
    },

    /// Show the floating whisper apparition.
    WhisperOverlay {
        /// How long the apparition lingers.
        duration_ms: u64,
    },

    /// Draw attention to a line (demo showcase).
    HighlightLine {
        /// 1-indexed line number.
        line: usize,
    },

    // ============================================
    // Riddles
    // ============================================
    /// A cursed line was clicked; pose its riddle.
    ChallengeOpened {
        /// The challenge to render.
        session: ChallengeSession,
    },

    /// The challenge ended (answered either way, or dismissed).
    ChallengeClosed {
        /// The line that was challenged.
        line: usize,
        /// Whether the line is now exorcised.
        exorcised: bool,
    },

    // ============================================
    // Ghosts
    // ============================================
    /// A ghost cheers for the user.
    GhostCheer {
        /// The cheering ghost.
        ghost: GhostPersonality,
    },

    /// A ghost startles the user.
    GhostScare {
        /// The offending ghost.
        ghost: GhostPersonality,
    },

    /// A ghost's mood or speech bubble changed.
    GhostMoodChanged {
        /// Which ghost.
        ghost: GhostPersonality,
        /// Its new mood.
        mood: GhostMood,
        /// Its new speech bubble, if any.
        message: Option<String>,
    },

    // ============================================
    // Demo lifecycle
    // ============================================
    /// A demo run began.
    DemoStarted {
        /// Identifier for this run.
        run_id: Uuid,
        /// Name of the script being played.
        script: String,
    },

    /// A demo run ended.
    DemoStopped {
        /// Identifier of the run that ended.
        run_id: Uuid,
        /// True when the script ran to completion, false when stopped early.
        completed: bool,
    },

    // ============================================
    // System
    // ============================================
    /// Free-form notification for the surface's status area.
    Notify {
        /// Severity.
        level: NotifyLevel,
        /// Message text.
        message: String,
    },
}

impl CryptEffect {
    /// Short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BufferReplaced { .. } => "buffer_replaced",
            Self::FindingsChanged { .. } => "findings_changed",
            Self::PlaySound { .. } => "play_sound",
            Self::VisualGlitch { .. } => "visual_glitch",
            Self::Flicker { .. } => "flicker",
            Self::WhisperOverlay { .. } => "whisper_overlay",
            Self::HighlightLine { .. } => "highlight_line",
            Self::ChallengeOpened { .. } => "challenge_opened",
            Self::ChallengeClosed { .. } => "challenge_closed",
            Self::GhostCheer { .. } => "ghost_cheer",
            Self::GhostScare { .. } => "ghost_scare",
            Self::GhostMoodChanged { .. } => "ghost_mood_changed",
            Self::DemoStarted { .. } => "demo_started",
            Self::DemoStopped { .. } => "demo_stopped",
            Self::Notify { .. } => "notify",
        }
    }
}
