//! Editor Events
//!
//! Events sent from a surface to the crypt core. Surfaces are dumb: they
//! report what the user did (typed, clicked, answered, pressed the demo
//! button) and the core decides what it means. The core answers with
//! [`crate::effects::CryptEffect`] messages.

use serde::{Deserialize, Serialize};

/// Events from a surface to the core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorEvent {
    /// The user edited the buffer; the full new text is attached.
    BufferEdited {
        /// Complete buffer contents after the edit.
        text: String,
    },

    /// The user clicked at a character offset the surface resolved from
    /// screen coordinates. An unresolvable offset is a silent no-op.
    ClickedAt {
        /// Character offset into the buffer.
        offset: usize,
    },

    /// The user clicked a line the surface already resolved.
    LineClicked {
        /// 1-indexed line number.
        line: usize,
    },

    /// The user submitted an answer to the open riddle.
    AnswerSubmitted {
        /// Raw answer text, normalized by the core.
        answer: String,
    },

    /// The user dismissed the riddle dialog without answering.
    ChallengeCancelled,

    /// The user asked for the scripted demo.
    DemoStartRequested {
        /// Named demo script to run; `None` means the default.
        script: Option<String>,
    },

    /// The user asked the demo to stop.
    DemoStopRequested,

    /// The user fed legacy code to the resurrection ritual.
    ResurrectRequested {
        /// The legacy code to modernize.
        code: String,
    },
}
