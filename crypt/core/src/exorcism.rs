//! Exorcism Engine
//!
//! Tracks which cursed lines have been exorcised and gates the riddle
//! challenge behind a click. The engine is a small state machine over two
//! pieces of state:
//!
//! - the solved set, which only ever grows (exorcism is permanent for the
//!   session), and
//! - at most one open [`ChallengeSession`] at a time.
//!
//! Wrong answers are an expected, recoverable outcome — they close the
//! session and change nothing else. Nothing in here is fatal.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::curses::{CurseEntry, CurseRegistry};

/// The transient state while a cursed line's riddle is open for an answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeSession {
    /// Unique id for this particular challenge attempt.
    pub id: Uuid,
    /// The cursed line being challenged.
    pub line: usize,
    /// The curse being confronted (riddle, hint, difficulty).
    pub curse: CurseEntry,
}

/// Result of submitting an answer to an open challenge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExorcismOutcome {
    /// The line the answer was for.
    pub line: usize,
    /// Whether the answer matched.
    pub correct: bool,
    /// Total lines exorcised so far this session.
    pub solved_total: usize,
}

/// State machine for cursed-line challenges.
#[derive(Clone, Debug, Default)]
pub struct ExorcismEngine {
    registry: CurseRegistry,
    solved: BTreeSet<usize>,
    session: Option<ChallengeSession>,
}

impl ExorcismEngine {
    /// Create an engine over the given curse registry.
    #[must_use]
    pub fn new(registry: CurseRegistry) -> Self {
        Self {
            registry,
            solved: BTreeSet::new(),
            session: None,
        }
    }

    /// The registry this engine guards.
    #[must_use]
    pub fn registry(&self) -> &CurseRegistry {
        &self.registry
    }

    /// Handle a click on a line.
    ///
    /// Opens a challenge iff the line is cursed and not yet exorcised. An
    /// already-open session for another line is silently replaced; the
    /// abandoned riddle has no lingering effect. Clicks anywhere else are
    /// no-ops returning `None`.
    pub fn handle_click(&mut self, line: usize) -> Option<&ChallengeSession> {
        if self.solved.contains(&line) {
            return None;
        }
        let curse = self.registry.entry(line)?.clone();

        tracing::debug!(line, "opening challenge for cursed line");
        self.session = Some(ChallengeSession {
            id: Uuid::new_v4(),
            line,
            curse,
        });
        self.session.as_ref()
    }

    /// Submit an answer for the open challenge.
    ///
    /// Returns `None` when no challenge is open. Either way the session is
    /// consumed: a correct answer exorcises the line permanently, a wrong
    /// one closes the dialog and nothing more.
    pub fn submit_answer(&mut self, raw_answer: &str) -> Option<ExorcismOutcome> {
        let session = self.session.take()?;
        let correct = self.registry.check_answer(session.line, raw_answer);

        if correct {
            self.solved.insert(session.line);
            tracing::info!(line = session.line, "line exorcised");
        } else {
            tracing::debug!(line = session.line, "wrong answer, curse holds");
        }

        Some(ExorcismOutcome {
            line: session.line,
            correct,
            solved_total: self.solved.len(),
        })
    }

    /// Dismiss the open challenge without answering. Idempotent.
    pub fn cancel(&mut self) {
        self.session = None;
    }

    /// The currently open challenge, if any.
    #[must_use]
    pub fn session(&self) -> Option<&ChallengeSession> {
        self.session.as_ref()
    }

    /// Whether a line has been exorcised this session.
    #[must_use]
    pub fn is_exorcised(&self, line: usize) -> bool {
        self.solved.contains(&line)
    }

    /// Lines exorcised so far, ascending. Always the live set — callers
    /// must not cache this across events.
    #[must_use]
    pub fn solved(&self) -> &BTreeSet<usize> {
        &self.solved
    }

    /// Count of exorcised lines.
    #[must_use]
    pub fn solved_count(&self) -> usize {
        self.solved.len()
    }

    /// Count of lines still cursed.
    #[must_use]
    pub fn cursed_remaining(&self) -> usize {
        self.registry.len() - self.solved.len()
    }
}
