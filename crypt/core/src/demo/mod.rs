//! Demo Orchestrator
//!
//! Plays a fixed [`DemoScript`] against wall-clock offsets, with
//! first-class cancellation. The controller holds the run state (active
//! flag, run identity, typing replay position); the actual timers live in
//! the caller's [`Scheduler`] under [`DEMO_TIMER_GROUP`], so `stop()` can
//! cancel every pending handle in one call and a cancelled run can never
//! mutate the buffer afterwards.
//!
//! Two layers of suppression protect a stopped run, mirroring the timer
//! discipline described in [`crate::scheduler`]:
//!
//! 1. `stop()` aborts all pending demo timers, and
//! 2. every action the caller applies re-checks [`DemoController::is_running`]
//!    first, which catches actions that had already fired into the queue
//!    when the stop arrived.

pub mod script;

pub use script::{DemoAction, DemoScript, DemoStep, DEMO_CODE};

use std::time::Duration;

use uuid::Uuid;

use crate::scheduler::Scheduler;

/// Scheduler group holding every timer of the current demo run.
pub const DEMO_TIMER_GROUP: &str = "demo";
/// Scheduler group holding the external safety-net stop timer.
pub const DEMO_GUARD_GROUP: &str = "demo-guard";

/// Identity of one demo run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemoRun {
    /// Unique id for this run.
    pub id: Uuid,
    /// Name of the script being played.
    pub script_name: String,
}

/// Progress of the character-by-character typing replay.
#[derive(Clone, Debug)]
struct TypingReplay {
    chars: Vec<char>,
    typed: usize,
    char_delay_ms: u64,
}

/// What the caller should do after one typing step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeOutcome {
    /// A character was typed: rewrite the buffer to `prefix` and schedule
    /// the next step after `next_delay_ms`.
    Typed {
        /// The code typed so far.
        prefix: String,
        /// Delay before the next character (doubled on a stumble).
        next_delay_ms: u64,
    },
    /// The whole string has been typed.
    Finished,
    /// No replay is in progress.
    Idle,
}

/// State machine for the scripted demo.
#[derive(Debug, Default)]
pub struct DemoController {
    active: bool,
    run: Option<DemoRun>,
    typing: Option<TypingReplay>,
}

impl DemoController {
    /// A controller with no run in progress.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a run is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active
    }

    /// The current (or, after completion, final) run identity.
    #[must_use]
    pub fn run(&self) -> Option<&DemoRun> {
        self.run.as_ref()
    }

    /// Start a run, scheduling every script step as an independent timer
    /// measured from now.
    ///
    /// Returns `None` (a strict no-op: no timers touched, no state changed)
    /// when a run is already active. `wrap` lifts each [`DemoAction`] into
    /// the caller's scheduler action type.
    pub fn start<A, F>(
        &mut self,
        script: &DemoScript,
        scheduler: &Scheduler<A>,
        wrap: F,
    ) -> Option<Uuid>
    where
        A: Send + 'static,
        F: Fn(DemoAction) -> A,
    {
        if self.active {
            tracing::debug!("demo already running, start ignored");
            return None;
        }

        let run_id = Uuid::new_v4();
        self.active = true;
        self.typing = None;
        self.run = Some(DemoRun {
            id: run_id,
            script_name: script.name.clone(),
        });

        for step in &script.steps {
            scheduler.schedule_in(
                DEMO_TIMER_GROUP,
                Duration::from_millis(step.offset_ms),
                wrap(step.action.clone()),
            );
        }

        tracing::info!(script = %script.name, %run_id, steps = script.steps.len(), "demo started");
        Some(run_id)
    }

    /// Stop the run: flip the active flag and cancel every pending demo
    /// timer (safety-net guard included). Idempotent; returns the id of the
    /// run that was stopped, or `None` when nothing was running.
    pub fn stop<A: Send + 'static>(&mut self, scheduler: &Scheduler<A>) -> Option<Uuid> {
        let cancelled = scheduler.cancel_group(DEMO_TIMER_GROUP);
        scheduler.cancel_group(DEMO_GUARD_GROUP);

        if !self.active {
            return None;
        }
        self.active = false;
        self.typing = None;

        let run_id = self.run.as_ref().map(|r| r.id);
        tracing::info!(?run_id, cancelled, "demo stopped");
        run_id
    }

    /// Mark the run complete (the script's final step fired). Returns the
    /// finished run's id.
    pub fn complete(&mut self) -> Option<Uuid> {
        if !self.active {
            return None;
        }
        self.active = false;
        self.typing = None;
        self.run.as_ref().map(|r| r.id)
    }

    /// Begin a typing replay (the `BeginTyping` action fired).
    pub fn begin_typing(&mut self, code: &str, char_delay_ms: u64) {
        self.typing = Some(TypingReplay {
            chars: code.chars().collect(),
            typed: 0,
            char_delay_ms,
        });
    }

    /// Advance the typing replay by one character.
    ///
    /// `stumble` doubles the delay before the next character, the
    /// occasional hesitation that keeps the replay from looking robotic.
    pub fn type_next(&mut self, stumble: bool) -> TypeOutcome {
        if !self.active {
            return TypeOutcome::Idle;
        }
        let Some(replay) = self.typing.as_mut() else {
            return TypeOutcome::Idle;
        };
        if replay.typed >= replay.chars.len() {
            self.typing = None;
            return TypeOutcome::Finished;
        }

        replay.typed += 1;
        let prefix: String = replay.chars[..replay.typed].iter().collect();
        let next_delay_ms = if stumble {
            replay.char_delay_ms * 2
        } else {
            replay.char_delay_ms
        };
        TypeOutcome::Typed {
            prefix,
            next_delay_ms,
        }
    }
}
