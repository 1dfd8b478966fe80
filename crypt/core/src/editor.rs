//! The Crypt
//!
//! The orchestration core tying everything together. The `Crypt` owns all
//! state — buffer, findings, exorcism progress, ghosts, demo run — and is
//! UI-agnostic: it receives [`EditorEvent`]s from whatever surface is
//! attached and answers with [`CryptEffect`] messages over a channel.
//!
//! # Execution model
//!
//! Everything runs on one cooperative context. Event handling is atomic:
//! one event is fully processed (scan, dedupe, effects) before the next is
//! looked at. Timed behavior goes through the [`Scheduler`]; fired timer
//! actions are queued and applied by [`Crypt::poll`], so a timer never
//! mutates state concurrently with an event handler. Every demo action
//! re-checks the run's active flag when applied, which is what makes
//! `stop()` effective even against timers that fired before the stop
//! arrived.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::buffer::ScriptBuffer;
use crate::config::CryptConfig;
use crate::curses::CurseRegistry;
use crate::demo::{
    DemoAction, DemoController, DemoScript, TypeOutcome, DEMO_GUARD_GROUP, DEMO_TIMER_GROUP,
};
use crate::effects::{CryptEffect, NotifyLevel};
use crate::events::EditorEvent;
use crate::exorcism::ExorcismEngine;
use crate::ghosts::{GhostAntic, GhostPersonality, GhostRoster};
use crate::resurrection;
use crate::scanner::{self, Finding};
use crate::scheduler::{Scheduler, TimerKey};
use crate::sound::SoundCue;

/// Scheduler group for ambient glitches and spontaneous ghost antics.
const AMBIENT_GROUP: &str = "ambient";

/// Internal timer actions drained by [`Crypt::poll`].
#[derive(Clone, Debug)]
enum CryptAction {
    Demo(DemoAction),
    DemoGuard { run_id: Uuid },
    ClearGhostMood(GhostPersonality),
    ClearGhostQuip(GhostPersonality),
    ClearTypingActivity,
    AmbientGlitch,
    GhostAnticTick,
}

/// Snapshot of the status-bar counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CryptStatus {
    /// Buffer line count.
    pub lines: usize,
    /// Cursed lines not yet exorcised.
    pub cursed_remaining: usize,
    /// Lines exorcised this session.
    pub exorcised: usize,
    /// Times the user has been scared.
    pub scares: u64,
    /// Times the ghosts cheered.
    pub cheers: u64,
    /// Monsters currently on screen (one per displayed finding).
    pub monsters: usize,
    /// Whether any finding is present.
    pub has_errors: bool,
    /// Whether a demo run is active.
    pub demo_running: bool,
}

/// The haunted-editor orchestration core.
pub struct Crypt {
    config: CryptConfig,
    buffer: ScriptBuffer,
    findings: Vec<Finding>,
    has_errors: bool,
    exorcism: ExorcismEngine,
    ghosts: GhostRoster,
    demo: DemoController,
    scheduler: Scheduler<CryptAction>,
    tx: mpsc::Sender<CryptEffect>,
    rng: StdRng,
    scares: u64,
    cheers: u64,
    mood_timers: HashMap<GhostPersonality, TimerKey>,
    quip_timers: HashMap<GhostPersonality, TimerKey>,
    activity_timer: Option<TimerKey>,
    started: bool,
}

impl Crypt {
    /// Create a crypt with the builtin curses.
    #[must_use]
    pub fn new(config: CryptConfig, tx: mpsc::Sender<CryptEffect>) -> Self {
        Self::with_registry(config, CurseRegistry::builtin(), tx)
    }

    /// Create a crypt haunted by a custom curse registry.
    #[must_use]
    pub fn with_registry(
        config: CryptConfig,
        registry: CurseRegistry,
        tx: mpsc::Sender<CryptEffect>,
    ) -> Self {
        let buffer = ScriptBuffer::default();
        let findings = scanner::scan_deduped(buffer.text());
        let has_errors = !findings.is_empty();
        Self {
            config,
            buffer,
            findings,
            has_errors,
            exorcism: ExorcismEngine::new(registry),
            ghosts: GhostRoster::new(),
            demo: DemoController::new(),
            scheduler: Scheduler::new(),
            tx,
            rng: StdRng::from_entropy(),
            scares: 0,
            cheers: 0,
            mood_timers: HashMap::new(),
            quip_timers: HashMap::new(),
            activity_timer: None,
            started: false,
        }
    }

    /// Announce the initial buffer and findings, and start the ambient
    /// background behaviors. Idempotent.
    pub async fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        self.emit(CryptEffect::BufferReplaced {
            text: self.buffer.text().to_string(),
        })
        .await;
        self.emit(CryptEffect::FindingsChanged {
            findings: self.findings.clone(),
        })
        .await;

        if self.config.ambient.enabled {
            self.schedule_ambient_glitch();
            self.schedule_ghost_tick();
        }
        tracing::info!(ambient = self.config.ambient.enabled, "crypt opened");
    }

    /// Cancel every pending timer and stop any demo run. The crypt can
    /// still process events afterwards, but nothing scheduled survives.
    pub fn shutdown(&mut self) {
        self.demo.stop(&self.scheduler);
        self.scheduler.cancel_all();
        self.mood_timers.clear();
        self.quip_timers.clear();
        self.activity_timer = None;
        tracing::info!("crypt closed");
    }

    /// Route one surface event.
    pub async fn handle_event(&mut self, event: EditorEvent) {
        match event {
            EditorEvent::BufferEdited { text } => {
                self.buffer.replace(text);
                self.after_buffer_change(false).await;
            }
            EditorEvent::ClickedAt { offset } => match self.buffer.line_at_char(offset) {
                Some(line) => self.handle_line_click(line).await,
                None => {
                    // Unresolvable coordinates are an environment fault, not
                    // an error: swallow quietly.
                    tracing::debug!(offset, "click offset outside buffer, ignoring");
                }
            },
            EditorEvent::LineClicked { line } => self.handle_line_click(line).await,
            EditorEvent::AnswerSubmitted { answer } => self.handle_answer(&answer).await,
            EditorEvent::ChallengeCancelled => {
                let open_line = self.exorcism.session().map(|s| s.line);
                self.exorcism.cancel();
                if let Some(line) = open_line {
                    self.emit(CryptEffect::ChallengeClosed {
                        line,
                        exorcised: false,
                    })
                    .await;
                }
            }
            EditorEvent::DemoStartRequested { script } => self.handle_demo_start(script).await,
            EditorEvent::DemoStopRequested => {
                if let Some(run_id) = self.demo.stop(&self.scheduler) {
                    self.emit(CryptEffect::DemoStopped {
                        run_id,
                        completed: false,
                    })
                    .await;
                }
            }
            EditorEvent::ResurrectRequested { code } => self.handle_resurrect(&code).await,
        }
    }

    /// Drain and apply every timer action that has fired since the last
    /// poll. Call this from the driving loop.
    pub async fn poll(&mut self) {
        while let Some(action) = self.scheduler.try_next() {
            self.apply(action).await;
        }
    }

    /// Current status-bar counters.
    #[must_use]
    pub fn status(&self) -> CryptStatus {
        CryptStatus {
            lines: self.buffer.line_count(),
            cursed_remaining: self.exorcism.cursed_remaining(),
            exorcised: self.exorcism.solved_count(),
            scares: self.scares,
            cheers: self.cheers,
            monsters: self.findings.len(),
            has_errors: self.has_errors,
            demo_running: self.demo.is_running(),
        }
    }

    /// The buffer as the core currently sees it.
    #[must_use]
    pub fn buffer(&self) -> &ScriptBuffer {
        &self.buffer
    }

    /// The currently displayed (deduplicated) findings.
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// The exorcism state machine.
    #[must_use]
    pub fn exorcism(&self) -> &ExorcismEngine {
        &self.exorcism
    }

    /// The resident ghosts.
    #[must_use]
    pub fn ghosts(&self) -> &GhostRoster {
        &self.ghosts
    }

    /// Whether a demo run is active.
    #[must_use]
    pub fn is_demo_running(&self) -> bool {
        self.demo.is_running()
    }

    // ========================================================================
    // Event handling internals
    // ========================================================================

    async fn handle_line_click(&mut self, line: usize) {
        let session = match self.exorcism.handle_click(line) {
            Some(session) => session.clone(),
            None => return,
        };
        self.emit(CryptEffect::ChallengeOpened { session }).await;
        self.emit(CryptEffect::PlaySound {
            cue: SoundCue::GhostWhisper,
        })
        .await;
        self.emit(CryptEffect::WhisperOverlay {
            duration_ms: self.config.flourish.whisper_overlay_ms,
        })
        .await;
    }

    async fn handle_answer(&mut self, answer: &str) {
        let Some(outcome) = self.exorcism.submit_answer(answer) else {
            return;
        };

        self.emit(CryptEffect::ChallengeClosed {
            line: outcome.line,
            exorcised: outcome.correct,
        })
        .await;

        if outcome.correct {
            self.cheers += 1;
            self.emit(CryptEffect::GhostCheer {
                ghost: GhostPersonality::Helper,
            })
            .await;
            self.emit(CryptEffect::PlaySound {
                cue: SoundCue::SuccessChime,
            })
            .await;
        } else {
            self.scares += 1;
            self.emit(CryptEffect::GhostScare {
                ghost: GhostPersonality::Mischief,
            })
            .await;
            self.emit(CryptEffect::Flicker {
                duration_ms: self.config.flourish.flicker_ms,
            })
            .await;
            self.emit(CryptEffect::VisualGlitch {
                duration_ms: self.config.flourish.glitch_ms,
            })
            .await;
            self.emit(CryptEffect::PlaySound {
                cue: SoundCue::Glitch,
            })
            .await;
        }
    }

    async fn handle_demo_start(&mut self, script_name: Option<String>) {
        if !self.config.demo.enabled {
            self.emit(CryptEffect::Notify {
                level: NotifyLevel::Warning,
                message: "The demo is disabled in this crypt.".to_string(),
            })
            .await;
            return;
        }

        let script = match script_name.as_deref() {
            None => DemoScript::spooky(),
            Some(name) => match DemoScript::by_name(name) {
                Some(script) => script,
                None => {
                    self.emit(CryptEffect::Notify {
                        level: NotifyLevel::Warning,
                        message: format!("Unknown demo script: {name}"),
                    })
                    .await;
                    return;
                }
            },
        };

        // A second start while running is a strict no-op: the check happens
        // before the buffer is touched.
        let Some(run_id) = self
            .demo
            .start(&script, &self.scheduler, CryptAction::Demo)
        else {
            return;
        };

        self.buffer.replace("");
        self.after_buffer_change(true).await;

        // Safety net outside the demo's own timeline: even if the Complete
        // step goes missing, the running indicator cannot outlive the
        // script by more than a second.
        self.scheduler.schedule_in(
            DEMO_GUARD_GROUP,
            Duration::from_millis(script.duration_ms() + 1_000),
            CryptAction::DemoGuard { run_id },
        );

        self.emit(CryptEffect::DemoStarted {
            run_id,
            script: script.name.clone(),
        })
        .await;
    }

    async fn handle_resurrect(&mut self, code: &str) {
        if let Err(error) = resurrection::validate(code) {
            self.emit(CryptEffect::Notify {
                level: NotifyLevel::Warning,
                message: error.to_string(),
            })
            .await;
            return;
        }

        let revived = resurrection::resurrect(code);
        let stats = resurrection::stats(code, &revived);
        self.buffer.replace(revived);
        self.after_buffer_change(true).await;

        let summary = stats.summary();
        if !summary.is_empty() {
            self.emit(CryptEffect::Notify {
                level: NotifyLevel::Info,
                message: summary,
            })
            .await;
        }
    }

    /// Everything that happens when the buffer text changes, regardless of
    /// who changed it: rescan, finding diff, ghost reactions.
    ///
    /// `from_core` controls whether the new text is echoed out as a
    /// [`CryptEffect::BufferReplaced`] — user edits already know their own
    /// text, core-driven mutations (demo typing, resurrection) do not.
    async fn after_buffer_change(&mut self, from_core: bool) {
        if from_core {
            self.emit(CryptEffect::BufferReplaced {
                text: self.buffer.text().to_string(),
            })
            .await;
        }

        let new_findings = scanner::scan_deduped(self.buffer.text());
        if new_findings != self.findings {
            let previous_lines: HashSet<usize> = self.findings.iter().map(|f| f.line).collect();
            let monster_spawned = new_findings
                .iter()
                .any(|f| !previous_lines.contains(&f.line));

            self.findings = new_findings.clone();
            self.emit(CryptEffect::FindingsChanged {
                findings: new_findings,
            })
            .await;

            if monster_spawned {
                self.emit(CryptEffect::PlaySound {
                    cue: SoundCue::MonsterGrowl,
                })
                .await;
            }
        }

        let now_has_errors = !self.findings.is_empty();
        if now_has_errors && !self.has_errors {
            self.ghost_error_reactions().await;
        }
        self.has_errors = now_has_errors;

        self.ghost_typing_reactions().await;
    }

    async fn ghost_error_reactions(&mut self) {
        let linger = Duration::from_millis(self.config.flourish.mood_linger_ms);
        for (ghost, mood, message) in self.ghosts.on_error() {
            self.emit(CryptEffect::GhostMoodChanged {
                ghost,
                mood,
                message,
            })
            .await;

            // A fresh reaction restarts the ghost's clear timer.
            if let Some(key) = self.mood_timers.remove(&ghost) {
                self.scheduler.cancel(key);
            }
            let key = self
                .scheduler
                .schedule(linger, CryptAction::ClearGhostMood(ghost));
            self.mood_timers.insert(ghost, key);
        }
    }

    async fn ghost_typing_reactions(&mut self) {
        let quips = self.ghosts.on_typing(&mut self.rng);
        let linger = Duration::from_millis(self.config.flourish.quip_linger_ms);
        for (ghost, quip) in quips {
            let mood = self.ghosts.get(ghost).mood;
            self.emit(CryptEffect::GhostMoodChanged {
                ghost,
                mood,
                message: Some(quip),
            })
            .await;

            if let Some(key) = self.quip_timers.remove(&ghost) {
                self.scheduler.cancel(key);
            }
            let key = self
                .scheduler
                .schedule(linger, CryptAction::ClearGhostQuip(ghost));
            self.quip_timers.insert(ghost, key);
        }

        // Each keystroke pushes the activity deadline out again.
        if let Some(key) = self.activity_timer.take() {
            self.scheduler.cancel(key);
        }
        self.activity_timer = Some(self.scheduler.schedule(
            Duration::from_millis(self.config.flourish.typing_activity_ms),
            CryptAction::ClearTypingActivity,
        ));
    }

    // ========================================================================
    // Timer action application
    // ========================================================================

    async fn apply(&mut self, action: CryptAction) {
        match action {
            CryptAction::Demo(action) => self.apply_demo_action(action).await,
            CryptAction::DemoGuard { run_id } => {
                let current = self.demo.run().map(|r| r.id);
                if self.demo.is_running() && current == Some(run_id) {
                    tracing::warn!(%run_id, "demo safety net fired before the script completed");
                    if let Some(stopped) = self.demo.stop(&self.scheduler) {
                        self.emit(CryptEffect::DemoStopped {
                            run_id: stopped,
                            completed: false,
                        })
                        .await;
                    }
                }
            }
            CryptAction::ClearGhostMood(ghost) => {
                self.mood_timers.remove(&ghost);
                if self.ghosts.clear_mood(ghost) {
                    self.emit(CryptEffect::GhostMoodChanged {
                        ghost,
                        mood: crate::ghosts::GhostMood::Neutral,
                        message: None,
                    })
                    .await;
                }
            }
            CryptAction::ClearGhostQuip(ghost) => {
                self.quip_timers.remove(&ghost);
                self.ghosts.clear_message(ghost);
                let mood = self.ghosts.get(ghost).mood;
                self.emit(CryptEffect::GhostMoodChanged {
                    ghost,
                    mood,
                    message: None,
                })
                .await;
            }
            CryptAction::ClearTypingActivity => {
                self.activity_timer = None;
                self.ghosts.clear_typing_activity();
            }
            CryptAction::AmbientGlitch => {
                self.emit(CryptEffect::VisualGlitch {
                    duration_ms: self.config.flourish.glitch_ms,
                })
                .await;
                self.emit(CryptEffect::PlaySound {
                    cue: SoundCue::Glitch,
                })
                .await;
                self.schedule_ambient_glitch();
            }
            CryptAction::GhostAnticTick => {
                let antics = self.ghosts.ambient_tick(&mut self.rng);
                for antic in antics {
                    match antic {
                        GhostAntic::Scare(ghost) => {
                            self.scares += 1;
                            self.emit(CryptEffect::GhostScare { ghost }).await;
                        }
                        GhostAntic::Cheer(ghost) => {
                            self.cheers += 1;
                            self.emit(CryptEffect::GhostCheer { ghost }).await;
                        }
                    }
                }
                self.schedule_ghost_tick();
            }
        }
    }

    async fn apply_demo_action(&mut self, action: DemoAction) {
        // The run may have been stopped between this action firing and the
        // poll that delivers it; a dead run's actions are dropped here.
        if !self.demo.is_running() {
            tracing::debug!("demo action suppressed, run no longer active");
            return;
        }

        match action {
            DemoAction::BeginTyping {
                code,
                char_delay_ms,
            } => {
                self.demo.begin_typing(&code, char_delay_ms);
                self.demo_type_step().await;
            }
            DemoAction::TypeStep => self.demo_type_step().await,
            DemoAction::HighlightLine { line } => {
                self.emit(CryptEffect::HighlightLine { line }).await;
            }
            DemoAction::PlaySound { cue } => {
                self.emit(CryptEffect::PlaySound { cue }).await;
            }
            DemoAction::TriggerGlitch => {
                self.emit(CryptEffect::VisualGlitch {
                    duration_ms: self.config.flourish.glitch_ms,
                })
                .await;
            }
            DemoAction::ReplaceText { find, replace } => {
                let new_text = self.buffer.text().replacen(&find, &replace, 1);
                self.buffer.replace(new_text);
                self.after_buffer_change(true).await;
            }
            DemoAction::Complete => {
                if let Some(run_id) = self.demo.complete() {
                    self.scheduler.cancel_group(DEMO_TIMER_GROUP);
                    self.scheduler.cancel_group(DEMO_GUARD_GROUP);
                    self.emit(CryptEffect::DemoStopped {
                        run_id,
                        completed: true,
                    })
                    .await;
                }
            }
        }
    }

    async fn demo_type_step(&mut self) {
        let stumble = self.rng.gen::<f64>() < self.config.typing.stumble_chance;
        match self.demo.type_next(stumble) {
            TypeOutcome::Typed {
                prefix,
                next_delay_ms,
            } => {
                self.buffer.replace(prefix);
                self.after_buffer_change(true).await;
                self.scheduler.schedule_in(
                    DEMO_TIMER_GROUP,
                    Duration::from_millis(next_delay_ms),
                    CryptAction::Demo(DemoAction::TypeStep),
                );
            }
            TypeOutcome::Finished | TypeOutcome::Idle => {}
        }
    }

    // ========================================================================
    // Ambient scheduling
    // ========================================================================

    fn schedule_ambient_glitch(&mut self) {
        let delay = self
            .rng
            .gen_range(self.config.ambient.glitch_min_ms..=self.config.ambient.glitch_max_ms);
        self.scheduler.schedule_in(
            AMBIENT_GROUP,
            Duration::from_millis(delay),
            CryptAction::AmbientGlitch,
        );
    }

    fn schedule_ghost_tick(&mut self) {
        self.scheduler.schedule_in(
            AMBIENT_GROUP,
            Duration::from_millis(self.config.ambient.ghost_tick_ms),
            CryptAction::GhostAnticTick,
        );
    }

    async fn emit(&self, effect: CryptEffect) {
        if let Err(error) = self.tx.send(effect).await {
            tracing::warn!(%error, "surface channel closed, effect dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> CryptConfig {
        let mut config = CryptConfig::default();
        // Keep the background noise out of deterministic tests.
        config.ambient.enabled = false;
        config
    }

    fn drain(rx: &mut mpsc::Receiver<CryptEffect>) -> Vec<CryptEffect> {
        let mut effects = Vec::new();
        while let Ok(effect) = rx.try_recv() {
            effects.push(effect);
        }
        effects
    }

    async fn opened_crypt() -> (Crypt, mpsc::Receiver<CryptEffect>) {
        let (tx, mut rx) = mpsc::channel(256);
        let mut crypt = Crypt::new(quiet_config(), tx);
        crypt.start().await;
        drain(&mut rx);
        (crypt, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_announces_buffer_and_findings() {
        let (tx, mut rx) = mpsc::channel(256);
        let mut crypt = Crypt::new(quiet_config(), tx);
        crypt.start().await;

        let effects = drain(&mut rx);
        assert!(matches!(effects[0], CryptEffect::BufferReplaced { .. }));
        assert!(matches!(effects[1], CryptEffect::FindingsChanged { .. }));

        // start() is idempotent.
        crypt.start().await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_rescans_and_reports_findings() {
        let (mut crypt, mut rx) = opened_crypt().await;

        crypt
            .handle_event(EditorEvent::BufferEdited {
                text: "const x = 5".to_string(),
            })
            .await;

        let effects = drain(&mut rx);
        let findings = effects.iter().find_map(|e| match e {
            CryptEffect::FindingsChanged { findings } => Some(findings.clone()),
            _ => None,
        });
        let findings = findings.expect("an edit with an error reports findings");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 1);
        // No BufferReplaced echo for user edits.
        assert!(!effects
            .iter()
            .any(|e| matches!(e, CryptEffect::BufferReplaced { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_rescans_stay_silent() {
        let (mut crypt, mut rx) = opened_crypt().await;
        crypt
            .handle_event(EditorEvent::BufferEdited {
                text: "const x = 5".to_string(),
            })
            .await;
        drain(&mut rx);

        // Same text again: findings are identical, so no FindingsChanged.
        crypt
            .handle_event(EditorEvent::BufferEdited {
                text: "const x = 5".to_string(),
            })
            .await;
        let effects = drain(&mut rx);
        assert!(!effects
            .iter()
            .any(|e| matches!(e, CryptEffect::FindingsChanged { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cursed_click_opens_challenge_with_whisper() {
        let (mut crypt, mut rx) = opened_crypt().await;

        crypt.handle_event(EditorEvent::LineClicked { line: 3 }).await;

        let effects = drain(&mut rx);
        let session = effects.iter().find_map(|e| match e {
            CryptEffect::ChallengeOpened { session } => Some(session.clone()),
            _ => None,
        });
        let session = session.expect("line 3 is cursed");
        assert_eq!(session.line, 3);
        assert!(effects.iter().any(|e| matches!(
            e,
            CryptEffect::PlaySound {
                cue: SoundCue::GhostWhisper
            }
        )));
        assert!(effects
            .iter()
            .any(|e| matches!(e, CryptEffect::WhisperOverlay { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_plain_click_and_bad_offset_are_silent() {
        let (mut crypt, mut rx) = opened_crypt().await;

        crypt.handle_event(EditorEvent::LineClicked { line: 5 }).await;
        crypt
            .handle_event(EditorEvent::ClickedAt { offset: 1_000_000 })
            .await;

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_correct_answer_exorcises_and_cheers() {
        let (mut crypt, mut rx) = opened_crypt().await;

        crypt.handle_event(EditorEvent::LineClicked { line: 3 }).await;
        drain(&mut rx);
        crypt
            .handle_event(EditorEvent::AnswerSubmitted {
                answer: "  Echo ".to_string(),
            })
            .await;

        let effects = drain(&mut rx);
        assert!(effects.iter().any(|e| matches!(
            e,
            CryptEffect::ChallengeClosed {
                line: 3,
                exorcised: true
            }
        )));
        assert!(effects.iter().any(|e| matches!(
            e,
            CryptEffect::PlaySound {
                cue: SoundCue::SuccessChime
            }
        )));

        let status = crypt.status();
        assert_eq!(status.exorcised, 1);
        assert_eq!(status.cheers, 1);
        assert_eq!(status.cursed_remaining, 2);

        // A second click on the exorcised line is a no-op.
        crypt.handle_event(EditorEvent::LineClicked { line: 3 }).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_answer_scares_and_flickers() {
        let (mut crypt, mut rx) = opened_crypt().await;

        crypt.handle_event(EditorEvent::LineClicked { line: 7 }).await;
        drain(&mut rx);
        crypt
            .handle_event(EditorEvent::AnswerSubmitted {
                answer: "shadows".to_string(),
            })
            .await;

        let effects = drain(&mut rx);
        assert!(effects.iter().any(|e| matches!(
            e,
            CryptEffect::ChallengeClosed {
                line: 7,
                exorcised: false
            }
        )));
        assert!(effects
            .iter()
            .any(|e| matches!(e, CryptEffect::Flicker { .. })));
        assert!(effects
            .iter()
            .any(|e| matches!(e, CryptEffect::GhostScare { .. })));

        let status = crypt.status();
        assert_eq!(status.exorcised, 0);
        assert_eq!(status.scares, 1);
        assert_eq!(status.cursed_remaining, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ghost_moods_react_to_errors_and_auto_clear() {
        let (mut crypt, mut rx) = opened_crypt().await;

        // Put the buffer into a clean state first so the next error is a
        // rising edge.
        crypt
            .handle_event(EditorEvent::BufferEdited {
                text: "const x = 5;".to_string(),
            })
            .await;
        drain(&mut rx);

        crypt
            .handle_event(EditorEvent::BufferEdited {
                text: "const x = 5".to_string(),
            })
            .await;
        let effects = drain(&mut rx);
        let moods = effects
            .iter()
            .filter(|e| matches!(e, CryptEffect::GhostMoodChanged { .. }))
            .count();
        assert!(moods >= 3, "all three ghosts react, got {moods}");

        // After the linger the moods clear back to neutral.
        tokio::time::sleep(Duration::from_millis(3_100)).await;
        crypt.poll().await;
        assert!(crypt
            .ghosts()
            .iter()
            .all(|g| g.mood == crate::ghosts::GhostMood::Neutral));
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_double_start_is_noop() {
        let (mut crypt, mut rx) = opened_crypt().await;

        crypt
            .handle_event(EditorEvent::DemoStartRequested { script: None })
            .await;
        drain(&mut rx);
        let buffer_before = crypt.buffer().text().to_string();

        crypt
            .handle_event(EditorEvent::DemoStartRequested { script: None })
            .await;
        assert!(drain(&mut rx).is_empty());
        assert_eq!(crypt.buffer().text(), buffer_before);
        assert!(crypt.is_demo_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_stop_suppresses_later_actions() {
        let (mut crypt, mut rx) = opened_crypt().await;

        crypt
            .handle_event(EditorEvent::DemoStartRequested { script: None })
            .await;
        drain(&mut rx);

        // Let the demo run to t=9s, then stop it.
        tokio::time::sleep(Duration::from_millis(9_000)).await;
        crypt.poll().await;
        crypt.handle_event(EditorEvent::DemoStopRequested).await;
        assert!(!crypt.is_demo_running());
        drain(&mut rx);

        // World clock reaches t=21s: the 12s error injection must not
        // have happened.
        tokio::time::sleep(Duration::from_millis(12_000)).await;
        crypt.poll().await;
        drain(&mut rx);
        assert!(!crypt.buffer().text().contains("function brokenCode( {"));
        assert!(!crypt.is_demo_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_runs_to_completion() {
        let (mut crypt, mut rx) = opened_crypt().await;

        crypt
            .handle_event(EditorEvent::DemoStartRequested {
                script: Some("quick".to_string()),
            })
            .await;
        assert!(crypt.is_demo_running());
        drain(&mut rx);

        // Walk the clock past the end of the script, polling as we go the
        // way a real driving loop would.
        for _ in 0..1_200 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            crypt.poll().await;
        }

        assert!(!crypt.is_demo_running());
        let effects = drain(&mut rx);
        assert!(effects.iter().any(|e| matches!(
            e,
            CryptEffect::DemoStopped {
                completed: true,
                ..
            }
        )));
        // The quick script's last rewrite leaves modern code behind.
        assert_eq!(crypt.buffer().text(), "// Quick demo\nconst x = 5");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_demo_script_notifies() {
        let (mut crypt, mut rx) = opened_crypt().await;
        crypt
            .handle_event(EditorEvent::DemoStartRequested {
                script: Some("seance".to_string()),
            })
            .await;
        let effects = drain(&mut rx);
        assert!(effects.iter().any(|e| matches!(
            e,
            CryptEffect::Notify {
                level: NotifyLevel::Warning,
                ..
            }
        )));
        assert!(!crypt.is_demo_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resurrection_replaces_buffer_and_reports() {
        let (mut crypt, mut rx) = opened_crypt().await;

        crypt
            .handle_event(EditorEvent::ResurrectRequested {
                code: "var ghost = 'boo';\nfunction haunt() {\n  return ghost;\n}".to_string(),
            })
            .await;

        let effects = drain(&mut rx);
        assert!(effects
            .iter()
            .any(|e| matches!(e, CryptEffect::BufferReplaced { .. })));
        assert!(effects.iter().any(|e| matches!(
            e,
            CryptEffect::Notify {
                level: NotifyLevel::Info,
                ..
            }
        )));
        assert!(crypt.buffer().text().contains("const ghost ="));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resurrection_rejects_tiny_fragments() {
        let (mut crypt, mut rx) = opened_crypt().await;
        let before = crypt.buffer().text().to_string();

        crypt
            .handle_event(EditorEvent::ResurrectRequested {
                code: "x = 1".to_string(),
            })
            .await;

        let effects = drain(&mut rx);
        assert!(effects.iter().any(|e| matches!(
            e,
            CryptEffect::Notify {
                level: NotifyLevel::Warning,
                ..
            }
        )));
        assert_eq!(crypt.buffer().text(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_everything() {
        let (mut crypt, mut rx) = opened_crypt().await;
        crypt
            .handle_event(EditorEvent::DemoStartRequested { script: None })
            .await;
        drain(&mut rx);

        crypt.shutdown();
        assert!(!crypt.is_demo_running());

        // Nothing fires after shutdown.
        tokio::time::sleep(Duration::from_secs(30)).await;
        crypt.poll().await;
        let effects = drain(&mut rx);
        assert!(
            !effects
                .iter()
                .any(|e| matches!(e, CryptEffect::BufferReplaced { .. })),
            "no timer survived shutdown"
        );
    }
}
