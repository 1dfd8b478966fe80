//! Sound Cues
//!
//! The crypt never synthesizes audio itself; it describes each cue as data
//! and hands it to an injected [`SoundDriver`]. The driver abstraction is
//! the testability seam: tests and headless runs use [`NullDriver`] or a
//! channel-backed recorder, a real surface plugs in whatever audio backend
//! it has.
//!
//! The [`SoundEngine`] wraps the driver with lazy initialize-once-and-reuse
//! semantics: the driver is constructed on first playback and shared for
//! the rest of the session, as an explicit handle rather than an ambient
//! process-wide global.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The cues the crypt can ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    /// Eerie layered whisper, played when a cursed line stirs.
    GhostWhisper,
    /// Short burst of digital noise for screen glitches.
    Glitch,
    /// Deep rumble for a monster making itself known.
    MonsterGrowl,
    /// Rising three-note chime for an exorcised line.
    SuccessChime,
}

/// Oscillator shapes a driver may be asked to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    /// Pure sine tone.
    Sine,
    /// Triangle wave.
    Triangle,
    /// Sawtooth wave.
    Sawtooth,
}

/// How a voice's pitch evolves over the cue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Pitch {
    /// Exponential glide from one frequency to another across the cue.
    Ramp {
        /// Starting frequency in Hz.
        start_hz: f32,
        /// Ending frequency in Hz.
        end_hz: f32,
    },
    /// Discrete frequency steps at offsets within the cue.
    Steps(Vec<PitchStep>),
}

/// One step of a stepped pitch sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PitchStep {
    /// Frequency in Hz.
    pub hz: f32,
    /// Offset from cue start, in milliseconds.
    pub at_ms: u32,
}

/// One layer of a cue: either a pitched oscillator or plain noise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Voice {
    /// A pitched oscillator.
    Tone {
        /// Oscillator shape.
        waveform: Waveform,
        /// Pitch trajectory.
        pitch: Pitch,
    },
    /// White noise.
    Noise,
}

/// Complete description of one sound cue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoundSpec {
    /// Layered voices, played together.
    pub voices: Vec<Voice>,
    /// Total duration in milliseconds.
    pub duration_ms: u32,
    /// Default volume, 0.0 to 1.0.
    pub volume: f32,
}

impl SoundCue {
    /// The synthesis recipe for this cue.
    #[must_use]
    pub fn spec(&self) -> SoundSpec {
        match self {
            Self::GhostWhisper => SoundSpec {
                voices: vec![
                    Voice::Tone {
                        waveform: Waveform::Sine,
                        pitch: Pitch::Ramp {
                            start_hz: 200.0,
                            end_hz: 100.0,
                        },
                    },
                    Voice::Tone {
                        waveform: Waveform::Sine,
                        pitch: Pitch::Ramp {
                            start_hz: 400.0,
                            end_hz: 200.0,
                        },
                    },
                    Voice::Tone {
                        waveform: Waveform::Triangle,
                        pitch: Pitch::Ramp {
                            start_hz: 150.0,
                            end_hz: 80.0,
                        },
                    },
                ],
                duration_ms: 500,
                volume: 0.1,
            },
            Self::Glitch => SoundSpec {
                voices: vec![Voice::Noise],
                duration_ms: 100,
                volume: 0.05,
            },
            Self::MonsterGrowl => SoundSpec {
                voices: vec![Voice::Tone {
                    waveform: Waveform::Sawtooth,
                    pitch: Pitch::Ramp {
                        start_hz: 80.0,
                        end_hz: 40.0,
                    },
                }],
                duration_ms: 300,
                volume: 0.08,
            },
            // C5, E5, G5.
            Self::SuccessChime => SoundSpec {
                voices: vec![Voice::Tone {
                    waveform: Waveform::Sine,
                    pitch: Pitch::Steps(vec![
                        PitchStep {
                            hz: 523.25,
                            at_ms: 0,
                        },
                        PitchStep {
                            hz: 659.25,
                            at_ms: 100,
                        },
                        PitchStep {
                            hz: 783.99,
                            at_ms: 200,
                        },
                    ]),
                }],
                duration_ms: 400,
                volume: 0.1,
            },
        }
    }
}

impl std::fmt::Display for SoundCue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GhostWhisper => write!(f, "ghost whisper"),
            Self::Glitch => write!(f, "glitch"),
            Self::MonsterGrowl => write!(f, "monster growl"),
            Self::SuccessChime => write!(f, "success chime"),
        }
    }
}

/// Audio backend abstraction.
///
/// Implement this to actually make noise. Playback is fire-and-forget from
/// the core's perspective; a failing driver is logged and otherwise ignored.
#[async_trait]
pub trait SoundDriver: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &str;

    /// Play one cue. Implementations should return promptly (spawn their
    /// own playback work if synthesis is slow).
    async fn play(&self, cue: SoundCue, spec: &SoundSpec) -> anyhow::Result<()>;
}

/// A driver that plays nothing. The default for headless sessions.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDriver;

#[async_trait]
impl SoundDriver for NullDriver {
    fn name(&self) -> &str {
        "null"
    }

    async fn play(&self, _cue: SoundCue, _spec: &SoundSpec) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Factory that produces the driver on first use.
pub type DriverFactory = Box<dyn Fn() -> Arc<dyn SoundDriver> + Send + Sync>;

/// Shared handle to the session's audio backend.
///
/// The driver is built lazily by the injected factory the first time a cue
/// plays, then reused for the lifetime of the engine.
pub struct SoundEngine {
    driver: OnceLock<Arc<dyn SoundDriver>>,
    factory: DriverFactory,
}

impl std::fmt::Debug for SoundEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundEngine")
            .field("initialized", &self.driver.get().is_some())
            .finish()
    }
}

impl Default for SoundEngine {
    fn default() -> Self {
        Self::new(|| Arc::new(NullDriver))
    }
}

impl SoundEngine {
    /// Create an engine that will build its driver with `factory` on first
    /// playback.
    #[must_use]
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<dyn SoundDriver> + Send + Sync + 'static,
    {
        Self {
            driver: OnceLock::new(),
            factory: Box::new(factory),
        }
    }

    /// Create an engine around an already-built driver.
    #[must_use]
    pub fn with_driver(driver: Arc<dyn SoundDriver>) -> Self {
        let engine = Self::new(|| Arc::new(NullDriver));
        let _ = engine.driver.set(driver);
        engine
    }

    /// Whether the driver has been constructed yet.
    #[must_use]
    pub fn initialized(&self) -> bool {
        self.driver.get().is_some()
    }

    /// Play a cue. Initializes the driver on first call; errors are logged
    /// and swallowed — sound is never load-bearing.
    pub async fn play(&self, cue: SoundCue) {
        let driver = self.driver.get_or_init(|| (self.factory)());
        let spec = cue.spec();
        if let Err(error) = driver.play(cue, &spec).await {
            tracing::warn!(%cue, driver = driver.name(), %error, "sound playback failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_whisper_spec_matches_recipe() {
        let spec = SoundCue::GhostWhisper.spec();
        assert_eq!(spec.voices.len(), 3);
        assert_eq!(spec.duration_ms, 500);
        match &spec.voices[0] {
            Voice::Tone { waveform, pitch } => {
                assert_eq!(*waveform, Waveform::Sine);
                assert_eq!(
                    *pitch,
                    Pitch::Ramp {
                        start_hz: 200.0,
                        end_hz: 100.0
                    }
                );
            }
            Voice::Noise => panic!("whisper voices are tones"),
        }
    }

    #[test]
    fn test_chime_steps_up_the_triad() {
        let spec = SoundCue::SuccessChime.spec();
        match &spec.voices[0] {
            Voice::Tone {
                pitch: Pitch::Steps(steps),
                ..
            } => {
                let freqs: Vec<f32> = steps.iter().map(|s| s.hz).collect();
                assert_eq!(freqs, vec![523.25, 659.25, 783.99]);
            }
            other => panic!("unexpected chime voice: {other:?}"),
        }
    }

    #[test]
    fn test_glitch_is_plain_noise() {
        let spec = SoundCue::Glitch.spec();
        assert_eq!(spec.voices, vec![Voice::Noise]);
        assert_eq!(spec.duration_ms, 100);
    }

    struct CountingDriver {
        plays: AtomicUsize,
    }

    #[async_trait]
    impl SoundDriver for CountingDriver {
        fn name(&self) -> &str {
            "counting"
        }

        async fn play(&self, _cue: SoundCue, _spec: &SoundSpec) -> anyhow::Result<()> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_engine_initializes_driver_lazily_and_once() {
        static BUILDS: AtomicUsize = AtomicUsize::new(0);
        let engine = SoundEngine::new(|| {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            Arc::new(CountingDriver {
                plays: AtomicUsize::new(0),
            })
        });

        assert!(!engine.initialized());
        assert_eq!(BUILDS.load(Ordering::SeqCst), 0);

        engine.play(SoundCue::Glitch).await;
        engine.play(SoundCue::SuccessChime).await;

        assert!(engine.initialized());
        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
    }

    struct FailingDriver;

    #[async_trait]
    impl SoundDriver for FailingDriver {
        fn name(&self) -> &str {
            "failing"
        }

        async fn play(&self, _cue: SoundCue, _spec: &SoundSpec) -> anyhow::Result<()> {
            anyhow::bail!("speaker is haunted")
        }
    }

    #[tokio::test]
    async fn test_driver_failure_is_swallowed() {
        let engine = SoundEngine::with_driver(Arc::new(FailingDriver));
        // Must not panic or propagate.
        engine.play(SoundCue::GhostWhisper).await;
        assert!(engine.initialized());
    }
}
