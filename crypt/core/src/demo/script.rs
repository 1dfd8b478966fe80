//! Demo Scripts
//!
//! The fixed timelines the demo orchestrator can play. A script is a list
//! of `(offset, action)` pairs measured from a single start instant —
//! actions are NOT chained, so two entries may share an offset and fire in
//! no particular order relative to each other.

use serde::{Deserialize, Serialize};

use crate::sound::SoundCue;

/// The code typed out during the showcase demo.
///
/// Short enough that the 50 ms/char replay lands close to the 8-second
/// mark, leaving the buffer complete well before the 12-second sabotage.
/// Line 7, the haunted constant, is a cursed line in the builtin registry,
/// so the 8-second highlight points at a genuinely cursed spot.
/// `brokenCode` starts healthy; the 12-second step breaks it on stage and
/// the 15-second step repairs it, so the error monster visibly spawns and
/// despawns mid-demo.
pub const DEMO_CODE: &str = "\
// \u{1f47b} The Code Crypt
// Dead code rises...

function summon() {
  return \"spirit\";
}
const haunted = \"possessed\";

function brokenCode() {
  return \"boo\";
}";

/// The healthy line the demo sabotages.
pub const DEMO_HEALTHY_LINE: &str = "function brokenCode() {";
/// The sabotaged form of [`DEMO_HEALTHY_LINE`].
pub const DEMO_BROKEN_LINE: &str = "function brokenCode( {";

/// One scheduled demo action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemoAction {
    /// Start the character-by-character typing replay.
    BeginTyping {
        /// The full code to type out.
        code: String,
        /// Base delay per character, in milliseconds.
        char_delay_ms: u64,
    },
    /// Continuation of a typing replay; scheduled dynamically, never
    /// written into a script.
    TypeStep,
    /// Draw attention to a line.
    HighlightLine {
        /// 1-indexed line number.
        line: usize,
    },
    /// Play a sound cue.
    PlaySound {
        /// Which cue.
        cue: SoundCue,
    },
    /// Trigger the screen-glitch visual.
    TriggerGlitch,
    /// Rewrite the first occurrence of `find` in the buffer.
    ReplaceText {
        /// Text to find.
        find: String,
        /// Replacement text.
        replace: String,
    },
    /// Mark the run finished.
    Complete,
}

/// A `(offset, action)` pair within a script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoStep {
    /// Offset from the run's start instant, in milliseconds.
    pub offset_ms: u64,
    /// What fires at that offset.
    pub action: DemoAction,
}

/// A complete, named demo timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoScript {
    /// Script name, echoed in the demo lifecycle effects.
    pub name: String,
    /// Scheduled steps, in authoring order.
    pub steps: Vec<DemoStep>,
}

impl DemoScript {
    /// The 20-second showcase timeline.
    ///
    /// 0s typing begins · 8s cursed-line highlight · 8.5s whisper ·
    /// 10s glitch visual + glitch sound · 12s error injected ·
    /// 15s error fixed · 15.5s success chime · 18s final glitch ·
    /// 20s complete.
    #[must_use]
    pub fn spooky() -> Self {
        let step = |offset_ms: u64, action: DemoAction| DemoStep { offset_ms, action };
        Self {
            name: "spooky".to_string(),
            steps: vec![
                step(
                    0,
                    DemoAction::BeginTyping {
                        code: DEMO_CODE.to_string(),
                        char_delay_ms: 50,
                    },
                ),
                step(8_000, DemoAction::HighlightLine { line: 7 }),
                step(
                    8_500,
                    DemoAction::PlaySound {
                        cue: SoundCue::GhostWhisper,
                    },
                ),
                step(10_000, DemoAction::TriggerGlitch),
                step(
                    10_000,
                    DemoAction::PlaySound {
                        cue: SoundCue::Glitch,
                    },
                ),
                step(
                    12_000,
                    DemoAction::ReplaceText {
                        find: DEMO_HEALTHY_LINE.to_string(),
                        replace: DEMO_BROKEN_LINE.to_string(),
                    },
                ),
                step(
                    15_000,
                    DemoAction::ReplaceText {
                        find: DEMO_BROKEN_LINE.to_string(),
                        replace: DEMO_HEALTHY_LINE.to_string(),
                    },
                ),
                step(
                    15_500,
                    DemoAction::PlaySound {
                        cue: SoundCue::SuccessChime,
                    },
                ),
                step(18_000, DemoAction::TriggerGlitch),
                step(20_000, DemoAction::Complete),
            ],
        }
    }

    /// The 10-second quick variant.
    #[must_use]
    pub fn quick() -> Self {
        let step = |offset_ms: u64, action: DemoAction| DemoStep { offset_ms, action };
        Self {
            name: "quick".to_string(),
            steps: vec![
                step(
                    0,
                    DemoAction::BeginTyping {
                        code: "// Quick demo\nvar x = 5".to_string(),
                        char_delay_ms: 50,
                    },
                ),
                step(
                    3_000,
                    DemoAction::ReplaceText {
                        find: "var x = 5".to_string(),
                        replace: "var x = 5(".to_string(),
                    },
                ),
                step(
                    5_000,
                    DemoAction::ReplaceText {
                        find: "var x = 5(".to_string(),
                        replace: "const x = 5".to_string(),
                    },
                ),
                step(7_000, DemoAction::TriggerGlitch),
                step(10_000, DemoAction::Complete),
            ],
        }
    }

    /// Look up a script by name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "spooky" => Some(Self::spooky()),
            "quick" => Some(Self::quick()),
            _ => None,
        }
    }

    /// Total runtime: the largest step offset.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.offset_ms).max().unwrap_or(0)
    }
}

/// Static demo code snippets, for surfaces that want a canned buffer
/// without running the full timeline.
#[must_use]
pub fn variation(name: &str) -> Option<&'static str> {
    match name {
        "spooky" => Some(DEMO_CODE),
        "minimal" => Some("// Minimal demo\nfunction test() {\n  return \"haunted\";\n}"),
        "error" => Some("// Error demo\nfunction broken( {\n  return \"error\";\n}"),
        "cursed" => Some(
            "// Line 3 is cursed!\nconst x = 1;\nconst cursed = \"click me\";\nconst y = 2;",
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_spooky_timeline_shape() {
        let script = DemoScript::spooky();
        assert_eq!(script.steps.len(), 10);
        assert_eq!(script.duration_ms(), 20_000);
        // The glitch visual and glitch sound share the 10s offset.
        let at_ten: Vec<&DemoAction> = script
            .steps
            .iter()
            .filter(|s| s.offset_ms == 10_000)
            .map(|s| &s.action)
            .collect();
        assert_eq!(at_ten.len(), 2);
        // Offsets are non-decreasing in authoring order.
        let offsets: Vec<u64> = script.steps.iter().map(|s| s.offset_ms).collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
    }

    #[test]
    fn test_demo_code_types_out_healthy() {
        assert!(DEMO_CODE.contains(DEMO_HEALTHY_LINE));
        assert!(!DEMO_CODE.contains(DEMO_BROKEN_LINE));
    }

    #[test]
    fn test_demo_code_fits_the_typing_window() {
        // ~50 ms/char with occasional doubled delays must finish well
        // before the 12-second sabotage step needs the full text.
        let chars = DEMO_CODE.chars().count();
        assert!(chars <= 180, "demo code is {chars} chars");
        // The highlight step points at the haunted constant on line 7.
        assert_eq!(
            DEMO_CODE.split('\n').nth(6),
            Some("const haunted = \"possessed\";")
        );
    }

    #[test]
    fn test_by_name() {
        assert_eq!(DemoScript::by_name("spooky").unwrap().name, "spooky");
        assert_eq!(DemoScript::by_name("quick").unwrap().duration_ms(), 10_000);
        assert!(DemoScript::by_name("haunted-house").is_none());
    }

    #[test]
    fn test_variations() {
        assert!(variation("spooky").is_some());
        assert!(variation("minimal").unwrap().contains("haunted"));
        assert!(variation("cursed").unwrap().lines().count() == 4);
        assert!(variation("nope").is_none());
    }
}
