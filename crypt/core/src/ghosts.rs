//! Resident Ghosts
//!
//! Three ghosts haunt every session, each with a fixed personality and a
//! small mood state machine. Ghost STATE lives here; how a surface draws a
//! ghost (floating animation, opacity, color) is the surface's business.
//!
//! Moods and quips are transient: the orchestrator schedules their
//! auto-clear through the [`crate::scheduler`], so a ghost never stays
//! startled forever.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// The fixed cast of ghost personalities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GhostPersonality {
    /// Encouraging; cheers you on and frets about your errors.
    Helper,
    /// Delights in broken code and the occasional jump scare.
    Mischief,
    /// Mostly silent. Mostly.
    Watcher,
}

impl GhostPersonality {
    /// Every resident ghost, in roster order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Helper, Self::Mischief, Self::Watcher]
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Helper => "Helper",
            Self::Mischief => "Mischief",
            Self::Watcher => "Watcher",
        }
    }
}

impl std::fmt::Display for GhostPersonality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A ghost's transient emotional state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GhostMood {
    /// Baseline drifting-about state.
    #[default]
    Neutral,
    /// Worried on your behalf (Helper).
    Concerned,
    /// Entertained by your misfortune (Mischief).
    Amused,
    /// Taking notes (Watcher).
    Observing,
}

/// One ghost: personality plus current mood and speech bubble.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ghost {
    /// Which ghost this is.
    pub personality: GhostPersonality,
    /// Current mood; reverts to Neutral when the auto-clear fires.
    pub mood: GhostMood,
    /// Current speech-bubble text, if the ghost is saying anything.
    pub message: Option<String>,
}

impl Ghost {
    /// A calm ghost of the given personality.
    #[must_use]
    pub fn new(personality: GhostPersonality) -> Self {
        Self {
            personality,
            mood: GhostMood::Neutral,
            message: None,
        }
    }

    /// React to a syntax error appearing in the buffer. Every personality
    /// has something to feel about broken code.
    pub fn react_to_error(&mut self) {
        let (mood, message) = match self.personality {
            GhostPersonality::Helper => {
                (GhostMood::Concerned, "I sense a disturbance... \u{1f50d}")
            }
            GhostPersonality::Mischief => (GhostMood::Amused, "Hehe, broken code! \u{1f608}"),
            GhostPersonality::Watcher => (GhostMood::Observing, "Interesting mistake..."),
        };
        self.mood = mood;
        self.message = Some(message.to_string());
    }

    /// Revert mood and speech to baseline.
    pub fn clear_mood(&mut self) {
        self.mood = GhostMood::Neutral;
        self.message = None;
    }

    /// Drop the speech bubble but keep the mood (quips expire faster than
    /// moods).
    pub fn clear_message(&mut self) {
        self.message = None;
    }
}

/// A spontaneous ghost act directed at the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GhostAntic {
    /// A jump scare.
    Scare(GhostPersonality),
    /// A little celebration.
    Cheer(GhostPersonality),
}

/// The full cast, plus the shared typing-activity flag the ghosts watch.
#[derive(Clone, Debug)]
pub struct GhostRoster {
    ghosts: Vec<Ghost>,
    typing_active: bool,
}

impl Default for GhostRoster {
    fn default() -> Self {
        Self::new()
    }
}

impl GhostRoster {
    /// Summon the standard three.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ghosts: GhostPersonality::all().map(Ghost::new).to_vec(),
            typing_active: false,
        }
    }

    /// Iterate the cast in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &Ghost> {
        self.ghosts.iter()
    }

    /// Look up one ghost.
    #[must_use]
    pub fn get(&self, personality: GhostPersonality) -> &Ghost {
        self.ghosts
            .iter()
            .find(|g| g.personality == personality)
            .unwrap_or(&self.ghosts[0])
    }

    fn get_mut(&mut self, personality: GhostPersonality) -> &mut Ghost {
        let index = self
            .ghosts
            .iter()
            .position(|g| g.personality == personality)
            .unwrap_or(0);
        &mut self.ghosts[index]
    }

    /// Whether someone typed recently (cleared by a scheduled timeout).
    #[must_use]
    pub fn typing_active(&self) -> bool {
        self.typing_active
    }

    /// Mark typing activity. Returns the ghosts' reactions: each entry is a
    /// quip to show (and later auto-clear).
    ///
    /// Helper pipes up rarely, Mischief even more rarely, Watcher never.
    pub fn on_typing<R: Rng>(&mut self, rng: &mut R) -> Vec<(GhostPersonality, String)> {
        self.typing_active = true;
        let mut quips = Vec::new();

        if rng.gen::<f64>() > 0.95 {
            let quip = "Looking good! \u{1f44d}".to_string();
            self.get_mut(GhostPersonality::Helper).message = Some(quip.clone());
            quips.push((GhostPersonality::Helper, quip));
        }
        if rng.gen::<f64>() > 0.98 {
            let quip = "What are you doing? \u{1f60f}".to_string();
            self.get_mut(GhostPersonality::Mischief).message = Some(quip.clone());
            quips.push((GhostPersonality::Mischief, quip));
        }

        quips
    }

    /// Typing-activity timeout fired.
    pub fn clear_typing_activity(&mut self) {
        self.typing_active = false;
    }

    /// A syntax error appeared: every ghost reacts. Returns the new
    /// (personality, mood, message) triples for the surface.
    pub fn on_error(&mut self) -> Vec<(GhostPersonality, GhostMood, Option<String>)> {
        self.ghosts
            .iter_mut()
            .map(|ghost| {
                ghost.react_to_error();
                (ghost.personality, ghost.mood, ghost.message.clone())
            })
            .collect()
    }

    /// Mood auto-clear fired for one ghost. Returns whether anything changed.
    pub fn clear_mood(&mut self, personality: GhostPersonality) -> bool {
        let ghost = self.get_mut(personality);
        let changed = ghost.mood != GhostMood::Neutral || ghost.message.is_some();
        ghost.clear_mood();
        changed
    }

    /// Quip auto-clear fired for one ghost.
    pub fn clear_message(&mut self, personality: GhostPersonality) {
        self.get_mut(personality).clear_message();
    }

    /// Periodic mischief: every few seconds the ghosts may act on their own.
    /// Mischief scares, Helper cheers, Watcher watches.
    pub fn ambient_tick<R: Rng>(&mut self, rng: &mut R) -> Vec<GhostAntic> {
        let mut antics = Vec::new();
        if rng.gen::<f64>() > 0.95 {
            antics.push(GhostAntic::Scare(GhostPersonality::Mischief));
        }
        if rng.gen::<f64>() > 0.97 {
            antics.push(GhostAntic::Cheer(GhostPersonality::Helper));
        }
        antics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_roster_has_the_standard_cast() {
        let roster = GhostRoster::new();
        let cast: Vec<GhostPersonality> = roster.iter().map(|g| g.personality).collect();
        assert_eq!(
            cast,
            vec![
                GhostPersonality::Helper,
                GhostPersonality::Mischief,
                GhostPersonality::Watcher,
            ]
        );
        assert!(roster.iter().all(|g| g.mood == GhostMood::Neutral));
    }

    #[test]
    fn test_every_ghost_reacts_to_errors() {
        let mut roster = GhostRoster::new();
        let reactions = roster.on_error();
        assert_eq!(reactions.len(), 3);
        assert_eq!(roster.get(GhostPersonality::Helper).mood, GhostMood::Concerned);
        assert_eq!(roster.get(GhostPersonality::Mischief).mood, GhostMood::Amused);
        assert_eq!(roster.get(GhostPersonality::Watcher).mood, GhostMood::Observing);
        assert!(roster.iter().take(2).all(|g| g.message.is_some()));
    }

    #[test]
    fn test_mood_clear_reverts_to_neutral() {
        let mut roster = GhostRoster::new();
        roster.on_error();
        assert!(roster.clear_mood(GhostPersonality::Mischief));
        let ghost = roster.get(GhostPersonality::Mischief);
        assert_eq!(ghost.mood, GhostMood::Neutral);
        assert_eq!(ghost.message, None);
        // Clearing an already-calm ghost reports no change.
        assert!(!roster.clear_mood(GhostPersonality::Mischief));
    }

    #[test]
    fn test_typing_marks_activity_and_sometimes_quips() {
        let mut roster = GhostRoster::new();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(!roster.typing_active());

        let mut quipped = false;
        for _ in 0..200 {
            if !roster.on_typing(&mut rng).is_empty() {
                quipped = true;
            }
        }
        assert!(roster.typing_active());
        // With 200 keystrokes the odds of total silence are negligible.
        assert!(quipped);

        roster.clear_typing_activity();
        assert!(!roster.typing_active());
    }

    #[test]
    fn test_watcher_never_quips() {
        let mut roster = GhostRoster::new();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            for (who, _) in roster.on_typing(&mut rng) {
                assert_ne!(who, GhostPersonality::Watcher);
            }
        }
    }

    #[test]
    fn test_ambient_antics_have_the_right_actors() {
        let mut roster = GhostRoster::new();
        let mut rng = StdRng::seed_from_u64(13);
        let mut saw_scare = false;
        let mut saw_cheer = false;
        for _ in 0..1000 {
            for antic in roster.ambient_tick(&mut rng) {
                match antic {
                    GhostAntic::Scare(who) => {
                        assert_eq!(who, GhostPersonality::Mischief);
                        saw_scare = true;
                    }
                    GhostAntic::Cheer(who) => {
                        assert_eq!(who, GhostPersonality::Helper);
                        saw_cheer = true;
                    }
                }
            }
        }
        assert!(saw_scare);
        assert!(saw_cheer);
    }
}
