//! Cursed Lines
//!
//! The fixed mapping from line numbers to riddles. A cursed line stays
//! cursed until its riddle is answered correctly, at which point it is
//! exorcised for the rest of the session (see [`crate::exorcism`]).
//!
//! Curses are positional: they bind to a line NUMBER, not to the text that
//! happens to live there. Editing the buffer never moves or lifts a curse.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How hard a riddle is meant to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Solvable on the first read.
    Easy,
    /// Takes a moment.
    Medium,
    /// Genuinely tricky.
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

/// One cursed line: the riddle guarding it and the answer that lifts it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurseEntry {
    /// 1-indexed line this curse binds to.
    pub line: usize,
    /// The riddle shown when the line is clicked.
    pub riddle: String,
    /// Expected answer, compared case- and whitespace-insensitively.
    pub answer: String,
    /// Hint offered to stuck visitors.
    pub hint: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
}

/// Normalize an answer for comparison: lower-case and trimmed.
#[must_use]
pub fn normalize_answer(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// The set of cursed lines for a session. Fixed at construction, never
/// mutated afterwards.
#[derive(Clone, Debug)]
pub struct CurseRegistry {
    entries: BTreeMap<usize, CurseEntry>,
}

impl Default for CurseRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CurseRegistry {
    /// The crypt's canonical three curses, on lines 3, 7, and 12.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_entries(vec![
            CurseEntry {
                line: 3,
                riddle: "I speak without a mouth and hear without ears. I have no body, \
                         but come alive with wind. What am I?"
                    .to_string(),
                answer: "echo".to_string(),
                hint: "Think about sound and programming...".to_string(),
                difficulty: Difficulty::Easy,
            },
            CurseEntry {
                line: 7,
                riddle: "The more you take, the more you leave behind. What am I?".to_string(),
                answer: "footsteps".to_string(),
                hint: "Think about walking...".to_string(),
                difficulty: Difficulty::Medium,
            },
            CurseEntry {
                line: 12,
                riddle: "I am not alive, but I grow; I don't have lungs, but I need air; \
                         I don't have a mouth, but water kills me. What am I?"
                    .to_string(),
                answer: "fire".to_string(),
                hint: "Think about elements...".to_string(),
                difficulty: Difficulty::Hard,
            },
        ])
    }

    /// Build a registry from arbitrary entries (useful for tests and
    /// alternative hauntings). Later entries for the same line replace
    /// earlier ones.
    #[must_use]
    pub fn from_entries(entries: Vec<CurseEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.line, e)).collect(),
        }
    }

    /// Whether the given line carries a curse.
    #[must_use]
    pub fn is_cursed(&self, line: usize) -> bool {
        self.entries.contains_key(&line)
    }

    /// Look up the curse on a line.
    #[must_use]
    pub fn entry(&self, line: usize) -> Option<&CurseEntry> {
        self.entries.get(&line)
    }

    /// All cursed line numbers, ascending.
    pub fn lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }

    /// Number of curses in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no curses at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check a raw answer against the curse on a line. Unknown lines are
    /// never correct.
    #[must_use]
    pub fn check_answer(&self, line: usize, raw_answer: &str) -> bool {
        self.entries
            .get(&line)
            .is_some_and(|entry| normalize_answer(raw_answer) == normalize_answer(&entry.answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_curses() {
        let registry = CurseRegistry::builtin();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.lines().collect::<Vec<_>>(), vec![3, 7, 12]);
        assert!(registry.is_cursed(3));
        assert!(!registry.is_cursed(4));
        assert_eq!(registry.entry(7).unwrap().answer, "footsteps");
        assert_eq!(registry.entry(12).unwrap().difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_check_answer_normalizes() {
        let registry = CurseRegistry::builtin();
        assert!(registry.check_answer(3, "echo"));
        assert!(registry.check_answer(3, "  Echo "));
        assert!(registry.check_answer(3, "ECHO"));
        assert!(!registry.check_answer(3, "echoes"));
        assert!(!registry.check_answer(99, "echo"));
    }

    #[test]
    fn test_from_entries_last_wins() {
        let mk = |answer: &str| CurseEntry {
            line: 1,
            riddle: "?".to_string(),
            answer: answer.to_string(),
            hint: String::new(),
            difficulty: Difficulty::Easy,
        };
        let registry = CurseRegistry::from_entries(vec![mk("old"), mk("new")]);
        assert_eq!(registry.len(), 1);
        assert!(registry.check_answer(1, "new"));
    }
}
