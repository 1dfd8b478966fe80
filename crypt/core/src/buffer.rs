//! Script Buffer
//!
//! The text being haunted. The buffer is deliberately simple: an owned string
//! mutated only by whole-buffer replacement. Surfaces send the full text on
//! every edit and the core re-derives everything else (findings, status
//! counts) from scratch, so there is no incremental diff state to corrupt.
//!
//! Line numbers are 1-indexed everywhere in this crate, matching what an
//! editor gutter shows the user.

use serde::{Deserialize, Serialize};

/// The script every new crypt session opens with.
pub const DEFAULT_SCRIPT: &str = "\
// Welcome to the Haunted Editor...
// Where code writes itself... or does it? \u{1f47b}

function summonSpirit() {
  const spirits = ['\u{1f47b}', '\u{1f987}', '\u{1f577}\u{fe0f}', '\u{26b0}\u{fe0f}'];
  return spirits[Math.floor(Math.random() * spirits.length)];
}

console.log('The crypt awakens...', summonSpirit());

// Beware: Your code may be possessed...
";

/// A line-oriented text buffer, replaced wholesale on every edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptBuffer {
    text: String,
}

impl Default for ScriptBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SCRIPT)
    }
}

impl ScriptBuffer {
    /// Create a buffer holding the given text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Create an empty buffer.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// The full buffer text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the entire contents. This is the only mutation the buffer
    /// supports.
    pub fn replace(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Whether the buffer holds no text at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of lines, counted the way an editor gutter counts them: the
    /// empty buffer has one (empty) line, and a trailing newline opens a
    /// final empty line.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Iterate over lines in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// Get a line by 1-indexed number, or `None` when out of range.
    #[must_use]
    pub fn line(&self, number: usize) -> Option<&str> {
        if number == 0 {
            return None;
        }
        self.text.split('\n').nth(number - 1)
    }

    /// Total character count (not bytes; click offsets arrive in characters).
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Resolve a character offset to the 1-indexed line containing it.
    ///
    /// An offset equal to the buffer length resolves to the last line (a
    /// cursor sitting at the very end still belongs to a line). Anything
    /// beyond that is unresolvable and returns `None`; callers treat that as
    /// a silent no-op rather than an error.
    #[must_use]
    pub fn line_at_char(&self, offset: usize) -> Option<usize> {
        let mut consumed = 0usize;
        for (index, line) in self.text.split('\n').enumerate() {
            let line_chars = line.chars().count();
            if offset <= consumed + line_chars {
                return Some(index + 1);
            }
            // +1 for the newline that terminated this line (absent on the last,
            // which makes any offset <= char_count resolve inside the loop).
            consumed += line_chars + 1;
        }
        None
    }
}
