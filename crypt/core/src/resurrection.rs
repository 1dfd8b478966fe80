//! Code Resurrection
//!
//! The ritual that drags legacy JavaScript out of its grave and dresses it
//! in modern idiom. Like the syntax scanner these are textual heuristics,
//! not a real parser: a handful of rewrites that make old code LOOK
//! modernized, plus a couple of advisory comments. The theatrical framing
//! is the point.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a piece of code cannot be resurrected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResurrectionError {
    /// No code at all.
    #[error("The crypt is empty! Please provide some code to resurrect.")]
    EmptyCrypt,

    /// Too little to work with.
    #[error("This code fragment is too small to resurrect. Need at least 10 characters.")]
    FragmentTooSmall,

    /// Guard against absurd inputs.
    #[error("This code is too powerful! Maximum 10,000 characters allowed.")]
    TooPowerful,
}

/// Smallest fragment worth resurrecting, in characters.
pub const MIN_RESURRECTION_CHARS: usize = 10;
/// Largest corpse the ritual accepts, in characters.
pub const MAX_RESURRECTION_CHARS: usize = 10_000;

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("hardcoded pattern compiles"))
}

fn var_decl() -> &'static Regex {
    static P: OnceLock<Regex> = OnceLock::new();
    pattern(&P, r"\bvar\s+(\w+)\s*=")
}

fn named_function() -> &'static Regex {
    static P: OnceLock<Regex> = OnceLock::new();
    pattern(&P, r"function\s+(\w+)\s*\(([^)]*)\)\s*\{")
}

fn anonymous_function() -> &'static Regex {
    static P: OnceLock<Regex> = OnceLock::new();
    pattern(&P, r"function\s*\(([^)]*)\)\s*\{")
}

fn single_quoted_concat() -> &'static Regex {
    static P: OnceLock<Regex> = OnceLock::new();
    pattern(&P, r"'([^']*)'\s*\+\s*(\w+)\s*\+\s*'([^']*)'")
}

fn double_quoted_concat() -> &'static Regex {
    static P: OnceLock<Regex> = OnceLock::new();
    pattern(&P, r#""([^"]*)"\s*\+\s*(\w+)\s*\+\s*"([^"]*)""#)
}

fn arrow_binding() -> &'static Regex {
    static P: OnceLock<Regex> = OnceLock::new();
    pattern(&P, r"(const\s+\w+\s*=\s*\([^)]*\)\s*=>)")
}

/// Validate code before resurrection.
pub fn validate(code: &str) -> Result<(), ResurrectionError> {
    if code.trim().is_empty() {
        return Err(ResurrectionError::EmptyCrypt);
    }
    let chars = code.chars().count();
    if chars < MIN_RESURRECTION_CHARS {
        return Err(ResurrectionError::FragmentTooSmall);
    }
    if chars > MAX_RESURRECTION_CHARS {
        return Err(ResurrectionError::TooPowerful);
    }
    Ok(())
}

/// Modernize legacy code.
///
/// Rewrites `var` declarations to `const`, function declarations to arrow
/// functions, simple string concatenation to template literals, and layers
/// on the ritual garnish (strict mode, advisory comments, the resurrection
/// banner). Purely textual; the input is never executed or parsed.
#[must_use]
pub fn resurrect(code: &str) -> String {
    let mut modern = code.to_string();

    modern = var_decl().replace_all(&modern, "const ${1} =").into_owned();
    modern = named_function()
        .replace_all(&modern, "const ${1} = (${2}) => {")
        .into_owned();
    modern = anonymous_function()
        .replace_all(&modern, "(${1}) => {")
        .into_owned();
    modern = single_quoted_concat()
        .replace_all(&modern, "`${1}$${${2}}${3}`")
        .into_owned();
    modern = double_quoted_concat()
        .replace_all(&modern, "`${1}$${${2}}${3}`")
        .into_owned();

    if modern.contains("callback") || modern.contains("then(") {
        modern = format!("// Consider using async/await for better readability\n{modern}");
    }

    if !modern.contains("use strict") {
        modern = format!("'use strict';\n\n{modern}");
    }

    modern = arrow_binding()
        .replace_all(
            &modern,
            "/**\n * Resurrected function - modernized by ghost AI\n */\n${1}",
        )
        .into_owned();

    if modern.contains('.') && modern.contains("const") {
        modern = format!("// Tip: Consider using destructuring for cleaner code\n{modern}");
    }

    format!(
        "// \u{1f47b} Code resurrected and modernized by Ghost AI\n\
         // Original code brought back from the crypt!\n\n{modern}"
    )
}

/// What the ritual changed, counted against the original corpse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResurrectionStats {
    /// `var` declarations converted to `const`.
    pub var_to_const: usize,
    /// Function declarations rewritten as arrow functions.
    pub functions_modernized: usize,
    /// Net lines added by the ritual (can be negative in principle).
    pub lines_added: i64,
    /// Absolute character-count difference.
    pub characters_changed: usize,
}

/// Measure a resurrection.
#[must_use]
pub fn stats(old_code: &str, new_code: &str) -> ResurrectionStats {
    let old_lines = old_code.split('\n').count() as i64;
    let new_lines = new_code.split('\n').count() as i64;
    let old_chars = old_code.chars().count();
    let new_chars = new_code.chars().count();

    ResurrectionStats {
        var_to_const: var_decl().find_iter(old_code).count(),
        functions_modernized: named_function().find_iter(old_code).count(),
        lines_added: new_lines - old_lines,
        characters_changed: old_chars.abs_diff(new_chars),
    }
}

impl ResurrectionStats {
    /// Render the spooky report, one line per non-zero stat.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        if self.var_to_const > 0 {
            lines.push(format!(
                "\u{1f987} Transformed {} ancient var declarations into modern const/let",
                self.var_to_const
            ));
        }
        if self.functions_modernized > 0 {
            lines.push(format!(
                "\u{1f47b} Modernized {} function declarations to arrow functions",
                self.functions_modernized
            ));
        }
        if self.lines_added != 0 {
            lines.push(format!(
                "\u{26b0}\u{fe0f} Added {} lines of modern JavaScript wisdom",
                self.lines_added
            ));
        }
        if self.characters_changed > 0 {
            lines.push(format!(
                "\u{1f480} Changed {} characters in the resurrection ritual",
                self.characters_changed
            ));
        }
        lines.join("\n")
    }
}
