//! Syntax Scanner
//!
//! Heuristic, line-oriented syntax anomaly detection. This is deliberately
//! not a JavaScript lexer or parser: every check works on one line of text
//! (plus one whole-buffer balance pass), which keeps scanning a total, pure
//! function of the buffer — any string is valid input and identical text
//! always produces identical findings in identical order.
//!
//! # Design Philosophy
//!
//! The scanner's output is not an error condition of the system; it IS the
//! system's product. Each [`Finding`] becomes a monster perched on the
//! offending line. The pipeline is scan (raw candidates, possibly several
//! per line) followed by [`dedupe`] (first finding per line wins), so the
//! surface never shows more than one monster per line no matter how many
//! checks fired.

pub mod checks;

use serde::{Deserialize, Serialize};

/// What flavor of anomaly a finding reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Per-line or whole-buffer bracket count mismatch.
    Bracket,
    /// Odd number of unescaped quote characters on a line.
    Quote,
    /// Statement-shaped line missing its trailing semicolon.
    Semicolon,
    /// Reserved for anomalies that fit none of the dedicated checks.
    Generic,
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bracket => write!(f, "bracket"),
            Self::Quote => write!(f, "quote"),
            Self::Semicolon => write!(f, "semicolon"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// One detected syntax anomaly, attributed to a 1-indexed line.
///
/// Findings are produced fresh on every buffer mutation and never mutated;
/// the next scan supersedes the whole list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// 1-indexed line the anomaly is attributed to.
    pub line: usize,
    /// Anomaly category.
    pub kind: FindingKind,
    /// Human-readable description shown next to the monster.
    pub message: String,
}

impl Finding {
    /// Create a finding.
    #[must_use]
    pub fn new(line: usize, kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            message: message.into(),
        }
    }
}

/// Scan text for syntax anomalies.
///
/// Per non-empty, non-comment line, three independent checks run in a fixed
/// order (brackets, quotes, semicolon); each contributes at most one
/// candidate finding. After all lines, a whole-buffer bracket balance pass
/// appends one finding per mismatched pair type, attributed to the last
/// line — that pass is what catches brackets legitimately opened on one
/// line and closed on another.
///
/// The raw result may contain several findings for one line; callers that
/// display findings should pass the result through [`dedupe`].
#[must_use]
pub fn scan(text: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (index, line) in text.split('\n').enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || checks::is_comment(trimmed) {
            continue;
        }

        if let Some(finding) = checks::check_brackets(line, line_number) {
            findings.push(finding);
        }
        if let Some(finding) = checks::check_quotes(line, line_number) {
            findings.push(finding);
        }
        if let Some(finding) = checks::check_semicolon(trimmed, line_number) {
            findings.push(finding);
        }
    }

    findings.extend(checks::check_overall_brackets(text));
    findings
}

/// Collapse findings to at most one per line number, keeping the first
/// encountered in scan order. Order of survivors is preserved.
#[must_use]
pub fn dedupe(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = std::collections::HashSet::new();
    findings
        .into_iter()
        .filter(|finding| seen.insert(finding.line))
        .collect()
}

/// Convenience wrapper: scan then dedupe.
#[must_use]
pub fn scan_deduped(text: &str) -> Vec<Finding> {
    dedupe(scan(text))
}
