//! Per-line classifiers and the whole-buffer balance pass.
//!
//! Every function here is pure: one line of text in, at most one candidate
//! [`Finding`] out. Nesting across lines is intentionally ignored by the
//! per-line checks; the aggregate pass in [`check_overall_brackets`] is the
//! only place multi-line structure is visible.

use std::sync::OnceLock;

use regex::Regex;

use super::{Finding, FindingKind};

/// The three bracket pairs the scanner cares about, with the display name
/// used in per-line messages.
const BRACKET_PAIRS: [(char, char, &str, &str); 3] = [
    ('(', ')', "parentheses ()", "parentheses"),
    ('{', '}', "curly braces {}", "braces"),
    ('[', ']', "square brackets []", "brackets"),
];

/// Line shapes that legitimately end without a semicolon.
const SKIP_PATTERNS: [&str; 12] = [
    r"^if\s*\(",
    r"^else",
    r"^for\s*\(",
    r"^while\s*\(",
    r"^function\s+",
    r"^class\s+",
    r"^(const|let|var)\s+\w+\s*=\s*\(",
    r"\{$",
    r"\}$",
    r"^import\s+",
    r"^export\s+",
    r"^return$",
];

/// Line shapes that look like statements which should end with a semicolon.
const STATEMENT_PATTERNS: [&str; 4] = [
    r"^(const|let|var)\s+\w+\s*=\s*.+[^{]$",
    r"^return\s+.+$",
    r"^\w+\s*=\s*.+$",
    r"^\w+\(.*\)$",
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("hardcoded pattern compiles"))
        .collect()
}

fn skip_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| compile(&SKIP_PATTERNS))
}

fn statement_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| compile(&STATEMENT_PATTERNS))
}

fn escaped_quote() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"\\["'`]"#).expect("hardcoded pattern compiles"))
}

/// Whether a trimmed line is a comment (line or block opener).
#[must_use]
pub fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with("//") || trimmed.starts_with("/*")
}

/// Count occurrences of a character in a line.
fn count(line: &str, needle: char) -> usize {
    line.chars().filter(|&c| c == needle).count()
}

/// Per-line bracket count check. The first pair with mismatched open/close
/// counts wins; balanced-on-this-line pairs pass even if the whole buffer
/// is imbalanced.
#[must_use]
pub fn check_brackets(line: &str, line_number: usize) -> Option<Finding> {
    for (open, close, display, _) in BRACKET_PAIRS {
        if count(line, open) != count(line, close) {
            return Some(Finding::new(
                line_number,
                FindingKind::Bracket,
                format!("Unmatched {display}"),
            ));
        }
    }
    None
}

/// Per-line quote parity check. Escaped quotes are stripped first, then an
/// odd count of any one of `'`, `"`, backtick flags the line.
#[must_use]
pub fn check_quotes(line: &str, line_number: usize) -> Option<Finding> {
    let clean = escaped_quote().replace_all(line, "");

    if count(&clean, '\'') % 2 != 0 {
        return Some(Finding::new(
            line_number,
            FindingKind::Quote,
            "Unmatched single quote '",
        ));
    }
    if count(&clean, '"') % 2 != 0 {
        return Some(Finding::new(
            line_number,
            FindingKind::Quote,
            "Unmatched double quote \"",
        ));
    }
    if count(&clean, '`') % 2 != 0 {
        return Some(Finding::new(
            line_number,
            FindingKind::Quote,
            "Unmatched backtick `",
        ));
    }
    None
}

/// Missing-semicolon heuristic, run against the trimmed line.
///
/// Lines already ending in `;`, comment lines, and anything matching a skip
/// pattern (control structures, declarations, block openers/closers) pass.
/// Only lines that positively match a statement shape are flagged.
#[must_use]
pub fn check_semicolon(trimmed: &str, line_number: usize) -> Option<Finding> {
    if trimmed.is_empty() || is_comment(trimmed) || trimmed.ends_with(';') {
        return None;
    }

    if skip_patterns().iter().any(|p| p.is_match(trimmed)) {
        return None;
    }

    if statement_patterns().iter().any(|p| p.is_match(trimmed)) {
        return Some(Finding::new(
            line_number,
            FindingKind::Semicolon,
            "Missing semicolon ;",
        ));
    }

    None
}

/// Whole-buffer bracket balance pass.
///
/// Recounts all six bracket characters across the entire text; each
/// mismatched pair appends one finding attributed to the last line, with
/// the open/close totals in the message. This is how brackets spanning
/// multiple lines ever get reported.
#[must_use]
pub fn check_overall_brackets(text: &str) -> Vec<Finding> {
    let last_line = text.split('\n').count();
    let mut findings = Vec::new();

    for (open, close, _, aggregate_name) in BRACKET_PAIRS {
        let opens = count(text, open);
        let closes = count(text, close);
        if opens != closes {
            findings.push(Finding::new(
                last_line,
                FindingKind::Bracket,
                format!("Unmatched {aggregate_name}: {opens} open, {closes} close"),
            ));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bracket_check_first_mismatched_pair_wins() {
        let finding = check_brackets("f( {", 1).unwrap();
        assert_eq!(finding.message, "Unmatched parentheses ()");

        let finding = check_brackets("() {", 1).unwrap();
        assert_eq!(finding.message, "Unmatched curly braces {}");

        let finding = check_brackets("() {} [", 1).unwrap();
        assert_eq!(finding.message, "Unmatched square brackets []");
    }

    #[test]
    fn test_bracket_check_balanced_line_passes() {
        assert_eq!(check_brackets("const a = [f(x), {y: 1}];", 1), None);
    }

    #[test]
    fn test_quote_check_ignores_escaped_quotes() {
        assert_eq!(check_quotes(r"const s = 'it\'s fine';", 1), None);
        let finding = check_quotes("const s = 'open", 1).unwrap();
        assert_eq!(finding.message, "Unmatched single quote '");
    }

    #[test]
    fn test_quote_check_reports_first_odd_kind() {
        let finding = check_quotes(r#"'a" "#, 1).unwrap();
        assert_eq!(finding.kind, FindingKind::Quote);
        assert_eq!(finding.message, "Unmatched single quote '");

        let finding = check_quotes(r#"say("boo"#, 2).unwrap();
        assert_eq!(finding.message, "Unmatched double quote \"");

        let finding = check_quotes("tag`tpl", 3).unwrap();
        assert_eq!(finding.message, "Unmatched backtick `");
    }

    #[test]
    fn test_semicolon_flags_bare_declaration() {
        let finding = check_semicolon("const x = 5", 1).unwrap();
        assert_eq!(finding.kind, FindingKind::Semicolon);
    }

    #[test]
    fn test_semicolon_skips_control_structures() {
        assert_eq!(check_semicolon("if (x) {", 1), None);
        assert_eq!(check_semicolon("else {", 1), None);
        assert_eq!(check_semicolon("for (let i = 0; i < n; i++) {", 1), None);
        assert_eq!(check_semicolon("while (alive) {", 1), None);
        assert_eq!(check_semicolon("function spook() {", 1), None);
        assert_eq!(check_semicolon("class Ghost {", 1), None);
        assert_eq!(check_semicolon("import { rites } from './rites'", 1), None);
        assert_eq!(check_semicolon("export default Ghost", 1), None);
        assert_eq!(check_semicolon("return", 1), None);
        assert_eq!(check_semicolon("}", 1), None);
    }

    #[test]
    fn test_semicolon_skips_terminated_and_unrecognized_lines() {
        assert_eq!(check_semicolon("const x = 5;", 1), None);
        // Not statement-shaped at all: no flag either.
        assert_eq!(check_semicolon("+ 2", 1), None);
    }

    #[test]
    fn test_semicolon_flags_returns_and_calls() {
        assert!(check_semicolon("return spirits", 1).is_some());
        assert!(check_semicolon("summonSpirit()", 1).is_some());
        assert!(check_semicolon("count = count + 1", 1).is_some());
    }

    #[test]
    fn test_overall_brackets_reports_counts() {
        let findings = check_overall_brackets("((\n)");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 2);
        assert_eq!(findings[0].message, "Unmatched parentheses: 2 open, 1 close");
    }

    #[test]
    fn test_overall_brackets_balanced_across_lines() {
        assert_eq!(check_overall_brackets("f(\n)").len(), 0);
        assert_eq!(check_overall_brackets("{\n  a: [1, 2]\n}").len(), 0);
    }

    #[test]
    fn test_overall_brackets_multiple_pairs() {
        let findings = check_overall_brackets("( {");
        assert_eq!(findings.len(), 2);
        assert!(findings[0].message.starts_with("Unmatched parentheses:"));
        assert!(findings[1].message.starts_with("Unmatched braces:"));
    }
}
