//! Comment-masking line scanner
//!
//! Walks the source one physical line at a time and produces cleaned lines in
//! which every comment character is replaced by a blank, so character offsets
//! in the cleaned text equal offsets in the original. Two pieces of state
//! carry across lines: whether a block comment is open, and whether the
//! cursor is inside a statement.
//!
//! Comments are only recognized inside statements. Lines outside statements
//! (including inline payload, which may legitimately contain `/*`) are passed
//! through untouched.

use crate::document::Position;
use crate::schema::STATEMENT_INTRODUCER;

const COMMENT_OPEN: (char, char) = ('/', '*');
const COMMENT_CLOSE: (char, char) = ('*', '/');

/// Character ending a statement
pub const TERMINATOR: char = '.';

/// Character delimiting a quoted literal
pub const QUOTE: char = '\'';

/// A comment found while scanning, positioned at its open marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedComment {
    pub position: Position,
    /// Full comment text including markers; line breaks are kept as `\n`
    pub text: String,
    /// Close marker was found
    pub terminated: bool,
}

/// Result of scanning a whole source text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutput {
    /// One cleaned line per physical line
    pub lines: Vec<String>,
    pub comments: Vec<ScannedComment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InBlockComment,
    InQuotedLiteral,
}

#[derive(Debug)]
struct PendingComment {
    line: usize,
    character: usize,
    text: String,
}

/// Line scanner state machine
#[derive(Debug)]
pub struct Scanner {
    state: ScanState,
    inside_statement: bool,
    depth: usize,
    pending: Option<PendingComment>,
    comments: Vec<ScannedComment>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            state: ScanState::Normal,
            inside_statement: false,
            depth: 0,
            pending: None,
            comments: Vec::new(),
        }
    }

    /// Whether the last scanned line left the scanner inside a statement
    pub fn inside_statement(&self) -> bool {
        self.inside_statement
    }

    /// Whether a block comment is open at the end of the last scanned line
    pub fn in_block_comment(&self) -> bool {
        self.state == ScanState::InBlockComment
    }

    /// Scan one physical line and return its cleaned form
    pub fn scan_line(&mut self, line_no: usize, raw: &str) -> String {
        if self.state != ScanState::InBlockComment && is_statement_start(raw) {
            self.inside_statement = true;
            self.depth = 0;
        }

        if self.state == ScanState::InBlockComment {
            if let Some(pending) = self.pending.as_mut() {
                pending.text.push('\n');
            }
        } else if !self.inside_statement {
            return raw.to_string();
        }

        let chars: Vec<char> = raw.chars().collect();
        let mut cleaned = String::with_capacity(raw.len());
        let mut terminated = false;
        let mut i = 0;

        while i < chars.len() {
            let current = chars[i];
            let next = chars.get(i + 1).copied();

            match self.state {
                ScanState::InBlockComment => {
                    if (current, next) == (COMMENT_CLOSE.0, Some(COMMENT_CLOSE.1)) {
                        self.close_comment();
                        cleaned.push_str("  ");
                        i += 2;
                        continue;
                    }
                    if let Some(pending) = self.pending.as_mut() {
                        pending.text.push(current);
                    }
                    cleaned.push(' ');
                }
                ScanState::InQuotedLiteral => {
                    if current == QUOTE {
                        self.state = ScanState::Normal;
                    }
                    cleaned.push(current);
                }
                ScanState::Normal => {
                    if (current, next) == (COMMENT_OPEN.0, Some(COMMENT_OPEN.1)) {
                        self.pending = Some(PendingComment {
                            line: line_no,
                            character: i,
                            text: String::from("/*"),
                        });
                        self.state = ScanState::InBlockComment;
                        cleaned.push_str("  ");
                        i += 2;
                        continue;
                    }
                    match current {
                        QUOTE => self.state = ScanState::InQuotedLiteral,
                        '(' => self.depth += 1,
                        ')' => self.depth = self.depth.saturating_sub(1),
                        TERMINATOR if self.depth == 0 => terminated = true,
                        _ => {}
                    }
                    cleaned.push(current);
                }
            }
            i += 1;
        }

        if self.state == ScanState::InQuotedLiteral {
            self.state = ScanState::Normal;
        }
        if terminated {
            self.inside_statement = false;
        }
        cleaned
    }

    fn close_comment(&mut self) {
        self.state = ScanState::Normal;
        if let Some(mut pending) = self.pending.take() {
            pending.text.push_str("*/");
            self.comments.push(finalize(pending, true));
        }
    }

    /// Finish scanning; an open block comment runs to end of input
    pub fn finish(mut self) -> Vec<ScannedComment> {
        if let Some(pending) = self.pending.take() {
            tracing::trace!(
                "Block comment opened at line {} runs to end of input",
                pending.line + 1
            );
            self.comments.push(finalize(pending, false));
        }
        self.comments
    }
}

fn finalize(pending: PendingComment, terminated: bool) -> ScannedComment {
    let length = pending.text.chars().count();
    ScannedComment {
        position: Position::new(pending.line, pending.character, length),
        text: pending.text,
        terminated,
    }
}

/// Whether a physical line opens a new statement
pub fn is_statement_start(line: &str) -> bool {
    line.trim_start().starts_with(STATEMENT_INTRODUCER)
}

/// Scan a complete source text
pub fn scan(text: &str) -> ScanOutput {
    let mut scanner = Scanner::new();
    let lines = text
        .lines()
        .enumerate()
        .map(|(line_no, raw)| scanner.scan_line(line_no, raw))
        .collect();
    ScanOutput {
        lines,
        comments: scanner.finish(),
    }
}

/// Drop block comments from a value, keeping quoted literals intact
///
/// An unterminated comment runs to the end of the text.
pub fn strip_comments(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut state = ScanState::Normal;
    let mut i = 0;

    while i < chars.len() {
        let pair = (chars[i], chars.get(i + 1).copied().unwrap_or(' '));
        match state {
            ScanState::Normal if pair == COMMENT_OPEN => {
                state = ScanState::InBlockComment;
                i += 2;
                continue;
            }
            ScanState::InBlockComment if pair == COMMENT_CLOSE => {
                state = ScanState::Normal;
                i += 2;
                continue;
            }
            ScanState::InBlockComment => {}
            ScanState::Normal => {
                if chars[i] == QUOTE {
                    state = ScanState::InQuotedLiteral;
                }
                out.push(chars[i]);
            }
            ScanState::InQuotedLiteral => {
                if chars[i] == QUOTE {
                    state = ScanState::Normal;
                }
                out.push(chars[i]);
            }
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comments_keeps_quoted_markers() {
        assert_eq!(strip_comments("ONE /* c */ TWO"), "ONE  TWO");
        assert_eq!(strip_comments("'A/*B' /* x\n y */C"), "'A/*B' C");
        assert_eq!(strip_comments("X /* open"), "X ");
    }

    #[test]
    fn test_same_line_comment_is_masked_in_place() {
        let output = scan("++MAC(A) /* note */ DISTLIB(X).");
        assert_eq!(output.lines[0], "++MAC(A)            DISTLIB(X).");
        assert_eq!(output.comments.len(), 1);
        assert_eq!(output.comments[0].text, "/* note */");
        assert_eq!(output.comments[0].position, Position::new(0, 9, 10));
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let text = "++MAC(A) /* first\nsecond line\nend */ DISTLIB(X).";
        let output = scan(text);

        assert_eq!(output.lines[0], "++MAC(A)         ");
        assert_eq!(output.lines[1], "           ");
        assert_eq!(output.lines[2], "       DISTLIB(X).");

        let comment = &output.comments[0];
        assert_eq!(comment.text, "/* first\nsecond line\nend */");
        assert_eq!(comment.position.line, 0);
        assert_eq!(comment.position.character, 9);
        assert_eq!(
            comment.position.slice(text).as_deref(),
            Some(comment.text.as_str())
        );
    }

    #[test]
    fn test_comments_outside_statements_are_ignored() {
        let text = "/* header */\n++VER(Z038) FMID(ABC).\n/* between */";
        let output = scan(text);
        assert!(output.comments.is_empty());
        assert_eq!(output.lines[0], "/* header */");
        assert_eq!(output.lines[2], "/* between */");
    }

    #[test]
    fn test_payload_after_terminator_is_untouched() {
        let text = "++JCLIN.\n//STEP EXEC PGM=X\n/*\n";
        let output = scan(text);
        assert!(output.comments.is_empty());
        assert_eq!(output.lines[2], "/*");
    }

    #[test]
    fn test_period_inside_parentheses_does_not_terminate() {
        let mut scanner = Scanner::new();
        scanner.scan_line(0, "++JCLIN FROMDS(DSN(MY.DATA.SET)");
        assert!(scanner.inside_statement());
        scanner.scan_line(1, "  NUMBER(1)) .");
        assert!(!scanner.inside_statement());
    }

    #[test]
    fn test_comment_markers_inside_quotes_are_literal() {
        let output = scan("++HOLD(A) REASON('/*X') .");
        assert!(output.comments.is_empty());
        assert_eq!(output.lines[0], "++HOLD(A) REASON('/*X') .");
    }

    #[test]
    fn test_terminator_inside_comment_is_ignored() {
        let mut scanner = Scanner::new();
        scanner.scan_line(0, "++MAC(A) /* ends here. */");
        assert!(scanner.inside_statement());
        scanner.scan_line(1, " DISTLIB(X).");
        assert!(!scanner.inside_statement());
    }

    #[test]
    fn test_unterminated_comment_runs_to_end() {
        let output = scan("++MAC(A) /* never closed\nDISTLIB(X).");
        assert_eq!(output.comments.len(), 1);
        let comment = &output.comments[0];
        assert!(!comment.terminated);
        assert_eq!(comment.text, "/* never closed\nDISTLIB(X).");
        assert_eq!(output.lines[1], "           ");
    }

    #[test]
    fn test_trailing_comment_on_terminator_line_is_recorded() {
        let output = scan("++VER(Z038) FMID(ABC). /* trailing */");
        assert_eq!(output.comments.len(), 1);
        assert_eq!(output.comments[0].position.character, 23);
    }
}
