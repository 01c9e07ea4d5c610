//! Groups cleaned lines into logical statements
//!
//! A statement starts on a line whose trimmed text begins with `++` and runs
//! until a terminator at parenthesis depth zero. Comments are already masked
//! by the scanner, so only depth and quoted literals need tracking here.

use crate::scanner::{QUOTE, TERMINATOR, is_statement_start};

/// One logical statement and the physical lines it was collected from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedStatement {
    /// Zero-based line of the introducer
    pub start_line: usize,
    /// Cleaned lines; the last one is cut just after the terminator
    pub lines: Vec<String>,
    /// Lines joined with a single space, the text the tree builder parses
    pub joined_text: String,
    pub unbalanced_parens: bool,
    pub terminated: bool,
}

impl CollectedStatement {
    pub fn end_line(&self) -> usize {
        self.start_line + self.lines.len().saturating_sub(1)
    }

    pub fn is_multi_line(&self) -> bool {
        self.lines.len() > 1
    }
}

#[derive(Debug, Default)]
struct DepthTracker {
    depth: usize,
    stray_close: bool,
}

impl DepthTracker {
    /// Feed one line; returns the character index of a terminator at depth zero
    fn feed(&mut self, line: &str) -> Option<usize> {
        let mut quoted = false;
        for (index, current) in line.chars().enumerate() {
            if quoted {
                if current == QUOTE {
                    quoted = false;
                }
                continue;
            }
            match current {
                QUOTE => quoted = true,
                '(' => self.depth += 1,
                ')' => {
                    if self.depth == 0 {
                        self.stray_close = true;
                    } else {
                        self.depth -= 1;
                    }
                }
                TERMINATOR if self.depth == 0 => return Some(index),
                _ => {}
            }
        }
        None
    }

    fn unbalanced(&self) -> bool {
        self.depth != 0 || self.stray_close
    }
}

/// Collect every statement from scanner output
pub fn collect(lines: &[String]) -> Vec<CollectedStatement> {
    let mut statements = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        if !is_statement_start(&lines[index]) {
            index += 1;
            continue;
        }

        let start_line = index;
        let mut tracker = DepthTracker::default();
        let mut collected: Vec<String> = Vec::new();
        let mut terminated = false;

        while index < lines.len() {
            let line = &lines[index];
            if index > start_line && is_statement_start(line) {
                break;
            }
            index += 1;
            if let Some(end) = tracker.feed(line) {
                collected.push(line.chars().take(end + 1).collect());
                terminated = true;
                break;
            }
            collected.push(line.clone());
        }

        statements.push(CollectedStatement {
            start_line,
            joined_text: collected.join(" "),
            lines: collected,
            unbalanced_parens: tracker.unbalanced(),
            terminated,
        });
    }

    tracing::debug!("Collected {} statements", statements.len());
    statements
}
