//! Columnar and placement checks over the raw source
//!
//! MCS input is card-image text: content must stay within columns 1-72.
//! Comments the parser recorded are blanked before measuring, and inline
//! payload lines are exempt since they follow their own conventions.

use mcs_core::{Diagnostic, DiagnosticCategory, Range};
use std::collections::{HashMap, HashSet};
use std::ops::Range as Span;

use crate::engine::AnalysisContext;

/// Last usable column
pub const COLUMN_LIMIT: usize = 72;

const COMMENT_OPEN: &str = "/*";
const COMMENT_CLOSE: &str = "*/";

pub fn check_column_limit(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    let masks = comment_spans(ctx);
    let payload = payload_lines(ctx);
    let mut diagnostics = Vec::new();

    for (line, text) in ctx.source.lines().enumerate() {
        if payload.contains(&line) {
            continue;
        }
        let visible = visible_length(text, masks.get(&line).map(Vec::as_slice).unwrap_or(&[]));
        if visible > COLUMN_LIMIT {
            diagnostics.push(Diagnostic::warning(
                DiagnosticCategory::ColumnLimit,
                Range::on_line(line, COLUMN_LIMIT, visible),
                format!("Line extends past column {COLUMN_LIMIT} ({visible} characters)"),
            ));
        }
    }

    diagnostics
}

/// Comments open on a line between two statements, outside any payload
pub fn check_standalone_comment(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    let document = ctx.document;
    let ranges: Vec<(usize, usize)> = document
        .statements()
        .iter()
        .filter_map(|&id| ctx.info(id))
        .map(|info| (info.start_line, info.end_line))
        .collect();
    let (Some(&(_, first_end)), Some(&(last_start, _))) = (ranges.first(), ranges.last()) else {
        return Vec::new();
    };

    let payload = payload_lines(ctx);
    let mut diagnostics = Vec::new();
    let mut in_comment = false;

    for (line, text) in ctx.source.lines().enumerate() {
        let between = line > first_end && line < last_start;
        let inside_statement = ranges
            .iter()
            .any(|&(start, end)| line >= start && line <= end);
        if !between || inside_statement || payload.contains(&line) {
            in_comment = false;
            continue;
        }

        let chars: Vec<char> = text.chars().collect();
        let mut index = 0;
        while index + 1 < chars.len() {
            let pair: String = chars[index..index + 2].iter().collect();
            if !in_comment && pair == COMMENT_OPEN {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticCategory::StandaloneComment,
                    Range::on_line(line, index, index + 2),
                    "Comment is outside any statement",
                ));
                in_comment = true;
                index += 2;
            } else if in_comment && pair == COMMENT_CLOSE {
                in_comment = false;
                index += 2;
            } else {
                index += 1;
            }
        }
    }

    diagnostics
}

/// Character spans covered by recorded comments, per line
fn comment_spans(ctx: &AnalysisContext<'_>) -> HashMap<usize, Vec<Span<usize>>> {
    let mut spans: HashMap<usize, Vec<Span<usize>>> = HashMap::new();

    for &id in ctx.document.comments() {
        let comment = ctx.document.node(id);
        let mut start = comment.position.character;
        for (offset, segment) in comment.value.split('\n').enumerate() {
            let length = segment.chars().count();
            spans
                .entry(comment.position.line + offset)
                .or_default()
                .push(start..start + length);
            start = 0;
        }
    }

    spans
}

/// Lines holding inline payload
fn payload_lines(ctx: &AnalysisContext<'_>) -> HashSet<usize> {
    let document = ctx.document;
    let statements = document.statements();
    let total = ctx.source.lines().count();
    let mut lines = HashSet::new();

    for (index, &id) in statements.iter().enumerate() {
        let Some(info) = ctx.info(id) else {
            continue;
        };
        if !info.has_inline_data {
            continue;
        }
        let next = statements
            .get(index + 1)
            .and_then(|&next| ctx.info(next))
            .map_or(total, |next| next.start_line);
        lines.extend(info.end_line + 1..next);
    }

    lines
}

fn visible_length(text: &str, masked: &[Span<usize>]) -> usize {
    let visible: String = text
        .chars()
        .enumerate()
        .map(|(index, c)| {
            if masked.iter().any(|span| span.contains(&index)) {
                ' '
            } else {
                c
            }
        })
        .collect();
    visible.trim_end().chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcs_core::{OperandDef, ParameterDef, SchemaCatalog, StatementDef, parse};

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new()
            .with_statement(
                StatementDef::new("MAC")
                    .with_parameter(ParameterDef::required())
                    .inline_data(true)
                    .operand(OperandDef::new("DISTLIB").with_parameter(ParameterDef::required())),
            )
            .with_statement(StatementDef::new("VER").with_parameter(ParameterDef::required()))
    }

    fn run(source: &str, check: fn(&AnalysisContext<'_>) -> Vec<Diagnostic>) -> Vec<Diagnostic> {
        let catalog = catalog();
        let document = parse(source, &catalog);
        check(&AnalysisContext::new(&document, &catalog, source))
    }

    #[test]
    fn test_column_72_boundary() {
        let exactly = format!("++VER(Z038) {}.", "X".repeat(59));
        assert_eq!(exactly.chars().count(), 72);
        assert!(run(&exactly, check_column_limit).is_empty());

        let over = format!("++VER(Z038) {}.", "X".repeat(60));
        let diagnostics = run(&over, check_column_limit);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range, Range::on_line(0, 72, 73));
    }

    #[test]
    fn test_trailing_blanks_and_comments_do_not_count() {
        let source = format!("++VER(Z038).{}", " ".repeat(80));
        assert!(run(&source, check_column_limit).is_empty());

        let commented = format!("++VER(Z038). /* {} */", "c".repeat(70));
        assert!(run(&commented, check_column_limit).is_empty());
    }

    #[test]
    fn test_payload_lines_are_exempt() {
        let source = format!("++MAC(A) DISTLIB(D).\n{}\n++VER(Z038).", "P".repeat(90));
        assert!(run(&source, check_column_limit).is_empty());
    }

    #[test]
    fn test_standalone_comment_between_statements() {
        let source = "++VER(Z038).\n/* note */\n++VER(Z039).";
        let diagnostics = run(source, check_standalone_comment);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range, Range::on_line(1, 0, 2));
    }

    #[test]
    fn test_comments_before_first_and_in_payload_are_ignored() {
        let source = "/* header */\n++MAC(A) DISTLIB(D).\n/* payload */\n++VER(Z038).";
        assert!(run(source, check_standalone_comment).is_empty());
    }

    #[test]
    fn test_multi_line_standalone_comment_reported_once() {
        let source = "++VER(Z038).\n/* one\n   two */\n++VER(Z039).";
        assert_eq!(run(source, check_standalone_comment).len(), 1);
    }
}
