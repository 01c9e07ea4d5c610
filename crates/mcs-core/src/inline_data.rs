//! Inline payload detection
//!
//! Some statements are followed by free-form payload lines (JCL, source,
//! shell text) up to the next statement. A statement expects payload only
//! when its schema allows it, it was terminated, and none of its operands
//! point the content elsewhere.

use crate::document::{Document, NodeId};

/// Operands naming an external payload source
pub const EXTERNAL_SOURCE_OPERANDS: [&str; 3] = ["FROMDS", "RELFILE", "TXLIB"];

/// Operand marking the element for deletion
pub const DELETE_OPERAND: &str = "DELETE";

/// Whether a built statement is eligible for payload lines
pub fn expects_inline_data(document: &Document, statement: NodeId) -> bool {
    let node = document.node(statement);
    let capable = node.statement_def().is_some_and(|def| def.inline_data);
    let terminated = node
        .statement
        .as_ref()
        .is_some_and(|info| info.has_terminator);
    if !capable || !terminated {
        return false;
    }

    !document.operands(statement).any(|(_, operand)| {
        let name = operand
            .operand_def()
            .map(|def| def.name.as_str())
            .unwrap_or(operand.name.as_str());
        name == DELETE_OPERAND || EXTERNAL_SOURCE_OPERANDS.contains(&name)
    })
}

/// Count payload lines after `end_line` up to `next_statement` (exclusive)
pub fn count_payload_lines(raw_lines: &[&str], end_line: usize, next_statement: usize) -> usize {
    raw_lines
        .iter()
        .take(next_statement)
        .skip(end_line + 1)
        .filter(|line| !line.trim().is_empty())
        .count()
}

/// Fill in the payload attributes of a statement
///
/// Returns whether the statement expects payload.
pub fn detect(
    document: &mut Document,
    statement: NodeId,
    raw_lines: &[&str],
    next_statement: usize,
) -> bool {
    let expects = expects_inline_data(document, statement);
    let node = document.node_mut(statement);
    let Some(info) = node.statement.as_mut() else {
        return false;
    };

    info.expects_inline_data = expects;
    if expects {
        info.inline_data_lines = count_payload_lines(raw_lines, info.end_line, next_statement);
        info.has_inline_data = info.inline_data_lines > 0;
        tracing::trace!(
            "Statement '{}' carries {} payload lines",
            node.name,
            info.inline_data_lines
        );
    }
    expects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_skips_blank_lines() {
        let raw = ["++JCLIN.", "//STEP EXEC PGM=X", "   ", "//DD DD *", "++VER."];
        assert_eq!(count_payload_lines(&raw, 0, 4), 2);
    }

    #[test]
    fn test_count_runs_to_end_of_input() {
        let raw = ["++HFS(A) TEXT.", "line one", "line two"];
        assert_eq!(count_payload_lines(&raw, 0, raw.len()), 2);
    }

    #[test]
    fn test_count_with_nothing_following() {
        let raw = ["++HFS(A) TEXT.", "++VER."];
        assert_eq!(count_payload_lines(&raw, 0, 1), 0);
    }
}
