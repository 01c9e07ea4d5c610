//! Maps joined-text offsets back to physical line and column
//!
//! The collector joins the lines of a multi-line statement with one space,
//! so the tree builder sees a single line. [`OffsetTable`] records, for every
//! character of the joined text, where it came from; the synthetic join
//! space maps to the end of the line it follows.

use std::sync::Arc;

use crate::document::{Document, NodeId, NodeKind, ParseError, Position};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetTable {
    /// `(line, character)` per joined-text character
    entries: Vec<(usize, usize)>,
    start_line: usize,
}

impl OffsetTable {
    pub fn new(lines: &[String], start_line: usize) -> Self {
        let mut entries = Vec::new();
        for (index, text) in lines.iter().enumerate() {
            let line = start_line + index;
            let length = text.chars().count();
            entries.extend((0..length).map(|character| (line, character)));
            if index + 1 < lines.len() {
                entries.push((line, length));
            }
        }
        Self {
            entries,
            start_line,
        }
    }

    /// Physical location of a joined-text offset
    ///
    /// Offsets at or past the end continue from the last character, so an
    /// empty range after the final character still resolves.
    pub fn lookup(&self, offset: usize) -> (usize, usize) {
        match self.entries.get(offset) {
            Some(&location) => location,
            None => match self.entries.last() {
                Some(&(line, character)) => {
                    (line, character + 1 + (offset - self.entries.len()))
                }
                None => (self.start_line, offset),
            },
        }
    }

    /// Translate a joined-text position into a physical one
    ///
    /// The length is kept: it still counts the characters of the token, and a
    /// token split across lines reads back through [`Position::slice`] with
    /// the join counted as the line break.
    pub fn map(&self, position: Position) -> Position {
        let (line, character) = self.lookup(position.character);
        Position::new(line, character, position.length)
    }
}

/// Rewrite every position in a statement subtree
pub fn remap_statement(document: &mut Document, root: NodeId, table: &OffsetTable) {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let node = document.node_mut(id);
        node.position = table.map(node.position);
        stack.extend(node.children.iter().copied());
    }
}

/// Reload Parameter values from the source text their positions address
///
/// The builder reads values from cleaned, joined text, where comments are
/// blanked and line breaks are join spaces. Values must carry the source
/// text verbatim.
pub fn restore_values(document: &mut Document, root: NodeId) {
    let source = Arc::clone(&document.source);
    for id in document.descendants(root) {
        let node = document.node_mut(id);
        if node.kind != NodeKind::Parameter {
            continue;
        }
        if let Some(text) = node.position.slice(&source) {
            node.value = text;
        }
    }
}

pub fn remap_errors(errors: &mut [ParseError], table: &OffsetTable) {
    for error in errors {
        error.position = table.map(error.position);
    }
}
