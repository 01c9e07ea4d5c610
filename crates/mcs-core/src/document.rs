//! Parsed document and its node arena
//!
//! A [`Document`] owns every node of one source unit in a flat arena.
//! Ownership runs parent to child through `children`; the `parent` link is a
//! plain [`NodeId`] used only for upward lookups.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::schema::{OperandDef, StatementDef};

/// Location of a node in the original source
///
/// `line` and `character` are zero-based; `character` and `length` count
/// Unicode scalar values. A comment or value spanning lines counts each line
/// break as one character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
    pub length: usize,
}

impl Position {
    pub fn new(line: usize, character: usize, length: usize) -> Self {
        Self {
            line,
            character,
            length,
        }
    }

    /// Character just past the end, for a position on one line
    pub fn end_character(&self) -> usize {
        self.character + self.length
    }

    /// `(line, character)` just past the end, following line breaks in `source`
    ///
    /// Each line break counts as one character of the length. A position
    /// running past the last line ends on it.
    pub fn end(&self, source: &str) -> (usize, usize) {
        let mut line = self.line;
        let mut character = self.character;
        let mut remaining = self.length;
        let mut lines = source.lines().skip(self.line).peekable();

        while let Some(text) = lines.next() {
            let available = text.chars().count().saturating_sub(character);
            if remaining <= available || lines.peek().is_none() {
                return (line, character + remaining);
            }
            remaining -= available + 1;
            line += 1;
            character = 0;
        }
        (line, character + remaining)
    }

    /// Whether `(line, character)` falls inside this position, end inclusive
    pub fn contains(&self, source: &str, line: usize, character: usize) -> bool {
        (line, character) >= (self.line, self.character) && (line, character) <= self.end(source)
    }

    /// Extract the substring of `source` this position addresses
    ///
    /// Returns `None` when the position lies outside the text.
    pub fn slice(&self, source: &str) -> Option<String> {
        let mut lines = source.lines().skip(self.line);
        let mut current: Vec<char> = lines.next()?.chars().collect();
        let mut out = String::new();
        let mut remaining = self.length;
        let mut index = self.character;
        if index > current.len() {
            return None;
        }

        while remaining > 0 {
            if index < current.len() {
                out.push(current[index]);
                index += 1;
                remaining -= 1;
            } else {
                current = lines.next()?.chars().collect();
                index = 0;
                out.push('\n');
                remaining -= 1;
            }
        }
        Some(out)
    }
}

/// Handle of a node inside its document's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Statement,
    Operand,
    Parameter,
    Comment,
}

/// Schema definition a node was resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Statement(Arc<StatementDef>),
    Operand(Arc<OperandDef>),
}

impl Definition {
    pub fn as_statement(&self) -> Option<&Arc<StatementDef>> {
        match self {
            Definition::Statement(def) => Some(def),
            Definition::Operand(_) => None,
        }
    }

    pub fn as_operand(&self) -> Option<&Arc<OperandDef>> {
        match self {
            Definition::Operand(def) => Some(def),
            Definition::Statement(_) => None,
        }
    }
}

/// Statement-only attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementInfo {
    pub has_terminator: bool,
    pub unbalanced_parens: bool,
    /// Schema and operands make this statement eligible for payload lines
    pub expects_inline_data: bool,
    pub has_inline_data: bool,
    pub inline_data_lines: usize,
    /// First physical line of the statement
    pub start_line: usize,
    /// Last physical line of the statement itself, payload excluded
    pub end_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// Statement or operand keyword; empty for parameters and comments
    pub name: String,
    /// Literal text for parameters and comments
    pub value: String,
    pub position: Position,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub definition: Option<Definition>,
    pub statement: Option<StatementInfo>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, position: Position) -> Self {
        Self {
            kind,
            name: String::new(),
            value: String::new(),
            position,
            children: Vec::new(),
            parent: None,
            definition: None,
            statement: None,
        }
    }

    /// Name for statements and operands, value for parameters and comments
    pub fn text(&self) -> &str {
        match self.kind {
            NodeKind::Statement | NodeKind::Operand => &self.name,
            NodeKind::Parameter | NodeKind::Comment => &self.value,
        }
    }

    pub fn statement_def(&self) -> Option<&Arc<StatementDef>> {
        self.definition.as_ref().and_then(Definition::as_statement)
    }

    pub fn operand_def(&self) -> Option<&Arc<OperandDef>> {
        self.definition.as_ref().and_then(Definition::as_operand)
    }

    pub fn is_resolved(&self) -> bool {
        self.definition.is_some()
    }
}

/// Kinds of structural irregularity recorded while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParseErrorKind {
    /// Text that is neither an operand nor punctuation
    UnexpectedToken,
    /// A `)` with no matching `(`
    UnmatchedParen,
    /// A `(` whose group runs to the end of the statement
    UnclosedGroup,
    /// Operand groups nested beyond the configured limit
    NestingTooDeep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: Position,
    pub kind: ParseErrorKind,
    /// Statement the error was found in
    pub statement: Option<NodeId>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
            kind,
            statement: None,
        }
    }
}

/// Root analysis result for one source unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub(crate) source: Arc<str>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) statements: Vec<NodeId>,
    pub(crate) comments: Vec<NodeId>,
    pub(crate) errors: Vec<ParseError>,
    pub(crate) inline_data: Vec<NodeId>,
}

impl Document {
    pub(crate) fn new(source: Arc<str>) -> Self {
        Self {
            source,
            nodes: Vec::new(),
            statements: Vec::new(),
            comments: Vec::new(),
            errors: Vec::new(),
            inline_data: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Statement ids in declaration order
    pub fn statements(&self) -> &[NodeId] {
        &self.statements
    }

    /// Comment ids in source order
    pub fn comments(&self) -> &[NodeId] {
        &self.comments
    }

    pub fn parse_errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Statements eligible for trailing payload lines
    pub fn inline_data_statements(&self) -> &[NodeId] {
        &self.inline_data
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Node)> {
        self.node(id)
            .children
            .iter()
            .map(move |&child| (child, self.node(child)))
    }

    /// Operand children only, in source order
    pub fn operands(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Node)> {
        self.children(id)
            .filter(|(_, node)| node.kind == NodeKind::Operand)
    }

    /// The Parameter child of a statement or operand
    pub fn parameter(&self, id: NodeId) -> Option<(NodeId, &Node)> {
        self.children(id)
            .find(|(_, node)| node.kind == NodeKind::Parameter)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Parent chain from the immediate parent up to the statement
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// The statement a node belongs to
    pub fn statement_of(&self, id: NodeId) -> Option<NodeId> {
        if self.node(id).kind == NodeKind::Statement {
            return Some(id);
        }
        self.ancestors(id)
            .find(|&ancestor| self.node(ancestor).kind == NodeKind::Statement)
    }

    /// The statement whose own lines cover `line`
    pub fn statement_at_line(&self, line: usize) -> Option<NodeId> {
        self.statements.iter().copied().find(|&id| {
            self.node(id)
                .statement
                .as_ref()
                .is_some_and(|info| line >= info.start_line && line <= info.end_line)
        })
    }

    /// Every node of a statement subtree, depth first, root included
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev());
        }
        out
    }

    /// Innermost node at a cursor location
    ///
    /// Prefers the deepest node whose range contains the point (end
    /// inclusive, so a cursor right after a token still addresses it). When
    /// nothing contains the point, returns the nearest node on that line
    /// that ends before it.
    pub fn node_at(&self, line: usize, character: usize) -> Option<NodeId> {
        let mut best: Option<(usize, NodeId)> = None;
        let mut preceding: Option<(usize, NodeId)> = None;

        for &statement in &self.statements {
            for id in self.descendants(statement) {
                let position = self.node(id).position;
                if position.line > line {
                    continue;
                }
                let (end_line, end_character) = position.end(&self.source);
                if end_line < line {
                    continue;
                }
                if position.contains(&self.source, line, character) {
                    let depth = self.ancestors(id).count();
                    if best.is_none_or(|(best_depth, _)| depth >= best_depth) {
                        best = Some((depth, id));
                    }
                } else if end_line == line
                    && end_character <= character
                    && preceding.is_none_or(|(end, _)| end_character >= end)
                {
                    preceding = Some((end_character, id));
                }
            }
        }

        best.or(preceding).map(|(_, id)| id)
    }
}
