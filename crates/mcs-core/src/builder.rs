//! Builds a typed node tree from one flattened statement
//!
//! The builder walks the joined statement text left to right. The leading
//! `++KEYWORD` becomes the Statement node, a group directly attached to it
//! becomes the statement Parameter, and every following uppercase word is an
//! Operand, optionally carrying a parenthesized group. Groups either hold one
//! literal (a Parameter child) or decompose into nested operands.
//!
//! Positions produced here are offsets into the joined text on the
//! statement's first line; the remapper corrects them for multi-line
//! statements. Nothing here is fatal: malformed input yields a partial tree
//! plus [`ParseError`]s.

use std::ops::Range;
use std::sync::Arc;

use crate::config::ParserConfig;
use crate::document::{
    Definition, Document, Node, NodeId, NodeKind, ParseError, ParseErrorKind, Position,
};
use crate::scanner::{QUOTE, TERMINATOR};
use crate::schema::{OperandDef, STATEMENT_INTRODUCER, SchemaCatalog};

/// Outcome of building one statement
#[derive(Debug)]
pub struct BuildOutput {
    pub statement: NodeId,
    pub errors: Vec<ParseError>,
    pub has_terminator: bool,
    /// A group was left open or a `)` had no partner
    pub unbalanced_parens: bool,
}

/// A parenthesized group located in the joined text
#[derive(Debug, Clone, PartialEq, Eq)]
struct Group {
    /// Offset of the opening paren
    open: usize,
    /// Text between the parens
    content: Range<usize>,
    /// Offset just past the group
    end: usize,
    closed: bool,
}

pub struct TreeBuilder<'a> {
    catalog: &'a SchemaCatalog,
    config: &'a ParserConfig,
    document: &'a mut Document,
    chars: Vec<char>,
    line: usize,
    errors: Vec<ParseError>,
    has_terminator: bool,
    unbalanced_parens: bool,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder that allocates into `document`; `line` is the
    /// statement's first physical line
    pub fn new(
        catalog: &'a SchemaCatalog,
        config: &'a ParserConfig,
        document: &'a mut Document,
        line: usize,
    ) -> Self {
        Self {
            catalog,
            config,
            document,
            chars: Vec::new(),
            line,
            errors: Vec::new(),
            has_terminator: false,
            unbalanced_parens: false,
        }
    }

    pub fn build(mut self, joined_text: &str) -> BuildOutput {
        self.chars = joined_text.chars().collect();
        let end = self.chars.len();

        let name_start = self.skip_whitespace(0, end);
        let mut pos = name_start;
        if self.starts_with_introducer(pos) {
            pos += STATEMENT_INTRODUCER.len();
        }
        while pos < end && is_keyword_char(self.chars[pos]) {
            pos += 1;
        }

        let name = self.text(name_start..pos);
        let definition = self.catalog.statement(&name).cloned();
        if definition.is_none() {
            tracing::trace!("Statement '{}' is not in the schema catalog", name);
        }

        let mut node = Node::new(NodeKind::Statement, self.position(name_start..pos));
        node.name = name;
        node.definition = definition.clone().map(Definition::Statement);
        let statement = self.document.alloc(node);

        if pos < end && self.chars[pos] == '(' {
            let group = self.scan_group(pos, end);
            if !group.closed {
                self.unclosed(&group, "statement parameter");
            }
            self.add_parameter(statement, group.content.clone());
            pos = group.end;
        }

        let scope = definition.as_ref().map(|def| def.operands.as_slice());
        self.parse_operands(statement, pos..end, scope, 0, true);

        BuildOutput {
            statement,
            errors: self.errors,
            has_terminator: self.has_terminator,
            unbalanced_parens: self.unbalanced_parens,
        }
    }

    /// Parse a run of operands, attaching them to `parent`
    fn parse_operands(
        &mut self,
        parent: NodeId,
        range: Range<usize>,
        scope: Option<&[Arc<OperandDef>]>,
        depth: usize,
        top_level: bool,
    ) {
        let end = range.end;
        let mut pos = range.start;

        while pos < end {
            let current = self.chars[pos];
            match current {
                c if c.is_whitespace() || c == ',' => pos += 1,
                TERMINATOR if top_level => {
                    self.has_terminator = true;
                    break;
                }
                'A'..='Z' => pos = self.parse_operand(parent, pos, end, scope, depth),
                ')' => {
                    self.unbalanced_parens = true;
                    self.errors.push(ParseError::new(
                        ParseErrorKind::UnmatchedParen,
                        "Unmatched ')'",
                        self.position(pos..pos + 1),
                    ));
                    pos += 1;
                }
                _ => pos = self.skip_unexpected(pos, end),
            }
        }
    }

    /// Parse one operand starting at an uppercase letter; returns the offset after it
    fn parse_operand(
        &mut self,
        parent: NodeId,
        start: usize,
        end: usize,
        scope: Option<&[Arc<OperandDef>]>,
        depth: usize,
    ) -> usize {
        let mut pos = start;
        while pos < end && is_operand_char(self.chars[pos]) {
            pos += 1;
        }
        if pos < end && !is_delimiter(self.chars[pos]) {
            return self.skip_unexpected(start, end);
        }

        let name = self.text(start..pos);
        let definition = scope
            .and_then(|candidates| candidates.iter().find(|def| def.matches(&name)))
            .cloned();
        if scope.is_some() && definition.is_none() {
            tracing::trace!("Operand '{}' did not resolve against the schema", name);
        }

        let mut node = Node::new(NodeKind::Operand, self.position(start..pos));
        node.name = name;
        node.definition = definition.clone().map(Definition::Operand);
        let operand = self.document.alloc(node);
        self.document.attach(parent, operand);

        if pos < end && self.chars[pos] == '(' {
            let group = self.scan_group(pos, end);
            if !group.closed {
                self.unclosed(&group, "operand value");
            }

            if depth + 1 > self.config.max_nesting_depth {
                tracing::debug!(
                    "Operand nesting exceeds {} levels, keeping group as a literal",
                    self.config.max_nesting_depth
                );
                self.errors.push(ParseError::new(
                    ParseErrorKind::NestingTooDeep,
                    format!(
                        "Operand groups are nested deeper than {} levels",
                        self.config.max_nesting_depth
                    ),
                    self.position(group.open..group.end),
                ));
                self.add_parameter(operand, group.content.clone());
            } else if self.should_decompose(definition.as_deref(), group.content.clone()) {
                let sub_scope = definition.as_ref().map(|def| def.sub_operands.as_slice());
                self.parse_operands(operand, group.content.clone(), sub_scope, depth + 1, false);
            } else {
                self.add_parameter(operand, group.content.clone());
            }
            pos = group.end;
        }

        pos
    }

    /// Composite when the schema says so, or when an operand without a value
    /// slot holds nothing but `NAME(...)` items
    fn should_decompose(&self, definition: Option<&OperandDef>, content: Range<usize>) -> bool {
        match definition {
            Some(def) if def.is_composite() => true,
            Some(def) if def.parameter.is_some() => false,
            _ => self.is_composite_shape(content),
        }
    }

    fn is_composite_shape(&self, content: Range<usize>) -> bool {
        let end = content.end;
        let mut pos = content.start;
        let mut items = 0;

        loop {
            while pos < end && (self.chars[pos].is_whitespace() || self.chars[pos] == ',') {
                pos += 1;
            }
            if pos >= end {
                return items > 0;
            }
            if !self.chars[pos].is_ascii_uppercase() {
                return false;
            }
            while pos < end && is_operand_char(self.chars[pos]) {
                pos += 1;
            }
            if pos >= end || self.chars[pos] != '(' {
                return false;
            }
            let group = self.scan_group(pos, end);
            if !group.closed {
                return false;
            }
            pos = group.end;
            items += 1;
        }
    }

    fn add_parameter(&mut self, parent: NodeId, content: Range<usize>) {
        let mut node = Node::new(NodeKind::Parameter, self.position(content.clone()));
        node.value = self.text(content);
        let parameter = self.document.alloc(node);
        self.document.attach(parent, parameter);
    }

    /// Locate the group opening at `open`, honoring nesting and quotes
    fn scan_group(&self, open: usize, end: usize) -> Group {
        let mut depth = 0usize;
        let mut quoted = false;

        for index in open..end {
            let current = self.chars[index];
            if quoted {
                if current == QUOTE {
                    quoted = false;
                }
                continue;
            }
            match current {
                QUOTE => quoted = true,
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Group {
                            open,
                            content: open + 1..index,
                            end: index + 1,
                            closed: true,
                        };
                    }
                }
                _ => {}
            }
        }

        Group {
            open,
            content: open + 1..end,
            end,
            closed: false,
        }
    }

    fn unclosed(&mut self, group: &Group, what: &str) {
        self.unbalanced_parens = true;
        self.errors.push(ParseError::new(
            ParseErrorKind::UnclosedGroup,
            format!("Missing ')' to close {what}"),
            self.position(group.open..group.open + 1),
        ));
    }

    /// Record an unexpected token and return the offset after it
    fn skip_unexpected(&mut self, start: usize, end: usize) -> usize {
        let mut pos = start;
        if self.chars[pos] == QUOTE {
            pos += 1;
            while pos < end && self.chars[pos] != QUOTE {
                pos += 1;
            }
            pos = (pos + 1).min(end);
        } else {
            pos += 1;
            while pos < end && !is_delimiter(self.chars[pos]) {
                pos += 1;
            }
            if pos < end && self.chars[pos] == '(' {
                pos = self.scan_group(pos, end).end;
            }
        }

        let token = self.text(start..pos);
        self.errors.push(ParseError::new(
            ParseErrorKind::UnexpectedToken,
            format!("Unexpected '{token}'"),
            self.position(start..pos),
        ));
        pos
    }

    fn skip_whitespace(&self, mut pos: usize, end: usize) -> usize {
        while pos < end && self.chars[pos].is_whitespace() {
            pos += 1;
        }
        pos
    }

    fn starts_with_introducer(&self, pos: usize) -> bool {
        STATEMENT_INTRODUCER
            .chars()
            .enumerate()
            .all(|(offset, expected)| self.chars.get(pos + offset) == Some(&expected))
    }

    fn text(&self, range: Range<usize>) -> String {
        self.chars[range].iter().collect()
    }

    fn position(&self, range: Range<usize>) -> Position {
        Position::new(self.line, range.start, range.len())
    }
}

fn is_keyword_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '#' | '@' | '$')
}

fn is_operand_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '#' | '@' | '$')
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '(' | ')' | TERMINATOR | QUOTE)
}
