//! Parse entry point
//!
//! Runs the whole pipeline for one source unit: scan, collect, build,
//! remap, detect inline data. Parsing is infallible and holds no state
//! between calls, so one parser can serve any number of threads.

use std::sync::Arc;

use crate::builder::TreeBuilder;
use crate::collector;
use crate::config::ParserConfig;
use crate::document::{Document, Node, NodeKind, StatementInfo};
use crate::inline_data;
use crate::remap::{self, OffsetTable};
use crate::scanner;
use crate::schema::SchemaCatalog;

/// Parser bound to a schema catalog
#[derive(Debug, Clone)]
pub struct McsParser<'a> {
    catalog: &'a SchemaCatalog,
    config: ParserConfig,
}

impl<'a> McsParser<'a> {
    pub fn new(catalog: &'a SchemaCatalog) -> Self {
        Self {
            catalog,
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        self.catalog
    }

    /// Parse one source unit into a fresh [`Document`]
    pub fn parse(&self, content: &str) -> Document {
        let source: Arc<str> = Arc::from(content);
        let mut document = Document::new(Arc::clone(&source));

        let scanned = scanner::scan(&source);
        for comment in scanned.comments {
            let mut node = Node::new(NodeKind::Comment, comment.position);
            node.value = comment.text;
            let id = document.alloc(node);
            document.comments.push(id);
        }

        let raw_lines: Vec<&str> = source.lines().collect();
        let collected = collector::collect(&scanned.lines);

        for (index, statement) in collected.iter().enumerate() {
            let output = TreeBuilder::new(
                self.catalog,
                &self.config,
                &mut document,
                statement.start_line,
            )
            .build(&statement.joined_text);
            let id = output.statement;
            let mut errors = output.errors;

            if statement.is_multi_line() {
                let table = OffsetTable::new(&statement.lines, statement.start_line);
                remap::remap_statement(&mut document, id, &table);
                remap::remap_errors(&mut errors, &table);
            }
            remap::restore_values(&mut document, id);

            document.node_mut(id).statement = Some(StatementInfo {
                has_terminator: output.has_terminator,
                unbalanced_parens: statement.unbalanced_parens || output.unbalanced_parens,
                start_line: statement.start_line,
                end_line: statement.end_line(),
                ..StatementInfo::default()
            });

            let next_statement = collected
                .get(index + 1)
                .map_or(raw_lines.len(), |next| next.start_line);
            if inline_data::detect(&mut document, id, &raw_lines, next_statement) {
                document.inline_data.push(id);
            }

            for mut error in errors {
                error.statement = Some(id);
                document.errors.push(error);
            }
            document.statements.push(id);
        }

        tracing::debug!(
            "Parsed {} statements, {} comments, {} parse errors",
            document.statements.len(),
            document.comments.len(),
            document.errors.len()
        );
        document
    }
}

/// Parse `content` against `catalog` with default limits
pub fn parse(content: &str, catalog: &SchemaCatalog) -> Document {
    McsParser::new(catalog).parse(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ParseErrorKind, Position};
    use crate::schema::{OperandDef, ParameterDef, StatementDef};

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new()
            .with_statement(
                StatementDef::new("HFS")
                    .with_parameter(ParameterDef::required())
                    .inline_data(true)
                    .operand(OperandDef::new("DISTLIB").with_parameter(ParameterDef::required()))
                    .operand(OperandDef::new("SYSLIB").with_parameter(ParameterDef::required()))
                    .operand(OperandDef::new("TEXT"))
                    .operand(OperandDef::new("DELETE")),
            )
            .with_statement(
                StatementDef::new("VER")
                    .with_parameter(ParameterDef::required())
                    .operand(OperandDef::new("FMID").with_parameter(ParameterDef::required())),
            )
    }

    #[test]
    fn test_multi_line_positions_are_remapped() {
        let source = "++HFS(TEST1)\n  DISTLIB(D1)\n  SYSLIB(S1) TEXT.";
        let catalog = catalog();
        let document = parse(source, &catalog);

        let statement = document.statements()[0];
        let operands: Vec<_> = document.operands(statement).collect();
        assert_eq!(operands[0].1.position, Position::new(1, 2, 7));
        assert_eq!(operands[1].1.position, Position::new(2, 2, 6));
        assert_eq!(operands[2].1.position, Position::new(2, 13, 4));

        let (_, value) = document.parameter(operands[1].0).unwrap();
        assert_eq!(value.position.slice(source).as_deref(), Some("S1"));

        let info = document.node(statement).statement.as_ref().unwrap();
        assert_eq!((info.start_line, info.end_line), (0, 2));
        assert!(info.has_terminator);
    }

    #[test]
    fn test_inline_data_is_counted() {
        let source = "++HFS(A) DISTLIB(D) SYSLIB(S) TEXT.\necho one\n\necho two\n++VER(Z038) FMID(X).";
        let catalog = catalog();
        let document = parse(source, &catalog);

        assert_eq!(document.inline_data_statements(), &[document.statements()[0]]);
        let info = document
            .node(document.statements()[0])
            .statement
            .as_ref()
            .unwrap();
        assert!(info.expects_inline_data);
        assert!(info.has_inline_data);
        assert_eq!(info.inline_data_lines, 2);
    }

    #[test]
    fn test_delete_suppresses_inline_data() {
        let catalog = catalog();
        let document = parse("++HFS(A) DISTLIB(D) DELETE.", &catalog);
        assert!(document.inline_data_statements().is_empty());
    }

    #[test]
    fn test_unterminated_statement_expects_no_inline_data() {
        let catalog = catalog();
        let document = parse("++HFS(A) DISTLIB(D)\n++VER(Z038) FMID(X).", &catalog);
        assert!(document.inline_data_statements().is_empty());
        let info = document
            .node(document.statements()[0])
            .statement
            .as_ref()
            .unwrap();
        assert!(!info.has_terminator);
    }

    #[test]
    fn test_comments_become_nodes() {
        let source = "++VER(Z038) /* base\n level */ FMID(X).";
        let catalog = catalog();
        let document = parse(source, &catalog);

        assert_eq!(document.comments().len(), 1);
        let comment = document.node(document.comments()[0]);
        assert_eq!(comment.kind, NodeKind::Comment);
        assert_eq!(comment.value, "/* base\n level */");
        assert_eq!(comment.position.slice(source).as_deref(), Some(comment.value.as_str()));

        let (_, fmid) = document.operands(document.statements()[0]).next().unwrap();
        assert_eq!(fmid.position, Position::new(1, 10, 4));
    }

    #[test]
    fn test_parse_errors_are_attributed() {
        let catalog = catalog();
        let document = parse("++VER(Z038)\n  fmid(X).", &catalog);
        let errors = document.parse_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ParseErrorKind::UnexpectedToken);
        assert_eq!(errors[0].position, Position::new(1, 2, 7));
        assert_eq!(errors[0].statement, Some(document.statements()[0]));
    }

    #[test]
    fn test_parse_is_repeatable() {
        let source = "++HFS(A)\n DISTLIB(D) /* c */\n SYSLIB(S) TEXT.\npayload\n";
        let catalog = catalog();
        assert_eq!(parse(source, &catalog), parse(source, &catalog));
    }
}
