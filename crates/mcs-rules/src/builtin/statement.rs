//! Statement-level checks: name, parameter, parentheses, terminator

use mcs_core::{
    Diagnostic, DiagnosticCategory, Document, NodeId, ParameterDef, ParseErrorKind, Position, Range,
};
use regex::Regex;
use std::collections::HashMap;

use super::{is_blank, value_text};
use crate::engine::AnalysisContext;

pub fn check_unknown_statement(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    ctx.statements()
        .filter(|(_, node)| !node.is_resolved())
        .map(|(_, node)| {
            Diagnostic::error(
                DiagnosticCategory::UnknownStatement,
                node.position,
                format!("Unknown statement '{}'", node.name),
            )
        })
        .collect()
}

/// Missing, unexpected, over-long or malformed statement parameters
pub fn check_statement_parameter(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut patterns = PatternCache::default();

    for (id, node) in ctx.statements() {
        let Some(def) = node.statement_def() else {
            continue;
        };
        let parameter = ctx.document.parameter(id).map(|(_, parameter)| parameter);

        match (&def.parameter, parameter) {
            (None, Some(parameter)) => diagnostics.push(
                Diagnostic::error(
                    DiagnosticCategory::StatementParameter,
                    ctx.range(parameter.position),
                    format!("Statement '{}' does not take a parameter", node.name),
                )
                .with_code("not-accepted"),
            ),
            (Some(slot), parameter) => {
                let value = parameter.map(|parameter| parameter.value.as_str());
                match value {
                    Some(value) if !is_blank(value) => {
                        let range = parameter.map_or(Range::from(node.position), |parameter| {
                            ctx.range(parameter.position)
                        });
                        diagnostics.extend(validate_value(
                            slot,
                            &value_text(value),
                            range,
                            &node.name,
                            &mut patterns,
                        ));
                    }
                    _ if slot.required => diagnostics.push(
                        Diagnostic::error(
                            DiagnosticCategory::StatementParameter,
                            parameter.map_or(Range::from(node.position), |parameter| {
                                ctx.range(parameter.position)
                            }),
                            format!("Statement '{}' requires a parameter", node.name),
                        )
                        .with_code("missing"),
                    ),
                    _ => {}
                }
            }
            (None, None) => {}
        }
    }

    diagnostics
}

fn validate_value(
    slot: &ParameterDef,
    value: &str,
    range: Range,
    statement: &str,
    patterns: &mut PatternCache,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if let Some(max) = slot.max_length {
        let length = value.chars().count();
        if length > max {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCategory::StatementParameter,
                    range,
                    format!(
                        "Parameter '{value}' of '{statement}' is {length} characters long, maximum is {max}"
                    ),
                )
                .with_code("too-long"),
            );
        }
    }

    if let Some(pattern) = &slot.pattern
        && let Some(regex) = patterns.get(pattern)
        && !regex.is_match(value)
    {
        diagnostics.push(
            Diagnostic::error(
                DiagnosticCategory::StatementParameter,
                range,
                format!("Parameter '{value}' of '{statement}' does not match '{pattern}'"),
            )
            .with_code("pattern"),
        );
    }

    diagnostics
}

/// Compiled schema patterns, anchored to the whole value
#[derive(Default)]
pub(crate) struct PatternCache {
    compiled: HashMap<String, Option<Regex>>,
}

impl PatternCache {
    pub(crate) fn get(&mut self, pattern: &str) -> Option<&Regex> {
        self.compiled
            .entry(pattern.to_string())
            .or_insert_with(|| match Regex::new(&format!("^(?:{pattern})$")) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    tracing::warn!("Ignoring unusable schema pattern '{}': {}", pattern, err);
                    None
                }
            })
            .as_ref()
    }
}

/// Reported at the offending paren when the parser located it
pub fn check_unbalanced_parentheses(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (id, node) in ctx.statements() {
        if !ctx.info(id).is_some_and(|info| info.unbalanced_parens) {
            continue;
        }

        let before = diagnostics.len();
        diagnostics.extend(paren_errors(ctx.document, id).map(|(position, message)| {
            Diagnostic::error(DiagnosticCategory::UnbalancedParentheses, position, message)
        }));
        if diagnostics.len() == before {
            diagnostics.push(Diagnostic::error(
                DiagnosticCategory::UnbalancedParentheses,
                node.position,
                format!("Unbalanced parentheses in '{}'", node.name),
            ));
        }
    }

    diagnostics
}

fn paren_errors(
    document: &Document,
    statement: NodeId,
) -> impl Iterator<Item = (Position, String)> + '_ {
    document
        .parse_errors()
        .iter()
        .filter(move |error| {
            error.statement == Some(statement)
                && matches!(
                    error.kind,
                    ParseErrorKind::UnmatchedParen | ParseErrorKind::UnclosedGroup
                )
        })
        .map(|error| (error.position, error.message.clone()))
}

pub fn check_missing_terminator(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    ctx.statements()
        .filter(|&(id, _)| !ctx.info(id).is_some_and(|info| info.has_terminator))
        .map(|(_, node)| {
            Diagnostic::error(
                DiagnosticCategory::MissingTerminator,
                node.position,
                format!("Statement '{}' is missing its terminating period", node.name),
            )
        })
        .collect()
}
