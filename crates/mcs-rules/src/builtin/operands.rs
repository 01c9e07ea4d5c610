//! Top-level operand checks

use mcs_core::{Diagnostic, DiagnosticCategory, NodeKind};
use std::collections::HashMap;

use super::statement::PatternCache;
use super::{is_blank, primary_name, value_text};
use crate::engine::AnalysisContext;

/// Operands the statement's schema does not declare
///
/// Operands of unknown statements are left to the unknown-statement check.
pub fn check_unknown_operand(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (id, statement) in ctx.statements() {
        if !statement.is_resolved() {
            continue;
        }
        for (_, operand) in ctx.document.operands(id) {
            if operand.is_resolved() {
                continue;
            }
            tracing::trace!("Unresolved operand '{}' on '{}'", operand.name, statement.name);
            diagnostics.push(Diagnostic::error(
                DiagnosticCategory::UnknownOperand,
                operand.position,
                format!(
                    "Operand '{}' is not valid for '{}'",
                    operand.name, statement.name
                ),
            ));
        }
    }

    diagnostics
}

/// Every repeat of an operand after alias resolution
pub fn check_duplicate_operand(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (id, _) in ctx.statements() {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (_, operand) in ctx.document.operands(id) {
            let primary = primary_name(operand);
            match seen.get(primary) {
                Some(&first) => {
                    let message = if first == operand.name {
                        format!("Operand '{}' is specified more than once", operand.name)
                    } else {
                        format!(
                            "Operand '{}' duplicates '{}' (both mean '{}')",
                            operand.name, first, primary
                        )
                    };
                    diagnostics.push(Diagnostic::error(
                        DiagnosticCategory::DuplicateOperand,
                        operand.position,
                        message,
                    ));
                }
                None => {
                    seen.insert(primary, operand.name.as_str());
                }
            }
        }
    }

    diagnostics
}

/// Operand values: empty groups, missing required values, values given to
/// flag operands, and schema length or pattern limits
pub fn check_operand_parameter(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut patterns = PatternCache::default();

    for (id, statement) in ctx.statements() {
        if !statement.is_resolved() {
            continue;
        }

        for (operand_id, operand) in ctx.document.operands(id) {
            let Some(def) = operand.operand_def() else {
                continue;
            };
            if def.is_composite() {
                continue;
            }
            let parameter = ctx.document.parameter(operand_id).map(|(_, node)| node);

            let Some(slot) = &def.parameter else {
                if !operand.children.is_empty() {
                    diagnostics.push(
                        Diagnostic::warning(
                            DiagnosticCategory::EmptyOperandParameter,
                            operand.position,
                            format!("Operand '{}' does not take a value", operand.name),
                        )
                        .with_code("not-accepted"),
                    );
                }
                continue;
            };

            match parameter {
                Some(parameter) if is_blank(&parameter.value) => diagnostics.push(
                    Diagnostic::error(
                        DiagnosticCategory::EmptyOperandParameter,
                        operand.position,
                        format!("Operand '{}' has an empty value", operand.name),
                    )
                    .with_code("empty"),
                ),
                Some(parameter) => {
                    let value = value_text(&parameter.value);
                    let value = value.as_str();
                    let range = ctx.range(parameter.position);
                    if let Some(max) = slot.max_length
                        && value.chars().count() > max
                    {
                        diagnostics.push(
                            Diagnostic::error(
                                DiagnosticCategory::EmptyOperandParameter,
                                range,
                                format!(
                                    "Value of '{}' is longer than {} characters",
                                    operand.name, max
                                ),
                            )
                            .with_code("too-long"),
                        );
                    }
                    if let Some(pattern) = &slot.pattern
                        && let Some(regex) = patterns.get(pattern)
                        && !regex.is_match(value)
                    {
                        diagnostics.push(
                            Diagnostic::error(
                                DiagnosticCategory::EmptyOperandParameter,
                                range,
                                format!(
                                    "Value '{}' of '{}' does not match '{}'",
                                    value, operand.name, pattern
                                ),
                            )
                            .with_code("pattern"),
                        );
                    }
                }
                None if slot.required => diagnostics.push(
                    Diagnostic::error(
                        DiagnosticCategory::EmptyOperandParameter,
                        operand.position,
                        format!("Operand '{}' requires a value", operand.name),
                    )
                    .with_code("missing"),
                ),
                None => {}
            }
        }
    }

    diagnostics
}

/// Schema-required operands absent from the statement
pub fn check_missing_required_operand(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (id, statement) in ctx.statements() {
        let Some(def) = statement.statement_def() else {
            continue;
        };
        let present: Vec<&str> = ctx
            .document
            .children(id)
            .filter(|(_, node)| node.kind == NodeKind::Operand)
            .map(|(_, node)| primary_name(node))
            .collect();

        for required in def.operands.iter().filter(|operand| operand.required) {
            if !present.contains(&required.name.as_str()) {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCategory::MissingRequiredOperand,
                    statement.position,
                    format!(
                        "Statement '{}' requires operand '{}'",
                        statement.name, required.name
                    ),
                ));
            }
        }
    }

    diagnostics
}
