//! Checks inside composite operands such as `FROMDS(DSN(...) NUMBER(...))`

use mcs_core::{Diagnostic, DiagnosticCategory, Document, NodeId};
use std::collections::HashSet;

use super::{is_blank, primary_name};
use crate::engine::AnalysisContext;

pub fn check_sub_operands(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (id, statement) in ctx.statements() {
        if !statement.is_resolved() {
            continue;
        }
        for (operand, node) in ctx.document.operands(id) {
            if node.is_resolved() {
                check_container(ctx.document, operand, &mut diagnostics);
            }
        }
    }

    diagnostics
}

/// Check the nested operands of one resolved operand, recursing into
/// nested composites
fn check_container(document: &Document, container: NodeId, diagnostics: &mut Vec<Diagnostic>) {
    let node = document.node(container);
    let Some(def) = node.operand_def() else {
        return;
    };
    if !def.is_composite() {
        return;
    }
    let children: Vec<_> = document.operands(container).collect();

    let mut seen = HashSet::new();
    for &(child_id, child) in &children {
        let Some(child_def) = child.operand_def() else {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCategory::SubOperand,
                    child.position,
                    format!(
                        "Sub-operand '{}' is not valid inside '{}'",
                        child.name, node.name
                    ),
                )
                .with_code("unknown"),
            );
            continue;
        };

        if !seen.insert(primary_name(child)) {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCategory::SubOperand,
                    child.position,
                    format!(
                        "Sub-operand '{}' is specified more than once inside '{}'",
                        child.name, node.name
                    ),
                )
                .with_code("duplicate"),
            );
        }

        if child_def.parameter.is_some() {
            let value = document.parameter(child_id).map(|(_, value)| value.value.as_str());
            let required = child_def
                .parameter
                .as_ref()
                .is_some_and(|slot| slot.required);
            if value.is_some_and(is_blank) || (value.is_none() && required) {
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticCategory::SubOperand,
                        child.position,
                        format!("Sub-operand '{}' requires a value", child.name),
                    )
                    .with_code("empty"),
                );
            }
        }

        if child_def.is_composite() {
            check_container(document, child_id, diagnostics);
        }
    }

    for required in def.sub_operands.iter().filter(|sub| sub.required) {
        if !seen.contains(required.name.as_str()) {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCategory::SubOperand,
                    node.position,
                    format!(
                        "Operand '{}' requires sub-operand '{}'",
                        node.name, required.name
                    ),
                )
                .with_code("missing"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcs_core::{OperandDef, ParameterDef, Range, SchemaCatalog, StatementDef, parse};

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new().with_statement(
            StatementDef::new("JCLIN").inline_data(true).operand(
                OperandDef::new("FROMDS")
                    .sub_operand(
                        OperandDef::new("DSN")
                            .required()
                            .with_parameter(ParameterDef::required()),
                    )
                    .sub_operand(OperandDef::new("NUMBER").with_parameter(ParameterDef::required()))
                    .sub_operand(OperandDef::new("VOL").alias("VOLUME").with_parameter(
                        ParameterDef::optional(),
                    )),
            ),
        )
    }

    fn run(source: &str) -> Vec<Diagnostic> {
        let catalog = catalog();
        let document = parse(source, &catalog);
        check_sub_operands(&AnalysisContext::new(&document, &catalog, source))
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics
            .iter()
            .filter_map(|diagnostic| diagnostic.code.as_deref())
            .collect()
    }

    #[test]
    fn test_valid_composite() {
        assert!(run("++JCLIN FROMDS(DSN(MY.DATA.SET) NUMBER(1)).").is_empty());
    }

    #[test]
    fn test_unknown_sub_operand() {
        let diagnostics = run("++JCLIN FROMDS(DSN(A) UNIT(SYSDA)).");
        assert_eq!(codes(&diagnostics), vec!["unknown"]);
        assert_eq!(diagnostics[0].range, Range::on_line(0, 22, 26));
    }

    #[test]
    fn test_duplicate_through_alias() {
        let diagnostics = run("++JCLIN FROMDS(DSN(A) VOL(1) VOLUME(2)).");
        assert_eq!(codes(&diagnostics), vec!["duplicate"]);
    }

    #[test]
    fn test_missing_required_and_empty_value() {
        let diagnostics = run("++JCLIN FROMDS(NUMBER()).");
        assert_eq!(codes(&diagnostics), vec!["empty", "missing"]);
        // missing sub-operand is reported on the composite
        assert_eq!(diagnostics[1].range, Range::on_line(0, 8, 14));
    }
}
