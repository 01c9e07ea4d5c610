//! Cross-operand rules declared in the schema: prerequisites, mutually
//! exclusive groups and required groups

use indexmap::IndexMap;
use mcs_core::{Diagnostic, DiagnosticCategory, Node, NodeId};
use std::collections::HashMap;

use super::primary_name;
use crate::engine::AnalysisContext;

fn present_operands<'a>(ctx: &AnalysisContext<'a>, statement: NodeId) -> Vec<&'a Node> {
    let document = ctx.document;
    document.operands(statement).map(|(_, node)| node).collect()
}

pub fn check_dependency(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (id, statement) in ctx.statements() {
        if !statement.is_resolved() {
            continue;
        }
        let operands = present_operands(ctx, id);

        for operand in &operands {
            let Some(required) = operand.operand_def().and_then(|def| def.requires.as_deref())
            else {
                continue;
            };
            let satisfied = operands.iter().any(|other| match other.operand_def() {
                Some(def) => def.matches(required),
                None => other.name == required,
            });
            if !satisfied {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCategory::DependencyViolation,
                    operand.position,
                    format!(
                        "Operand '{}' requires '{}' on the same statement",
                        operand.name, required
                    ),
                ));
            }
        }
    }

    diagnostics
}

/// The first member of an exclusive group wins; later members are reported
pub fn check_mutual_exclusion(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (id, statement) in ctx.statements() {
        if !statement.is_resolved() {
            continue;
        }
        let mut first_in_group: HashMap<&str, &Node> = HashMap::new();

        for operand in present_operands(ctx, id) {
            let Some(group) = operand
                .operand_def()
                .and_then(|def| def.exclusive_group.as_deref())
            else {
                continue;
            };
            match first_in_group.get(group) {
                Some(first) if primary_name(first) != primary_name(operand) => {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticCategory::MutualExclusion,
                        operand.position,
                        format!(
                            "Operand '{}' cannot be combined with '{}'",
                            operand.name, first.name
                        ),
                    ));
                }
                Some(_) => {}
                None => {
                    first_in_group.insert(group, operand);
                }
            }
        }
    }

    diagnostics
}

pub fn check_required_group(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (id, statement) in ctx.statements() {
        let Some(def) = statement.statement_def() else {
            continue;
        };

        let mut groups: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for operand in &def.operands {
            if let Some(group) = operand.required_group.as_deref() {
                groups.entry(group).or_default().push(operand.name.as_str());
            }
        }
        if groups.is_empty() {
            continue;
        }

        let operands = present_operands(ctx, id);
        for (group, members) in groups {
            let satisfied = operands.iter().any(|operand| {
                operand
                    .operand_def()
                    .and_then(|def| def.required_group.as_deref())
                    == Some(group)
            });
            if !satisfied {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCategory::RequiredGroup,
                    statement.position,
                    format!(
                        "Statement '{}' requires one of {}",
                        statement.name,
                        members.join(", ")
                    ),
                ));
            }
        }
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcs_core::{OperandDef, ParameterDef, Range, SchemaCatalog, StatementDef, parse};

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new().with_statement(
            StatementDef::new("HFS")
                .with_parameter(ParameterDef::required())
                .operand(OperandDef::new("DISTLIB").with_parameter(ParameterDef::required()))
                .operand(
                    OperandDef::new("SYMLNK")
                        .with_parameter(ParameterDef::required())
                        .requires("SYMPATH"),
                )
                .operand(OperandDef::new("SYMPATH").with_parameter(ParameterDef::required()))
                .operand(OperandDef::new("TEXT").alias("TXT").exclusive_group("format"))
                .operand(OperandDef::new("BINARY").exclusive_group("format"))
                .operand(
                    OperandDef::new("FROMDS")
                        .required_group("source")
                        .with_parameter(ParameterDef::required()),
                )
                .operand(
                    OperandDef::new("RELFILE")
                        .required_group("source")
                        .with_parameter(ParameterDef::required()),
                ),
        )
    }

    fn run(source: &str, check: fn(&AnalysisContext<'_>) -> Vec<Diagnostic>) -> Vec<Diagnostic> {
        let catalog = catalog();
        let document = parse(source, &catalog);
        check(&AnalysisContext::new(&document, &catalog, source))
    }

    #[test]
    fn test_dependency_violation_at_dependent() {
        let diagnostics = run("++HFS(A) RELFILE(1) SYMLNK(L).", check_dependency);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range, Range::on_line(0, 20, 26));

        assert!(run("++HFS(A) RELFILE(1) SYMLNK(L) SYMPATH(P).", check_dependency).is_empty());
    }

    #[test]
    fn test_mutual_exclusion_reports_later_operand() {
        let diagnostics = run("++HFS(A) RELFILE(1) BINARY TXT.", check_mutual_exclusion);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range, Range::on_line(0, 27, 30));
        assert!(diagnostics[0].message.contains("BINARY"));
    }

    #[test]
    fn test_repeated_member_is_not_exclusive_with_itself() {
        assert!(run("++HFS(A) RELFILE(1) TEXT TXT.", check_mutual_exclusion).is_empty());
    }

    #[test]
    fn test_required_group() {
        let diagnostics = run("++HFS(A) TEXT.", check_required_group);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("FROMDS, RELFILE"));
        assert!(run("++HFS(A) FROMDS(X) TEXT.", check_required_group).is_empty());
    }
}
