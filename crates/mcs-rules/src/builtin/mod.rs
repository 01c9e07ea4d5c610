//! Builtin checks, one module per rule family

pub mod inline_data;
pub mod layout;
pub mod operands;
pub mod relations;
pub mod statement;
pub mod sub_operands;
pub mod syntax;

use mcs_core::{DiagnosticCategory, Node, scanner};

use crate::engine::Check;

/// Every builtin check
pub fn checks() -> Vec<Check> {
    vec![
        Check::new(
            DiagnosticCategory::UnknownStatement,
            statement::check_unknown_statement,
        ),
        Check::new(
            DiagnosticCategory::StatementParameter,
            statement::check_statement_parameter,
        ),
        Check::new(
            DiagnosticCategory::UnbalancedParentheses,
            statement::check_unbalanced_parentheses,
        ),
        Check::new(
            DiagnosticCategory::MissingTerminator,
            statement::check_missing_terminator,
        ),
        Check::new(
            DiagnosticCategory::UnknownOperand,
            operands::check_unknown_operand,
        ),
        Check::new(
            DiagnosticCategory::DuplicateOperand,
            operands::check_duplicate_operand,
        ),
        Check::new(
            DiagnosticCategory::EmptyOperandParameter,
            operands::check_operand_parameter,
        ),
        Check::new(
            DiagnosticCategory::MissingRequiredOperand,
            operands::check_missing_required_operand,
        ),
        Check::new(
            DiagnosticCategory::DependencyViolation,
            relations::check_dependency,
        ),
        Check::new(
            DiagnosticCategory::MutualExclusion,
            relations::check_mutual_exclusion,
        ),
        Check::new(
            DiagnosticCategory::RequiredGroup,
            relations::check_required_group,
        ),
        Check::new(
            DiagnosticCategory::MissingInlineData,
            inline_data::check_missing_inline_data,
        ),
        Check::new(
            DiagnosticCategory::SubOperand,
            sub_operands::check_sub_operands,
        ),
        Check::new(DiagnosticCategory::ColumnLimit, layout::check_column_limit),
        Check::new(
            DiagnosticCategory::StandaloneComment,
            layout::check_standalone_comment,
        ),
        Check::new(DiagnosticCategory::Syntax, syntax::check_syntax),
    ]
}

/// Schema name of an operand, falling back to what was written
pub(crate) fn primary_name(node: &Node) -> &str {
    node.operand_def()
        .map(|def| def.name.as_str())
        .unwrap_or(node.name.as_str())
}

/// A parameter value as the checks see it: comments dropped, outer blanks
/// trimmed
pub(crate) fn value_text(value: &str) -> String {
    scanner::strip_comments(value).trim().to_string()
}

/// Whether a parameter value counts as absent
pub(crate) fn is_blank(value: &str) -> bool {
    value_text(value).is_empty()
}
