//! Statements expecting inline data with nothing following them

use mcs_core::{Diagnostic, DiagnosticCategory};

use crate::engine::AnalysisContext;

pub fn check_missing_inline_data(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    ctx.document
        .inline_data_statements()
        .iter()
        .filter(|&&id| ctx.info(id).is_some_and(|info| info.inline_data_lines == 0))
        .map(|&id| {
            let node = ctx.document.node(id);
            Diagnostic::warning(
                DiagnosticCategory::MissingInlineData,
                node.position,
                format!(
                    "Statement '{}' expects inline data, but no data lines follow it",
                    node.name
                ),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcs_core::{OperandDef, ParameterDef, Range, SchemaCatalog, StatementDef, parse};

    fn run(source: &str) -> Vec<Diagnostic> {
        let catalog = SchemaCatalog::new().with_statement(
            StatementDef::new("SRC")
                .with_parameter(ParameterDef::required())
                .inline_data(true)
                .operand(OperandDef::new("DISTLIB").with_parameter(ParameterDef::required()))
                .operand(OperandDef::new("TXLIB").with_parameter(ParameterDef::required())),
        );
        let document = parse(source, &catalog);
        check_missing_inline_data(&AnalysisContext::new(&document, &catalog, source))
    }

    #[test]
    fn test_payload_present() {
        assert!(run("++SRC(A) DISTLIB(D).\n  DC  C'X'\n").is_empty());
    }

    #[test]
    fn test_payload_missing_before_next_statement() {
        let diagnostics = run("++SRC(A) DISTLIB(D).\n\n++SRC(B) DISTLIB(D).\n  DC C'X'");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range, Range::on_line(0, 0, 5));
    }

    #[test]
    fn test_text_library_needs_no_payload() {
        assert!(run("++SRC(A) DISTLIB(D) TXLIB(LIB).").is_empty());
    }
}
