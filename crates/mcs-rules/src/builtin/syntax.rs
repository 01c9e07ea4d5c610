//! Tokens the parser could not place, and over-deep nesting

use mcs_core::{Diagnostic, DiagnosticCategory, ParseErrorKind};

use crate::engine::AnalysisContext;

pub fn check_syntax(ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
    ctx.document
        .parse_errors()
        .iter()
        .filter(|error| {
            matches!(
                error.kind,
                ParseErrorKind::UnexpectedToken | ParseErrorKind::NestingTooDeep
            )
        })
        .map(|error| {
            let code = match error.kind {
                ParseErrorKind::NestingTooDeep => "nesting-too-deep",
                _ => "unexpected-token",
            };
            Diagnostic::error(
                DiagnosticCategory::Syntax,
                ctx.range(error.position),
                error.message.clone(),
            )
            .with_code(code)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcs_core::{Range, SchemaCatalog, parse};

    #[test]
    fn test_unexpected_token_is_reported() {
        let source = "++VER(Z038) fmid(X).";
        let catalog = SchemaCatalog::new();
        let document = parse(source, &catalog);
        let diagnostics = check_syntax(&AnalysisContext::new(&document, &catalog, source));

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range, Range::on_line(0, 12, 19));
        assert_eq!(diagnostics[0].code.as_deref(), Some("unexpected-token"));
    }

    #[test]
    fn test_paren_errors_are_left_to_their_own_check() {
        let source = "++VER(Z038)) .";
        let catalog = SchemaCatalog::new();
        let document = parse(source, &catalog);
        assert!(check_syntax(&AnalysisContext::new(&document, &catalog, source)).is_empty());
    }
}
