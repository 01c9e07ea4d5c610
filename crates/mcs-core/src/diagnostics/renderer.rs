//! Text and JSON rendering of diagnostics

use super::{Diagnostic, Severity};
use crate::console::{Color, Console};

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text with a code frame
    Text,
    Json,
    JsonPretty,
}

/// Lines of context shown around the diagnostic line
const CONTEXT_LINES: usize = 2;

pub struct DiagnosticRenderer {
    console: Console,
    output_format: OutputFormat,
}

impl DiagnosticRenderer {
    /// Text output with automatic color detection
    pub fn new() -> Self {
        Self {
            console: Console::new(),
            output_format: OutputFormat::Text,
        }
    }

    pub fn no_colors() -> Self {
        Self {
            console: Console::no_colors(),
            output_format: OutputFormat::Text,
        }
    }

    pub fn with_format(format: OutputFormat) -> Self {
        let console = match format {
            OutputFormat::Json | OutputFormat::JsonPretty => Console::no_colors(),
            OutputFormat::Text => Console::new(),
        };

        Self {
            console,
            output_format: format,
        }
    }

    /// Render one diagnostic against the source it was produced from
    pub fn render(&self, diagnostic: &Diagnostic, source: &str) -> String {
        match self.output_format {
            OutputFormat::Text => self.render_text(diagnostic, source),
            OutputFormat::Json => self.render_json(std::slice::from_ref(diagnostic), false),
            OutputFormat::JsonPretty => self.render_json(std::slice::from_ref(diagnostic), true),
        }
    }

    pub fn render_diagnostics(&self, diagnostics: &[Diagnostic], source: &str) -> String {
        match self.output_format {
            OutputFormat::Text => diagnostics
                .iter()
                .map(|diagnostic| self.render_text(diagnostic, source))
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Json => self.render_json(diagnostics, false),
            OutputFormat::JsonPretty => self.render_json(diagnostics, true),
        }
    }

    /// Text output followed by an error and warning count
    pub fn render_diagnostics_with_summary(
        &self,
        diagnostics: &[Diagnostic],
        source: &str,
    ) -> String {
        let mut output = self.render_diagnostics(diagnostics, source);
        if self.output_format == OutputFormat::Text {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(&self.render_summary(diagnostics));
        }
        output
    }

    fn render_summary(&self, diagnostics: &[Diagnostic]) -> String {
        let count = |severity: Severity| {
            diagnostics
                .iter()
                .filter(|diagnostic| diagnostic.severity == severity)
                .count()
        };
        let errors = count(Severity::Error);
        let warnings = count(Severity::Warning);

        format!(
            "{} {}, {} {}",
            self.console.colorize(&errors.to_string(), Color::Red),
            if errors == 1 { "error" } else { "errors" },
            self.console.colorize(&warnings.to_string(), Color::Yellow),
            if warnings == 1 { "warning" } else { "warnings" },
        )
    }

    fn render_text(&self, diagnostic: &Diagnostic, source: &str) -> String {
        let mut output = self.render_header(diagnostic);
        output.push('\n');

        match self.render_code_frame(diagnostic, source) {
            Some(frame) => output.push_str(&frame),
            None => {
                output.push_str(&format!(
                    "  {} {}:{}\n",
                    self.console.colorize("→", Color::Blue),
                    diagnostic.range.start.line + 1,
                    diagnostic.range.start.character + 1
                ));
            }
        }
        output
    }

    fn render_json(&self, diagnostics: &[Diagnostic], pretty: bool) -> String {
        let rendered = if pretty {
            serde_json::to_string_pretty(diagnostics)
        } else {
            serde_json::to_string(diagnostics)
        };
        rendered.unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {e}\"}}"))
    }

    fn render_header(&self, diagnostic: &Diagnostic) -> String {
        let severity = self
            .console
            .colorize(&diagnostic.severity.to_string(), severity_color(diagnostic.severity));
        let code = match &diagnostic.code {
            Some(code) => format!("[{}/{}]", diagnostic.category, code),
            None => format!("[{}]", diagnostic.category),
        };

        format!(
            "{}{}: {}",
            severity,
            self.console.colorize(&code, Color::Dim),
            self.console.colorize(&diagnostic.message, Color::Bold)
        )
    }

    /// Code frame with the diagnostic line marked and underlined
    fn render_code_frame(&self, diagnostic: &Diagnostic, source: &str) -> Option<String> {
        let lines: Vec<&str> = source.lines().collect();
        let start = diagnostic.range.start;
        let error_line = *lines.get(start.line)?;

        let first = start.line.saturating_sub(CONTEXT_LINES);
        let last = (start.line + CONTEXT_LINES).min(lines.len() - 1);
        let gutter_width = (last + 1).to_string().len();
        let color = severity_color(diagnostic.severity);

        let line_chars = error_line.chars().count();
        let column = start.character.min(line_chars);
        let underline = if diagnostic.range.end.line == start.line {
            diagnostic.range.len()
        } else {
            line_chars.saturating_sub(column)
        };

        let bar = self.console.colorize("│", Color::Blue);
        let mut frame = String::new();
        frame.push_str(&format!(
            "  {}─[{}:{}]\n",
            self.console.colorize("┌", Color::Blue),
            start.line + 1,
            start.character + 1
        ));
        frame.push_str(&format!("  {bar}\n"));

        for (index, content) in lines.iter().enumerate().take(last + 1).skip(first) {
            let is_error_line = index == start.line;
            let marker = if is_error_line {
                self.console.colorize(">", color)
            } else {
                " ".to_string()
            };
            let number = self
                .console
                .colorize(&format!("{:>gutter_width$}", index + 1), Color::Dim);
            let text = if is_error_line {
                self.highlight(content, column, underline, color)
            } else {
                content.to_string()
            };
            let separator = self.console.colorize("│", Color::Dim);
            let rendered = format!("{marker} {number} {separator} {text}");
            frame.push_str(rendered.trim_end());
            frame.push('\n');

            if is_error_line {
                frame.push_str(&format!(
                    "  {} {} {}{}\n",
                    " ".repeat(gutter_width),
                    self.console.colorize("│", Color::Dim),
                    " ".repeat(column),
                    self.console.colorize(&"^".repeat(underline.max(1)), color)
                ));
            }
        }

        Some(frame)
    }

    fn highlight(&self, line: &str, column: usize, length: usize, color: Color) -> String {
        let chars: Vec<char> = line.chars().collect();
        let end = (column + length).min(chars.len());
        if column >= end {
            return line.to_string();
        }

        let before: String = chars[..column].iter().collect();
        let marked: String = chars[column..end].iter().collect();
        let after: String = chars[end..].iter().collect();
        format!("{before}{}{after}", self.console.colorize(&marked, color))
    }
}

impl Default for DiagnosticRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Blue,
        Severity::Hint => Color::Cyan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticCategory, Range};

    const SOURCE: &str = "++VER(Z038) FMID(ABC).\n++FOO(BAR) TEXT.\n";

    fn unknown_statement() -> Diagnostic {
        Diagnostic::error(
            DiagnosticCategory::UnknownStatement,
            Range::on_line(1, 0, 5),
            "Unknown statement '++FOO'",
        )
    }

    #[test]
    fn test_render_text_code_frame() {
        let renderer = DiagnosticRenderer::no_colors();
        let output = renderer.render(&unknown_statement(), SOURCE);

        insta::assert_snapshot!(output, @r"
        error[unknown-statement]: Unknown statement '++FOO'
          ┌─[2:1]
          │
          1 │ ++VER(Z038) FMID(ABC).
        > 2 │ ++FOO(BAR) TEXT.
            │ ^^^^^
        ");
    }

    #[test]
    fn test_render_header_with_code() {
        let renderer = DiagnosticRenderer::no_colors();
        let diagnostic = Diagnostic::error(
            DiagnosticCategory::StatementParameter,
            Range::on_line(0, 6, 10),
            "Parameter is too long",
        )
        .with_code("too-long");

        let output = renderer.render_header(&diagnostic);
        assert_eq!(
            output,
            "error[statement-parameter/too-long]: Parameter is too long"
        );
    }

    #[test]
    fn test_render_falls_back_without_source_line() {
        let renderer = DiagnosticRenderer::no_colors();
        let diagnostic = Diagnostic::warning(
            DiagnosticCategory::ColumnLimit,
            Range::on_line(9, 72, 80),
            "Line exceeds column 72",
        );
        let output = renderer.render(&diagnostic, SOURCE);
        assert!(output.ends_with("→ 10:73\n"));
    }

    #[test]
    fn test_render_json() {
        let renderer = DiagnosticRenderer::with_format(OutputFormat::Json);
        let output = renderer.render_diagnostics(&[unknown_statement()], SOURCE);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["category"], "unknown-statement");
        assert_eq!(value[0]["range"]["end"]["character"], 5);
    }

    #[test]
    fn test_summary_counts() {
        let renderer = DiagnosticRenderer::no_colors();
        let output = renderer.render_diagnostics_with_summary(&[unknown_statement()], SOURCE);
        assert!(output.ends_with("1 error, 0 warnings"));
    }
}
