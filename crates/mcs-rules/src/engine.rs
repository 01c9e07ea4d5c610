//! Diagnostics engine
//!
//! Runs every enabled check over a parsed document and merges the results.
//! Checks are plain functions with no shared state; each one belongs to a
//! single [`DiagnosticCategory`] and is skipped when that category is
//! switched off.

use mcs_core::{
    Diagnostic, DiagnosticCategory, DiagnosticsConfig, Document, Node, NodeId, Position, Range,
    SchemaCatalog, StatementInfo,
};

use crate::builtin;

/// Inputs shared by every check
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub document: &'a Document,
    pub catalog: &'a SchemaCatalog,
    pub source: &'a str,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(document: &'a Document, catalog: &'a SchemaCatalog, source: &'a str) -> Self {
        Self {
            document,
            catalog,
            source,
        }
    }

    /// Statements paired with their nodes, in declaration order
    pub fn statements(&self) -> impl Iterator<Item = (NodeId, &'a Node)> + '_ {
        let document = self.document;
        document
            .statements()
            .iter()
            .map(move |&id| (id, document.node(id)))
    }

    pub fn info(&self, statement: NodeId) -> Option<&'a StatementInfo> {
        self.document.node(statement).statement.as_ref()
    }

    /// Source range of a position that may continue onto later lines
    pub fn range(&self, position: Position) -> Range {
        Range::from_position(position, self.source)
    }
}

pub type CheckFn = fn(&AnalysisContext<'_>) -> Vec<Diagnostic>;

/// One registered check
#[derive(Debug, Clone, Copy)]
pub struct Check {
    pub category: DiagnosticCategory,
    pub run: CheckFn,
}

impl Check {
    pub const fn new(category: DiagnosticCategory, run: CheckFn) -> Self {
        Self { category, run }
    }
}

#[derive(Debug, Clone)]
pub struct DiagnosticsEngine {
    checks: Vec<Check>,
}

impl Default for DiagnosticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticsEngine {
    /// Engine with every builtin check registered
    pub fn new() -> Self {
        Self {
            checks: builtin::checks(),
        }
    }

    pub fn with_checks(checks: Vec<Check>) -> Self {
        Self { checks }
    }

    pub fn register(&mut self, check: Check) {
        self.checks.push(check);
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Run all enabled checks; output is ordered by start position
    pub fn analyze(
        &self,
        document: &Document,
        catalog: &SchemaCatalog,
        config: &DiagnosticsConfig,
        source: &str,
    ) -> Vec<Diagnostic> {
        let context = AnalysisContext::new(document, catalog, source);
        let mut diagnostics = Vec::new();

        for check in &self.checks {
            if !config.is_enabled(check.category) {
                tracing::trace!("Skipping disabled category {}", check.category);
                continue;
            }
            let found = (check.run)(&context);
            if !found.is_empty() {
                tracing::debug!("{}: {} diagnostics", check.category, found.len());
            }
            diagnostics.extend(found);
        }

        diagnostics.sort_by_key(|diagnostic| {
            (diagnostic.range.start.line, diagnostic.range.start.character)
        });
        diagnostics
    }
}
