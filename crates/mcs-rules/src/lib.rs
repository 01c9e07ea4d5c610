//! Built-in diagnostics for SMP/E modification control statements
//!
//! Takes a [`Document`] produced by `mcs-core` together with the schema
//! catalog it was parsed against and reports everything the builtin checks
//! find, in source order.
//!
//! ```
//! use mcs_core::{DiagnosticsConfig, OperandDef, ParameterDef, SchemaCatalog, StatementDef, parse};
//!
//! let catalog = SchemaCatalog::new().with_statement(
//!     StatementDef::new("VER")
//!         .with_parameter(ParameterDef::required())
//!         .operand(OperandDef::new("FMID").with_parameter(ParameterDef::required())),
//! );
//! let source = "++VER(Z038) FMID(HXX1000) FMID(HXX1000).";
//! let document = parse(source, &catalog);
//!
//! let config = DiagnosticsConfig::default();
//! let diagnostics = mcs_rules::analyze(&document, &catalog, &config, source);
//! assert_eq!(diagnostics.len(), 1);
//! ```

pub mod builtin;
pub mod engine;

pub use engine::{AnalysisContext, Check, CheckFn, DiagnosticsEngine};

use mcs_core::{Diagnostic, DiagnosticsConfig, Document, SchemaCatalog, Severity};
use once_cell::sync::Lazy;
use serde::Serialize;

static DEFAULT_ENGINE: Lazy<DiagnosticsEngine> = Lazy::new(DiagnosticsEngine::new);

/// Run every builtin check enabled in `config`
pub fn analyze(
    document: &Document,
    catalog: &SchemaCatalog,
    config: &DiagnosticsConfig,
    source: &str,
) -> Vec<Diagnostic> {
    DEFAULT_ENGINE.analyze(document, catalog, config, source)
}

/// Counts per severity over one analysis run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub hints: usize,
}

impl AnalysisSummary {
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        diagnostics
            .iter()
            .fold(Self::default(), |mut summary, diagnostic| {
                match diagnostic.severity {
                    Severity::Error => summary.errors += 1,
                    Severity::Warning => summary.warnings += 1,
                    Severity::Info => summary.infos += 1,
                    Severity::Hint => summary.hints += 1,
                }
                summary
            })
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos + self.hints
    }
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
