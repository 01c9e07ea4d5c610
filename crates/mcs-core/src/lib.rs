//! MCS Core
//!
//! Analysis core for SMP/E modification control statements (MCS). This crate
//! turns source text into a [`Document`]: a node tree per statement,
//! resolved against a [`SchemaCatalog`], with every position addressing the
//! original text even when a statement spans several lines.
//!
//! ```
//! use mcs_core::{OperandDef, ParameterDef, SchemaCatalog, StatementDef, parse};
//!
//! let catalog = SchemaCatalog::new().with_statement(
//!     StatementDef::new("VER")
//!         .with_parameter(ParameterDef::required())
//!         .operand(OperandDef::new("FMID").with_parameter(ParameterDef::required())),
//! );
//! let document = parse("++VER(Z038) FMID(HBB77C0).", &catalog);
//! assert_eq!(document.statements().len(), 1);
//! ```

pub mod builder;
pub mod collector;
pub mod config;
pub mod console;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod inline_data;
pub mod parser;
pub mod remap;
pub mod result;
pub mod scanner;
pub mod schema;

pub use config::{ConfigLoader, DiagnosticsConfig, McsConfig, ParserConfig};
pub use console::{Color, Console};
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticRenderer, LinePosition, OutputFormat, Range,
    Severity,
};
pub use document::{
    Definition, Document, Node, NodeId, NodeKind, ParseError, ParseErrorKind, Position,
    StatementInfo,
};
pub use error::{ErrorKind, McsError};
pub use parser::{McsParser, parse};
pub use result::{Result, ResultExt};
pub use schema::{OperandDef, ParameterDef, SchemaCatalog, StatementDef};

/// Install a `tracing` subscriber for binaries embedding the core
///
/// Filtering follows `RUST_LOG`, defaulting to `mcs=info`. Call at most once.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mcs=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
