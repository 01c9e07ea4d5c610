//! Configuration for the analysis core
//!
//! Two sections, both optional in a config file:
//!
//! ```yaml
//! diagnostics:
//!   columnLimit: false
//!   standaloneComment: false
//! parser:
//!   maxNestingDepth: 16
//! ```
//!
//! Every diagnostic category is enabled unless switched off. Files are
//! discovered by walking up from a start directory; see [`ConfigLoader`].

mod loader;
mod mcs_config;

pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
pub use mcs_config::{DEFAULT_MAX_NESTING_DEPTH, DiagnosticsConfig, McsConfig, ParserConfig};
