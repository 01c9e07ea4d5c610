//! Configuration types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::diagnostics::DiagnosticCategory;
use crate::error::McsError;
use crate::Result;

/// Default limit on nested operand groups
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 16;

/// Top-level configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct McsConfig {
    #[schemars(description = "Enable or disable each diagnostic category")]
    pub diagnostics: DiagnosticsConfig,

    #[schemars(description = "Parser limits")]
    pub parser: ParserConfig,
}

impl McsConfig {
    /// Load configuration from a file, picking the format by extension
    ///
    /// Supports `.json`, `.toml`, `.yaml` and `.yml`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| McsError::io_error(path, e))?;
        let ext = path.extension().and_then(|e| e.to_str());

        match ext {
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("toml") => {
                toml::from_str(&content).map_err(|e| McsError::serialization_error(e.to_string()))
            }
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| McsError::serialization_error(e.to_string())),
            _ => Err(McsError::config_error(format!(
                "Unsupported config file extension for '{}' (expected .json, .toml, .yaml or .yml)",
                path.display()
            ))),
        }
    }

    /// JSON Schema describing the configuration document
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(McsConfig)).unwrap_or_default()
    }
}

/// One switch per diagnostic category, all on by default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsConfig {
    #[schemars(description = "Statement name is not in the schema catalog")]
    pub unknown_statement: bool,
    #[schemars(description = "Statement parameter missing, not accepted or malformed")]
    pub statement_parameter: bool,
    #[schemars(description = "Unbalanced parentheses")]
    pub unbalanced_parentheses: bool,
    #[schemars(description = "Statement has no terminating period")]
    pub missing_terminator: bool,
    #[schemars(description = "Operand is not defined for the statement")]
    pub unknown_operand: bool,
    #[schemars(description = "Operand appears more than once")]
    pub duplicate_operand: bool,
    #[schemars(description = "Operand value is empty or not accepted")]
    pub empty_operand_parameter: bool,
    #[schemars(description = "Required operand is absent")]
    pub missing_required_operand: bool,
    #[schemars(description = "Operand prerequisite is absent")]
    pub dependency_violation: bool,
    #[schemars(description = "Mutually exclusive operands used together")]
    pub mutual_exclusion: bool,
    #[schemars(description = "No member of a required operand group is present")]
    pub required_group: bool,
    #[schemars(description = "Statement expects inline data but none follows")]
    pub missing_inline_data: bool,
    #[schemars(description = "Problems inside composite operands")]
    pub sub_operand: bool,
    #[schemars(description = "Content extends past column 72")]
    pub column_limit: bool,
    #[schemars(description = "Comment placed between statements")]
    pub standalone_comment: bool,
    #[schemars(description = "Unexpected tokens and over-deep nesting")]
    pub syntax: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self::all(true)
    }
}

impl DiagnosticsConfig {
    /// Every category set to `enabled`
    pub fn all(enabled: bool) -> Self {
        Self {
            unknown_statement: enabled,
            statement_parameter: enabled,
            unbalanced_parentheses: enabled,
            missing_terminator: enabled,
            unknown_operand: enabled,
            duplicate_operand: enabled,
            empty_operand_parameter: enabled,
            missing_required_operand: enabled,
            dependency_violation: enabled,
            mutual_exclusion: enabled,
            required_group: enabled,
            missing_inline_data: enabled,
            sub_operand: enabled,
            column_limit: enabled,
            standalone_comment: enabled,
            syntax: enabled,
        }
    }

    pub fn is_enabled(&self, category: DiagnosticCategory) -> bool {
        *self.flag(category)
    }

    pub fn set(&mut self, category: DiagnosticCategory, enabled: bool) {
        *self.flag_mut(category) = enabled;
    }

    /// Builder form of [`DiagnosticsConfig::set`]
    pub fn with(mut self, category: DiagnosticCategory, enabled: bool) -> Self {
        self.set(category, enabled);
        self
    }

    fn flag(&self, category: DiagnosticCategory) -> &bool {
        match category {
            DiagnosticCategory::UnknownStatement => &self.unknown_statement,
            DiagnosticCategory::StatementParameter => &self.statement_parameter,
            DiagnosticCategory::UnbalancedParentheses => &self.unbalanced_parentheses,
            DiagnosticCategory::MissingTerminator => &self.missing_terminator,
            DiagnosticCategory::UnknownOperand => &self.unknown_operand,
            DiagnosticCategory::DuplicateOperand => &self.duplicate_operand,
            DiagnosticCategory::EmptyOperandParameter => &self.empty_operand_parameter,
            DiagnosticCategory::MissingRequiredOperand => &self.missing_required_operand,
            DiagnosticCategory::DependencyViolation => &self.dependency_violation,
            DiagnosticCategory::MutualExclusion => &self.mutual_exclusion,
            DiagnosticCategory::RequiredGroup => &self.required_group,
            DiagnosticCategory::MissingInlineData => &self.missing_inline_data,
            DiagnosticCategory::SubOperand => &self.sub_operand,
            DiagnosticCategory::ColumnLimit => &self.column_limit,
            DiagnosticCategory::StandaloneComment => &self.standalone_comment,
            DiagnosticCategory::Syntax => &self.syntax,
        }
    }

    fn flag_mut(&mut self, category: DiagnosticCategory) -> &mut bool {
        match category {
            DiagnosticCategory::UnknownStatement => &mut self.unknown_statement,
            DiagnosticCategory::StatementParameter => &mut self.statement_parameter,
            DiagnosticCategory::UnbalancedParentheses => &mut self.unbalanced_parentheses,
            DiagnosticCategory::MissingTerminator => &mut self.missing_terminator,
            DiagnosticCategory::UnknownOperand => &mut self.unknown_operand,
            DiagnosticCategory::DuplicateOperand => &mut self.duplicate_operand,
            DiagnosticCategory::EmptyOperandParameter => &mut self.empty_operand_parameter,
            DiagnosticCategory::MissingRequiredOperand => &mut self.missing_required_operand,
            DiagnosticCategory::DependencyViolation => &mut self.dependency_violation,
            DiagnosticCategory::MutualExclusion => &mut self.mutual_exclusion,
            DiagnosticCategory::RequiredGroup => &mut self.required_group,
            DiagnosticCategory::MissingInlineData => &mut self.missing_inline_data,
            DiagnosticCategory::SubOperand => &mut self.sub_operand,
            DiagnosticCategory::ColumnLimit => &mut self.column_limit,
            DiagnosticCategory::StandaloneComment => &mut self.standalone_comment,
            DiagnosticCategory::Syntax => &mut self.syntax,
        }
    }
}

/// Parser limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserConfig {
    /// Nested operand groups beyond this depth are kept as one literal
    #[schemars(description = "Maximum depth of nested operand groups")]
    pub max_nesting_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_everything() {
        let config = DiagnosticsConfig::default();
        assert!(
            DiagnosticCategory::ALL
                .iter()
                .all(|&category| config.is_enabled(category))
        );
        assert_eq!(ParserConfig::default().max_nesting_depth, 16);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: McsConfig =
            serde_json::from_str(r#"{"diagnostics": {"columnLimit": false}}"#).unwrap();
        assert!(!config.diagnostics.is_enabled(DiagnosticCategory::ColumnLimit));
        assert!(config.diagnostics.is_enabled(DiagnosticCategory::UnknownOperand));
        assert_eq!(config.parser.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
    }

    #[test]
    fn test_set_round_trips_every_category() {
        for category in DiagnosticCategory::ALL {
            let config = DiagnosticsConfig::default().with(category, false);
            assert!(!config.is_enabled(category));
            let still_on = DiagnosticCategory::ALL
                .iter()
                .filter(|&&other| config.is_enabled(other))
                .count();
            assert_eq!(still_on, DiagnosticCategory::ALL.len() - 1);
        }
    }

    #[test]
    fn test_json_schema_lists_sections() {
        let schema = McsConfig::json_schema();
        let text = schema.to_string();
        assert!(text.contains("diagnostics"));
        assert!(text.contains("maxNestingDepth"));
        assert!(text.contains("columnLimit"));
    }
}
