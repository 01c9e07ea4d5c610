//! Schema catalog for MCS statements
//!
//! The catalog is the declarative table of statement names, their optional
//! parameter slot, and the operands each statement accepts. Operands carry
//! alias names and the cross-operand rules (required, depends-on, mutually
//! exclusive, required-group) that the diagnostics engine evaluates.
//!
//! A catalog is built once and shared read-only: definitions are held in
//! [`Arc`] so parsed nodes can keep a resolved definition without borrowing
//! the catalog.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::McsError;
use crate::Result;

/// Marker that introduces every statement
pub const STATEMENT_INTRODUCER: &str = "++";

/// Shape constraints for a parenthesized value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterDef {
    /// The value must be present and non-empty
    pub required: bool,
    /// Maximum number of characters in the value
    pub max_length: Option<usize>,
    /// Regular expression the whole value must match
    pub pattern: Option<String>,
}

impl ParameterDef {
    /// A parameter that must be supplied
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    /// A parameter that may be omitted
    pub fn optional() -> Self {
        Self::default()
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

/// Definition of one operand (or sub-operand of a composite operand)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperandDef {
    /// Primary name
    pub name: String,
    /// Alternative spellings accepted for this operand
    pub aliases: Vec<String>,
    /// Operand must appear on the statement
    pub required: bool,
    /// Value slot; `None` means the operand takes no value
    pub parameter: Option<ParameterDef>,
    /// Primary name of a sibling operand that must also be present
    pub requires: Option<String>,
    /// Operands sharing an exclusive group cannot appear together
    pub exclusive_group: Option<String>,
    /// At least one operand of each required group must appear
    pub required_group: Option<String>,
    /// Nested operand shapes for composite operands
    pub sub_operands: Vec<Arc<OperandDef>>,
}

impl OperandDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterDef) -> Self {
        self.parameter = Some(parameter);
        self
    }

    pub fn requires(mut self, operand: impl Into<String>) -> Self {
        self.requires = Some(operand.into());
        self
    }

    pub fn exclusive_group(mut self, group: impl Into<String>) -> Self {
        self.exclusive_group = Some(group.into());
        self
    }

    pub fn required_group(mut self, group: impl Into<String>) -> Self {
        self.required_group = Some(group.into());
        self
    }

    pub fn sub_operand(mut self, operand: OperandDef) -> Self {
        self.sub_operands.push(Arc::new(operand));
        self
    }

    /// Whether `name` is the primary name or one of the aliases
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| alias == name)
    }

    /// Resolve a nested operand by name or alias
    pub fn sub_operand_named(&self, name: &str) -> Option<&Arc<OperandDef>> {
        self.sub_operands.iter().find(|sub| sub.matches(name))
    }

    pub fn is_composite(&self) -> bool {
        !self.sub_operands.is_empty()
    }
}

/// Definition of one statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatementDef {
    /// Keyword without the `++` introducer
    pub name: String,
    /// Value slot directly attached to the keyword, e.g. `++HFS(name)`
    pub parameter: Option<ParameterDef>,
    /// Operands accepted by the statement, in catalog order
    pub operands: Vec<Arc<OperandDef>>,
    /// Statement may be followed by free-form payload lines
    pub inline_data: bool,
}

impl StatementDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: normalize_statement_name(&name.into()).to_string(),
            ..Self::default()
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterDef) -> Self {
        self.parameter = Some(parameter);
        self
    }

    pub fn operand(mut self, operand: OperandDef) -> Self {
        self.operands.push(Arc::new(operand));
        self
    }

    pub fn inline_data(mut self, capable: bool) -> Self {
        self.inline_data = capable;
        self
    }

    /// Resolve an operand by primary name or alias
    pub fn operand_named(&self, name: &str) -> Option<&Arc<OperandDef>> {
        self.operands.iter().find(|operand| operand.matches(name))
    }
}

/// Immutable keyed table of statement definitions
///
/// Serialized as a map from keyword to definition. Deserialized entries go
/// through [`SchemaCatalog::insert`], so keys may carry the `++` introducer
/// and the key decides the statement name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CatalogEntries", into = "CatalogEntries")]
pub struct SchemaCatalog {
    statements: IndexMap<String, Arc<StatementDef>>,
}

/// Wire form of [`SchemaCatalog`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct CatalogEntries(IndexMap<String, Arc<StatementDef>>);

impl From<CatalogEntries> for SchemaCatalog {
    fn from(entries: CatalogEntries) -> Self {
        let mut catalog = SchemaCatalog::new();
        for (key, statement) in entries.0 {
            let mut statement = Arc::unwrap_or_clone(statement);
            let keyword = normalize_statement_name(&key);
            if !statement.name.is_empty() && normalize_statement_name(&statement.name) != keyword {
                tracing::warn!(
                    "Catalog entry '{}' names statement '{}'; using the key",
                    key,
                    statement.name
                );
            }
            statement.name = keyword.to_string();
            catalog.insert(statement);
        }
        catalog
    }
}

impl From<SchemaCatalog> for CatalogEntries {
    fn from(catalog: SchemaCatalog) -> Self {
        CatalogEntries(catalog.statements)
    }
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a statement definition, replacing any previous one with the same name
    pub fn with_statement(mut self, statement: StatementDef) -> Self {
        self.insert(statement);
        self
    }

    pub fn insert(&mut self, mut statement: StatementDef) {
        statement.name = normalize_statement_name(&statement.name).to_string();
        self.statements
            .insert(statement.name.clone(), Arc::new(statement));
    }

    /// Look up a statement by keyword, with or without the `++` introducer
    pub fn statement(&self, name: &str) -> Option<&Arc<StatementDef>> {
        self.statements.get(normalize_statement_name(name))
    }

    pub fn statements(&self) -> impl Iterator<Item = &Arc<StatementDef>> {
        self.statements.values()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Check the catalog for internal consistency
    ///
    /// Reports the first problem found: a `requires` reference naming an
    /// operand the statement does not declare, two operands answering to the
    /// same name, or a parameter pattern that does not compile.
    pub fn validate(&self) -> Result<()> {
        for statement in self.statements.values() {
            if let Some(parameter) = &statement.parameter {
                validate_pattern(&statement.name, parameter)?;
            }
            validate_operands(&statement.name, &statement.operands)?;
        }
        Ok(())
    }
}

fn validate_operands(statement: &str, operands: &[Arc<OperandDef>]) -> Result<()> {
    let mut seen = HashSet::new();
    for operand in operands {
        for name in std::iter::once(&operand.name).chain(operand.aliases.iter()) {
            if !seen.insert(name.as_str()) {
                return Err(McsError::schema_error(
                    statement,
                    format!("name '{name}' is declared by more than one operand"),
                ));
            }
        }

        if let Some(required) = &operand.requires
            && !operands.iter().any(|other| other.matches(required))
        {
            return Err(McsError::schema_error(
                statement,
                format!(
                    "operand '{}' requires '{}', which is not declared",
                    operand.name, required
                ),
            ));
        }

        if let Some(parameter) = &operand.parameter {
            validate_pattern(statement, parameter)?;
        }
        validate_operands(statement, &operand.sub_operands)?;
    }
    Ok(())
}

fn validate_pattern(statement: &str, parameter: &ParameterDef) -> Result<()> {
    if let Some(pattern) = &parameter.pattern
        && let Err(err) = Regex::new(pattern)
    {
        return Err(McsError::schema_error(
            statement,
            format!("invalid parameter pattern '{pattern}': {err}"),
        ));
    }
    Ok(())
}

/// Strip the `++` introducer from a statement keyword
pub fn normalize_statement_name(name: &str) -> &str {
    name.strip_prefix(STATEMENT_INTRODUCER).unwrap_or(name)
}
