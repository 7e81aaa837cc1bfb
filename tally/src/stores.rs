//! Variable, function and equation stores
//!
//! The engine reads and writes document state only through these traits, so a
//! host can back them with its own storage. The in-memory tables below are what
//! `Engine` uses by default.

use crate::ast::ExpressionComponent;
use crate::semantic::SemanticValue;
use crate::units::Quantity;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use thiserror::Error;

/// Names the engine resolves itself and will not store
const RESERVED_NAMES: &[&str] = &[
    "solve", "where", "today", "now", "tomorrow", "yesterday", "to", "in", "as", "into", "of",
    "per", "mod",
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Invalid name '{0}'")]
    InvalidName(String),

    #[error("'{0}' is reserved and cannot be assigned")]
    ReservedName(String),
}

/// Trim, collapse whitespace runs and lowercase
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn validate_name(name: &str) -> Result<String, StoreError> {
    let normalized = normalize_name(name);
    let valid = normalized
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && normalized
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == ' ' || c == '\'');
    if !valid {
        return Err(StoreError::InvalidName(name.trim().to_string()));
    }
    if RESERVED_NAMES.contains(&normalized.as_str()) {
        return Err(StoreError::ReservedName(normalized));
    }
    Ok(normalized)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub value: SemanticValue,
    /// Source text the value came from
    pub raw: String,
    pub quantity: Option<Quantity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Variable {
    pub fn new(name: &str, value: SemanticValue, raw: impl Into<String>) -> Self {
        let now = Utc::now();
        let quantity = match &value {
            SemanticValue::Unit(q) => Some(q.clone()),
            _ => None,
        };
        Self {
            name: normalize_name(name),
            value,
            raw: raw.into(),
            quantity,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Read-only view of the variables, in insertion order
pub trait VariableContext {
    fn variable(&self, name: &str) -> Option<&Variable>;

    fn names(&self) -> Vec<String>;

    fn value(&self, name: &str) -> Option<&SemanticValue> {
        self.variable(name).map(|v| &v.value)
    }
}

pub trait VariableStore: VariableContext {
    /// Store `value` under `name`, keeping the original creation time on overwrite
    fn set_variable_with_value(
        &mut self,
        name: &str,
        value: SemanticValue,
        raw: &str,
    ) -> Result<(), StoreError> {
        self.set_variable_with_metadata(Variable::new(name, value, raw))
    }

    fn set_variable_with_metadata(&mut self, variable: Variable) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    variables: IndexMap<String, Variable>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }
}

impl VariableContext for VariableTable {
    fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(&normalize_name(name))
    }

    fn names(&self) -> Vec<String> {
        self.variables.keys().cloned().collect()
    }
}

impl VariableStore for VariableTable {
    fn set_variable_with_metadata(&mut self, mut variable: Variable) -> Result<(), StoreError> {
        let name = validate_name(&variable.name)?;
        if let Some(existing) = self.variables.get(&name) {
            variable.created_at = existing.created_at;
        }
        variable.name = name.clone();
        self.variables.insert(name, variable);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub default: Option<Vec<ExpressionComponent>>,
    pub default_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub params: Vec<Parameter>,
    pub body: Vec<ExpressionComponent>,
    pub body_text: String,
    pub line: usize,
}

impl FunctionDefinition {
    /// `name(a, b = 2)`
    pub fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| match &p.default_text {
                Some(default) => format!("{} = {}", p.name, default),
                None => p.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.name, params)
    }
}

pub trait FunctionStore {
    fn function(&self, name: &str) -> Option<&FunctionDefinition>;

    /// Insert or overwrite. Returns the previous definition when one was replaced.
    fn define(&mut self, definition: FunctionDefinition) -> Result<Option<FunctionDefinition>, StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: IndexMap<String, FunctionDefinition>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl FunctionStore for FunctionTable {
    fn function(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.get(&normalize_name(name))
    }

    fn define(&mut self, mut definition: FunctionDefinition) -> Result<Option<FunctionDefinition>, StoreError> {
        let name = validate_name(&definition.name)?;
        definition.name = name.clone();
        Ok(self.functions.insert(name, definition))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub variable: String,
    pub expression: String,
    pub source_line: usize,
}

/// Append-only equation history
pub trait EquationStore {
    fn record(&mut self, equation: Equation);

    fn equations(&self) -> &[Equation];

    /// Equations from lines before `line` mentioning `name` on either side,
    /// most recent first
    fn mentioning(&self, name: &str, line: usize) -> Vec<&Equation> {
        let name = normalize_name(name);
        self.equations()
            .iter()
            .rev()
            .filter(|eq| eq.source_line < line)
            .filter(|eq| eq.variable == name || mentions(&eq.expression, &name))
            .collect()
    }
}

/// Whole-word, case-insensitive occurrence of `name` in `text`
pub fn mentions(text: &str, name: &str) -> bool {
    let lower = text.to_lowercase();
    lower.match_indices(name).any(|(start, matched)| {
        let before = lower[..start].chars().next_back();
        let after = lower[start + matched.len()..].chars().next();
        !before.is_some_and(is_name_char) && !after.is_some_and(is_name_char)
    })
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[derive(Debug, Clone, Default)]
pub struct EquationLog {
    equations: Vec<Equation>,
}

impl EquationLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EquationStore for EquationLog {
    fn record(&mut self, equation: Equation) {
        self.equations.push(equation);
    }

    fn equations(&self) -> &[Equation] {
        &self.equations
    }
}
