use crate::error::TallyError;
use crate::semantic::{ErrorValue, FormatOptions, SemanticValue};
use serde::Serialize;

/// What the notepad shows for one line. Written once by the evaluator that
/// handled the line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    /// 1-based
    pub line: usize,
    #[serde(rename = "originalRaw")]
    pub original_raw: String,
    #[serde(rename = "displayText")]
    pub display_text: String,
    #[serde(flatten)]
    pub kind: RenderKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderKind {
    /// Comments and other lines shown as written
    Text,
    Error {
        error: String,
        #[serde(rename = "errorKind")]
        error_kind: String,
    },
    MathResult {
        result: String,
        #[serde(skip)]
        value: SemanticValue,
    },
    /// An assignment without the display marker
    Variable {
        #[serde(rename = "variableName")]
        variable_name: String,
        result: String,
        #[serde(skip)]
        value: SemanticValue,
    },
    /// An assignment that also displays its value (`name = expr =>`)
    Combined {
        #[serde(rename = "variableName")]
        variable_name: String,
        result: String,
        #[serde(skip)]
        value: SemanticValue,
    },
}

impl RenderNode {
    pub fn text(line: usize, raw: &str, display: impl Into<String>) -> Self {
        Self {
            line,
            original_raw: raw.to_string(),
            display_text: display.into(),
            kind: RenderKind::Text,
        }
    }

    pub fn error(line: usize, raw: &str, error: &ErrorValue) -> Self {
        let message = error.describe();
        Self {
            line,
            original_raw: raw.to_string(),
            display_text: message.clone(),
            kind: RenderKind::Error {
                error: message,
                error_kind: error.kind.name().to_string(),
            },
        }
    }

    /// Generic error node for a host failure inside `evaluator`
    pub fn failure(line: usize, raw: &str, evaluator: &str, error: &TallyError) -> Self {
        let message = TallyError::evaluator(evaluator, error.message()).to_string();
        let kind = match error {
            TallyError::Parse(_) => "parse",
            TallyError::ResourceLimitExceeded { .. } => "limit",
            _ => "evaluator",
        };
        Self {
            line,
            original_raw: raw.to_string(),
            display_text: message.clone(),
            kind: RenderKind::Error {
                error: message,
                error_kind: kind.to_string(),
            },
        }
    }

    /// A math result, or an error node when the value is an error
    pub fn value(line: usize, raw: &str, value: SemanticValue, format: &FormatOptions) -> Self {
        if let SemanticValue::Error(error) = &value {
            return Self::error(line, raw, error);
        }
        let result = value.format(format);
        Self {
            line,
            original_raw: raw.to_string(),
            display_text: result.clone(),
            kind: RenderKind::MathResult { result, value },
        }
    }

    pub fn variable(
        line: usize,
        raw: &str,
        name: &str,
        value: SemanticValue,
        format: &FormatOptions,
        combined: bool,
    ) -> Self {
        let result = value.format(format);
        let variable_name = name.to_string();
        let kind = if combined {
            RenderKind::Combined {
                variable_name,
                result: result.clone(),
                value,
            }
        } else {
            RenderKind::Variable {
                variable_name,
                result: result.clone(),
                value,
            }
        };
        Self {
            line,
            original_raw: raw.to_string(),
            display_text: result,
            kind,
        }
    }

    /// The semantic value behind a result, variable or combined node
    pub fn semantic_value(&self) -> Option<&SemanticValue> {
        match &self.kind {
            RenderKind::MathResult { value, .. }
            | RenderKind::Variable { value, .. }
            | RenderKind::Combined { value, .. } => Some(value),
            RenderKind::Text | RenderKind::Error { .. } => None,
        }
    }

    /// Short name of the node kind
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            RenderKind::Text => "text",
            RenderKind::Error { .. } => "error",
            RenderKind::MathResult { .. } => "mathResult",
            RenderKind::Variable { .. } => "variable",
            RenderKind::Combined { .. } => "combined",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, RenderKind::Error { .. })
    }

    /// Displayed result for result, variable and combined nodes
    pub fn result(&self) -> Option<&str> {
        match &self.kind {
            RenderKind::MathResult { result, .. }
            | RenderKind::Variable { result, .. }
            | RenderKind::Combined { result, .. } => Some(result),
            RenderKind::Text | RenderKind::Error { .. } => None,
        }
    }
}
