use crate::ast::Span;
use crate::stores::StoreError;
use thiserror::Error;

/// Detailed error information with source location
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetails {
    pub message: String,
    pub span: Span,
    pub source_text: String,
    pub suggestion: Option<String>,
}

/// Host-level errors of the tally engine.
///
/// Evaluation problems inside an expression are *values* (`SemanticValue::Error`);
/// these variants are reserved for failures around the evaluation itself: a line
/// that cannot be tokenized, an evaluator that could not finish, a store refusing
/// a write or a resource limit being hit.
#[derive(Debug, Clone, Error)]
pub enum TallyError {
    #[error("Parse error: {}", describe_parse(.0))]
    Parse(Box<ErrorDetails>),

    /// An evaluator failed while handling a line it claimed
    #[error("{evaluator} failed: {message}")]
    Evaluator { evaluator: String, message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Resource limit exceeded: {limit_name} (limit: {limit_value}, actual: {actual_value}). {suggestion}")]
    ResourceLimitExceeded {
        limit_name: String,
        limit_value: String,
        actual_value: String,
        suggestion: String,
    },

    #[error("Engine error: {0}")]
    Engine(String),
}

fn describe_parse(details: &ErrorDetails) -> String {
    match &details.suggestion {
        Some(s) => format!("{} (suggestion: {})", details.message, s),
        None => details.message.clone(),
    }
}

impl TallyError {
    /// Create a parse error with source information
    pub fn parse(message: impl Into<String>, span: Span, source_text: impl Into<String>) -> Self {
        Self::Parse(Box::new(ErrorDetails {
            message: message.into(),
            span,
            source_text: source_text.into(),
            suggestion: None,
        }))
    }

    /// Create a parse error with suggestion
    pub fn parse_with_suggestion(
        message: impl Into<String>,
        span: Span,
        source_text: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Parse(Box::new(ErrorDetails {
            message: message.into(),
            span,
            source_text: source_text.into(),
            suggestion: Some(suggestion.into()),
        }))
    }

    pub fn evaluator(evaluator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Evaluator {
            evaluator: evaluator.into(),
            message: message.into(),
        }
    }

    /// The bare message, without the variant prefix
    pub fn message(&self) -> String {
        match self {
            TallyError::Parse(details) => details.message.clone(),
            TallyError::Evaluator { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn details(&self) -> Option<&ErrorDetails> {
        match self {
            TallyError::Parse(details) => Some(details),
            _ => None,
        }
    }
}

impl From<std::fmt::Error> for TallyError {
    fn from(err: std::fmt::Error) -> Self {
        TallyError::Engine(format!("Format error: {}", err))
    }
}

/// Result type for tally host operations
pub type TallyResult<T> = Result<T, TallyError>;
