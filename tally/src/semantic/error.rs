use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Parse,
    Syntax,
    /// Incompatible units/currencies/dimensions, divide-by-zero, missing argument, unknown names
    Semantic,
    /// Expected vs. actual value type
    Type,
    Conversion,
    /// Wraps failures from lower layers
    Runtime,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Parse => "parse",
            ErrorKind::Syntax => "syntax",
            ErrorKind::Semantic => "semantic",
            ErrorKind::Type => "type",
            ErrorKind::Conversion => "conversion",
            ErrorKind::Runtime => "runtime",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An error carried as a value through arithmetic
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorValue {
    pub kind: ErrorKind,
    pub message: String,
    /// Source expression the error arose in, when known
    pub expression: Option<String>,
    pub suggestion: Option<String>,
    pub expected: Option<String>,
    pub actual: Option<String>,
    /// Names that could not be resolved; non-empty means "unknown variable"
    pub unresolved: Vec<String>,
    pub cause: Option<Box<ErrorValue>>,
}

impl ErrorValue {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            expression: None,
            suggestion: None,
            expected: None,
            actual: None,
            unresolved: Vec::new(),
            cause: None,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn syntax(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, message).with_suggestion(suggestion)
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Semantic, message)
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conversion, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, message)
    }

    pub fn type_mismatch(
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            expected: Some(expected.into()),
            actual: Some(actual.into()),
            ..Self::new(ErrorKind::Type, message)
        }
    }

    pub fn unknown_variable(name: &str) -> Self {
        Self {
            unresolved: vec![name.to_string()],
            ..Self::semantic(format!("Unknown variable '{}'", name))
        }
    }

    pub fn division_by_zero() -> Self {
        Self::semantic("Division by zero")
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        if self.expression.is_none() {
            self.expression = Some(expression.into());
        }
        self
    }

    /// Combine with a second error from the other operand. The first error
    /// leads; the second becomes its cause and unresolved names merge.
    pub fn chain(mut self, other: ErrorValue) -> Self {
        for name in &other.unresolved {
            if !self.unresolved.contains(name) {
                self.unresolved.push(name.clone());
            }
        }
        let mut tail = &mut self.cause;
        while let Some(next) = tail {
            tail = &mut next.cause;
        }
        *tail = Some(Box::new(other));
        self
    }

    /// True when every failure in the chain is an unknown name
    pub fn is_unresolved_only(&self) -> bool {
        !self.unresolved.is_empty()
            && self.kind == ErrorKind::Semantic
            && self.cause.as_ref().map_or(true, |c| c.is_unresolved_only())
    }

    /// Message with the expression and type details, for display
    pub fn describe(&self) -> String {
        let mut text = match &self.expression {
            Some(expr) => format!("{}: {}", expr, self.message),
            None => self.message.clone(),
        };
        if let (Some(expected), Some(actual)) = (&self.expected, &self.actual) {
            text.push_str(&format!(" (expected {}, got {})", expected, actual));
        }
        if let Some(suggestion) = &self.suggestion {
            text.push_str(&format!(". {}", suggestion));
        }
        text
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.message)
    }
}

impl std::error::Error for ErrorValue {}
