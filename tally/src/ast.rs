//! Expression component tree
//!
//! This module contains the structural form of an expression, produced by the
//! component parser and consumed by the numeric evaluator and the solver:
//! - `Span` for tracking source locations
//! - `ExpressionComponent` / `ComponentKind` for the tree itself
//! - `ArithmeticOperation` for binary operators

use crate::semantic::SemanticValue;
use serde::Serialize;
use std::fmt;

/// Span representing a location in a line of source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn from_pest_span(span: pest::Span) -> Self {
        let (line, col) = span.start_pos().line_col();
        Self {
            start: span.start(),
            end: span.end(),
            line,
            col,
        }
    }

    /// Smallest span covering both
    pub fn join(&self, other: &Span) -> Span {
        let first = if self.start <= other.start { self } else { other };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: first.line,
            col: first.col,
        }
    }

    /// True when `other` starts exactly where this span ends
    pub fn touches(&self, other: &Span) -> bool {
        self.end == other.start
    }
}

/// Binary arithmetic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArithmeticOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl ArithmeticOperation {
    /// Returns a human-readable name for the operation
    pub fn name(&self) -> &'static str {
        match self {
            ArithmeticOperation::Add => "addition",
            ArithmeticOperation::Subtract => "subtraction",
            ArithmeticOperation::Multiply => "multiplication",
            ArithmeticOperation::Divide => "division",
            ArithmeticOperation::Modulo => "modulo",
            ArithmeticOperation::Power => "exponentiation",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOperation::Add => "+",
            ArithmeticOperation::Subtract => "-",
            ArithmeticOperation::Multiply => "*",
            ArithmeticOperation::Divide => "/",
            ArithmeticOperation::Modulo => "mod",
            ArithmeticOperation::Power => "^",
        }
    }

    /// Binding strength; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            ArithmeticOperation::Add | ArithmeticOperation::Subtract => 1,
            ArithmeticOperation::Multiply
            | ArithmeticOperation::Divide
            | ArithmeticOperation::Modulo => 2,
            ArithmeticOperation::Power => 4,
        }
    }

    pub fn is_right_associative(&self) -> bool {
        matches!(self, ArithmeticOperation::Power)
    }
}

impl fmt::Display for ArithmeticOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Operators as they appear between (or after) operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    Binary(ArithmeticOperation),
    /// `of` between a percentage and a base: multiplication
    Of,
    /// Postfix `%` applied to a non-literal operand
    Percent,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        let op = match symbol {
            "+" => ArithmeticOperation::Add,
            "-" | "−" => ArithmeticOperation::Subtract,
            "*" | "×" | "·" => ArithmeticOperation::Multiply,
            "/" | "÷" | "per" => ArithmeticOperation::Divide,
            "^" | "**" => ArithmeticOperation::Power,
            "mod" => ArithmeticOperation::Modulo,
            "of" => return Some(Operator::Of),
            "%" => return Some(Operator::Percent),
            _ => return None,
        };
        Some(Operator::Binary(op))
    }
}

/// A function-call argument, optionally named (`round(x, digits: 2)`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    pub name: Option<String>,
    pub components: Vec<ExpressionComponent>,
    pub text: String,
}

/// What follows a component inside `[...]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Access {
    Index(Vec<ExpressionComponent>),
    Slice {
        start: Option<Vec<ExpressionComponent>>,
        end: Option<Vec<ExpressionComponent>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ComponentKind {
    /// Literal text with its pre-parsed semantic value, when it has one
    Literal(Option<SemanticValue>),
    /// Normalized variable (or phrase) name
    Variable(String),
    Operator(Operator),
    Function {
        name: String,
        args: Vec<Argument>,
    },
    Parentheses(Vec<ExpressionComponent>),
    List(Vec<Vec<ExpressionComponent>>),
    ListAccess {
        base: Box<ExpressionComponent>,
        access: Access,
    },
    Range {
        start: Box<ExpressionComponent>,
        end: Box<ExpressionComponent>,
        step: Option<Box<ExpressionComponent>>,
    },
}

/// One node of a parsed expression. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionComponent {
    pub kind: ComponentKind,
    pub text: String,
    pub span: Span,
}

impl ExpressionComponent {
    pub fn new(kind: ComponentKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(self.kind, ComponentKind::Operator(_))
    }

    pub fn operator(&self) -> Option<Operator> {
        match self.kind {
            ComponentKind::Operator(op) => Some(op),
            _ => None,
        }
    }

    /// Visit this component and every nested one, depth first
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a ExpressionComponent)) {
        visit(self);
        match &self.kind {
            ComponentKind::Function { args, .. } => {
                for arg in args {
                    for c in &arg.components {
                        c.walk(visit);
                    }
                }
            }
            ComponentKind::Parentheses(children) => {
                for c in children {
                    c.walk(visit);
                }
            }
            ComponentKind::List(items) => {
                for item in items {
                    for c in item {
                        c.walk(visit);
                    }
                }
            }
            ComponentKind::ListAccess { base, access } => {
                base.walk(visit);
                match access {
                    Access::Index(index) => {
                        for c in index {
                            c.walk(visit);
                        }
                    }
                    Access::Slice { start, end } => {
                        for bound in [start, end].into_iter().flatten() {
                            for c in bound {
                                c.walk(visit);
                            }
                        }
                    }
                }
            }
            ComponentKind::Range { start, end, step } => {
                start.walk(visit);
                end.walk(visit);
                if let Some(step) = step {
                    step.walk(visit);
                }
            }
            ComponentKind::Literal(_) | ComponentKind::Variable(_) | ComponentKind::Operator(_) => {}
        }
    }
}

/// Collect every variable name referenced anywhere in `components`
pub fn referenced_variables(components: &[ExpressionComponent]) -> Vec<String> {
    let mut names = Vec::new();
    for component in components {
        component.walk(&mut |c| {
            if let ComponentKind::Variable(name) = &c.kind {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        });
    }
    names
}

/// True if any literal in the tree carries a value satisfying `predicate`
pub fn any_literal(
    components: &[ExpressionComponent],
    predicate: &dyn Fn(&SemanticValue) -> bool,
) -> bool {
    let mut found = false;
    for component in components {
        component.walk(&mut |c| {
            if let ComponentKind::Literal(Some(value)) = &c.kind {
                if predicate(value) {
                    found = true;
                }
            }
        });
    }
    found
}
