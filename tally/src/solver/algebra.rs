//! Algebraic expression tree
//!
//! Built from components independently of the numeric evaluator. Nodes keep
//! the source text of literals so a solved tree prints back the way it was
//! written.

use super::SolveError;
use crate::ast::{ArithmeticOperation, ComponentKind, ExpressionComponent, Operator};
use crate::parser::literals::parse_value;
use crate::semantic::symbolic::UNARY_PRECEDENCE;
use crate::semantic::SemanticValue;
use crate::stores::mentions;

#[derive(Debug, Clone, PartialEq)]
pub enum AlgebraNode {
    /// Literal source text (`3`, `5 m`, `20%`); opaque structures such as
    /// lists are kept as literals too
    Literal(String),
    Variable(String),
    Negate(Box<AlgebraNode>),
    Binary(Box<AlgebraNode>, ArithmeticOperation, Box<AlgebraNode>),
    Function(String, Vec<AlgebraNode>),
}

impl AlgebraNode {
    pub fn literal(text: impl Into<String>) -> Self {
        AlgebraNode::Literal(text.into())
    }

    pub fn binary(left: AlgebraNode, op: ArithmeticOperation, right: AlgebraNode) -> Self {
        AlgebraNode::Binary(Box::new(left), op, Box::new(right))
    }

    pub fn function(name: &str, args: Vec<AlgebraNode>) -> Self {
        AlgebraNode::Function(name.to_string(), args)
    }

    pub fn contains(&self, target: &str) -> bool {
        match self {
            AlgebraNode::Literal(text) => mentions(text, target),
            AlgebraNode::Variable(name) => name == target,
            AlgebraNode::Negate(inner) => inner.contains(target),
            AlgebraNode::Binary(l, _, r) => l.contains(target) || r.contains(target),
            AlgebraNode::Function(_, args) => args.iter().any(|a| a.contains(target)),
        }
    }

    /// Variable names in first-appearance order
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            AlgebraNode::Literal(_) => {}
            AlgebraNode::Variable(name) => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            AlgebraNode::Negate(inner) => inner.collect_variables(names),
            AlgebraNode::Binary(l, _, r) => {
                l.collect_variables(names);
                r.collect_variables(names);
            }
            AlgebraNode::Function(_, args) => {
                for arg in args {
                    arg.collect_variables(names);
                }
            }
        }
    }

    /// A literal number or percentage, possibly negated
    pub fn is_numeric_constant(&self) -> bool {
        match self {
            AlgebraNode::Literal(text) => matches!(
                parse_value(text),
                Some(SemanticValue::Number(_) | SemanticValue::Percentage(_))
            ),
            AlgebraNode::Negate(inner) => inner.is_numeric_constant(),
            _ => false,
        }
    }

    pub fn is_literal(&self, text: &str) -> bool {
        matches!(self, AlgebraNode::Literal(t) if t == text)
    }
}

/// Build a tree from one side of an equation
pub fn from_components(components: &[ExpressionComponent]) -> Result<AlgebraNode, SolveError> {
    if components.is_empty() {
        return Err(SolveError::Unsupported("Empty side of an equation".to_string()));
    }
    let mut pos = 0;
    let node = expression(components, &mut pos, 0)?;
    match components.get(pos) {
        Some(extra) => Err(SolveError::Unsupported(format!("Unexpected '{}'", extra.text))),
        None => Ok(node),
    }
}

fn expression(
    components: &[ExpressionComponent],
    pos: &mut usize,
    min_precedence: u8,
) -> Result<AlgebraNode, SolveError> {
    let mut left = unary(components, pos)?;

    while let Some(next) = components.get(*pos) {
        let (op, explicit) = match &next.kind {
            ComponentKind::Operator(Operator::Percent) => {
                return Err(SolveError::Unsupported(
                    "Cannot solve through a postfix '%'".to_string(),
                ))
            }
            ComponentKind::Operator(Operator::Binary(op)) => (*op, true),
            ComponentKind::Operator(Operator::Of) => (ArithmeticOperation::Multiply, true),
            _ => (ArithmeticOperation::Multiply, false),
        };
        let precedence = op.precedence();
        if precedence < min_precedence {
            break;
        }
        if explicit {
            *pos += 1;
        }
        let next_min = if op.is_right_associative() {
            precedence
        } else {
            precedence + 1
        };
        let right = expression(components, pos, next_min)?;
        left = AlgebraNode::binary(left, op, right);
    }
    Ok(left)
}

fn unary(components: &[ExpressionComponent], pos: &mut usize) -> Result<AlgebraNode, SolveError> {
    let component = components
        .get(*pos)
        .ok_or_else(|| SolveError::Unsupported("Missing value".to_string()))?;
    *pos += 1;
    match &component.kind {
        ComponentKind::Operator(Operator::Binary(ArithmeticOperation::Subtract)) => Ok(
            AlgebraNode::Negate(Box::new(expression(components, pos, UNARY_PRECEDENCE)?)),
        ),
        ComponentKind::Operator(Operator::Binary(ArithmeticOperation::Add)) => {
            expression(components, pos, UNARY_PRECEDENCE)
        }
        ComponentKind::Operator(_) => Err(SolveError::Unsupported(format!(
            "Unexpected '{}'",
            component.text
        ))),
        ComponentKind::Variable(name) => Ok(AlgebraNode::Variable(name.clone())),
        ComponentKind::Parentheses(children) => from_components(children),
        ComponentKind::Function { name, args } => {
            if args.iter().any(|a| a.name.is_some()) {
                return Ok(AlgebraNode::literal(component.text.clone()));
            }
            let args = args
                .iter()
                .map(|a| from_components(&a.components))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(AlgebraNode::Function(name.clone(), args))
        }
        ComponentKind::Literal(_)
        | ComponentKind::List(_)
        | ComponentKind::ListAccess { .. }
        | ComponentKind::Range { .. } => Ok(AlgebraNode::literal(component.text.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_components;

    fn tree(text: &str) -> AlgebraNode {
        from_components(&parse_components(text).unwrap()).unwrap()
    }

    #[test]
    fn builds_with_precedence() {
        let node = tree("m*x + b");
        assert_eq!(
            node,
            AlgebraNode::binary(
                AlgebraNode::binary(
                    AlgebraNode::Variable("m".into()),
                    ArithmeticOperation::Multiply,
                    AlgebraNode::Variable("x".into())
                ),
                ArithmeticOperation::Add,
                AlgebraNode::Variable("b".into())
            )
        );
        assert_eq!(node.variables(), vec!["m", "x", "b"]);
    }

    #[test]
    fn implicit_multiplication_and_functions() {
        let node = tree("2 x + sqrt(a)");
        assert!(node.contains("x"));
        assert!(node.contains("a"));
        assert!(!node.contains("b"));
        match node {
            AlgebraNode::Binary(left, ArithmeticOperation::Add, right) => {
                assert!(matches!(*left, AlgebraNode::Binary(_, ArithmeticOperation::Multiply, _)));
                assert!(matches!(*right, AlgebraNode::Function(ref name, _) if name == "sqrt"));
            }
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn numeric_constants() {
        assert!(AlgebraNode::literal("2").is_numeric_constant());
        assert!(AlgebraNode::Negate(Box::new(AlgebraNode::literal("1.5"))).is_numeric_constant());
        assert!(!AlgebraNode::literal("5 m").is_numeric_constant());
        assert!(!AlgebraNode::Variable("n".into()).is_numeric_constant());
    }
}
