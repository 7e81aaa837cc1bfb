//! Printing a tree with minimal parentheses

use super::algebra::AlgebraNode;
use crate::ast::ArithmeticOperation;
use crate::semantic::symbolic::{SymbolicValue, UNARY_PRECEDENCE};

/// Text of `node` as a symbolic value, parenthesized only where precedence
/// or associativity requires it
pub fn to_symbolic(node: &AlgebraNode) -> SymbolicValue {
    match node {
        AlgebraNode::Literal(text) => literal(text),
        AlgebraNode::Variable(name) => SymbolicValue::atom(name.clone()),
        AlgebraNode::Negate(inner) => to_symbolic(inner).negate(),
        AlgebraNode::Binary(l, op, r) => SymbolicValue::combine(&to_symbolic(l), *op, &to_symbolic(r)),
        AlgebraNode::Function(name, args) => {
            let args: Vec<String> = args.iter().map(|a| to_symbolic(a).text).collect();
            SymbolicValue::atom(format!("{}({})", name, args.join(", ")))
        }
    }
}

/// `-3` binds like a unary minus and `5 m` like a product
fn literal(text: &str) -> SymbolicValue {
    if text.starts_with('-') {
        SymbolicValue::new(text, UNARY_PRECEDENCE)
    } else if text.contains(' ') {
        SymbolicValue::new(text, ArithmeticOperation::Multiply.precedence())
    } else {
        SymbolicValue::atom(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> AlgebraNode {
        AlgebraNode::Variable(name.to_string())
    }

    #[test]
    fn parenthesizes_minimally() {
        use ArithmeticOperation::*;
        let node = AlgebraNode::binary(AlgebraNode::binary(var("y"), Subtract, var("b")), Divide, var("m"));
        assert_eq!(to_symbolic(&node).text, "(y - b) / m");

        let node = AlgebraNode::binary(var("a"), Subtract, AlgebraNode::binary(var("b"), Subtract, var("c")));
        assert_eq!(to_symbolic(&node).text, "a - (b - c)");

        let node = AlgebraNode::binary(var("a"), Add, AlgebraNode::binary(var("b"), Multiply, var("c")));
        assert_eq!(to_symbolic(&node).text, "a + b * c");

        let node = AlgebraNode::binary(AlgebraNode::literal("5 m"), Power, AlgebraNode::literal("2"));
        assert_eq!(to_symbolic(&node).text, "(5 m)^2");
    }

    #[test]
    fn negation_and_functions() {
        let node = AlgebraNode::Negate(Box::new(AlgebraNode::binary(
            var("a"),
            ArithmeticOperation::Add,
            var("b"),
        )));
        assert_eq!(to_symbolic(&node).text, "-(a + b)");
        assert_eq!(
            to_symbolic(&AlgebraNode::function("sqrt", vec![var("a")])).text,
            "sqrt(a)"
        );
    }
}
