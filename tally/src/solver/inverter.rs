//! Isolating a target variable

use super::algebra::AlgebraNode;
use super::SolveError;
use crate::ast::ArithmeticOperation;

/// Rearrange `left = right` into an expression for `target`
///
/// The side holding the target is peeled one operation at a time; each
/// peeled operation moves to the other side as its inverse.
pub fn isolate(left: &AlgebraNode, right: &AlgebraNode, target: &str) -> Result<AlgebraNode, SolveError> {
    match (left.contains(target), right.contains(target)) {
        (true, true) => Err(SolveError::BothSides(target.to_string())),
        (false, false) => Err(SolveError::NotFound(target.to_string())),
        (true, false) => invert(left, right.clone(), target),
        (false, true) => invert(right, left.clone(), target),
    }
}

/// Solve `expr = result` for `target`, where only `expr` contains it
fn invert(expr: &AlgebraNode, result: AlgebraNode, target: &str) -> Result<AlgebraNode, SolveError> {
    use ArithmeticOperation::*;

    match expr {
        AlgebraNode::Variable(name) if name == target => Ok(result),
        AlgebraNode::Variable(_) => Err(SolveError::NotFound(target.to_string())),
        AlgebraNode::Literal(text) => Err(SolveError::Unsupported(format!(
            "Cannot solve for '{}' inside '{}'",
            target, text
        ))),
        AlgebraNode::Function(name, _) => Err(SolveError::InsideFunction(target.to_string(), name.clone())),
        // -u = t  =>  u = -t
        AlgebraNode::Negate(inner) => invert(inner, negated(result), target),
        AlgebraNode::Binary(l, op, r) => {
            let l_contains = l.contains(target);
            let r_contains = r.contains(target);
            if l_contains && r_contains {
                return Err(SolveError::Repeated(target.to_string()));
            }

            if l_contains {
                let r = (**r).clone();
                let new_result = match op {
                    Add => AlgebraNode::binary(result, Subtract, r),
                    Subtract => AlgebraNode::binary(result, Add, r),
                    Multiply => AlgebraNode::binary(result, Divide, r),
                    Divide => AlgebraNode::binary(result, Multiply, r),
                    // u^2 = t  =>  u = sqrt(t)
                    Power if r.is_literal("2") => AlgebraNode::function("sqrt", vec![result]),
                    // u^c = t  =>  u = t^(1 / c)
                    Power if r.is_numeric_constant() => AlgebraNode::binary(
                        result,
                        Power,
                        AlgebraNode::binary(AlgebraNode::literal("1"), Divide, r),
                    ),
                    Power => return Err(SolveError::NonNumeric("exponent".to_string())),
                    Modulo => return Err(SolveError::NotInvertible(op.name().to_string())),
                };
                invert(l, new_result, target)
            } else {
                let l = (**l).clone();
                let new_result = match op {
                    Add => AlgebraNode::binary(result, Subtract, l),
                    // c - u = t  =>  u = c - t
                    Subtract => AlgebraNode::binary(l, Subtract, result),
                    Multiply => AlgebraNode::binary(result, Divide, l),
                    // c / u = t  =>  u = c / t
                    Divide => AlgebraNode::binary(l, Divide, result),
                    // c^u = t  =>  u = ln(t) / ln(c)
                    Power if l.is_numeric_constant() => AlgebraNode::binary(
                        AlgebraNode::function("ln", vec![result]),
                        Divide,
                        AlgebraNode::function("ln", vec![l]),
                    ),
                    Power => return Err(SolveError::NonNumeric("base".to_string())),
                    Modulo => return Err(SolveError::NotInvertible(op.name().to_string())),
                };
                invert(r, new_result, target)
            }
        }
    }
}

fn negated(node: AlgebraNode) -> AlgebraNode {
    match node {
        AlgebraNode::Negate(inner) => *inner,
        other => AlgebraNode::Negate(Box::new(other)),
    }
}
