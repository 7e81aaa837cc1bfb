use crate::ast::ArithmeticOperation;

/// Precedence of an operand that never needs parentheses
pub const ATOM_PRECEDENCE: u8 = 9;
/// Precedence of a unary minus
pub const UNARY_PRECEDENCE: u8 = 3;

/// An unevaluated expression kept as text. `precedence` is that of its
/// outermost operator, so combining can parenthesize minimally.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicValue {
    pub text: String,
    pub precedence: u8,
}

impl SymbolicValue {
    pub fn new(text: impl Into<String>, precedence: u8) -> Self {
        Self {
            text: text.into(),
            precedence,
        }
    }

    pub fn atom(text: impl Into<String>) -> Self {
        Self::new(text, ATOM_PRECEDENCE)
    }

    pub fn combine(left: &SymbolicValue, op: ArithmeticOperation, right: &SymbolicValue) -> SymbolicValue {
        let prec = op.precedence();
        let left_parens = left.precedence < prec || (op.is_right_associative() && left.precedence == prec);
        let right_parens = right.precedence < prec
            || (right.precedence == prec
                && matches!(
                    op,
                    ArithmeticOperation::Subtract
                        | ArithmeticOperation::Divide
                        | ArithmeticOperation::Modulo
                ));
        let wrap = |s: &SymbolicValue, parens: bool| {
            if parens {
                format!("({})", s.text)
            } else {
                s.text.clone()
            }
        };
        let text = match op {
            ArithmeticOperation::Power => format!("{}^{}", wrap(left, left_parens), wrap(right, right_parens)),
            _ => format!(
                "{} {} {}",
                wrap(left, left_parens),
                op.symbol(),
                wrap(right, right_parens)
            ),
        };
        SymbolicValue::new(text, prec)
    }

    pub fn negate(&self) -> SymbolicValue {
        if self.precedence < UNARY_PRECEDENCE {
            SymbolicValue::new(format!("-({})", self.text), UNARY_PRECEDENCE)
        } else {
            SymbolicValue::new(format!("-{}", self.text), UNARY_PRECEDENCE)
        }
    }
}
