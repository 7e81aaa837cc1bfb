//! Equation solving by symbolic inversion
//!
//! Two entry points:
//! - explicit: `solve x in y = 2*x + 3, y = 11 [where ...]`. Helper equations
//!   are evaluated into a local scope before the main one is solved.
//! - implicit: a bare reference to a name with no value, solved from the most
//!   recent earlier equation that mentions it.
//!
//! The solved tree is printed back to text and evaluated. When inputs are
//! still unknown the result stays symbolic, with known values substituted.

pub mod algebra;
pub mod format;
pub mod inverter;
pub mod substitute;

pub use algebra::AlgebraNode;

use crate::evaluator::{evaluate_text, EvaluationContext};
use crate::parser::line::{assignment_position, split_top_level};
use crate::parser::parse_components;
use crate::semantic::{ErrorValue, SemanticValue, SymbolicValue};
use crate::stores::{normalize_name, Equation};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static SOLVE_REQUEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^solve\s+(?:for\s+)?(.+?)\s+(?:in|from)\s+(.+)$").expect("solve request regex must compile")
});
static WHERE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+where\s+").expect("where regex must compile"));

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("'{0}' does not appear in the equation")]
    NotFound(String),
    #[error("'{0}' appears on both sides of the equation")]
    BothSides(String),
    #[error("'{0}' appears more than once on its side of the equation")]
    Repeated(String),
    #[error("Cannot solve for '{0}' inside {1}()")]
    InsideFunction(String, String),
    #[error("Cannot invert {0}")]
    NotInvertible(String),
    #[error("Cannot invert a power with a non-numeric {0}")]
    NonNumeric(String),
    #[error("{0}")]
    Unsupported(String),
}

impl From<SolveError> for ErrorValue {
    fn from(error: SolveError) -> Self {
        let value = ErrorValue::semantic(error.to_string());
        match error {
            SolveError::BothSides(_) | SolveError::Repeated(_) => {
                value.with_suggestion("Collect the terms into a single occurrence first")
            }
            SolveError::NotFound(name) => value.with_suggestion(format!("Write an equation that uses '{}'", name)),
            _ => value,
        }
    }
}

/// A parsed `solve` line
#[derive(Debug, Clone, PartialEq)]
pub struct SolveRequest {
    pub target: String,
    pub equation: String,
    /// `name = expression` pairs evaluated before solving
    pub helpers: Vec<String>,
}

impl SolveRequest {
    pub fn parse(text: &str) -> Result<SolveRequest, ErrorValue> {
        let caps = SOLVE_REQUEST.captures(text.trim()).ok_or_else(|| {
            ErrorValue::syntax(
                "Expected 'solve <name> in <equation>'",
                "For example: solve x in y = 2*x + 3, y = 11",
            )
        })?;
        let target = normalize_name(&caps[1]);
        let mut parts: Vec<String> = Vec::new();
        for section in WHERE.split(&caps[2]) {
            parts.extend(
                split_top_level(section)
                    .into_iter()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from),
            );
        }
        if parts.is_empty() {
            return Err(ErrorValue::syntax("Missing equation", "Add an equation after 'in'"));
        }
        let equation = parts.remove(0);
        Ok(SolveRequest {
            target,
            equation,
            helpers: parts,
        })
    }
}

/// Split `left = right` at its top-level `=`
pub fn split_equation(text: &str) -> Result<(&str, &str), ErrorValue> {
    let at = assignment_position(text).ok_or_else(|| {
        ErrorValue::syntax(
            format!("'{}' is not an equation", text.trim()),
            "An equation needs '=' between its sides",
        )
    })?;
    Ok((text[..at].trim(), text[at + 1..].trim()))
}

/// Isolate `target` in `left = right`
pub fn solve_for(left: &str, right: &str, target: &str) -> Result<AlgebraNode, ErrorValue> {
    let side = |text: &str| -> Result<AlgebraNode, ErrorValue> {
        let components = parse_components(text).map_err(|e| ErrorValue::parse(e.message()))?;
        Ok(algebra::from_components(&components)?)
    };
    Ok(inverter::isolate(&side(left)?, &side(right)?, target)?)
}

/// Evaluate an explicit `solve` line
pub fn solve_explicit(text: &str, ctx: &mut EvaluationContext<'_>) -> SemanticValue {
    let request = match SolveRequest::parse(text) {
        Ok(request) => request,
        Err(error) => return SemanticValue::Error(error.with_expression(text.trim())),
    };

    ctx.push_scope(IndexMap::new());
    let result = solve_request(&request, ctx);
    ctx.pop_scope();

    result.unwrap_or_else(|error| SemanticValue::Error(error.with_expression(text.trim())))
}

fn solve_request(request: &SolveRequest, ctx: &mut EvaluationContext<'_>) -> Result<SemanticValue, ErrorValue> {
    for helper in &request.helpers {
        let (name, expression) = split_equation(helper)?;
        let value = evaluate_text(expression, None, ctx);
        if let SemanticValue::Error(error) = value {
            return Err(error);
        }
        ctx.bind_local(name, value);
    }
    let (left, right) = split_equation(&request.equation)?;
    let solved = solve_for(left, right, &request.target)?;
    Ok(evaluate_solution(&solved, ctx))
}

/// Solve for `name` from earlier equations, most recent first
///
/// A concrete result wins over a symbolic one, and a symbolic one over the
/// first error an isolating equation produced. Returns `None` when no earlier
/// equation can be solved for the name.
pub fn solve_implicit(name: &str, ctx: &mut EvaluationContext<'_>) -> Option<SemanticValue> {
    let name = normalize_name(name);
    let equations: Vec<Equation> = ctx
        .equations
        .mentioning(&name, ctx.line)
        .into_iter()
        .cloned()
        .collect();

    let mut symbolic = None;
    let mut failure = None;
    for equation in equations {
        let solved = if equation.variable == name {
            evaluate_defining(&equation, ctx)
        } else {
            match solve_for(&equation.variable, &equation.expression, &name) {
                Ok(node) => evaluate_solution(&node, ctx),
                Err(_) => continue,
            }
        };
        match solved {
            SemanticValue::Error(_) => {
                failure.get_or_insert(solved);
            }
            SemanticValue::Symbolic(_) => {
                symbolic.get_or_insert(solved);
            }
            value => return Some(value),
        }
    }
    symbolic.or(failure)
}

/// Re-evaluate the right-hand side of `name = expression`
fn evaluate_defining(equation: &Equation, ctx: &mut EvaluationContext<'_>) -> SemanticValue {
    match parse_components(&equation.expression) {
        Ok(components) => match algebra::from_components(&components) {
            Ok(node) => evaluate_solution(&node, ctx),
            Err(error) => SemanticValue::Error(error.into()),
        },
        Err(error) => SemanticValue::Error(ErrorValue::parse(error.message())),
    }
}

/// Evaluate a solved tree. Names whose values are themselves symbolic count
/// as unknown; if any unknown remains the result is symbolic text.
pub fn evaluate_solution(node: &AlgebraNode, ctx: &mut EvaluationContext<'_>) -> SemanticValue {
    let symbolic = format::to_symbolic(node);
    let mut known = Vec::new();
    let mut shadows = IndexMap::new();
    for name in node.variables() {
        match ctx.lookup(&name) {
            Some(SemanticValue::Symbolic(_)) => {
                shadows.insert(name.clone(), SemanticValue::Error(ErrorValue::unknown_variable(&name)));
            }
            Some(SemanticValue::Error(_)) | None => {}
            Some(value) => known.push((name, value.to_string())),
        }
    }

    ctx.push_scope(shadows);
    let value = evaluate_text(&symbolic.text, None, ctx);
    ctx.pop_scope();

    match value {
        SemanticValue::Error(error) if error.is_unresolved_only() => SemanticValue::Symbolic(SymbolicValue::new(
            substitute::substitute(&symbolic.text, &known),
            symbolic.precedence,
        )),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_requests() {
        let request = SolveRequest::parse("solve x in y = 2*x + 3, y = 11").unwrap();
        assert_eq!(request.target, "x");
        assert_eq!(request.equation, "y = 2*x + 3");
        assert_eq!(request.helpers, vec!["y = 11"]);

        let request = SolveRequest::parse("Solve for r in a = pi * r^2 where a = 10, k = 2").unwrap();
        assert_eq!(request.target, "r");
        assert_eq!(request.equation, "a = pi * r^2");
        assert_eq!(request.helpers, vec!["a = 10", "k = 2"]);

        assert!(SolveRequest::parse("solve x").is_err());
    }

    #[test]
    fn splits_equations() {
        assert_eq!(split_equation("y = m*x + b").unwrap(), ("y", "m*x + b"));
        assert!(split_equation("y >= 2").is_err());
    }

    #[test]
    fn solve_errors_are_semantic() {
        let error: ErrorValue = SolveError::BothSides("x".into()).into();
        assert_eq!(error.kind, crate::semantic::ErrorKind::Semantic);
        assert!(error.suggestion.is_some());
    }
}
