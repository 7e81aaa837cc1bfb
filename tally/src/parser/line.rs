//! Line classification
//!
//! Splits a raw notepad line into its syntactic category before any evaluator
//! sees it. Expression text is parsed into components here; a parse failure is
//! kept on the node so the pipeline can still render the line.

use super::components::parse_components;
use crate::ast::ExpressionComponent;
use crate::error::TallyError;
use crate::stores::{normalize_name, Parameter};
use once_cell::sync::Lazy;
use regex::Regex;

static PHRASE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}_][\p{L}\d_' ]*$").expect("phrase name regex must compile"));
static FUNCTION_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([\p{L}_][\p{L}\d_]*)\s*\((.*)\)$").expect("function head regex must compile")
});
static SOLVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^solve\s").expect("solve regex must compile"));

#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// Blank lines and `#` / `//` comments
    Comment,
    Assignment {
        name: String,
        expression: String,
    },
    FunctionDefinition {
        name: String,
        params: Vec<Parameter>,
        body: String,
    },
    Expression {
        text: String,
    },
}

#[derive(Debug, Clone)]
pub struct LineNode {
    /// 1-based
    pub line: usize,
    pub raw: String,
    pub kind: LineKind,
    /// Ends with the `=>` display marker
    pub display: bool,
    /// Components of the expression, right-hand side or body
    pub components: Option<Vec<ExpressionComponent>>,
    pub parse_error: Option<TallyError>,
}

impl LineNode {
    /// The text that gets evaluated for this line
    pub fn expression_text(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Comment => None,
            LineKind::Assignment { expression, .. } => Some(expression),
            LineKind::FunctionDefinition { body, .. } => Some(body),
            LineKind::Expression { text } => Some(text),
        }
    }

    pub fn is_solve(&self) -> bool {
        matches!(&self.kind, LineKind::Expression { text } if SOLVE.is_match(text))
    }
}

pub fn parse_line(raw: &str, line: usize) -> LineNode {
    let trimmed = raw.trim();
    let mut node = LineNode {
        line,
        raw: raw.to_string(),
        kind: LineKind::Comment,
        display: false,
        components: None,
        parse_error: None,
    };
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
        return node;
    }

    let body = match trimmed.strip_suffix("=>") {
        Some(rest) => {
            node.display = true;
            rest.trim_end()
        }
        None => trimmed,
    };

    node.kind = classify(body);
    if let LineKind::FunctionDefinition { params, .. } = &node.kind {
        if let Some(error) = params_error(params) {
            node.parse_error = Some(error);
        }
    }
    if node.is_solve() || node.parse_error.is_some() {
        return node;
    }
    if let Some(text) = node.expression_text() {
        if text.is_empty() {
            node.parse_error = Some(TallyError::parse(
                "Missing expression",
                Default::default(),
                body,
            ));
        } else {
            match parse_components(text) {
                Ok(components) => node.components = Some(components),
                Err(error) => node.parse_error = Some(error),
            }
        }
    }
    node
}

fn classify(body: &str) -> LineKind {
    if SOLVE.is_match(body) {
        return LineKind::Expression { text: body.to_string() };
    }
    let Some(at) = assignment_position(body) else {
        return LineKind::Expression { text: body.to_string() };
    };
    let left = body[..at].trim();
    let right = body[at + 1..].trim().to_string();

    if let Some(caps) = FUNCTION_HEAD.captures(left) {
        let name = normalize_name(&caps[1]);
        let params = split_top_level(&caps[2])
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .map(parse_parameter)
            .collect();
        return LineKind::FunctionDefinition { name, params, body: right };
    }
    if PHRASE_NAME.is_match(left) {
        return LineKind::Assignment {
            name: normalize_name(left),
            expression: right,
        };
    }
    LineKind::Expression { text: body.to_string() }
}

/// Byte index of the first `=` outside brackets that is not part of a
/// comparison or arrow
pub fn assignment_position(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth -= 1,
            b'=' if depth == 0 => {
                let before = i.checked_sub(1).map(|j| bytes[j]);
                let after = bytes.get(i + 1).copied();
                let paired = matches!(before, Some(b'=' | b'<' | b'>' | b'!'))
                    || matches!(after, Some(b'=' | b'>'));
                if !paired {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split at commas that are not inside brackets
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// `rate` or `rate = 0.05`
fn parse_parameter(text: &str) -> Parameter {
    match text.split_once('=') {
        Some((name, default)) => {
            let default_text = default.trim().to_string();
            Parameter {
                name: normalize_name(name),
                default: parse_components(&default_text).ok(),
                default_text: Some(default_text),
            }
        }
        None => Parameter {
            name: normalize_name(text),
            default: None,
            default_text: None,
        },
    }
}

fn params_error(params: &[Parameter]) -> Option<TallyError> {
    for param in params {
        if !PHRASE_NAME.is_match(&param.name) || param.name.contains(' ') {
            return Some(TallyError::parse_with_suggestion(
                format!("Invalid parameter name '{}'", param.name),
                Default::default(),
                param.name.clone(),
                "Parameter names are single words",
            ));
        }
        if let (Some(text), None) = (&param.default_text, &param.default) {
            return parse_components(text).err();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_lines() {
        assert_eq!(parse_line("  # note", 1).kind, LineKind::Comment);
        assert_eq!(parse_line("", 2).kind, LineKind::Comment);
        assert_eq!(parse_line("// note", 3).kind, LineKind::Comment);

        let node = parse_line("Total Cost = price + 10% =>", 4);
        assert!(node.display);
        assert_eq!(
            node.kind,
            LineKind::Assignment {
                name: "total cost".into(),
                expression: "price + 10%".into()
            }
        );
        assert!(node.components.is_some());
    }

    #[test]
    fn function_definitions_with_defaults() {
        let node = parse_line("interest(p, rate = 5%) = p * rate", 1);
        match node.kind {
            LineKind::FunctionDefinition { name, params, body } => {
                assert_eq!(name, "interest");
                assert_eq!(params.len(), 2);
                assert_eq!(params[1].default_text.as_deref(), Some("5%"));
                assert!(params[1].default.is_some());
                assert_eq!(body, "p * rate");
            }
            other => panic!("expected a function definition, got {:?}", other),
        }
    }

    #[test]
    fn comparisons_and_solve_are_expressions() {
        assert!(matches!(parse_line("solve x in y = 2*x", 1).kind, LineKind::Expression { .. }));
        assert!(parse_line("solve x in y = 2*x", 1).is_solve());
        assert_eq!(assignment_position("a <= b"), None);
        assert_eq!(assignment_position("f(a = 1)"), None);
        assert_eq!(assignment_position("x = 1"), Some(2));
    }

    #[test]
    fn parse_failures_stay_on_the_node() {
        let node = parse_line("x = (1 + 2", 1);
        assert!(node.parse_error.is_some());
        assert!(node.components.is_none());
    }
}
