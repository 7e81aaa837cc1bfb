use crate::evaluator::EvaluationContext;
use crate::parser::parse_line;
use crate::pipeline::{Pipeline, RenderNode};
use crate::semantic::{ErrorValue, FormatOptions};
use crate::stores::{EquationLog, FunctionTable, VariableTable};
use crate::{ResourceLimits, TallyError, TallyResult};
use chrono::{DateTime, FixedOffset, Local};
use tracing::debug;

/// The tally evaluation engine.
///
/// Owns the variable, function and equation stores of one document and runs
/// every line through the evaluator pipeline, top to bottom.
pub struct Engine {
    variables: VariableTable,
    functions: FunctionTable,
    equations: EquationLog,
    pipeline: Pipeline,
    format: FormatOptions,
    limits: ResourceLimits,
    /// Pinned clock; the local clock is read per document otherwise
    now: Option<DateTime<FixedOffset>>,
    /// Lines evaluated so far through `evaluate_line`
    lines: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            variables: VariableTable::new(),
            functions: FunctionTable::new(),
            equations: EquationLog::new(),
            pipeline: Pipeline::standard(),
            format: FormatOptions::default(),
            limits: ResourceLimits::default(),
            now: None,
            lines: 0,
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine whose `today` and `now` are fixed
    pub fn with_now(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Some(now),
            ..Self::default()
        }
    }

    /// Create an engine with custom resource limits
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }

    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    pub fn format(&self) -> &FormatOptions {
        &self.format
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn equations(&self) -> &EquationLog {
        &self.equations
    }

    /// Forget every variable, function and equation
    pub fn reset(&mut self) {
        self.variables = VariableTable::new();
        self.functions = FunctionTable::new();
        self.equations = EquationLog::new();
        self.lines = 0;
    }

    /// Evaluate a whole document from a clean state. Every line yields exactly
    /// one render node.
    pub fn evaluate_document(&mut self, text: &str) -> TallyResult<Vec<RenderNode>> {
        if text.len() > self.limits.max_document_bytes {
            return Err(TallyError::ResourceLimitExceeded {
                limit_name: "max_document_bytes".to_string(),
                limit_value: self.limits.max_document_bytes.to_string(),
                actual_value: text.len().to_string(),
                suggestion: "Split the document into smaller ones".to_string(),
            });
        }
        self.reset();
        let now = self.clock();
        let nodes = text
            .lines()
            .map(|raw| {
                self.lines += 1;
                self.evaluate_at(raw, self.lines, now)
            })
            .collect::<Vec<_>>();
        debug!(lines = nodes.len(), variables = self.variables.len(), "document evaluated");
        Ok(nodes)
    }

    /// Evaluate one more line after those already evaluated, keeping state
    pub fn evaluate_line(&mut self, raw: &str) -> RenderNode {
        self.lines += 1;
        let now = self.clock();
        self.evaluate_at(raw, self.lines, now)
    }

    fn clock(&self) -> DateTime<FixedOffset> {
        self.now.unwrap_or_else(|| Local::now().fixed_offset())
    }

    fn evaluate_at(&mut self, raw: &str, line: usize, now: DateTime<FixedOffset>) -> RenderNode {
        let length = raw.chars().count();
        if length > self.limits.max_line_length {
            let error = ErrorValue::runtime(format!(
                "Line is {} characters long; the limit is {}",
                length, self.limits.max_line_length
            ));
            return RenderNode::error(line, raw, &error);
        }

        let node = parse_line(raw, line);
        let mut ctx = EvaluationContext::new(
            &mut self.variables,
            &mut self.functions,
            &mut self.equations,
            line,
            &self.format,
            &self.limits,
            now,
        );
        self.pipeline
            .evaluate(&node, &mut ctx)
            .into_node()
            .unwrap_or_else(|| RenderNode::text(line, raw, raw.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn engine() -> Engine {
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 15, 12, 0, 0)
            .unwrap();
        Engine::with_now(now)
    }

    #[test]
    fn one_node_per_line() {
        let nodes = engine().evaluate_document("# header\nx = 2\nx * 3\n\n").unwrap();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[2].result(), Some("6"));
    }

    #[test]
    fn document_evaluation_starts_clean() {
        let mut engine = engine();
        engine.evaluate_document("a = 1").unwrap();
        assert_eq!(engine.variables().len(), 1);
        engine.evaluate_document("b = 2\nc = 3").unwrap();
        assert_eq!(engine.variables().len(), 2);
    }

    #[test]
    fn line_by_line_keeps_state() {
        let mut engine = engine();
        engine.evaluate_line("rate = 4");
        assert_eq!(engine.evaluate_line("rate * 2").result(), Some("8"));
    }

    #[test]
    fn enforces_size_limits() {
        let limits = ResourceLimits {
            max_document_bytes: 13,
            max_line_length: 5,
            ..ResourceLimits::default()
        };
        let mut engine = engine().with_limits(limits);
        assert!(matches!(
            engine.evaluate_document("x = 1234567890"),
            Err(TallyError::ResourceLimitExceeded { .. })
        ));
        let nodes = engine.evaluate_document("1 + 2\n123456").unwrap();
        assert_eq!(nodes[0].result(), Some("3"));
        assert!(nodes[1].is_error());
    }
}
