// Value tests
mod semantic;

// Evaluator tests
mod context;
mod expressions;
mod functions;
mod operations;

// Store and pipeline tests
mod engine;
mod pipeline;
mod stores;

use crate::evaluator::EvaluationContext;
use crate::resource_limits::ResourceLimits;
use crate::semantic::FormatOptions;
use crate::stores::{EquationLog, FunctionTable, VariableTable};
use chrono::{DateTime, FixedOffset, TimeZone};

/// Stores and settings that an `EvaluationContext` borrows
pub(crate) struct Fixture {
    pub variables: VariableTable,
    pub functions: FunctionTable,
    pub equations: EquationLog,
    pub format: FormatOptions,
    pub limits: ResourceLimits,
    pub now: DateTime<FixedOffset>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            variables: VariableTable::new(),
            functions: FunctionTable::new(),
            equations: EquationLog::new(),
            format: FormatOptions::default(),
            limits: ResourceLimits::default(),
            // a Friday
            now: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 15, 9, 30, 0)
                .unwrap(),
        }
    }

    pub fn ctx(&mut self, line: usize) -> EvaluationContext<'_> {
        EvaluationContext::new(
            &mut self.variables,
            &mut self.functions,
            &mut self.equations,
            line,
            &self.format,
            &self.limits,
            self.now,
        )
    }
}
