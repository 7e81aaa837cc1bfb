//! Evaluation context for a single line
//!
//! Bundles the injected stores with the line number, formatting options, limits,
//! the pinned clock and the local scopes of function calls and `solve` helpers.

use crate::resource_limits::ResourceLimits;
use crate::semantic::{ErrorValue, FormatOptions, SemanticValue};
use crate::stores::{normalize_name, EquationStore, FunctionStore, VariableStore};
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;

pub struct EvaluationContext<'a> {
    pub variables: &'a mut dyn VariableStore,
    pub functions: &'a mut dyn FunctionStore,
    pub equations: &'a mut dyn EquationStore,
    /// 1-based line being evaluated
    pub line: usize,
    pub format: &'a FormatOptions,
    pub limits: &'a ResourceLimits,
    /// Clock used by `today` and `now`
    pub now: DateTime<FixedOffset>,
    call_depth: usize,
    scopes: Vec<IndexMap<String, SemanticValue>>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        variables: &'a mut dyn VariableStore,
        functions: &'a mut dyn FunctionStore,
        equations: &'a mut dyn EquationStore,
        line: usize,
        format: &'a FormatOptions,
        limits: &'a ResourceLimits,
        now: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            variables,
            functions,
            equations,
            line,
            format,
            limits,
            now,
            call_depth: 0,
            scopes: Vec::new(),
        }
    }

    /// Innermost local binding first, then the variable store
    pub fn lookup(&self, name: &str) -> Option<SemanticValue> {
        let name = normalize_name(name);
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).cloned())
            .or_else(|| self.variables.value(&name).cloned())
    }

    /// Binding in the innermost scope only
    pub fn lookup_local(&self, name: &str) -> Option<&SemanticValue> {
        self.scopes.last()?.get(&normalize_name(name))
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Every name visible from here, locals first
    pub fn visible_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.keys().cloned())
            .collect();
        for name in self.variables.names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn push_scope(&mut self, bindings: IndexMap<String, SemanticValue>) {
        self.scopes.push(bindings);
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Bind in the innermost scope, opening one if needed
    pub fn bind_local(&mut self, name: &str, value: SemanticValue) {
        if self.scopes.is_empty() {
            self.scopes.push(IndexMap::new());
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(normalize_name(name), value);
        }
    }

    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Enter a user function call, failing past `max_call_depth`
    pub fn enter_call(&mut self, name: &str) -> Result<(), ErrorValue> {
        if self.call_depth >= self.limits.max_call_depth {
            return Err(ErrorValue::runtime(format!(
                "Maximum call depth of {} exceeded in '{}'",
                self.limits.max_call_depth, name
            ))
            .with_suggestion("Check the function for recursion"));
        }
        self.call_depth += 1;
        Ok(())
    }

    pub fn exit_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    /// Offset used for dates written without a zone
    pub fn local_zone(&self) -> FixedOffset {
        *self.now.offset()
    }
}
