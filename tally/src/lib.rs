//! # Tally Engine
//!
//! **Numbers, units, money, dates and equations in plain text**
//!
//! Tally evaluates a notepad line by line. Each line may assign a variable,
//! define a function, state an equation or just compute something, and gets
//! back a typed result for inline display.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tally::{Engine, TallyResult};
//!
//! fn main() -> TallyResult<()> {
//!     let mut engine = Engine::new();
//!
//!     let nodes = engine.evaluate_document(
//!         "price = 100\n\
//!          total = price + 10% =>\n\
//!          50 m + 20 ft =>\n\
//!          solve x in y = 2*x + 3, y = 11 =>",
//!     )?;
//!
//!     for node in nodes {
//!         println!("{}: {}", node.line, node.display_text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Semantic values
//! Every result is one of a closed set of kinds: numbers, percentages,
//! currency amounts and rates, quantities with units, dates, times,
//! durations, lists, symbolic expressions and errors. Arithmetic dispatches
//! on the kinds of both operands.
//!
//! ### Errors are values
//! A failing expression evaluates to an error value that keeps flowing
//! through arithmetic, collecting the names it could not resolve. Only
//! problems around evaluation itself surface as [`TallyError`].
//!
//! ### The pipeline
//! Lines go through ten evaluators in priority order; the first one to claim
//! a line renders it.

pub mod ast;
pub mod datemath;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod pipeline;
pub mod resource_limits;
pub mod semantic;
pub mod solver;
pub mod stores;
pub mod units;

pub use ast::{ExpressionComponent, Span};
pub use engine::Engine;
pub use error::{TallyError, TallyResult};
pub use evaluator::EvaluationContext;
pub use parser::{parse_components, parse_line, parse_value};
pub use pipeline::{NodeEvaluator, Pipeline, RenderKind, RenderNode};
pub use resource_limits::ResourceLimits;
pub use semantic::*;
pub use stores::{
    EquationLog, EquationStore, FunctionStore, FunctionTable, VariableContext, VariableStore, VariableTable,
};
pub use units::Quantity;

#[cfg(test)]
mod tests;
