//! Parsing of notepad lines
//!
//! - `components`: pest grammar + builder producing `ExpressionComponent`s
//! - `literals`: semantic values from their written form
//! - `line`: classification of a raw line

use pest_derive::Parser;

pub mod components;
pub mod line;
pub mod literals;

pub use components::parse_components;
pub use line::{parse_line, LineKind, LineNode};
pub use literals::{parse_value, parse_value_with};

#[derive(Parser)]
#[grammar = "src/parser/components.pest"]
pub struct ComponentParser;
