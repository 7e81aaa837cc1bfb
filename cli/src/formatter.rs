use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, Row, Table};
use tally::{RenderKind, RenderNode};

pub struct Formatter {}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {}
    }

    /// One row per line: number, input, result
    pub fn format_nodes(&self, nodes: &[RenderNode]) -> String {
        if nodes.is_empty() {
            return String::new();
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec![
            Cell::new("#").set_alignment(CellAlignment::Right),
            Cell::new("Input").set_alignment(CellAlignment::Left),
            Cell::new("Result").set_alignment(CellAlignment::Left),
        ]));

        for node in nodes {
            table.add_row(Row::from(vec![
                Cell::new(node.line).set_alignment(CellAlignment::Right),
                Cell::new(node.original_raw.trim_end()),
                self.result_cell(node),
            ]));
        }

        format!("{}\n", table)
    }

    fn result_cell(&self, node: &RenderNode) -> Cell {
        match &node.kind {
            RenderKind::Text => Cell::new(""),
            RenderKind::Error { error, error_kind } => {
                Cell::new(format!("{} error: {}", error_kind, error)).fg(Color::Red)
            }
            RenderKind::MathResult { result, .. } => Cell::new(result),
            RenderKind::Variable {
                variable_name,
                result,
                ..
            } => Cell::new(format!("{} = {}", variable_name, result)).fg(Color::DarkGrey),
            RenderKind::Combined {
                variable_name,
                result,
                ..
            } => Cell::new(format!("{} = {}", variable_name, result)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally::Engine;

    #[test]
    fn test_rows_follow_lines() {
        let mut engine = Engine::new();
        let nodes = engine
            .evaluate_document("# prices\nx = 2\nx * 21\n1 / 0")
            .unwrap();
        let output = Formatter::default().format_nodes(&nodes);
        assert!(output.contains("# prices"));
        assert!(output.contains("x = 2"));
        assert!(output.contains("42"));
        assert!(output.contains("semantic error: "));
    }

    #[test]
    fn test_empty_document_prints_nothing() {
        assert_eq!(Formatter::default().format_nodes(&[]), "");
    }
}
