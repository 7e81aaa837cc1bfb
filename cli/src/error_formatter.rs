use ariadne::{Color, Label, Report, ReportKind, Source};
use tally::{parse_line, RenderNode, TallyError};

/// Format a TallyError with fancy terminal output using Ariadne
pub fn format_error(error: &TallyError, source_id: &str) -> String {
    match error {
        TallyError::Parse(details) => {
            let id = source_id.to_string();
            let length = details.source_text.chars().count();
            let start = details.span.start.min(length);
            let end = details.span.end.clamp(start, length);

            let mut report = Report::build(ReportKind::Error, &id, start)
                .with_message(format!("Parse error: {}", details.message))
                .with_label(
                    Label::new((&id, start..end))
                        .with_message("")
                        .with_color(Color::Red),
                );
            if let Some(suggestion) = &details.suggestion {
                report = report.with_help(suggestion);
            }

            let mut output = Vec::new();
            match report
                .finish()
                .write((&id, Source::from(details.source_text.as_str())), &mut output)
            {
                Ok(_) => String::from_utf8_lossy(&output).to_string(),
                Err(_) => format!("{}", error),
            }
        }
        TallyError::ResourceLimitExceeded {
            limit_name,
            limit_value,
            actual_value,
            suggestion,
        } => format!(
            "Resource limit exceeded: {}\n  Limit: {}\n  Actual: {}\n  {}",
            limit_name, limit_value, actual_value, suggestion
        ),
        other => format!("{}", other),
    }
}

/// Ariadne reports for error lines that failed to parse
pub fn parse_reports(nodes: &[RenderNode], source_id: &str) -> Vec<String> {
    nodes
        .iter()
        .filter(|node| node.is_error())
        .filter_map(|node| {
            let parsed = parse_line(&node.original_raw, node.line);
            let error = parsed.parse_error?;
            Some(format_error(&error, &format!("{}:{}", source_id, node.line)))
        })
        .collect()
}
