// Output formatting for CLI

use agentdesk_core::{DisplayStyle, FieldDisplay, FileRow, FileRowState};
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            "yaml" => OutputFormat::Yaml,
            _ => OutputFormat::Text,
        }
    }

    pub fn print_value<T: Serialize>(&self, value: &T) -> Result<()> {
        match self {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(value)?);
            }
            OutputFormat::Yaml => {
                print!("{}", serde_yaml::to_string(value)?);
            }
            OutputFormat::Text => {
                // Text format is handled by each command
            }
        }
        Ok(())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, OutputFormat::Text)
    }
}

/// Print a simple key-value pair for text output
pub fn print_field(label: &str, value: &str) {
    println!("{:<14} {}", format!("{}:", label), value);
}

/// Print a table header
pub fn print_table_header(columns: &[(&str, usize)]) {
    let header: String = columns
        .iter()
        .map(|(name, width)| format!("{:<width$}", name, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", header);
}

/// Print a table row
pub fn print_table_row(values: &[(&str, usize)]) {
    let row: String = values
        .iter()
        .map(|(val, width)| format!("{:<width$}", truncate(val, *width), width = width))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", row);
}

/// Shorten `value` to at most `width` characters, marking the cut with "..."
pub fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut short: String = value.chars().take(keep).collect();
    short.push_str("...");
    short
}

/// Render a field view with a marker for its display style
///
/// Provisional values carry an "(unsaved)" suffix; placeholders are bracketed.
pub fn styled(display: &FieldDisplay<'_>) -> String {
    match display.style {
        DisplayStyle::Confirmed => display.text.to_string(),
        DisplayStyle::Provisional => format!("{} (unsaved)", display.text),
        DisplayStyle::Placeholder => format!("[{}]", display.text),
    }
}

/// Render one numbered file row
pub fn file_row(row: &FileRow) -> String {
    let marker = match row.state {
        FileRowState::Existing => "",
        FileRowState::MarkedDeleted => " (delete on save)",
        FileRowState::New => " (new)",
    };
    format!("{:>3}. {}{}", row.number, row.name, marker)
}
