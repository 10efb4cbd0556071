// Display precedence for field views
//
// Every read-only field view resolves what to show through `resolve`:
// a provisional (unsaved) value wins, then the confirmed value, then the
// placeholder.

use serde::Serialize;

use crate::prompts;

/// How a displayed value should be treated visually
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStyle {
    /// Value confirmed persisted by the backend
    Confirmed,
    /// Value edited locally but not saved
    Provisional,
    /// Example or fallback text, no real value
    Placeholder,
}

/// Resolved text and style for a field view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDisplay<'a> {
    pub text: &'a str,
    pub style: DisplayStyle,
}

/// Pick what a field view shows given its baseline, pending value and placeholder
pub fn resolve<'a>(baseline: &'a str, pending: &'a str, placeholder: &'a str) -> FieldDisplay<'a> {
    if pending != baseline && !pending.is_empty() {
        FieldDisplay {
            text: pending,
            style: DisplayStyle::Provisional,
        }
    } else if !baseline.is_empty() {
        FieldDisplay {
            text: baseline,
            style: DisplayStyle::Confirmed,
        }
    } else {
        FieldDisplay {
            text: placeholder,
            style: DisplayStyle::Placeholder,
        }
    }
}

/// Render encoded suggested prompts as a numbered markdown list
pub fn prompts_markdown(encoded: &str) -> String {
    let entries = prompts::decode(encoded);
    if entries.is_empty() {
        return "No suggested prompts have been set".to_string();
    }

    let mut markdown = String::from("The following are your suggested prompts:\n\n");
    for (index, entry) in entries.iter().enumerate() {
        markdown.push_str(&format!("{}. {}\n", index + 1, entry));
    }
    markdown.trim_end().to_string()
}

/// State of one row in a file listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRowState {
    /// Persisted and kept
    Existing,
    /// Persisted but marked for deletion
    MarkedDeleted,
    /// Attached locally, not uploaded yet
    New,
}

/// One numbered row of a file listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRow {
    pub number: usize,
    pub name: String,
    pub state: FileRowState,
}

/// Number baseline files first, then pending attachments
pub fn file_rows<S: AsRef<str>, T: AsRef<str>, D: AsRef<str>>(
    existing: &[S],
    new_names: &[T],
    deleted: &[D],
) -> Vec<FileRow> {
    let existing_rows = existing.iter().map(|name| {
        let name = name.as_ref();
        let state = if deleted.iter().any(|d| d.as_ref() == name) {
            FileRowState::MarkedDeleted
        } else {
            FileRowState::Existing
        };
        (name.to_string(), state)
    });
    let new_rows = new_names
        .iter()
        .map(|name| (name.as_ref().to_string(), FileRowState::New));

    existing_rows
        .chain(new_rows)
        .enumerate()
        .map(|(index, (name, state))| FileRow {
            number: index + 1,
            name,
            state,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_shown_when_pending_empty() {
        assert_eq!(
            resolve("B", "", "P"),
            FieldDisplay {
                text: "B",
                style: DisplayStyle::Confirmed
            }
        );
    }

    #[test]
    fn test_pending_shown_when_different() {
        assert_eq!(
            resolve("B", "Q", "P"),
            FieldDisplay {
                text: "Q",
                style: DisplayStyle::Provisional
            }
        );
    }

    #[test]
    fn test_pending_equal_to_baseline_is_confirmed() {
        assert_eq!(resolve("B", "B", "P").style, DisplayStyle::Confirmed);
    }

    #[test]
    fn test_placeholder_when_both_empty() {
        assert_eq!(
            resolve("", "", "P"),
            FieldDisplay {
                text: "P",
                style: DisplayStyle::Placeholder
            }
        );
    }

    #[test]
    fn test_new_value_over_empty_baseline_is_provisional() {
        assert_eq!(resolve("", "Q", "P").style, DisplayStyle::Provisional);
    }

    #[test]
    fn test_prompts_markdown() {
        assert_eq!(
            prompts_markdown("a, \"b\""),
            "The following are your suggested prompts:\n\n1. a\n2. b"
        );
        assert_eq!(prompts_markdown("  "), "No suggested prompts have been set");
    }

    #[test]
    fn test_file_rows_numbering() {
        let rows = file_rows(&["a.txt", "b.txt"], &["c.txt"], &["b.txt"]);
        let summary: Vec<(usize, &str, FileRowState)> = rows
            .iter()
            .map(|r| (r.number, r.name.as_str(), r.state))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "a.txt", FileRowState::Existing),
                (2, "b.txt", FileRowState::MarkedDeleted),
                (3, "c.txt", FileRowState::New),
            ]
        );
    }
}
