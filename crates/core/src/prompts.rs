// Suggested prompts codec
//
// The backend stores suggested prompts as one comma-delimited string.
// Encoding skips blank entries and escapes double quotes; decoding splits on
// the delimiter, trims, strips one layer of surrounding quotes, unescapes and
// drops blanks.

use serde::{Deserialize, Serialize};

/// Maximum number of suggested prompts an agent carries
pub const MAX_SUGGESTED_PROMPTS: usize = 3;

const DELIMITER: char = ',';
const JOINER: &str = ", ";

/// Encode prompt entries into the stored string form
pub fn encode<S: AsRef<str>>(entries: &[S]) -> String {
    entries
        .iter()
        .map(|e| e.as_ref())
        .filter(|e| !e.trim().is_empty())
        .map(|e| e.replace('"', "\\\""))
        .collect::<Vec<_>>()
        .join(JOINER)
}

/// Decode the stored string form into non-blank entries
pub fn decode(encoded: &str) -> Vec<String> {
    encoded
        .split(DELIMITER)
        .map(|part| strip_surrounding_quotes(part.trim()).replace("\\\"", "\""))
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Remove one pair of enclosing double quotes, if both are present
pub(crate) fn strip_surrounding_quotes(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Fixed set of prompt slots as edited in the wizard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedPrompts {
    slots: [String; MAX_SUGGESTED_PROMPTS],
}

impl SuggestedPrompts {
    /// Fill slots from entries; entries past the last slot are dropped
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Self {
        let mut prompts = Self::default();
        for (slot, entry) in prompts.slots.iter_mut().zip(entries) {
            *slot = entry.as_ref().to_string();
        }
        prompts
    }

    /// Fill slots from the stored string form
    pub fn from_encoded(encoded: &str) -> Self {
        Self::from_entries(&decode(encoded))
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// Set one slot; out of range indexes are ignored
    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = value.into();
        }
    }

    /// Non-blank entries in slot order
    pub fn entries(&self) -> Vec<&str> {
        self.slots
            .iter()
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
            .collect()
    }

    pub fn encode(&self) -> String {
        encode(&self.slots)
    }
}
