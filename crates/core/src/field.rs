// Agent field identifiers and wizard ordering
//
// FieldList is computed per entity: the name is the agent's identity and
// becomes immutable once persisted, so it drops out of the sequence.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a field's value is shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text
    Text,
    /// Delimited list encoded into a single string
    DelimitedList,
    /// Existing file names plus new attachments and deletions
    FileSet,
}

/// Editable agent field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    Name,
    Instructions,
    WelcomeMessage,
    SuggestedPrompts,
    Files,
}

impl FieldId {
    /// All fields in wizard order
    pub const ALL: [FieldId; 5] = [
        FieldId::Name,
        FieldId::Instructions,
        FieldId::WelcomeMessage,
        FieldId::SuggestedPrompts,
        FieldId::Files,
    ];

    pub fn kind(self) -> FieldKind {
        match self {
            FieldId::SuggestedPrompts => FieldKind::DelimitedList,
            FieldId::Files => FieldKind::FileSet,
            _ => FieldKind::Text,
        }
    }

    /// Key used by the backend form and JSON bodies
    pub fn wire_key(self) -> &'static str {
        match self {
            FieldId::Name => "name",
            FieldId::Instructions => "instructions",
            FieldId::WelcomeMessage => "welcome_message",
            FieldId::SuggestedPrompts => "suggested_prompts",
            FieldId::Files => "files",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FieldId::Name => "Agent Name",
            FieldId::Instructions => "Instructions",
            FieldId::WelcomeMessage => "Welcome Message",
            FieldId::SuggestedPrompts => "Suggested Prompts",
            FieldId::Files => "Files",
        }
    }

    /// Guidance shown next to the field's editor
    pub fn hint(self) -> &'static str {
        match self {
            FieldId::Name => {
                "Keep the name meaningful and short. It should be unique and can contain only \
                 letters, digits, hyphen (-) and underscore (_). No spaces or decimal point."
            }
            FieldId::Instructions => {
                "Instructions must be detailed and specific. The contents can include: role, \
                 task, setting boundaries, tone and style of reply, error handling etc"
            }
            FieldId::WelcomeMessage => "Keep it short and encouraging",
            FieldId::SuggestedPrompts => {
                "Use different prompt styles to indicate agent's capabilities"
            }
            FieldId::Files => "Attach .txt or .pdf files for the agent to process",
        }
    }

    /// Example text shown while creating a new agent
    pub fn example_placeholder(self) -> &'static str {
        match self {
            FieldId::Name => "set-a-name",
            FieldId::Instructions => {
                "This is an example of an instruction:\n\n\
                 Follow the **below** instructions:\n\
                 1. You are an expert in policy analysis. Answer questions based solely on the provided documents.\n\
                 2. If the information is insufficient, ask for more details.\n\
                 3. Do not speculate or provide information that is not explicitly found in the documents. \
                 If multiple possible answers exist, list the options."
            }
            FieldId::WelcomeMessage => {
                "This is an example of a welcome message:\n\n\
                 Welcome to the **Insurance Policy Assistant**!\n\
                 I'm here to help you navigate your insurance needs and provide expert advice on \
                 various policy matters."
            }
            FieldId::SuggestedPrompts => {
                "How do I file a claim for car damage?, \
                 Can I change my beneficiaries on my life insurance policy?, \
                 Is flood damage covered under my homeowner's insurance?"
            }
            FieldId::Files => {
                "Here you should upload all files that you would like the agent to process to \
                 serve its needs."
            }
        }
    }

    /// Text shown for a persisted agent whose field is empty
    pub fn empty_placeholder(self) -> &'static str {
        match self {
            FieldId::Name => "",
            FieldId::Instructions => "No instructions to the model have been given",
            FieldId::WelcomeMessage => "No welcome message has been set",
            FieldId::SuggestedPrompts => "",
            FieldId::Files => "No files have been uploaded for this agent.",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_key())
    }
}

/// Error returned when a string does not name a field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for FieldId {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "name" => Ok(FieldId::Name),
            "instructions" => Ok(FieldId::Instructions),
            "welcomemessage" => Ok(FieldId::WelcomeMessage),
            "suggestedprompts" | "prompts" => Ok(FieldId::SuggestedPrompts),
            "files" => Ok(FieldId::Files),
            _ => Err(UnknownField(s.to_string())),
        }
    }
}

/// Ordered sequence of fields the wizard walks through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldList {
    fields: Vec<FieldId>,
}

impl FieldList {
    /// Field order for an entity; `name` is omitted once persisted
    pub fn for_entity(has_persisted_name: bool) -> Self {
        let fields = FieldId::ALL
            .into_iter()
            .filter(|f| !(has_persisted_name && *f == FieldId::Name))
            .collect();
        Self { fields }
    }

    pub fn contains(&self, field: FieldId) -> bool {
        self.fields.contains(&field)
    }

    pub fn first(&self) -> Option<FieldId> {
        self.fields.first().copied()
    }

    pub fn as_slice(&self) -> &[FieldId] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.fields.iter().copied()
    }

    /// Field before `field`, none at the start or when `field` is absent
    pub fn prev(&self, field: FieldId) -> Option<FieldId> {
        let index = self.position(field)?;
        index.checked_sub(1).map(|i| self.fields[i])
    }

    /// Field after `field`, none at the end or when `field` is absent
    pub fn next(&self, field: FieldId) -> Option<FieldId> {
        let index = self.position(field)?;
        self.fields.get(index + 1).copied()
    }

    /// (prev, next) around `field`
    pub fn neighbors(&self, field: FieldId) -> (Option<FieldId>, Option<FieldId>) {
        (self.prev(field), self.next(field))
    }

    fn position(&self, field: FieldId) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }
}
