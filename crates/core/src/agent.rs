// Agent domain types
//
// These types mirror what the backend returns for an agent.
// Used by the edit session, the stores and the frontends.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::files::split_names;

/// Embeddings status value while the backend is processing files
pub const EMBEDDINGS_IN_PROGRESS: &str = "I";

/// Agent as persisted by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub name: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub welcome_message: String,
    /// Encoded suggested prompts, see [`crate::prompts`]
    #[serde(default)]
    pub suggested_prompts: String,
    /// Comma-joined file names
    #[serde(default)]
    pub files: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub embeddings_status: String,
    #[serde(default)]
    pub created_on: Option<i64>,
    #[serde(default)]
    pub updated_on: Option<i64>,
}

impl AgentRecord {
    /// Create a record with just a name (mostly for tests and stores)
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Persisted file names in backend order
    pub fn file_names(&self) -> Vec<String> {
        split_names(&self.files)
    }

    /// True while the backend is generating embeddings for this agent's files
    pub fn is_processing(&self) -> bool {
        self.embeddings_status == EMBEDDINGS_IN_PROGRESS
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_on.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_on.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

/// Subset of an agent exposed to chat users
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAgent {
    pub name: String,
    #[serde(default)]
    pub welcome_message: String,
    #[serde(default)]
    pub suggested_prompts: String,
}

impl From<&AgentRecord> for ChatAgent {
    fn from(record: &AgentRecord) -> Self {
        Self {
            name: record.name.clone(),
            welcome_message: record.welcome_message.clone(),
            suggested_prompts: record.suggested_prompts.clone(),
        }
    }
}

/// `{ "agent": ... }` envelope used by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEnvelope<T> {
    pub agent: Option<T>,
}

/// `{ "list": [...] }` envelope used by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentList {
    #[serde(default)]
    pub list: Vec<AgentRecord>,
}

/// A file chosen locally that has not been uploaded yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub name: String,
    #[serde(serialize_with = "serialize_base64")]
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

fn serialize_base64<S: Serializer>(content: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_tolerates_missing_fields() {
        let record: AgentRecord = serde_json::from_value(json!({
            "name": "policy-bot",
            "files": "a.txt, \"b.pdf\"",
            "embeddings_status": "I",
            "created_on": 1700000000
        }))
        .unwrap();

        assert_eq!(record.file_names(), vec!["a.txt", "b.pdf"]);
        assert!(record.is_processing());
        assert_eq!(record.instructions, "");
        assert_eq!(record.created_at().unwrap().timestamp(), 1700000000);
        assert!(record.updated_at().is_none());
    }

    #[test]
    fn test_envelope_without_agent() {
        let envelope: AgentEnvelope<ChatAgent> = serde_json::from_value(json!({})).unwrap();
        assert!(envelope.agent.is_none());
    }

    #[test]
    fn test_attachment_serializes_base64() {
        let value = serde_json::to_value(Attachment::new("a.txt", b"hi".to_vec())).unwrap();
        assert_eq!(value, json!({ "name": "a.txt", "content": "aGk=" }));
    }
}
