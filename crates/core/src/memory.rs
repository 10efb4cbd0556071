// In-memory implementations for examples and testing
//
// InMemoryAgentStore applies saves the way the backend does, so sessions can
// be exercised end to end without a server.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::agent::{AgentRecord, EMBEDDINGS_IN_PROGRESS};
use crate::error::StoreError;
use crate::files;
use crate::session::SavePayload;
use crate::traits::{AgentStore, StoreResult};
use crate::validation::sanitize_agent_name;

// ============================================================================
// InMemoryAgentStore - Stores agents in memory
// ============================================================================

/// In-memory agent store
///
/// Stores agents in a HashMap keyed by their sanitized name.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAgentStore {
    agents: Arc<RwLock<HashMap<String, AgentRecord>>>,
}

impl InMemoryAgentStore {
    /// Create a new in-memory agent store
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with an agent (useful for testing)
    pub async fn seed(&self, record: AgentRecord) {
        self.agents.write().await.insert(record.name.clone(), record);
    }

    /// Mark an agent's embeddings as finished
    pub async fn finish_processing(&self, name: &str) {
        if let Some(record) = self.agents.write().await.get_mut(name) {
            record.embeddings_status.clear();
        }
    }

    /// Number of stored agents
    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }

    fn create(
        agents: &mut HashMap<String, AgentRecord>,
        payload: &SavePayload,
    ) -> StoreResult<AgentRecord> {
        let name = sanitize_agent_name(&payload.name);
        if name.is_empty() {
            return Err(StoreError::rejected(400, "Agent name is required"));
        }
        if agents.contains_key(&name) {
            return Err(StoreError::rejected(
                409,
                format!("Agent {} already exists", name),
            ));
        }

        let now = Utc::now().timestamp();
        let new_names: Vec<&str> = payload.new_files.iter().map(|f| f.name.as_str()).collect();
        let record = AgentRecord {
            name: name.clone(),
            instructions: payload.instructions.clone(),
            welcome_message: payload.welcome_message.clone(),
            suggested_prompts: payload.suggested_prompts.clone(),
            files: files::join_names(&new_names),
            embeddings_status: if new_names.is_empty() {
                String::new()
            } else {
                EMBEDDINGS_IN_PROGRESS.to_string()
            },
            created_on: Some(now),
            updated_on: Some(now),
            ..Default::default()
        };
        tracing::debug!(agent = %name, files = new_names.len(), "Created agent");
        agents.insert(name, record.clone());
        Ok(record)
    }

    fn update(
        agents: &mut HashMap<String, AgentRecord>,
        name: &str,
        payload: &SavePayload,
    ) -> StoreResult<AgentRecord> {
        let record = agents
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        let deleted = payload.deleted_names();
        let mut names: Vec<String> = record
            .file_names()
            .into_iter()
            .filter(|existing| !deleted.contains(existing))
            .collect();
        let before = names.len();
        for file in &payload.new_files {
            if !names.contains(&file.name) {
                names.push(file.name.clone());
            }
        }
        let files_changed = names.len() != before || !deleted.is_empty();

        record.instructions = payload.instructions.clone();
        record.welcome_message = payload.welcome_message.clone();
        record.suggested_prompts = payload.suggested_prompts.clone();
        record.files = files::join_names(&names);
        if files_changed {
            record.embeddings_status = EMBEDDINGS_IN_PROGRESS.to_string();
        }
        record.updated_on = Some(Utc::now().timestamp());
        tracing::debug!(agent = %name, files_changed, "Updated agent");
        Ok(record.clone())
    }
}

#[async_trait]
impl AgentStore for InMemoryAgentStore {
    async fn list_agents(&self) -> StoreResult<Vec<AgentRecord>> {
        let mut agents: Vec<AgentRecord> = self.agents.read().await.values().cloned().collect();
        agents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(agents)
    }

    async fn fetch_agent(&self, name: &str) -> StoreResult<AgentRecord> {
        self.agents
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn save_agent(
        &self,
        name: Option<&str>,
        payload: &SavePayload,
    ) -> StoreResult<AgentRecord> {
        let mut agents = self.agents.write().await;
        match name {
            None => Self::create(&mut agents, payload),
            Some(name) => Self::update(&mut agents, name, payload),
        }
    }

    async fn delete_agent(&self, name: &str) -> StoreResult<()> {
        self.agents
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}
