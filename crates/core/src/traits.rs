// Core traits for pluggable backends
//
// These traits let the edit session run against different transports:
// - The HTTP client in the CLI for the real backend
// - InMemoryAgentStore for examples and tests

use async_trait::async_trait;

use crate::agent::{AgentRecord, ChatAgent};
use crate::error::StoreError;
use crate::session::SavePayload;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ============================================================================
// AgentStore - Backend persistence of agents
// ============================================================================

/// Trait for fetching and persisting agents
///
/// Saving with `name = None` creates an agent; the returned record carries
/// the name the backend assigned.
#[async_trait]
pub trait AgentStore: Send + Sync {
    /// List all agents
    async fn list_agents(&self) -> StoreResult<Vec<AgentRecord>>;

    /// Fetch one agent by name
    async fn fetch_agent(&self, name: &str) -> StoreResult<AgentRecord>;

    /// Create (`name = None`) or update an agent
    async fn save_agent(&self, name: Option<&str>, payload: &SavePayload)
        -> StoreResult<AgentRecord>;

    /// Delete an agent and its files
    async fn delete_agent(&self, name: &str) -> StoreResult<()>;

    /// Fetch the chat-facing subset of an agent
    async fn fetch_chat_agent(&self, name: &str) -> StoreResult<ChatAgent> {
        let record = self.fetch_agent(name).await?;
        Ok(ChatAgent::from(&record))
    }
}
