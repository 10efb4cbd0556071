// Backend endpoints
//
// Typed wrappers over the backend's auth, agent and chat routes. The agent
// routes back the core AgentStore trait so edit sessions save straight
// through the HTTP client.

use agentdesk_core::agent::{AgentEnvelope, AgentList};
use agentdesk_core::{AgentRecord, AgentStore, ChatAgent, SavePayload, StoreError, StoreResult};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::{Client, ClientError};

/// Username the backend expects for the single admin account
pub const ADMIN_USERNAME: &str = "admin";

#[derive(Debug, Deserialize)]
struct PasswordStatus {
    admin_password_set: bool,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SetPasswordRequest<'a> {
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct ChangePasswordRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

/// One entry of a chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub role: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            role: role.into(),
        }
    }
}

/// Body of a chat prompt
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub input: &'a str,
    pub messages: &'a [ChatMessage],
    /// 1 low, 2 medium, 3 high
    pub temperature: u8,
    /// 1 short, 2 medium, 3 long
    pub response_length: u8,
}

/// Model reply to a chat prompt
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub content: String,
    #[serde(default = "assistant_role")]
    pub role: String,
}

fn assistant_role() -> String {
    "assistant".to_string()
}

// ============================================================================
// Auth
// ============================================================================

impl Client {
    pub async fn is_admin_password_set(&self) -> Result<bool, ClientError> {
        let status: PasswordStatus = self.get(&["auth", "is-admin-password-set"]).await?;
        Ok(status.admin_password_set)
    }

    /// Whether the session cookie is valid
    ///
    /// Any error status reads as `false`; the backend answers a missing
    /// cookie with 500 as well as 401. Only a missing response is an error.
    pub async fn check_token(&self) -> Result<bool, ClientError> {
        match self
            .get::<serde_json::Value>(&["auth", "check-token"])
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if err.status().is_some() => {
                tracing::debug!(error = %err, "Session token rejected");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn set_admin_password(&self, password: &str) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .post(
                &["auth", "set-admin-password"],
                &SetPasswordRequest { password },
            )
            .await?;
        Ok(())
    }

    pub async fn login(&self, password: &str) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .post(
                &["auth", "login"],
                &LoginRequest {
                    username: ADMIN_USERNAME,
                    password,
                },
            )
            .await?;
        tracing::info!("Logged in");
        Ok(())
    }

    pub async fn change_admin_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .post(
                &["auth", "change-admin-password"],
                &ChangePasswordRequest {
                    current_password,
                    new_password,
                },
            )
            .await?;
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .post(&["auth", "logout"], &serde_json::json!({}))
            .await?;
        Ok(())
    }

    // ========================================================================
    // Chat
    // ========================================================================

    pub async fn send_chat(
        &self,
        agent: &str,
        request: &ChatRequest<'_>,
    ) -> Result<ChatReply, ClientError> {
        self.post(&["chat", agent], request).await
    }
}

// ============================================================================
// Agents
// ============================================================================

/// Multipart body for an agent save
pub fn save_form(payload: &SavePayload) -> Form {
    let mut form = Form::new();
    for (key, value) in payload.form_fields() {
        form = form.text(key, value.to_string());
    }
    for file in &payload.new_files {
        let part = Part::bytes(file.content.clone()).file_name(file.name.clone());
        form = form.part("new_files", part);
    }
    form
}

fn store_error(err: ClientError, name: &str) -> StoreError {
    match err {
        ClientError::NotFound(_) => StoreError::NotFound(name.to_string()),
        ClientError::Api { status, message } => StoreError::rejected(status, message),
        other => StoreError::transport(other.to_string()),
    }
}

#[async_trait]
impl AgentStore for Client {
    async fn list_agents(&self) -> StoreResult<Vec<AgentRecord>> {
        let list: AgentList = self
            .get(&["agents", ""])
            .await
            .map_err(|e| store_error(e, ""))?;
        Ok(list.list)
    }

    async fn fetch_agent(&self, name: &str) -> StoreResult<AgentRecord> {
        let envelope: AgentEnvelope<AgentRecord> = self
            .get(&["agents", name])
            .await
            .map_err(|e| store_error(e, name))?;
        envelope
            .agent
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn save_agent(
        &self,
        name: Option<&str>,
        payload: &SavePayload,
    ) -> StoreResult<AgentRecord> {
        let form = save_form(payload);
        let result = match name {
            None => {
                tracing::info!(agent = %payload.name, files = payload.new_files.len(), "Creating agent");
                self.send_form(Method::POST, &["agents", ""], form).await
            }
            Some(name) => {
                tracing::info!(agent = %name, files = payload.new_files.len(), "Updating agent");
                self.send_form(Method::PUT, &["agents", name], form).await
            }
        };
        let envelope: AgentEnvelope<AgentRecord> =
            result.map_err(|e| store_error(e, name.unwrap_or(&payload.name)))?;
        envelope.agent.ok_or_else(|| {
            StoreError::transport("Backend did not return the saved agent")
        })
    }

    async fn delete_agent(&self, name: &str) -> StoreResult<()> {
        self.delete(&["agents", name])
            .await
            .map_err(|e| store_error(e, name))
    }

    async fn fetch_chat_agent(&self, name: &str) -> StoreResult<ChatAgent> {
        let envelope: AgentEnvelope<ChatAgent> = self
            .get(&["chat", name])
            .await
            .map_err(|e| store_error(e, name))?;
        envelope
            .agent
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use agentdesk_core::{Attachment, EditSession, FieldId};
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> Client {
        Client::new(&CliConfig::new(&format!("{}/api", server.uri()))).unwrap()
    }

    fn agent_json(name: &str, files: &str) -> serde_json::Value {
        json!({
            "name": name,
            "instructions": "Answer from the documents.",
            "welcome_message": "Hi",
            "suggested_prompts": "\"How do I claim?\"",
            "files": files,
            "status": "",
            "embeddings_status": "",
            "created_on": 1700000000,
            "updated_on": 1700000000
        })
    }

    #[tokio::test]
    async fn test_login_sends_admin_username() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"username": "admin", "password": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Login successful"})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).login("secret").await.unwrap();
    }

    #[tokio::test]
    async fn test_check_token_rejection_is_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/check-token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token missing"})))
            .mount(&server)
            .await;

        assert!(!client_for(&server).check_token().await.unwrap());
    }

    #[tokio::test]
    async fn test_check_token_server_error_is_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/check-token"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"detail": "Access token is missing in cookies"})),
            )
            .mount(&server)
            .await;

        assert!(!client_for(&server).check_token().await.unwrap());

        let unreachable = Client::new(&CliConfig::new("http://127.0.0.1:9/api")).unwrap();
        assert!(matches!(
            unreachable.check_token().await,
            Err(ClientError::NoResponse)
        ));
    }

    #[tokio::test]
    async fn test_list_and_fetch_agents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/agents/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"list": [agent_json("claims", "a.txt, b.txt")]})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/agents/claims"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"agent": agent_json("claims", "a.txt")})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/agents/ghost"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"agent": null})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let agents = client.list_agents().await.unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].file_names(), vec!["a.txt", "b.txt"]);

        let agent = client.fetch_agent("claims").await.unwrap();
        assert_eq!(agent.welcome_message, "Hi");
        assert!(agent.created_at().is_some());

        assert!(matches!(
            client.fetch_agent("ghost").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_session_save_uses_put_with_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/agents/claims"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"agent": agent_json("claims", "a.txt, b.txt")})),
            )
            .mount(&server)
            .await;
        let mut saved = agent_json("claims", "b.txt, c.txt");
        saved["embeddings_status"] = json!("I");
        Mock::given(method("PUT"))
            .and(path("/api/agents/claims"))
            .and(body_string_contains("name=\"deleted_files\""))
            .and(body_string_contains("filename=\"c.txt\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"agent": saved})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut session = EditSession::open_existing(&client, "claims").await.unwrap();
        session.open(FieldId::Files).unwrap();
        session
            .commit_files(
                FieldId::Files,
                vec![Attachment::new("c.txt", b"hello".to_vec())],
                vec!["a.txt".to_string()],
                None,
            )
            .unwrap();

        let record = session.save(&client).await.unwrap();
        assert_eq!(record.files, "b.txt, c.txt");
        assert!(!session.is_dirty());
        assert!(!session.is_editable());
    }

    #[tokio::test]
    async fn test_create_posts_to_collection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/agents/"))
            .and(body_string_contains("Claims Bot"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"agent": agent_json("claimsbot", "")})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut session = EditSession::new_entity();
        session.open(FieldId::Name).unwrap();
        session.commit_field(FieldId::Name, "Claims Bot", None).unwrap();

        let record = session.save(&client).await.unwrap();
        assert_eq!(record.name, "claimsbot");
        assert_eq!(session.agent_name(), Some("claimsbot"));
    }

    #[tokio::test]
    async fn test_rejected_save_keeps_pending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/agents/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut session = EditSession::new_entity();
        session.open(FieldId::Name).unwrap();
        session.commit_field(FieldId::Name, "claims", None).unwrap();

        let err = session.save(&client).await.unwrap_err();
        assert_eq!(err.to_string(), "An error occurred on the server");
        assert!(session.is_dirty());
        assert_eq!(session.pending(FieldId::Name), Some("claims"));
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chat/claims"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "agent": {"name": "claims", "welcome_message": "Hello", "suggested_prompts": "a, b"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/chat/claims"))
            .and(body_string_contains("\"response_length\":3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"content": "Flood is covered.", "role": "assistant"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let agent = client.fetch_chat_agent("claims").await.unwrap();
        assert_eq!(agent.welcome_message, "Hello");

        let history = vec![ChatMessage::new("system", "Hello")];
        let reply = client
            .send_chat(
                "claims",
                &ChatRequest {
                    input: "Is flood covered?",
                    messages: &history,
                    temperature: 2,
                    response_length: 3,
                },
            )
            .await
            .unwrap();
        assert_eq!(reply.content, "Flood is covered.");
        assert_eq!(reply.role, "assistant");
    }

    #[test]
    fn test_save_form_has_boundary() {
        let payload = SavePayload {
            name: "claims".to_string(),
            instructions: String::new(),
            welcome_message: String::new(),
            suggested_prompts: String::new(),
            new_files: vec![Attachment::new("a.txt", b"x".to_vec())],
            deleted_files: String::new(),
        };
        assert!(!save_form(&payload).boundary().is_empty());
    }
}
