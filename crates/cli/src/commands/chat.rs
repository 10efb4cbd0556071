// Chat command - talk to an agent
//
// Design Decision: The transcript lives in a Conversation value; each request
// carries the history as it stood before the new input, then the input and
// the reply are appended.

use crate::api::{ChatMessage, ChatRequest};
use crate::auth::Gate;
use crate::client::Client;
use crate::config::CliConfig;
use crate::editor::TerminalEditor;
use agentdesk_core::{prompts, AgentStore, ChatAgent};
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};

/// Welcome shown when an agent has none configured
pub const DEFAULT_WELCOME: &str = "Hello! How can I help you today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Temperature {
    Low,
    #[default]
    Medium,
    High,
}

impl Temperature {
    fn level(self) -> u8 {
        match self {
            Temperature::Low => 1,
            Temperature::Medium => 2,
            Temperature::High => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ResponseLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ResponseLength {
    fn level(self) -> u8 {
        match self {
            ResponseLength::Short => 1,
            ResponseLength::Medium => 2,
            ResponseLength::Long => 3,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ChatArgs {
    /// Agent to chat with
    pub agent: String,

    /// Message to send; starts an interactive chat when omitted
    pub message: Option<String>,

    /// How long the answers should be
    #[arg(long, value_enum, default_value_t = ResponseLength::Medium)]
    pub length: ResponseLength,

    /// How creative the answers should be
    #[arg(long, value_enum, default_value_t = Temperature::Medium)]
    pub temperature: Temperature,
}

impl ChatArgs {
    pub fn gate(&self) -> Gate {
        Gate::Anyone
    }
}

/// A chat transcript with one agent
#[derive(Debug, Clone)]
pub struct Conversation {
    agent: ChatAgent,
    history: Vec<ChatMessage>,
    temperature: Temperature,
    length: ResponseLength,
}

impl Conversation {
    /// Start a transcript seeded with the agent's welcome message
    pub fn new(agent: ChatAgent, temperature: Temperature, length: ResponseLength) -> Self {
        let welcome = ChatMessage::new("system", welcome_for(&agent));
        Self {
            agent,
            history: vec![welcome],
            temperature,
            length,
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn suggested_prompts(&self) -> Vec<String> {
        prompts::decode(&self.agent.suggested_prompts)
            .into_iter()
            .take(prompts::MAX_SUGGESTED_PROMPTS)
            .collect()
    }

    /// Send `input` and record both sides of the exchange
    pub async fn send(&mut self, client: &Client, input: &str) -> Result<&ChatMessage> {
        let request = ChatRequest {
            input,
            messages: &self.history,
            temperature: self.temperature.level(),
            response_length: self.length.level(),
        };
        let reply = client
            .send_chat(&self.agent.name, &request)
            .await
            .with_context(|| format!("Chat with {} failed", self.agent.name))?;
        tracing::debug!(agent = %self.agent.name, turns = self.history.len(), "Chat reply received");

        self.history.push(ChatMessage::new("user", input));
        self.history.push(ChatMessage::new(reply.role, reply.content));
        Ok(&self.history[self.history.len() - 1])
    }
}

fn welcome_for(agent: &ChatAgent) -> &str {
    let welcome = agent.welcome_message.trim();
    if welcome.is_empty() {
        DEFAULT_WELCOME
    } else {
        welcome
    }
}

pub async fn run(args: ChatArgs, client: &Client, config: &CliConfig) -> Result<()> {
    let agent = client
        .fetch_chat_agent(&args.agent)
        .await
        .with_context(|| format!("Unable to load agent {} for chat", args.agent))?;
    let mut conversation = Conversation::new(agent, args.temperature, args.length);

    match args.message {
        Some(message) => {
            let reply = conversation.send(client, &message).await?;
            if config.output.is_text() {
                println!("{}", reply.content);
            } else {
                config.output.print_value(reply)?;
            }
            Ok(())
        }
        None => {
            let mut editor =
                TerminalEditor::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
            chat_loop(&mut conversation, client, &mut editor).await
        }
    }
}

async fn chat_loop<R, W>(
    conversation: &mut Conversation,
    client: &Client,
    editor: &mut TerminalEditor<R, W>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    let welcome = conversation.history()[0].content.clone();
    editor.say(&format!("{}: {}", conversation.agent.name, welcome)).await?;
    let suggestions = conversation.suggested_prompts();
    for (index, prompt) in suggestions.iter().enumerate() {
        editor.say(&format!("  /{} {}", index + 1, prompt)).await?;
    }
    editor.say("Type /quit to leave.").await?;

    loop {
        let Some(line) = editor.prompt("you> ").await? else {
            return Ok(());
        };
        let line = line.trim();
        let input = match line {
            "" => continue,
            "/quit" | "/exit" => return Ok(()),
            shortcut if shortcut.starts_with('/') => {
                let picked = shortcut[1..]
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| suggestions.get(i));
                match picked {
                    Some(prompt) => {
                        editor.say(&format!("you> {}", prompt)).await?;
                        prompt.clone()
                    }
                    None => {
                        editor.say("Unknown command").await?;
                        continue;
                    }
                }
            }
            text => text.to_string(),
        };

        match conversation.send(client, &input).await {
            Ok(reply) => {
                let text = format!("{}: {}", conversation_name(reply), reply.content);
                editor.say(&text).await?;
            }
            Err(err) => editor.say(&format!("{:#}", err)).await?,
        }
    }
}

fn conversation_name(reply: &ChatMessage) -> &str {
    if reply.role == "assistant" {
        "agent"
    } else {
        &reply.role
    }
}
