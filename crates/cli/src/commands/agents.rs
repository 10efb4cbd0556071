// Agent management commands

use crate::auth::Gate;
use crate::client::Client;
use crate::config::CliConfig;
use crate::editor::TerminalEditor;
use crate::output::{file_row, print_field, print_table_header, print_table_row, styled, OutputFormat};
use agentdesk_core::validation::{validate_agent_name, validate_attachment_name};
use agentdesk_core::{
    display, prompts, run_wizard, AgentRecord, AgentStore, Attachment, DisplayStyle, EditSession,
    FieldId, SavePayload,
};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};

/// Idle time before the name editor opens on its own for a new agent
pub const NAME_HINT_DELAY: Duration = Duration::from_secs(5);

#[derive(Subcommand)]
pub enum AgentsCommand {
    /// List all agents
    List,

    /// Show one agent
    Get {
        /// Agent name
        name: String,
    },

    /// Create a new agent (interactive wizard when no field input is given)
    Create {
        /// YAML/JSON/Markdown file with agent definition
        #[arg(short, long)]
        file: Option<String>,

        /// Agent name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: FieldArgs,

        /// Print the save payload instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Edit an agent (interactive wizard when no field input is given)
    Edit {
        /// Agent name
        name: String,

        /// YAML/JSON/Markdown file with new field values
        #[arg(short, long)]
        file: Option<String>,

        #[command(flatten)]
        fields: FieldArgs,

        /// Existing file to remove (repeatable)
        #[arg(long = "delete-file")]
        delete_files: Vec<String>,

        /// Print the save payload instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete an agent and its files
    Delete {
        /// Agent name
        name: String,
    },
}

impl AgentsCommand {
    pub fn gate(&self) -> Gate {
        Gate::NeedsLogin
    }
}

/// Field values given on the command line
#[derive(Args, Debug, Clone, Default)]
pub struct FieldArgs {
    /// Instructions for the model
    #[arg(long)]
    pub instructions: Option<String>,

    /// Message shown when a chat starts
    #[arg(long)]
    pub welcome_message: Option<String>,

    /// Suggested prompt (repeatable, up to three)
    #[arg(long = "prompt")]
    pub prompts: Vec<String>,

    /// File to attach, .txt or .pdf (repeatable)
    #[arg(long = "attach")]
    pub attach: Vec<PathBuf>,
}

/// Agent definition from YAML/JSON file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentFile {
    pub name: Option<String>,
    pub instructions: Option<String>,
    pub welcome_message: Option<String>,
    #[serde(default)]
    pub suggested_prompts: Vec<String>,
    /// Paths of files to attach, relative to the definition file
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

/// Field values merged from a definition file and flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct AgentFields {
    name: Option<String>,
    instructions: Option<String>,
    welcome_message: Option<String>,
    prompts: Option<Vec<String>>,
    attach: Vec<PathBuf>,
    delete_files: Vec<String>,
}

impl AgentFields {
    /// CLI args override file values
    fn merge(file: AgentFile, base_dir: &Path, name: Option<String>, args: FieldArgs) -> Self {
        let file_prompts = (!file.suggested_prompts.is_empty()).then_some(file.suggested_prompts);
        let attach = if args.attach.is_empty() {
            file.files.iter().map(|p| base_dir.join(p)).collect()
        } else {
            args.attach
        };
        Self {
            name: name.or(file.name),
            instructions: args.instructions.or(file.instructions),
            welcome_message: args.welcome_message.or(file.welcome_message),
            prompts: (!args.prompts.is_empty())
                .then_some(args.prompts)
                .or(file_prompts),
            attach,
            delete_files: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parse markdown file with YAML front matter.
/// Format:
/// ```markdown
/// ---
/// name: "policy-bot"
/// welcome_message: "Hi! Ask me about your policy."
/// suggested_prompts:
///   - Is flood damage covered?
/// ---
/// Instructions go here as the body.
/// ```
fn parse_markdown_frontmatter(content: &str) -> Result<AgentFile> {
    // Check for front matter delimiter
    if !content.starts_with("---") {
        anyhow::bail!("Markdown file must start with YAML front matter (---)");
    }

    // Find the closing delimiter
    let rest = &content[3..];
    let end_pos = rest
        .find("\n---")
        .context("Missing closing front matter delimiter (---)")?;

    let front_matter = &rest[..end_pos].trim();
    let body = rest[end_pos + 4..].trim(); // Skip "\n---"

    // Parse front matter as YAML
    let mut config: AgentFile =
        serde_yaml::from_str(front_matter).context("Failed to parse front matter as YAML")?;

    // Body becomes instructions if not empty
    if !body.is_empty() {
        config.instructions = Some(body.to_string());
    }

    Ok(config)
}

fn parse_agent_file(path: &str, content: &str) -> Result<AgentFile> {
    // Detect format by extension
    let config: AgentFile = if path.ends_with(".md") {
        parse_markdown_frontmatter(content)
            .with_context(|| format!("Failed to parse markdown: {}", path))?
    } else if path.ends_with(".yaml") || path.ends_with(".yml") {
        serde_yaml::from_str(content).with_context(|| format!("Failed to parse YAML: {}", path))?
    } else if path.ends_with(".json") {
        serde_json::from_str(content).with_context(|| format!("Failed to parse JSON: {}", path))?
    } else if content.starts_with("---") {
        // Try markdown first (if starts with ---), then YAML, then JSON
        parse_markdown_frontmatter(content)
            .or_else(|_| serde_yaml::from_str(content))
            .or_else(|_| serde_json::from_str(content))
            .with_context(|| {
                format!("Failed to parse file (tried markdown, YAML, JSON): {}", path)
            })?
    } else {
        serde_yaml::from_str(content)
            .or_else(|_| serde_json::from_str(content))
            .with_context(|| format!("Failed to parse file (tried YAML and JSON): {}", path))?
    };
    Ok(config)
}

async fn resolve_fields(
    file: Option<String>,
    name: Option<String>,
    args: FieldArgs,
) -> Result<AgentFields> {
    // Load from file if provided
    let (file_config, base_dir) = match file {
        Some(path) => {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read file: {}", path))?;
            let base_dir = Path::new(&path)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            (parse_agent_file(&path, &content)?, base_dir)
        }
        None => (AgentFile::default(), PathBuf::new()),
    };
    Ok(AgentFields::merge(file_config, &base_dir, name, args))
}

async fn load_attachment(path: &Path) -> Result<Attachment> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    validate_attachment_name(&name)?;
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read attachment: {}", path.display()))?;
    Ok(Attachment::new(name, content))
}

fn commit_text(session: &mut EditSession, field: FieldId, value: &str) -> Result<()> {
    session.open(field)?;
    session.commit_field(field, value, None)?;
    Ok(())
}

/// Push flag and file values through the session like an editor would
async fn apply_fields(session: &mut EditSession, fields: &AgentFields) -> Result<()> {
    if let Some(name) = &fields.name {
        if !session.field_list().contains(FieldId::Name) {
            anyhow::bail!("An agent's name cannot be changed after it is created");
        }
        validate_agent_name(name)?;
        commit_text(session, FieldId::Name, name)?;
    }
    if let Some(instructions) = &fields.instructions {
        commit_text(session, FieldId::Instructions, instructions)?;
    }
    if let Some(welcome) = &fields.welcome_message {
        commit_text(session, FieldId::WelcomeMessage, welcome)?;
    }
    if let Some(entries) = &fields.prompts {
        if entries.len() > prompts::MAX_SUGGESTED_PROMPTS {
            anyhow::bail!(
                "At most {} suggested prompts are allowed",
                prompts::MAX_SUGGESTED_PROMPTS
            );
        }
        if entries.iter().any(|e| e.contains(',')) {
            anyhow::bail!("Suggested prompts cannot contain commas");
        }
        commit_text(session, FieldId::SuggestedPrompts, &prompts::encode(entries))?;
    }

    if !fields.attach.is_empty() || !fields.delete_files.is_empty() {
        let existing = session.baseline_files();
        if let Some(missing) = fields.delete_files.iter().find(|d| !existing.contains(d)) {
            anyhow::bail!("No existing file named {}", missing);
        }
        let mut new_files = Vec::with_capacity(fields.attach.len());
        for path in &fields.attach {
            new_files.push(load_attachment(path).await?);
        }
        session.open(FieldId::Files)?;
        session.commit_files(FieldId::Files, new_files, fields.delete_files.clone(), None)?;
    }
    Ok(())
}

pub async fn run(command: AgentsCommand, client: &Client, config: &CliConfig) -> Result<()> {
    match command {
        AgentsCommand::List => list(client, config.output).await,
        AgentsCommand::Get { name } => get(client, config.output, &name).await,
        AgentsCommand::Create {
            file,
            name,
            fields,
            dry_run,
        } => {
            let fields = resolve_fields(file, name, fields).await?;
            let mut session = EditSession::new_entity();
            if fields.is_empty() {
                return interactive(&mut session, client, config, dry_run).await;
            }
            if fields.name.is_none() {
                anyhow::bail!("--name is required (or provide in file)");
            }
            apply_fields(&mut session, &fields).await?;
            finish(&mut session, client, config, dry_run).await
        }
        AgentsCommand::Edit {
            name,
            file,
            fields,
            delete_files,
            dry_run,
        } => {
            let mut fields = resolve_fields(file, None, fields).await?;
            if let Some(file_name) = fields.name.take() {
                if file_name != name {
                    tracing::warn!(%file_name, agent = %name, "Ignoring name from file; agents cannot be renamed");
                }
            }
            fields.delete_files = delete_files;

            let mut session = EditSession::open_existing(client, &name)
                .await
                .with_context(|| format!("Failed to load agent {}", name))?;
            if !session.is_editable() {
                anyhow::bail!(
                    "Agent {} is still processing its files; try again once embeddings are ready",
                    name
                );
            }
            if fields.is_empty() {
                return interactive(&mut session, client, config, dry_run).await;
            }
            apply_fields(&mut session, &fields).await?;
            finish(&mut session, client, config, dry_run).await
        }
        AgentsCommand::Delete { name } => delete(client, config, &name).await,
    }
}

/// Save the session, or show its payload on a dry run
async fn finish(
    session: &mut EditSession,
    client: &Client,
    config: &CliConfig,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        return print_payload(session.agent_name(), &session.build_save_payload(), config.output);
    }
    if !session.is_dirty() {
        if !config.quiet {
            println!("Nothing to save");
        }
        return Ok(());
    }

    let created = session.is_new_entity();
    let record = session.save(client).await.context("Failed to save agent")?;
    if config.output.is_text() {
        if config.quiet {
            println!("{}", record.name);
        } else {
            let verb = if created { "Created" } else { "Updated" };
            println!("{} agent: {}", verb, record.name);
            if record.is_processing() {
                println!("Files are being processed; the agent is read-only until embeddings finish.");
            }
        }
    } else {
        config.output.print_value(record)?;
    }
    Ok(())
}

fn print_payload(agent: Option<&str>, payload: &SavePayload, output: OutputFormat) -> Result<()> {
    if !output.is_text() {
        return output.print_value(payload);
    }
    match agent {
        Some(name) => println!("Would update agent: {}", name),
        None => println!("Would create agent: {}", payload.name),
    }
    print_field("Instructions", &payload.instructions);
    print_field("Welcome", &payload.welcome_message);
    print_field("Prompts", &prompts::decode(&payload.suggested_prompts).join(" | "));
    let new_names: Vec<&str> = payload.new_files.iter().map(|f| f.name.as_str()).collect();
    if !new_names.is_empty() {
        print_field("New files", &new_names.join(", "));
    }
    if !payload.deleted_files.is_empty() {
        print_field("Delete files", &payload.deleted_files);
    }
    Ok(())
}

// ============================================================================
// Interactive wizard
// ============================================================================

/// Lines describing every field of the session, styled by display precedence
fn overview_lines(session: &EditSession) -> Vec<String> {
    let mut lines = Vec::new();
    for field in FieldId::ALL {
        let shown = session.display(field);
        let marker = if session.field_list().contains(field) {
            ""
        } else {
            " (fixed)"
        };
        lines.push(format!("{}{}:", field.title(), marker));
        match field {
            FieldId::SuggestedPrompts if shown.style != DisplayStyle::Placeholder => {
                for (index, entry) in prompts::decode(shown.text).iter().enumerate() {
                    let suffix = if shown.style == DisplayStyle::Provisional {
                        " (unsaved)"
                    } else {
                        ""
                    };
                    lines.push(format!("  {}. {}{}", index + 1, entry, suffix));
                }
            }
            FieldId::Files if shown.style != DisplayStyle::Placeholder => {
                lines.extend(session.file_rows().iter().map(file_row));
            }
            _ => {
                for text_line in styled(&shown).lines() {
                    lines.push(format!("  {}", text_line));
                }
            }
        }
    }
    lines
}

const HOST_HELP: &str = "Commands: edit [field] | save | reset | quit";

/// What woke the host loop
enum Wake {
    Line(Option<String>),
    Hint,
}

async fn interactive(
    session: &mut EditSession,
    client: &Client,
    config: &CliConfig,
    dry_run: bool,
) -> Result<()> {
    let mut editor = TerminalEditor::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    host_loop(session, client, config, dry_run, &mut editor).await
}

async fn host_loop<R, W, S>(
    session: &mut EditSession,
    store: &S,
    config: &CliConfig,
    dry_run: bool,
    editor: &mut TerminalEditor<R, W>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
    S: AgentStore + ?Sized,
{
    if session.is_new_entity() {
        session.schedule_open(FieldId::Name, NAME_HINT_DELAY)?;
    }

    loop {
        editor.say("").await?;
        for line in overview_lines(session) {
            editor.say(&line).await?;
        }
        editor.say(HOST_HELP).await?;
        editor.write_prompt("> ").await?;

        let wake = match session.hint_deadline() {
            Some(deadline) => {
                let sleep = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline));
                tokio::select! {
                    line = editor.read_line() => Wake::Line(line?),
                    _ = sleep => Wake::Hint,
                }
            }
            None => Wake::Line(editor.read_line().await?),
        };

        let line = match wake {
            Wake::Hint => {
                if session.fire_due_hint(Instant::now()).is_some() {
                    editor.say("").await?;
                    run_wizard(session, editor).await?;
                }
                continue;
            }
            Wake::Line(None) => "quit".to_string(),
            Wake::Line(Some(line)) => line,
        };

        let line = line.trim();
        let (verb, arg) = line.split_once(' ').unwrap_or((line, ""));
        match verb {
            "" | "edit" => {
                let field = if arg.trim().is_empty() {
                    session.field_list().first()
                } else {
                    match arg.trim().parse::<FieldId>() {
                        Ok(field) => Some(field),
                        Err(err) => {
                            editor.say(&err.to_string()).await?;
                            continue;
                        }
                    }
                };
                let Some(field) = field else { continue };
                if let Err(err) = session.open(field) {
                    editor.say(&err.to_string()).await?;
                    continue;
                }
                run_wizard(session, editor).await?;
            }
            "save" => {
                if dry_run {
                    print_payload(session.agent_name(), &session.build_save_payload(), config.output)?;
                    continue;
                }
                if !session.is_dirty() {
                    editor.say("Nothing to save").await?;
                    continue;
                }
                match session.save(store).await {
                    Ok(record) => {
                        let message = format!("Saved agent: {}", record.name);
                        let processing = record.is_processing();
                        editor.say(&message).await?;
                        if processing {
                            editor
                                .say("Files are being processed; the agent is read-only until embeddings finish.")
                                .await?;
                            return Ok(());
                        }
                    }
                    // pending values are kept so the user can retry
                    Err(err) => editor.say(&format!("Save failed: {}", err)).await?,
                }
            }
            "reset" => {
                session.reset()?;
                editor.say("Discarded unsaved changes").await?;
            }
            "quit" | "exit" | "q" => {
                if session.is_dirty() {
                    editor.say("Discarding unsaved changes").await?;
                }
                return Ok(());
            }
            _ => {
                // a bare field name opens that field
                match line.parse::<FieldId>() {
                    Ok(field) if session.open(field).is_ok() => run_wizard(session, editor).await?,
                    _ => editor.say(HOST_HELP).await?,
                }
            }
        }
    }
}

// ============================================================================
// Read-only commands
// ============================================================================

fn format_time(record_time: Option<chrono::DateTime<chrono::Utc>>) -> String {
    record_time
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn embeddings_label(record: &AgentRecord) -> &'static str {
    if record.is_processing() {
        "processing"
    } else {
        "ready"
    }
}

async fn list(client: &Client, output: OutputFormat) -> Result<()> {
    let agents = client.list_agents().await.context("Failed to list agents")?;

    if output.is_text() {
        if agents.is_empty() {
            println!("No agents found");
            return Ok(());
        }

        print_table_header(&[("NAME", 24), ("FILES", 30), ("EMBEDDINGS", 10), ("UPDATED", 16)]);

        for agent in &agents {
            let files = if agent.files.is_empty() {
                "-".to_string()
            } else {
                agent.file_names().join(", ")
            };
            print_table_row(&[
                (&agent.name, 24),
                (&files, 30),
                (embeddings_label(agent), 10),
                (&format_time(agent.updated_at()), 16),
            ]);
        }
    } else {
        output.print_value(&agents)?;
    }

    Ok(())
}

async fn get(client: &Client, output: OutputFormat, name: &str) -> Result<()> {
    let agent = client.fetch_agent(name).await?;

    if output.is_text() {
        let session = EditSession::for_record(agent.clone());
        print_field("Name", &agent.name);
        print_field("Instructions", &styled(&session.display(FieldId::Instructions)));
        print_field("Welcome", &styled(&session.display(FieldId::WelcomeMessage)));
        println!("{}", display::prompts_markdown(&agent.suggested_prompts));
        if agent.files.is_empty() {
            print_field("Files", "-");
        } else {
            print_field("Files", &agent.file_names().join(", "));
        }
        print_field("Embeddings", embeddings_label(&agent));
        print_field("Created", &format_time(agent.created_at()));
        print_field("Updated", &format_time(agent.updated_at()));
    } else {
        output.print_value(&agent)?;
    }

    Ok(())
}

async fn delete(client: &Client, config: &CliConfig, name: &str) -> Result<()> {
    client.delete_agent(name).await?;

    if config.output.is_text() && !config.quiet {
        println!("Deleted agent: {}", name);
    } else if !config.output.is_text() {
        config
            .output
            .print_value(&serde_json::json!({ "name": name, "status": "deleted" }))?;
    }

    Ok(())
}
