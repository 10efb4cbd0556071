// Admin auth commands

use crate::auth::{AuthContext, Gate, GateError};
use crate::client::Client;
use crate::config::CliConfig;
use crate::editor::TerminalEditor;
use agentdesk_core::validation::{validate_new_password, validate_password_change};
use anyhow::{Context, Result};
use clap::Subcommand;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};

#[derive(Subcommand)]
pub enum AuthCommand {
    /// Show whether the admin password is set and the session is valid
    Status,

    /// Set the admin password on a fresh backend
    Setup {
        /// New admin password (prompted with visible input when omitted)
        #[arg(long)]
        new_password: Option<String>,

        /// Repeat of the new password (prompted with visible input when omitted)
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Check the admin password against the backend
    ///
    /// Reads --password / AGENTDESK_ADMIN_PASSWORD, or prompts with visible input.
    Login,

    /// End the admin session
    Logout,

    /// Change the admin password
    ChangePassword {
        /// Current password (defaults to --password / AGENTDESK_ADMIN_PASSWORD)
        #[arg(long)]
        current: Option<String>,

        /// New password (prompted with visible input when omitted)
        #[arg(long)]
        new_password: Option<String>,

        /// Repeat of the new password (prompted with visible input when omitted)
        #[arg(long)]
        confirm: Option<String>,
    },
}

impl AuthCommand {
    pub fn gate(&self) -> Gate {
        match self {
            AuthCommand::Setup { .. } => Gate::NeedsSetup,
            AuthCommand::ChangePassword { .. } => Gate::NeedsLogin,
            AuthCommand::Status | AuthCommand::Login | AuthCommand::Logout => Gate::Anyone,
        }
    }
}

/// Use `given` or ask for it on the terminal
///
/// The terminal editor does not mask input, so the prompt says so; flags
/// and AGENTDESK_ADMIN_PASSWORD avoid the echo.
async fn value_or_prompt<R, W>(
    given: Option<String>,
    label: &str,
    editor: &mut TerminalEditor<R, W>,
) -> Result<String>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    if let Some(value) = given {
        return Ok(value);
    }
    let line = editor
        .prompt(&format!("{} (input is visible): ", label))
        .await?
        .with_context(|| format!("{} is required", label))?;
    Ok(line.trim().to_string())
}

fn terminal() -> TerminalEditor<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    TerminalEditor::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
}

pub async fn run(
    command: AuthCommand,
    client: &Client,
    config: &CliConfig,
    context: &AuthContext,
) -> Result<()> {
    match command {
        AuthCommand::Status => status(client, config, context).await,
        AuthCommand::Setup {
            new_password,
            confirm,
        } => {
            let mut editor = terminal();
            let password = value_or_prompt(new_password, "New password", &mut editor).await?;
            let confirm = value_or_prompt(confirm, "Confirm password", &mut editor).await?;
            setup(client, config, &password, &confirm).await
        }
        AuthCommand::Login => {
            if !context.admin_password_set {
                return Err(GateError::SetupRequired.into());
            }
            let password = match config.password.clone() {
                Some(password) => password,
                None => value_or_prompt(None, "Password", &mut terminal()).await?,
            };
            client.login(&password).await.context("Login failed")?;
            if !config.quiet {
                println!("Login successful");
            }
            Ok(())
        }
        AuthCommand::Logout => {
            client.logout().await.context("Logout failed")?;
            if !config.quiet {
                println!("Logged out");
            }
            Ok(())
        }
        AuthCommand::ChangePassword {
            current,
            new_password,
            confirm,
        } => {
            let mut editor = terminal();
            let current =
                value_or_prompt(current.or(config.password.clone()), "Current password", &mut editor)
                    .await?;
            let new_password = value_or_prompt(new_password, "New password", &mut editor).await?;
            let confirm = value_or_prompt(confirm, "Repeat new password", &mut editor).await?;
            change_password(client, config, &current, &new_password, &confirm).await
        }
    }
}

async fn status(client: &Client, config: &CliConfig, context: &AuthContext) -> Result<()> {
    let logged_in = context.admin_password_set && client.check_token().await?;

    if config.output.is_text() {
        let set = if context.admin_password_set { "set" } else { "not set" };
        crate::output::print_field("Admin password", set);
        crate::output::print_field("Session", if logged_in { "valid" } else { "none" });
    } else {
        config.output.print_value(&serde_json::json!({
            "admin_password_set": context.admin_password_set,
            "logged_in": logged_in,
        }))?;
    }
    Ok(())
}

async fn setup(client: &Client, config: &CliConfig, password: &str, confirm: &str) -> Result<()> {
    validate_new_password(password, confirm)?;
    client
        .set_admin_password(password)
        .await
        .context("Failed to set admin password")?;
    if !config.quiet {
        println!("Admin password set. Pass it with --password or AGENTDESK_ADMIN_PASSWORD.");
    }
    Ok(())
}

async fn change_password(
    client: &Client,
    config: &CliConfig,
    current: &str,
    new_password: &str,
    confirm: &str,
) -> Result<()> {
    validate_password_change(current, new_password, confirm)?;
    client
        .change_admin_password(current, new_password)
        .await
        .context("Failed to change admin password")?;
    if !config.quiet {
        println!("Admin password changed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> CliConfig {
        CliConfig::new(&format!("{}/api", server.uri()))
    }

    #[test]
    fn test_gates() {
        assert_eq!(AuthCommand::Status.gate(), Gate::Anyone);
        let setup = AuthCommand::Setup {
            new_password: None,
            confirm: None,
        };
        assert_eq!(setup.gate(), Gate::NeedsSetup);
    }

    #[tokio::test]
    async fn test_prompt_used_when_flag_missing() {
        let mut editor = TerminalEditor::new(BufReader::new(&b"hunter22\n"[..]), Vec::new());
        let value = value_or_prompt(None, "Password", &mut editor).await.unwrap();
        assert_eq!(value, "hunter22");

        let given = value_or_prompt(Some("flag".into()), "Password", &mut editor)
            .await
            .unwrap();
        assert_eq!(given, "flag");

        assert!(value_or_prompt(None, "Password", &mut editor).await.is_err());

        let (_, out) = editor.into_inner();
        assert!(String::from_utf8(out)
            .unwrap()
            .starts_with("Password (input is visible): "));
    }

    #[tokio::test]
    async fn test_setup_validates_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/set-admin-password"))
            .and(body_json(json!({"password": "secret1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server);
        let client = Client::new(&config).unwrap();
        assert!(setup(&client, &config, "secret1", "secret2").await.is_err());
        assert!(setup(&client, &config, "short", "short").await.is_err());
        setup(&client, &config, "secret1", "secret1").await.unwrap();
    }

    #[tokio::test]
    async fn test_change_password_reports_backend_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/change-admin-password"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "Current password is incorrect"})),
            )
            .mount(&server)
            .await;

        let config = config_for(&server);
        let client = Client::new(&config).unwrap();
        let err = change_password(&client, &config, "wrong1", "newpass", "newpass")
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Current password is incorrect"));
    }
}
