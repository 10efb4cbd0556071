// Session-gated routing
//
// Design Decision: Auth state is an explicit AuthContext established once at
// startup and passed by reference to commands, not a global.
// Design Decision: Each command declares a Gate; the router checks it before
// the command runs.

use anyhow::{Context, Result};
use thiserror::Error;

use crate::client::Client;

/// Precondition a command puts on the auth state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Runs regardless of auth state
    Anyone,
    /// Runs only before the admin password is set
    NeedsSetup,
    /// Runs only with a logged-in admin session
    NeedsLogin,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Set the admin password first: agentdesk auth setup")]
    SetupRequired,

    #[error("The admin password is already set; use `agentdesk auth change-password`")]
    AlreadySetUp,

    #[error("Log in first: pass --password or set AGENTDESK_ADMIN_PASSWORD")]
    LoginRequired,
}

/// What the backend told us about the admin session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthContext {
    pub admin_password_set: bool,
    pub logged_in: bool,
}

impl AuthContext {
    /// Check a command's gate against this context
    pub fn check(&self, gate: Gate) -> Result<(), GateError> {
        match gate {
            Gate::Anyone => Ok(()),
            Gate::NeedsSetup if self.admin_password_set => Err(GateError::AlreadySetUp),
            Gate::NeedsSetup => Ok(()),
            Gate::NeedsLogin if !self.admin_password_set => Err(GateError::SetupRequired),
            Gate::NeedsLogin if !self.logged_in => Err(GateError::LoginRequired),
            Gate::NeedsLogin => Ok(()),
        }
    }
}

/// Establish the auth context for a command with `gate`
///
/// Logs in with `password` when the command needs a session and the cookie
/// store does not already hold a valid one.
pub async fn bootstrap(client: &Client, gate: Gate, password: Option<&str>) -> Result<AuthContext> {
    let admin_password_set = client
        .is_admin_password_set()
        .await
        .context("Failed to check whether the admin password is set")?;

    let mut context = AuthContext {
        admin_password_set,
        logged_in: false,
    };
    if !admin_password_set || gate != Gate::NeedsLogin {
        tracing::debug!(?context, "Auth context established");
        return Ok(context);
    }

    context.logged_in = client.check_token().await.context("Failed to check session")?;
    if !context.logged_in {
        if let Some(password) = password {
            client.login(password).await.context("Login failed")?;
            context.logged_in = true;
        }
    }
    tracing::debug!(?context, "Auth context established");
    Ok(context)
}
