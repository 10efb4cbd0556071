// CLI configuration
//
// Every setting has a flag and an environment binding (see main.rs);
// CliConfig is what the rest of the CLI reads.

use std::time::Duration;

use crate::output::OutputFormat;

/// Default backend base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Resolved CLI settings
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Backend base URL, without trailing slash
    pub api_url: String,

    /// Value sent as `X-Requested-With` on every request
    pub request_token: Option<String>,

    /// Admin password used to log in when a command needs it
    pub password: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,

    pub output: OutputFormat,

    /// Suppress non-essential output
    pub quiet: bool,
}

impl CliConfig {
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            request_token: None,
            password: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            output: OutputFormat::Text,
            quiet: false,
        }
    }

    pub fn with_request_token(mut self, token: Option<String>) -> Self {
        self.request_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password.filter(|p| !p.is_empty());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs.max(1));
        self
    }

    pub fn with_output(mut self, output: OutputFormat, quiet: bool) -> Self {
        self.output = output;
        self.quiet = quiet;
        self
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
