use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::time::Duration;

/// devfinder — look up a GitHub user and show their public profile.
#[derive(Parser, Debug, Clone)]
#[command(name = "devfinder", version)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the profile procedure over HTTP
    Serve(ServeArgs),
    /// Look up one or more usernames through a running server
    Lookup(LookupArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// HTTP port
    #[arg(short = 'p', long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(long = "bind", default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Base URL of the GitHub REST API
    #[arg(long = "github-api-base", default_value = GITHUB_API_BASE)]
    pub github_api_base: String,

    /// Access token sent to GitHub as a bearer credential
    #[arg(long = "github-token", env = "GITHUB_API_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct LookupArgs {
    /// Usernames to submit, in order; each one supersedes the previous
    #[arg(required = true)]
    pub usernames: Vec<String>,

    /// Base URL of a running `devfinder serve`
    #[arg(short = 'e', long = "endpoint", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Seconds to wait between automatic retries
    #[arg(long = "retry-delay", default_value_t = QUERY_RETRY_DELAY_SECS)]
    pub retry_delay_secs: u64,
}

/// Runtime settings for the server side.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub github: GitHubConfig,
}

/// Everything the profile fetcher needs to talk to the upstream.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub api_version: String,
    pub user_agent: String,
}

// Server constants
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000";
pub const PROCEDURE_PATH: &str = "/api/profile.getProfileByUsername";

// Upstream constants
pub const GITHUB_API_BASE: &str = "https://api.github.com";
pub const GITHUB_API_VERSION: &str = "2022-11-28";
pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_API_TOKEN";

// Query constants
pub const QUERY_MAX_RETRIES: u32 = 1;
pub const QUERY_RETRY_DELAY_SECS: u64 = 1;
pub const NOTIFICATION_DURATION_SECS: u64 = 5;

impl GitHubConfig {
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            // An empty variable counts as unset
            token: token.filter(|t| !t.trim().is_empty()),
            api_version: GITHUB_API_VERSION.to_string(),
            user_agent: format!("devfinder/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn token_configured(&self) -> bool {
        self.token.is_some()
    }
}

impl ServerConfig {
    pub fn from_args(args: ServeArgs) -> Self {
        ServerConfig {
            bind: args.bind,
            port: args.port,
            github: GitHubConfig::new(args.github_api_base, args.github_token),
        }
    }
}

impl LookupArgs {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}
