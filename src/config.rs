//! Runtime configuration
//!
//! Built once at startup from CLI flags with environment fallbacks and
//! handed to each component constructor.

use clap::{Parser, ValueEnum};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_CLOUDFLARE_API_URL: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_CLERK_API_URL: &str = "https://api.clerk.com";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "dns-manager-api", author, version, about, long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Cloudflare v4 API base URL
    #[arg(long, env = "CLOUDFLARE_API_URL", default_value = DEFAULT_CLOUDFLARE_API_URL)]
    pub cloudflare_api_url: String,

    /// Clerk API base URL used to verify bearer tokens
    #[arg(long, env = "CLERK_API_URL", default_value = DEFAULT_CLERK_API_URL)]
    pub clerk_api_url: String,

    /// SurrealDB endpoint (ws://, wss:// or mem://)
    #[arg(long, env = "DATABASE_URL", default_value = "ws://127.0.0.1:8000")]
    pub database_url: String,

    #[arg(long, env = "DATABASE_NAMESPACE", default_value = "dns_manager")]
    pub database_namespace: String,

    #[arg(long, env = "DATABASE_NAME", default_value = "dns_manager")]
    pub database_name: String,

    /// Root user for SurrealDB (skipped when unset)
    #[arg(long, env = "DATABASE_USER")]
    pub database_user: Option<String>,

    #[arg(long, env = "DATABASE_PASS", hide_env_values = true)]
    pub database_pass: Option<String>,

    /// Origin allowed by CORS
    #[arg(long, env = "FRONTEND_URL", default_value = "http://localhost:3000")]
    pub frontend_url: String,

    /// CSV template applied by the Google Workspace endpoint
    #[arg(long, env = "DNS_TEMPLATE_PATH", default_value = "data/google_workspace.csv")]
    pub template_path: PathBuf,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

impl Config {
    /// Loads `.env` (searched from the working directory upwards) into the
    /// process environment, then parses flags. Variables already set win.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }

    /// Same as [`Config::load`] with an explicit env file. A missing file is ignored.
    pub fn try_load_from<I, T>(env_file: &Path, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        if let Err(e) = dotenvy::from_path(env_file) {
            if !e.not_found() {
                warn!("Ignoring unreadable env file {}: {}", env_file.display(), e);
            }
        }
        Self::try_parse_from(args)
    }

    /// Cloudflare base URL without a trailing slash.
    pub fn cloudflare_base(&self) -> &str {
        self.cloudflare_api_url.trim_end_matches('/')
    }

    pub fn clerk_base(&self) -> &str {
        self.clerk_api_url.trim_end_matches('/')
    }
}
