use clap::{Parser, Subcommand};
use stremthru::{Auth, StoreName};

use crate::config::Config;

/// Command line client for the StremThru store API
#[derive(Debug, Parser)]
#[command(name = "stremthru", version)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, env = "STREMTHRU_CONFIG")]
    pub config: Option<String>,

    /// StremThru base URL, e.g. http://localhost:8080
    #[arg(long)]
    pub base_url: Option<String>,

    /// Basic auth, either `user:pass` or an already encoded token
    #[arg(long, conflicts_with_all = ["store", "token"])]
    pub auth: Option<String>,

    /// Backing store name, used together with --token
    #[arg(long, requires = "token")]
    pub store: Option<StoreName>,

    /// Backing store API token
    #[arg(long, requires = "store")]
    pub token: Option<String>,

    /// Suffix appended to the SDK user agent
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Default client IP forwarded on add-magnet and generate-link
    #[arg(long)]
    pub default_client_ip: Option<String>,

    #[arg(long)]
    pub log_level: Option<String>,

    #[arg(long, value_parser = ["pretty", "json"])]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Check server health
    Health,
    /// Show the store user
    User,
    /// Add a magnet to the store
    AddMagnet {
        magnet: String,
        #[arg(long)]
        client_ip: Option<String>,
    },
    /// Check cache status of one or more magnets or hashes
    CheckMagnet {
        #[arg(required = true)]
        magnets: Vec<String>,
        #[arg(long)]
        sid: Option<String>,
    },
    /// Show a magnet with its files
    GetMagnet { id: String },
    /// List magnets in the store
    ListMagnets {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Remove a magnet from the store
    RemoveMagnet { id: String },
    /// Generate a download link for a file link
    GenerateLink {
        link: String,
        #[arg(long)]
        client_ip: Option<String>,
    },
}

impl Cli {
    /// Apply explicit flags on top of file and environment configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.client.base_url.clone_from(base_url);
        }
        if let Some(auth) = &self.auth {
            config.client.auth = Some(Auth::token(auth.as_str()));
        }
        if let (Some(store), Some(token)) = (self.store, &self.token) {
            config.client.auth = Some(Auth::store(store, token.as_str()));
        }
        if let Some(user_agent) = &self.user_agent {
            config.client.user_agent = Some(user_agent.clone());
        }
        if let Some(timeout) = self.timeout {
            config.client.timeout = Some(timeout);
        }
        if let Some(client_ip) = &self.default_client_ip {
            config.client.client_ip = Some(client_ip.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        if let Some(format) = &self.log_format {
            config.logging.format.clone_from(format);
        }
    }
}
