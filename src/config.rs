//! Command line and environment configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 2022;
pub const DEFAULT_URL: &str = "http://127.0.0.1:2022";

#[derive(Debug, Parser)]
#[command(name = "famtasks")]
#[command(about = "Shared task board for a household", version)]
pub struct Cli {
    /// SQLite database file (defaults to the per-user data directory)
    #[arg(long, global = true, env = "FAMILY_TASKS_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Start MCP server via stdio
    Mcp,
    /// Check whether a server is answering
    Status(RemoteArgs),
    /// Print the task board, using demo data if the server is unreachable
    Board(RemoteArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct ServeArgs {
    /// Interface to bind
    #[arg(long, env = "SERVER_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port for HTTP API
    #[arg(short, long, env = "SERVER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServeArgs {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct RemoteArgs {
    /// Base URL of a running server
    #[arg(long, env = "FAMILY_TASKS_URL", default_value = DEFAULT_URL)]
    pub url: String,
}
