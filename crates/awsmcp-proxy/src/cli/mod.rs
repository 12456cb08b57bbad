//! CLI interface for awsmcp-proxy
//!
//! ```text
//! cli/
//! ├── args.rs       # Gateway flags with environment fallbacks
//! └── error.rs      # User-friendly startup error display
//! ```

pub mod args;
pub mod error;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::GatewayConfig;
use crate::error::ProxyResult;

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// awsmcp-proxy - OAuth2-authenticated MCP gateway
///
/// Accepts MCP JSON-RPC requests over HTTP, attaches a client-credentials
/// bearer token, forwards them upstream, and normalizes JSON or SSE replies.
#[derive(Parser, Debug)]
#[command(
    name = "awsmcp-proxy",
    version,
    about = "OAuth2-authenticated MCP gateway with JSON/SSE reply normalization",
    author
)]
pub struct Cli {
    /// Gateway settings
    #[command(flatten)]
    pub gateway: args::GatewayArgs,

    /// Enable verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(long, value_enum, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Validate configuration and run the gateway until shutdown
    ///
    /// `env_file` is the `.env` file loaded before parsing, if any.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError` if configuration is invalid or the server fails.
    pub async fn execute(self, env_file: Option<PathBuf>) -> ProxyResult<()> {
        if self.no_color || !std::io::stderr().is_terminal() {
            colored::control::set_override(false);
        }

        self.init_tracing();

        if let Some(path) = env_file {
            debug!(path = %path.display(), "Loaded environment file");
        }

        let config = GatewayConfig::from_settings(self.gateway.into_settings())?;
        info!("Gateway configuration loaded successfully");

        crate::server::run(config).await
    }

    /// Filter directive picked by `-v`/`--quiet`
    fn default_directive(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Initialize tracing; `RUST_LOG` overrides the verbosity flags
    fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive()));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr);

        match self.log_format {
            LogFormat::Pretty => builder.with_ansi(!self.no_color).init(),
            LogFormat::Json => builder.json().init(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "awsmcp-proxy",
            "--auth-url",
            "https://auth.example.com/oauth2/token",
            "--mcp-url",
            "https://mcp.example.com/mcp",
            "--client-id",
            "client",
            "--client-secret",
            "secret",
            "--scope",
            "mcp/invoke",
            "--port",
            "8080",
        ])
        .unwrap();

        let config = GatewayConfig::from_settings(cli.gateway.into_settings()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.credentials.client_id, "client");
        assert_eq!(config.upstream.url.host_str(), Some("mcp.example.com"));
    }

    #[test]
    fn test_verbosity_levels() {
        let cli = Cli::try_parse_from(["awsmcp-proxy", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.default_directive(), "trace");

        let cli = Cli::try_parse_from(["awsmcp-proxy", "--quiet"]).unwrap();
        assert_eq!(cli.default_directive(), "error");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let cli = Cli::try_parse_from(["awsmcp-proxy", "-v", "--quiet"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_json_log_format() {
        let cli = Cli::try_parse_from(["awsmcp-proxy", "--log-format", "json"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_secret_not_in_debug_output() {
        let cli =
            Cli::try_parse_from(["awsmcp-proxy", "--client-secret", "hunter2-value"]).unwrap();
        let output = format!("{cli:?}");
        assert!(!output.contains("hunter2-value"));
    }
}
