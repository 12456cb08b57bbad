//! Startup error display
//!
//! Request-time errors never reach here; they become HTTP responses. This only
//! renders what stops the gateway from starting or keeps it from serving.

use colored::Colorize;

use crate::error::ProxyError;

/// Format an error for CLI display
#[must_use]
pub fn format_error(error: &ProxyError) -> String {
    match error {
        ProxyError::Configuration { message, key } => {
            let suggestion = match key {
                Some(key) => format!("Check the value of {key} (flag, environment, or .env file)"),
                None => "Set the AWS_* variables in the environment or a .env file, or run with --help"
                    .to_string(),
            };
            format!(
                "{} Configuration error\n  {}\n\n{}\n  {}",
                "✗".red().bold(),
                message,
                "Suggestion:".yellow(),
                suggestion
            )
        }
        ProxyError::Io(err) => {
            format!(
                "{} I/O error\n  {}\n\n{}\n  {}",
                "✗".red().bold(),
                err,
                "Suggestion:".yellow(),
                "Check that the port is free and the host address is valid (--host, --port)"
            )
        }
        _ => format!("{} {}", "✗".red().bold(), error),
    }
}

/// Display an error to stderr and return exit code
#[must_use]
pub fn display_error(error: &ProxyError) -> i32 {
    eprintln!("{}", format_error(error));
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_formatting() {
        colored::control::set_override(false);

        let error = ProxyError::configuration("Missing required environment variables: AWS_SCOPE");
        let formatted = format_error(&error);
        assert!(formatted.contains("Configuration error"));
        assert!(formatted.contains("AWS_SCOPE"));
        assert!(formatted.contains(".env"));

        let error = ProxyError::configuration_with_key("Invalid URL 'x'", "AWS_MCP_URL");
        assert!(format_error(&error).contains("Check the value of AWS_MCP_URL"));
    }

    #[test]
    fn test_io_formatting() {
        colored::control::set_override(false);

        let error = ProxyError::Io(std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "address in use",
        ));
        let formatted = format_error(&error);
        assert!(formatted.contains("I/O error"));
        assert!(formatted.contains("--port"));
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(display_error(&ProxyError::internal("boom")), 1);
    }
}
