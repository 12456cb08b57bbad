//! awsmcp-proxy CLI entry point

#![warn(clippy::all)]

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("Error: CLI feature not enabled. Build with --features cli");
    std::process::exit(1);
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() {
    use clap::Parser;

    // Must run before parsing so .env values feed the env fallbacks
    let env_file = dotenvy::dotenv().ok();

    let cli = awsmcp_proxy::cli::Cli::parse();

    if let Err(e) = cli.execute(env_file).await {
        let exit_code = awsmcp_proxy::cli::error::display_error(&e);
        std::process::exit(exit_code);
    }
}
