//! SSO server entrypoint

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use sso_server::{logging, shutdown_signal, ServerApp, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "sso-server", version, about = "SSO auth service")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, env = "CONFIG_PATH")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ServerConfig::from_file(&cli.config)?;

    logging::init_logging(&config.env)?;
    info!(env = %config.env, port = config.http.port, "Config loaded");

    let app = ServerApp::new(&config)?;
    app.run(shutdown_signal()).await
}
