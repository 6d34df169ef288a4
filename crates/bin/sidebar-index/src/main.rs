//! Command-line entry point for sidebar-index.
//!
//! Renders sidebar scripts from rustdoc JSON, checks and converts existing
//! scripts, and serves the ingest API. Logs go to stderr; set `RUST_LOG` to
//! override the default `info` level.

mod commands;
mod config;

use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::config::SidebarCommand;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let command = match SidebarCommand::from_args() {
        Ok(command) => command,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        SidebarCommand::Render(config) => commands::render(config).await,
        SidebarCommand::Check(config) => commands::check(config).await,
        SidebarCommand::Convert(config) => commands::convert(config).await,
        SidebarCommand::Serve(config) => commands::serve(config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
