use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use irc_client::{cli::Cli, client, shutdown::ShutdownReason};

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    let result = runtime.block_on(client::run(cli.client));
    // Stdin is read on a blocking thread that cannot be cancelled; waiting for
    // it would keep the process alive until the operator presses enter.
    runtime.shutdown_background();

    Ok(exit_code(result?))
}

fn exit_code(reason: ShutdownReason) -> ExitCode {
    match reason {
        ShutdownReason::Interrupted => ExitCode::from(130),
        ShutdownReason::ServerError
        | ShutdownReason::LocalExit
        | ShutdownReason::ConnectionLost => ExitCode::SUCCESS,
    }
}
