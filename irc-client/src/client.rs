use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::{info, warn};

use crate::{
    cli::ClientArgs,
    connection::Connection,
    console::Console,
    session::Session,
    shutdown::ShutdownReason,
};

/// Connects, registers, and relays between the terminal and the server.
///
/// A failed connect is returned as an error before any loop starts; every
/// other way the session can end is reported through [`ShutdownReason`].
pub async fn run(args: ClientArgs) -> Result<ShutdownReason> {
    let connection = Connection::open(&args.host, args.port)
        .await
        .context("could not reach IRC server")?;

    let session = Session::new(connection, Console::stdout());
    session.register(&args.registration()).await?;

    let stdin = BufReader::new(tokio::io::stdin());
    let reason = session.run_until(stdin, ctrl_c()).await;
    info!(?reason, "disconnected");

    Ok(reason)
}

async fn ctrl_c() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(?error, "failed to install ctrl-c handler");
        // Without a handler there is nothing to wait for; never fire.
        std::future::pending::<()>().await;
    }
}
