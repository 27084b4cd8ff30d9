use tokio::{
    io::{AsyncRead, AsyncWrite},
    select,
};
use tracing::{debug, info, warn};

use crate::{
    connection::{ConnectionError, LineReader, LineSender},
    console::Console,
    protocol::{self, Inbound},
    shutdown::{Shutdown, ShutdownReason},
};

/// Drains inbound lines until shutdown or until the connection goes away.
///
/// Every line is echoed, `PING` is answered with `PONG` on `sender`, and an
/// `ERROR` line shuts the session down and closes the connection.
pub async fn run<R, W>(
    mut reader: LineReader<R>,
    sender: LineSender<W>,
    shutdown: Shutdown,
    console: Console,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let received = select! {
            biased;
            _ = shutdown.wait() => break,
            received = reader.receive_line() => received,
        };

        let keep_reading = match received {
            Ok(Some(line)) => handle_line(&line, &sender, &shutdown, &console).await,
            Ok(None) => {
                debug!("server closed the connection");
                handle_connection_gone(&sender, &shutdown, &console).await;
                false
            }
            Err(error) => {
                handle_receive_error(error);
                handle_connection_gone(&sender, &shutdown, &console).await;
                false
            }
        };

        if !keep_reading {
            break;
        }
    }

    debug!("reader loop finished");
}

async fn handle_line<W>(
    line: &str,
    sender: &LineSender<W>,
    shutdown: &Shutdown,
    console: &Console,
) -> bool
where
    W: AsyncWrite + Unpin,
{
    console.line(&format!("Received: {line}")).await;

    match protocol::classify(line) {
        Inbound::Fatal => {
            handle_server_error(sender, shutdown, console).await;
            false
        }
        Inbound::Ping(token) => answer_ping(token, sender, shutdown, console).await,
        Inbound::Other => true,
    }
}

async fn handle_server_error<W>(sender: &LineSender<W>, shutdown: &Shutdown, console: &Console)
where
    W: AsyncWrite + Unpin,
{
    if shutdown.trigger(ShutdownReason::ServerError) {
        console
            .line("*** server reported an error, disconnecting")
            .await;
    }
    info!("server reported an error");
    sender.close().await;
}

async fn answer_ping<W>(
    token: &str,
    sender: &LineSender<W>,
    shutdown: &Shutdown,
    console: &Console,
) -> bool
where
    W: AsyncWrite + Unpin,
{
    let reply = protocol::pong(token);
    console.line(&format!("Sending: {reply}")).await;

    match sender.send_line(&reply).await {
        Ok(()) => true,
        Err(error) => {
            debug!(?error, "failed to answer ping");
            if shutdown.trigger(ShutdownReason::ConnectionLost) {
                console.line("*** connection closed").await;
            }
            false
        }
    }
}

async fn handle_connection_gone<W>(sender: &LineSender<W>, shutdown: &Shutdown, console: &Console)
where
    W: AsyncWrite + Unpin,
{
    // A shutdown started locally already explains why the stream ended.
    if shutdown.trigger(ShutdownReason::ConnectionLost) {
        console.line("*** connection closed by server").await;
    }
    sender.close().await;
}

fn handle_receive_error(error: ConnectionError) {
    match error {
        ConnectionError::Closed => debug!("connection closed locally"),
        error => warn!(?error, "failed to read from server"),
    }
}
