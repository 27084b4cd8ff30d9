use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite},
    select,
};
use tracing::{debug, warn};

use crate::{
    connection::LineSender,
    console::Console,
    protocol,
    shutdown::{Shutdown, ShutdownReason},
};

const LINE_ENDINGS: &[char] = &['\n', '\r'];

/// Relays operator lines to the server until shutdown.
///
/// Waiting for input races the shutdown signal, so the loop ends as soon as
/// another trigger fires even if the operator never types again.
pub async fn run<I, W>(
    input: &mut I,
    sender: &LineSender<W>,
    shutdown: &Shutdown,
    console: &Console,
) where
    I: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = select! {
            biased;
            _ = shutdown.wait() => break,
            bytes_read = input.read_line(&mut line) => bytes_read,
        };

        match bytes_read {
            Ok(0) => {
                debug!("operator input closed");
                leave(sender, shutdown).await;
                break;
            }
            Ok(_) => {}
            Err(error) => {
                warn!(?error, "failed to read operator input");
                leave(sender, shutdown).await;
                break;
            }
        }

        if !handle_input(&line, sender, shutdown, console).await {
            break;
        }
    }

    debug!("writer loop finished");
}

async fn handle_input<W>(
    line: &str,
    sender: &LineSender<W>,
    shutdown: &Shutdown,
    console: &Console,
) -> bool
where
    W: AsyncWrite + Unpin,
{
    let text = line.trim_end_matches(LINE_ENDINGS);

    if protocol::is_exit_command(text) {
        if shutdown.trigger(ShutdownReason::LocalExit) {
            console.line("*** leaving chat").await;
        }
        sender.close().await;
        return false;
    }

    match sender.send_line(text).await {
        Ok(()) => true,
        Err(error) => {
            debug!(?error, "failed to send operator line");
            if shutdown.trigger(ShutdownReason::ConnectionLost) {
                console.line("*** connection closed").await;
            }
            false
        }
    }
}

async fn leave<W>(sender: &LineSender<W>, shutdown: &Shutdown)
where
    W: AsyncWrite + Unpin,
{
    shutdown.trigger(ShutdownReason::LocalExit);
    sender.close().await;
}
