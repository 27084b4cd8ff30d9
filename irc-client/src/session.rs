use std::future::Future;

use anyhow::{Context, Result};
use tokio::{
    io::{AsyncBufRead, AsyncRead, AsyncWrite},
    select,
};
use tracing::{debug, info, warn};

use crate::{
    connection::{Connection, LineReader, LineSender},
    console::Console,
    protocol::Registration,
    reader,
    shutdown::{Shutdown, ShutdownReason},
    writer,
};

/// One registered connection with its reader and writer loops.
pub struct Session<R, W> {
    reader: LineReader<R>,
    sender: LineSender<W>,
    shutdown: Shutdown,
    console: Console,
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(connection: Connection<R, W>, console: Console) -> Self {
        let (reader, sender) = connection.into_split();
        Self {
            reader,
            sender,
            shutdown: Shutdown::new(),
            console,
        }
    }

    /// Sends the `USER`/`NICK` handshake without waiting for any reply.
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        for line in registration.lines() {
            self.sender
                .send_line(&line)
                .await
                .with_context(|| format!("failed to send registration line '{line}'"))?;
        }
        info!(nickname = %registration.nickname, "registration sent");
        Ok(())
    }

    /// Runs both loops until one of them, or `interrupt`, ends the session.
    ///
    /// The reader loop runs as its own task; operator input is relayed from
    /// `input` on the current task. Returns whatever triggered the shutdown.
    pub async fn run_until<I, F>(self, mut input: I, interrupt: F) -> ShutdownReason
    where
        I: AsyncBufRead + Unpin,
        F: Future<Output = ()>,
    {
        let Session {
            reader,
            sender,
            shutdown,
            console,
        } = self;

        let reader_task = tokio::spawn(reader::run(
            reader,
            sender.clone(),
            shutdown.clone(),
            console.clone(),
        ));

        tokio::pin!(interrupt);
        select! {
            _ = writer::run(&mut input, &sender, &shutdown, &console) => {}
            _ = &mut interrupt => handle_interrupt(&sender, &shutdown, &console).await,
        }

        if let Err(error) = reader_task.await {
            warn!(?error, "reader task failed");
        }

        let reason = shutdown.reason().unwrap_or(ShutdownReason::LocalExit);
        debug!(?reason, "session finished");
        reason
    }
}

async fn handle_interrupt<W>(sender: &LineSender<W>, shutdown: &Shutdown, console: &Console)
where
    W: AsyncWrite + Unpin,
{
    if shutdown.trigger(ShutdownReason::Interrupted) {
        console.line("*** interrupted, shutting down").await;
    }
    sender.close().await;
}
