use std::sync::Arc;

use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};
use tracing::debug;

type Sink = Box<dyn AsyncWrite + Send + Unpin>;

/// Line output shared by the reader and writer loops.
///
/// Each line is written and flushed under one lock so output from the two
/// loops never interleaves mid-line.
#[derive(Clone)]
pub struct Console {
    sink: Arc<Mutex<Sink>>,
}

impl Console {
    pub fn new<W>(sink: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }

    /// Prints one line. A broken console is not a reason to drop the
    /// connection, so write failures are only logged.
    pub async fn line(&self, text: &str) {
        let mut sink = self.sink.lock().await;
        if let Err(error) = write_line(&mut *sink, text).await {
            debug!(?error, "failed to write console line");
        }
    }
}

async fn write_line(sink: &mut Sink, text: &str) -> std::io::Result<()> {
    sink.write_all(text.as_bytes()).await?;
    sink.write_all(b"\n").await?;
    sink.flush().await
}
