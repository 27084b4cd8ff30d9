use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::Mutex,
};
use tracing::{debug, info};

const LINE_ENDINGS: &[char] = &['\n', '\r'];
const LINE_TERMINATOR: &[u8] = b"\r\n";
/// Longest inbound line accepted, terminator included: a 512 byte IRC
/// message plus the 8191 bytes IRCv3 allows for message tags.
pub const MAX_LINE_BYTES: usize = 8704;

/// Errors surfaced by the line transport.
///
/// Anything returned from an established connection means it is gone:
/// callers stop issuing I/O and shut down rather than retry.
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("failed to connect to {addr}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("connection already closed")]
    Closed,

    #[error("inbound line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("connection I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// A line-oriented connection split into its two directions.
///
/// The inbound half is owned by whoever drains it; the outbound half is
/// cloneable so the reader and writer loops can both send on it.
pub struct Connection<R, W> {
    reader: LineReader<R>,
    sender: LineSender<W>,
}

impl Connection<OwnedReadHalf, OwnedWriteHalf> {
    pub async fn open(host: &str, port: u16) -> Result<Self, ConnectionError> {
        let addr = format!("{host}:{port}");
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|source| ConnectionError::Connect {
                addr: addr.clone(),
                source,
            })?;

        info!(%addr, "connected");

        let (reader, writer) = stream.into_split();
        Ok(Self::new(reader, writer))
    }
}

impl<R, W> Connection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        let closed = Arc::new(AtomicBool::new(false));
        Self {
            reader: LineReader {
                inner: BufReader::new(reader),
                buffer: Vec::new(),
                closed: Arc::clone(&closed),
            },
            sender: LineSender {
                writer: Arc::new(Mutex::new(Some(writer))),
                closed,
            },
        }
    }

    pub fn into_split(self) -> (LineReader<R>, LineSender<W>) {
        (self.reader, self.sender)
    }
}

/// Inbound direction of a [`Connection`].
pub struct LineReader<R> {
    inner: BufReader<R>,
    buffer: Vec<u8>,
    closed: Arc<AtomicBool>,
}

impl<R> LineReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Waits for the next line, blank lines included.
    ///
    /// Returns `Ok(None)` once the peer closes the stream. The terminator is
    /// stripped; both CRLF and bare LF are accepted. A line longer than
    /// [`MAX_LINE_BYTES`] fails with [`ConnectionError::LineTooLong`].
    pub async fn receive_line(&mut self) -> Result<Option<String>, ConnectionError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ConnectionError::Closed);
        }

        self.buffer.clear();
        let bytes = (&mut self.inner)
            .take(MAX_LINE_BYTES as u64)
            .read_until(b'\n', &mut self.buffer)
            .await?;
        if bytes == 0 {
            return Ok(None);
        }
        if bytes == MAX_LINE_BYTES && self.buffer.last() != Some(&b'\n') {
            return Err(ConnectionError::LineTooLong {
                limit: MAX_LINE_BYTES,
            });
        }

        // Servers are not bound to a charset, so undecodable bytes are replaced.
        let line = String::from_utf8_lossy(&self.buffer);
        Ok(Some(line.trim_end_matches(LINE_ENDINGS).to_string()))
    }
}

/// Outbound direction of a [`Connection`].
pub struct LineSender<W> {
    writer: Arc<Mutex<Option<W>>>,
    closed: Arc<AtomicBool>,
}

impl<W> Clone for LineSender<W> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<W> LineSender<W>
where
    W: AsyncWrite + Unpin,
{
    pub async fn send_line(&self, text: &str) -> Result<(), ConnectionError> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(ConnectionError::Closed)?;

        // One write per line keeps a reply from one loop from splitting a line from the other.
        let mut frame = Vec::with_capacity(text.len() + LINE_TERMINATOR.len());
        frame.extend_from_slice(text.as_bytes());
        frame.extend_from_slice(LINE_TERMINATOR);
        writer.write_all(&frame).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Closes the outbound half and marks the whole connection closed.
    ///
    /// Safe to call any number of times from any task. Returns `true` only
    /// for the call that actually closed the connection.
    pub async fn close(&self) -> bool {
        self.closed.store(true, Ordering::Release);

        let Some(mut writer) = self.writer.lock().await.take() else {
            return false;
        };

        if let Err(error) = writer.shutdown().await {
            debug!(?error, "failed to shutdown connection writer cleanly");
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
