//! Minimal interactive IRC client.
//!
//! The client opens one TCP connection, sends the `USER`/`NICK` handshake,
//! and then runs two loops against it until something ends the session:
//!
//! - [`reader`] drains server lines in a background task, echoes them,
//!   answers `PING` with `PONG`, and stops on `ERROR` or end of stream.
//! - [`writer`] relays operator lines from stdin until `exit`, end of input,
//!   or shutdown.
//! - [`shutdown`] is the one-way signal both loops watch; the first trigger
//!   decides who prints the closing notice.
//! - [`connection`] provides CRLF line framing over the socket halves with an
//!   idempotent close.
//! - [`session`] wires the loops together and handles interrupts, and
//!   [`client`] binds it to the terminal and ctrl-c.
//! - [`protocol`], [`console`], and [`cli`] hold the keyword rules, shared
//!   console output, and command-line flags.
//!
//! Unit tests drive each loop over in-memory duplex streams; the `tests/`
//! directory runs sessions against a local TCP listener and the built binary.

pub mod cli;
pub mod client;
pub mod connection;
pub mod console;
pub mod protocol;
pub mod reader;
pub mod session;
pub mod shutdown;
pub mod writer;
