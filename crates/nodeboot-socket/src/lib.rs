//! Nodeboot Control Socket
//!
//! The system supervisor listens on a Unix socket for one-byte commands.
//! There is no framing and no reply: a command is a single byte written to
//! the stream.
//!
//! # Example
//!
//! ```no_run
//! use nodeboot_socket::{Command, SystemSocket};
//!
//! # async fn run() -> nodeboot_socket::Result<()> {
//! let mut socket = SystemSocket::connect().await?;
//! socket.send(Command::RestartKubelet).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod protocol;

pub use client::{SystemSocket, SYSTEM_SOCKET_PATH};
pub use error::{Result, SocketError};
pub use protocol::{Command, Event};
