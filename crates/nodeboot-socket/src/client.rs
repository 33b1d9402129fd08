//! Control socket client

use crate::error::{Result, SocketError};
use crate::protocol::Command;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tracing::debug;

/// Where the supervisor listens
pub const SYSTEM_SOCKET_PATH: &str = "/run/system.sock";

/// Connection to the supervisor's control socket
#[derive(Debug)]
pub struct SystemSocket {
    path: PathBuf,
    stream: UnixStream,
}

impl SystemSocket {
    /// Connect to the well-known socket path
    pub async fn connect() -> Result<Self> {
        Self::connect_to(SYSTEM_SOCKET_PATH).await
    }

    pub async fn connect_to(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let stream = UnixStream::connect(&path)
            .await
            .map_err(|source| SocketError::Connect {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "Connected to control socket");
        Ok(Self { path, stream })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one command byte. Nothing is read back.
    pub async fn send(&mut self, command: Command) -> Result<()> {
        self.stream.write_all(&[u8::from(command)]).await?;
        self.stream.flush().await?;
        debug!(command = ?command, "Sent control command");
        Ok(())
    }
}
