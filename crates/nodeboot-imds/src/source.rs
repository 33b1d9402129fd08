//! Metadata source trait

use crate::document::BootstrapDocument;
use crate::error::Result;
use async_trait::async_trait;

/// Path of the bootstrap document
pub const USER_DATA_PATH: &str = "user-data";

/// Anything that can answer metadata paths
///
/// [`ImdsSession`](crate::ImdsSession) is the production implementation.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch the raw body of a metadata path
    async fn fetch(&self, path: &str) -> Result<Vec<u8>>;

    /// Fetch a metadata path as text
    async fn fetch_string(&self, path: &str) -> Result<String> {
        let raw = self.fetch(path).await?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    /// Fetch and parse the bootstrap document
    ///
    /// Transport failures are returned. A document that does not parse is
    /// replaced by the default document.
    async fn fetch_document(&self) -> Result<BootstrapDocument> {
        let raw = self.fetch(USER_DATA_PATH).await?;
        Ok(BootstrapDocument::parse_lenient(&raw))
    }
}
