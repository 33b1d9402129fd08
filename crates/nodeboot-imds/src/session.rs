//! IMDSv2 session
//!
//! A session holds a short-lived token obtained from `PUT <base>/api/token`
//! and attaches it to every metadata read.

use crate::error::{ImdsError, Result};
use crate::resolver::Candidate;
use crate::source::MetadataSource;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

/// Header carrying the requested token lifetime
pub const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";

/// Header carrying the token on metadata reads
pub const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";

/// Upper bound on a single metadata request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on connecting to the metadata service
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Build the HTTP client used for metadata requests
///
/// The metadata service is link-local, so proxies are never used.
pub fn default_client() -> Result<Client> {
    Ok(Client::builder()
        .no_proxy()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?)
}

/// Token authenticated session against one metadata endpoint
#[derive(Debug, Clone)]
pub struct ImdsSession {
    client: Client,
    base_url: String,
    token: String,
    issued_at: Option<Instant>,
    ttl: Duration,
}

impl ImdsSession {
    /// Create a session for a candidate endpoint. No request is made until
    /// [`establish`](Self::establish) is called.
    pub fn new(candidate: &Candidate) -> Result<Self> {
        Ok(Self::with_client(candidate, default_client()?))
    }

    /// Create a session sharing an existing HTTP client
    pub fn with_client(candidate: &Candidate, client: Client) -> Self {
        Self {
            client,
            base_url: candidate.base_url().to_string(),
            token: String::new(),
            issued_at: None,
            ttl: Duration::ZERO,
        }
    }

    /// Base URL every path is resolved against, e.g. `http://169.254.169.254/latest/`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request a token with the given lifetime in seconds
    ///
    /// The response body is stored verbatim as the token. This never
    /// retries; that is up to the caller.
    pub async fn establish(&mut self, ttl_secs: u32) -> Result<()> {
        let url = format!("{}api/token", self.base_url);
        debug!(url = %url, ttl = ttl_secs, "Requesting metadata token");

        let response = self
            .client
            .put(&url)
            .header(TOKEN_TTL_HEADER, ttl_secs.to_string())
            .send()
            .await?;
        let token = response.text().await?;

        if token.is_empty() {
            return Err(ImdsError::EmptyToken(self.base_url.clone()));
        }

        self.token = token;
        self.issued_at = Some(Instant::now());
        self.ttl = Duration::from_secs(u64::from(ttl_secs));
        Ok(())
    }

    /// Whether the session currently holds a live token
    pub fn is_usable(&self) -> bool {
        self.check_token().is_ok()
    }

    fn check_token(&self) -> Result<()> {
        match self.issued_at {
            None => Err(ImdsError::NoToken),
            Some(_) if self.token.is_empty() => Err(ImdsError::NoToken),
            Some(issued) if issued.elapsed() >= self.ttl => Err(ImdsError::TokenExpired(self.ttl)),
            Some(_) => Ok(()),
        }
    }
}

#[async_trait]
impl MetadataSource for ImdsSession {
    /// Read `<base>/<path>`. The status code is not inspected; callers
    /// decide what a body means.
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        self.check_token()?;

        let url = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        debug!(url = %url, "Fetching metadata");

        let response = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await?;
        Ok(response.bytes().await?.to_vec())
    }
}
