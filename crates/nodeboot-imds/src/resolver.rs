//! Dual-stack endpoint discovery
//!
//! Even when an instance has IPv6, the IPv6 metadata endpoint has to be
//! enabled explicitly, so there is no reliable way to tell up front which
//! address will answer. The resolver asks both at once and keeps the first
//! session that comes up. The slower attempt is left to finish on its own;
//! its result is dropped.

use crate::error::{ImdsError, Result};
use crate::session::{default_client, ImdsSession};
use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// IPv4 metadata address
pub const IMDS_IPV4: &str = "169.254.169.254";

/// IPv6 metadata address, bracketed for use in URLs
pub const IMDS_IPV6: &str = "[fd00:ec2::254]";

/// Token lifetime requested during bootstrap, in seconds
pub const DEFAULT_TOKEN_TTL: u32 = 30;

/// How long to wait for any endpoint before giving up
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// A metadata endpoint the resolver may use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    address: String,
    base_url: String,
}

impl Candidate {
    /// Candidate for a host (and optional port), e.g. `169.254.169.254`
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        let base_url = format!("http://{}/latest/", address);
        Self { address, base_url }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The IPv4 and IPv6 metadata endpoints
    pub fn defaults() -> Vec<Candidate> {
        vec![Candidate::new(IMDS_IPV4), Candidate::new(IMDS_IPV6)]
    }
}

/// Races session establishment across candidate endpoints
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    candidates: Vec<Candidate>,
    ttl_secs: u32,
    deadline: Duration,
    client: Option<Client>,
}

impl Default for EndpointResolver {
    fn default() -> Self {
        Self::new(Candidate::defaults())
    }
}

impl EndpointResolver {
    /// Create a resolver over the given candidates
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            ttl_secs: DEFAULT_TOKEN_TTL,
            deadline: DEFAULT_DEADLINE,
            client: None,
        }
    }

    /// Set the token lifetime requested from the winning endpoint
    pub fn with_token_ttl(mut self, ttl_secs: u32) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Set the overall deadline for finding an endpoint
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Use a specific HTTP client for every attempt
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Establish a session with whichever candidate answers first
    ///
    /// Returns [`ImdsError::Unreachable`] once every attempt has failed and
    /// [`ImdsError::Timeout`] if none succeeded within the deadline.
    pub async fn resolve(&self) -> Result<ImdsSession> {
        let client = match &self.client {
            Some(client) => client.clone(),
            None => default_client()?,
        };

        // Room for every candidate, so a late winner never blocks on send
        // after the receiver has gone.
        let (tx, mut rx) = mpsc::channel(self.candidates.len().max(1));

        for candidate in &self.candidates {
            let tx = tx.clone();
            let mut session = ImdsSession::with_client(candidate, client.clone());
            let ttl = self.ttl_secs;

            tokio::spawn(async move {
                match session.establish(ttl).await {
                    Ok(()) => {
                        let _ = tx.send(session).await;
                    }
                    Err(e) => {
                        warn!(endpoint = %session.base_url(), error = %e, "Could not establish metadata session");
                    }
                }
            });
        }
        // Only the tasks hold senders now; the channel closes when all fail.
        drop(tx);

        match tokio::time::timeout(self.deadline, rx.recv()).await {
            Ok(Some(session)) => {
                info!(endpoint = %session.base_url(), "Metadata session created");
                Ok(session)
            }
            Ok(None) => Err(ImdsError::Unreachable(
                self.candidates
                    .iter()
                    .map(|c| c.address.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            )),
            Err(_) => Err(ImdsError::Timeout(self.deadline)),
        }
    }
}
