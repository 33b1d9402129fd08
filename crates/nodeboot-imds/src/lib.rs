//! Nodeboot Instance Metadata Client
//!
//! This crate talks to the EC2 instance metadata service (IMDSv2) during
//! node bootstrap.
//!
//! # Overview
//!
//! The metadata service is reachable on a link-local address, either
//! `169.254.169.254` or `[fd00:ec2::254]` depending on which network stack
//! the instance has the service enabled for. There is no way to know in
//! advance which one answers, so [`EndpointResolver`] races a token request
//! against both and keeps whichever session comes up first.
//!
//! # Example
//!
//! ```no_run
//! use nodeboot_imds::{EndpointResolver, MetadataSource};
//!
//! # async fn run() -> nodeboot_imds::Result<()> {
//! let session = EndpointResolver::default().resolve().await?;
//! let instance_id = session.fetch_string("meta-data/instance-id").await?;
//! let document = session.fetch_document().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Paths used during bootstrap
//!
//! - `meta-data/instance-id`
//! - `meta-data/instance-type`
//! - `meta-data/local-ipv4`
//! - `meta-data/placement/availability-zone`
//! - `meta-data/placement/region`
//! - `user-data` - the [`BootstrapDocument`]

pub mod document;
pub mod error;
pub mod resolver;
pub mod session;
pub mod source;

#[cfg(test)]
mod test_helpers;

pub use document::{ApiServer, BootstrapDocument, ContainerRuntime, Limits, Node, Taint};
pub use error::{ImdsError, Result};
pub use resolver::{Candidate, EndpointResolver};
pub use session::ImdsSession;
pub use source::MetadataSource;
