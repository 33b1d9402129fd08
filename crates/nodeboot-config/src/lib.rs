//! Nodeboot Configuration Synthesis
//!
//! Turns instance metadata plus the operator's [`BootstrapDocument`] into
//! the files kubelet needs to join a cluster:
//!
//! - the cluster CA certificate
//! - a kubeconfig using the `aws-iam-authenticator` exec plugin
//! - the image credential provider configuration (ECR)
//! - node labels
//! - CRI-O overrides, when any are declared
//! - the node hostname, so the node name matches its private DNS name
//! - the kubelet configuration, always written last
//!
//! # Example
//!
//! ```no_run
//! use nodeboot_config::{ArtifactPaths, ArtifactWriter, Synthesizer, Templates};
//! use nodeboot_imds::{EndpointResolver, MetadataSource};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let session = EndpointResolver::default().resolve().await?;
//! let document = session.fetch_document().await?;
//! let templates = Templates::load("/usr/share/nodeboot/templates").await?;
//!
//! let artifacts = Synthesizer::new(&session, &document, templates)
//!     .synthesize()
//!     .await?;
//! ArtifactWriter::new(ArtifactPaths::default()).write(&artifacts).await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`BootstrapDocument`]: nodeboot_imds::BootstrapDocument

pub mod credential_provider;
pub mod error;
pub mod facts;
pub mod instance_types;
pub mod kubeconfig;
pub mod kubelet;
pub mod labels;
pub mod merge;
pub mod paths;
pub mod runtime;
pub mod synth;
pub mod writer;

pub use error::{ConfigError, Result};
pub use facts::InstanceFacts;
pub use instance_types::InstanceCapacities;
pub use kubeconfig::KubeConfig;
pub use paths::{ArtifactPaths, Templates};
pub use synth::{Artifacts, Synthesizer};
pub use writer::{ArtifactWriter, WriteOutcome};
