//! Configuration synthesis
//!
//! [`Synthesizer`] combines live instance facts with the bootstrap document
//! and the baseline templates. It does not touch the filesystem; see
//! [`ArtifactWriter`](crate::ArtifactWriter) for that.

use crate::credential_provider;
use crate::error::{ConfigError, Result};
use crate::facts::InstanceFacts;
use crate::instance_types::InstanceCapacities;
use crate::kubeconfig::KubeConfig;
use crate::kubelet;
use crate::labels;
use crate::paths::{authenticator_path, Templates, CLUSTER_CA_PATH};
use crate::runtime;
use base64::Engine;
use nodeboot_imds::{BootstrapDocument, MetadataSource};
use serde_yaml::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Everything bootstrap writes for kubelet
#[derive(Debug, Clone, PartialEq)]
pub struct Artifacts {
    /// Decoded cluster CA certificate
    pub cluster_ca: Vec<u8>,
    pub kubeconfig: KubeConfig,
    pub credential_providers: Value,
    pub node_labels: BTreeMap<String, String>,
    /// CRI-O overrides, `None` when the operator declared none
    pub container_runtime: Option<String>,
    /// Node name from metadata, `None` when it could not be read
    pub hostname: Option<String>,
    pub kubelet: Value,
}

/// Builds [`Artifacts`] from a metadata source and a bootstrap document
pub struct Synthesizer<'a> {
    source: &'a dyn MetadataSource,
    document: &'a BootstrapDocument,
    templates: Templates,
    capacities: InstanceCapacities,
}

impl<'a> Synthesizer<'a> {
    pub fn new(
        source: &'a dyn MetadataSource,
        document: &'a BootstrapDocument,
        templates: Templates,
    ) -> Self {
        Self {
            source,
            document,
            templates,
            capacities: InstanceCapacities::default(),
        }
    }

    /// Replace the built in instance type capacity table
    pub fn with_capacities(mut self, capacities: InstanceCapacities) -> Self {
        self.capacities = capacities;
        self
    }

    /// Produce every artifact
    ///
    /// Only an undecodable cluster CA or a serialization failure is an
    /// error. Metadata that cannot be read is left empty.
    pub async fn synthesize(&self) -> Result<Artifacts> {
        let cluster_ca = decode_cluster_ca(&self.document.api_server.b64_cluster_ca)?;
        let facts = InstanceFacts::gather(self.source).await;
        info!(
            instance_id = %facts.instance_id,
            instance_type = %facts.instance_type,
            zone = %facts.availability_zone,
            "Gathered instance metadata"
        );

        let api_server = &self.document.api_server;
        let kubeconfig = KubeConfig::for_cluster(
            &api_server.endpoint,
            &api_server.name,
            &facts.region,
            CLUSTER_CA_PATH,
            &authenticator_path(),
        );

        let credential_providers = credential_provider::build(&self.templates.credential_providers)
            .map_err(|source| ConfigError::Serialize {
                artifact: "credential provider configuration",
                source,
            })?;

        Ok(Artifacts {
            cluster_ca,
            kubeconfig,
            credential_providers,
            node_labels: labels::build(&facts, &self.document.node.labels),
            container_runtime: runtime::render(&self.document.node.container_runtime)?,
            hostname: hostname(&facts),
            kubelet: kubelet::build(&self.templates.kubelet, self.document, &facts, &self.capacities),
        })
    }
}

/// First name the metadata service reports; custom DHCP option sets can
/// return several, space separated
fn hostname(facts: &InstanceFacts) -> Option<String> {
    match facts.hostname.split_whitespace().next() {
        Some(name) => Some(name.to_string()),
        None => {
            warn!("No hostname in instance metadata, keeping the host's own");
            None
        }
    }
}

/// Decode the base64 cluster CA from the bootstrap document
pub fn decode_cluster_ca(b64: &str) -> Result<Vec<u8>> {
    let b64 = b64.trim();
    if b64.is_empty() {
        warn!("Bootstrap document has no cluster CA");
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(b64)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::tests::StaticSource;
    use crate::facts::{
        AVAILABILITY_ZONE_PATH, HOSTNAME_PATH, INSTANCE_ID_PATH, INSTANCE_TYPE_PATH, LOCAL_IPV4_PATH,
        REGION_PATH,
    };

    fn source() -> StaticSource {
        StaticSource::new(&[
            (INSTANCE_ID_PATH, "i-123"),
            (INSTANCE_TYPE_PATH, "test.large"),
            (LOCAL_IPV4_PATH, "10.0.5.2"),
            (AVAILABILITY_ZONE_PATH, "us-east-1a"),
            (REGION_PATH, "us-east-1"),
            (HOSTNAME_PATH, "ip-10-0-5-2.ec2.internal corp.example.com"),
        ])
    }

    fn templates() -> Templates {
        Templates {
            kubelet: serde_yaml::from_str(
                "apiVersion: kubelet.config.k8s.io/v1beta1\nkind: KubeletConfiguration\n",
            )
            .unwrap(),
            credential_providers: serde_yaml::from_str(
                "apiVersion: kubelet.config.k8s.io/v1alpha1\nkind: CredentialProviderConfig\n",
            )
            .unwrap(),
        }
    }

    #[tokio::test]
    async fn test_end_to_end() {
        let document = BootstrapDocument::parse(
            br#"{"apiServer":{"name":"x","endpoint":"https://e","b64ClusterCA":"QQ=="},"node":{"maxPods":{"set":true,"offset":3}}}"#,
        )
        .unwrap();
        let source = source();
        let capacities: InstanceCapacities = [("test.large".to_string(), 20)].into_iter().collect();

        let artifacts = Synthesizer::new(&source, &document, templates())
            .with_capacities(capacities)
            .synthesize()
            .await
            .unwrap();

        assert_eq!(artifacts.cluster_ca, b"A");
        assert_eq!(artifacts.kubeconfig.server(), Some("https://e"));
        assert_eq!(
            artifacts.kubeconfig.exec_args().unwrap().join(" "),
            "token -i x --region us-east-1"
        );
        assert_eq!(artifacts.kubelet["maxPods"].as_i64(), Some(23));
        assert_eq!(artifacts.kubelet["clusterDNS"][0].as_str(), Some("172.20.0.10"));
        assert_eq!(artifacts.kubelet["providerID"].as_str(), Some("aws:///us-east-1a/i-123"));
        assert_eq!(artifacts.node_labels[labels::REGION_LABEL], "us-east-1");
        assert_eq!(
            artifacts.credential_providers["providers"][0]["name"].as_str(),
            Some("ecr-credential-provider")
        );
        assert_eq!(artifacts.container_runtime, None);
        assert_eq!(artifacts.hostname.as_deref(), Some("ip-10-0-5-2.ec2.internal"));
    }

    #[tokio::test]
    async fn test_missing_metadata_is_soft() {
        let document = BootstrapDocument::default();
        let source = StaticSource::new(&[]);

        let artifacts = Synthesizer::new(&source, &document, templates())
            .synthesize()
            .await
            .unwrap();

        assert_eq!(artifacts.kubelet["providerID"].as_str(), Some("aws:////"));
        assert_eq!(artifacts.kubelet["clusterDNS"][0].as_str(), Some("10.100.0.10"));
        assert_eq!(artifacts.kubelet["maxPods"].as_i64(), Some(3));
        assert_eq!(artifacts.hostname, None);
        assert_eq!(artifacts.kubeconfig.exec_args().unwrap()[4], "");
    }

    #[tokio::test]
    async fn test_invalid_cluster_ca_is_fatal() {
        let mut document = BootstrapDocument::default();
        document.api_server.b64_cluster_ca = "not base64!".to_string();
        let source = source();

        let result = Synthesizer::new(&source, &document, templates()).synthesize().await;
        assert!(matches!(result, Err(ConfigError::InvalidClusterCa(_))));
    }

    #[test]
    fn test_decode_cluster_ca() {
        assert_eq!(decode_cluster_ca("QQ==").unwrap(), b"A");
        assert_eq!(decode_cluster_ca(" QQ==\n").unwrap(), b"A");
        assert!(decode_cluster_ca("").unwrap().is_empty());
    }
}
