//! Live instance facts
//!
//! Every fact is a soft read: if the metadata service cannot answer, a
//! warning is logged and the fact is left empty so bootstrap can carry on.

use nodeboot_imds::MetadataSource;
use tracing::warn;

pub const INSTANCE_ID_PATH: &str = "meta-data/instance-id";
pub const INSTANCE_TYPE_PATH: &str = "meta-data/instance-type";
pub const LOCAL_IPV4_PATH: &str = "meta-data/local-ipv4";
pub const AVAILABILITY_ZONE_PATH: &str = "meta-data/placement/availability-zone";
pub const REGION_PATH: &str = "meta-data/placement/region";
/// Private DNS name; the IAM authenticator maps the node role to it
pub const HOSTNAME_PATH: &str = "meta-data/hostname";

/// Facts about the running instance read from the metadata service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceFacts {
    pub instance_id: String,
    pub instance_type: String,
    pub local_ipv4: String,
    pub availability_zone: String,
    pub region: String,
    pub hostname: String,
}

impl InstanceFacts {
    /// Read every fact concurrently
    pub async fn gather(source: &dyn MetadataSource) -> Self {
        let (instance_id, instance_type, local_ipv4, availability_zone, region, hostname) = tokio::join!(
            soft_fetch(source, INSTANCE_ID_PATH),
            soft_fetch(source, INSTANCE_TYPE_PATH),
            soft_fetch(source, LOCAL_IPV4_PATH),
            soft_fetch(source, AVAILABILITY_ZONE_PATH),
            soft_fetch(source, REGION_PATH),
            soft_fetch(source, HOSTNAME_PATH),
        );

        Self {
            instance_id,
            instance_type,
            local_ipv4,
            availability_zone,
            region,
            hostname,
        }
    }
}

/// Fetch a path, substituting an empty string on failure
pub async fn soft_fetch(source: &dyn MetadataSource, path: &str) -> String {
    match source.fetch_string(path).await {
        Ok(value) => value.trim().to_string(),
        Err(e) => {
            warn!(path = %path, error = %e, "Could not read instance metadata, continuing without it");
            String::new()
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use nodeboot_imds::{ImdsError, Result};
    use std::collections::HashMap;

    /// Metadata source backed by a map; unknown paths fail like a dead transport
    pub(crate) struct StaticSource(pub HashMap<String, String>);

    impl StaticSource {
        pub(crate) fn new(values: &[(&str, &str)]) -> Self {
            Self(values.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
        }
    }

    #[async_trait]
    impl MetadataSource for StaticSource {
        async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
            self.0
                .get(path)
                .map(|v| v.as_bytes().to_vec())
                .ok_or(ImdsError::NoToken)
        }
    }

    #[tokio::test]
    async fn test_gather_all_facts() {
        let source = StaticSource::new(&[
            (INSTANCE_ID_PATH, "i-123"),
            (INSTANCE_TYPE_PATH, "m5.large"),
            (LOCAL_IPV4_PATH, "10.0.5.2\n"),
            (AVAILABILITY_ZONE_PATH, "us-east-1a"),
            (REGION_PATH, "us-east-1"),
            (HOSTNAME_PATH, "ip-10-0-5-2.ec2.internal\n"),
        ]);

        let facts = InstanceFacts::gather(&source).await;
        assert_eq!(facts.instance_id, "i-123");
        assert_eq!(facts.instance_type, "m5.large");
        assert_eq!(facts.local_ipv4, "10.0.5.2");
        assert_eq!(facts.availability_zone, "us-east-1a");
        assert_eq!(facts.region, "us-east-1");
        assert_eq!(facts.hostname, "ip-10-0-5-2.ec2.internal");
    }

    #[tokio::test]
    async fn test_failed_reads_are_empty() {
        let source = StaticSource::new(&[(REGION_PATH, "eu-west-1")]);

        let facts = InstanceFacts::gather(&source).await;
        assert_eq!(facts.region, "eu-west-1");
        assert!(facts.instance_id.is_empty());
        assert!(facts.local_ipv4.is_empty());
        assert!(facts.hostname.is_empty());
    }
}
