//! Kubelet configuration rules
//!
//! The kubelet configuration starts from the baseline template, takes the
//! operator's free-text override on top, and then has the values the
//! operator left unset filled in from instance metadata.

use crate::facts::InstanceFacts;
use crate::instance_types::InstanceCapacities;
use crate::merge::{into_mapping, overlay_text};
use nodeboot_imds::{BootstrapDocument, Limits, Taint};
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

pub const PROVIDER_ID_KEY: &str = "providerID";
pub const CLUSTER_DNS_KEY: &str = "clusterDNS";
pub const MAX_PODS_KEY: &str = "maxPods";
pub const TAINTS_KEY: &str = "registerWithTaints";

/// Cluster DNS service address for nodes in `10.0.0.0/8`
pub const DNS_FOR_TEN_NETWORK: &str = "172.20.0.10";

/// Cluster DNS service address for every other node network
pub const DNS_DEFAULT: &str = "10.100.0.10";

/// `aws:///<zone>/<instance-id>`
pub fn provider_id(availability_zone: &str, instance_id: &str) -> String {
    format!("aws:///{}/{}", availability_zone, instance_id)
}

/// Cluster DNS address for a node's private IPv4 address
///
/// The service CIDR is chosen so it cannot collide with the VPC: a VPC in
/// `10.0.0.0/8` gets its DNS service from `172.20.0.0/16`, anything else
/// from `10.100.0.0/16`. Only the first octet is inspected.
pub fn cluster_dns(local_ipv4: &str) -> &'static str {
    if local_ipv4.split('.').next() == Some("10") {
        DNS_FOR_TEN_NETWORK
    } else {
        DNS_DEFAULT
    }
}

/// Pod limit, or `None` when the limit is switched off
pub fn max_pods(limits: Limits, capacity: u32) -> Option<i64> {
    limits
        .set
        .then(|| i64::from(capacity) + i64::from(limits.offset))
}

/// Build the kubelet configuration
pub fn build(
    template: &Value,
    document: &BootstrapDocument,
    facts: &InstanceFacts,
    capacities: &InstanceCapacities,
) -> Value {
    let mut config = template.clone();
    overlay_text(&mut config, &document.node.kubelet_configuration);

    let mut config_map = into_mapping(config);

    match non_empty_str(config_map.get(PROVIDER_ID_KEY)) {
        Some(existing) => {
            warn!(provider_id = %existing, "providerID set manually; this must match the instance or the node will not register");
        }
        None => {
            let id = provider_id(&facts.availability_zone, &facts.instance_id);
            debug!(provider_id = %id, "Derived providerID");
            config_map.insert(PROVIDER_ID_KEY.into(), Value::String(id));
        }
    }

    let has_dns = matches!(
        config_map.get(CLUSTER_DNS_KEY),
        Some(Value::Sequence(addresses)) if !addresses.is_empty()
    );
    if !has_dns {
        let dns = cluster_dns(&facts.local_ipv4);
        debug!(local_ipv4 = %facts.local_ipv4, cluster_dns = dns, "Derived cluster DNS");
        config_map.insert(
            CLUSTER_DNS_KEY.into(),
            Value::Sequence(vec![Value::String(dns.to_string())]),
        );
    }

    let limits = document.node.max_pods;
    if let Some(pods) = max_pods(limits, capacities.capacity(&facts.instance_type)) {
        if !capacities.contains(&facts.instance_type) {
            warn!(instance_type = %facts.instance_type, "Unknown instance type, pod limit is the offset alone");
        }
        debug!(instance_type = %facts.instance_type, offset = limits.offset, max_pods = pods, "Derived pod limit");
        config_map.insert(MAX_PODS_KEY.into(), Value::Number(pods.into()));
    }

    if !document.node.taints.is_empty() {
        config_map.insert(TAINTS_KEY.into(), taints(&document.node.taints));
    }

    Value::Mapping(config_map)
}

fn taints(taints: &[Taint]) -> Value {
    Value::Sequence(
        taints
            .iter()
            .map(|taint| {
                let mut record = Mapping::new();
                record.insert("key".into(), taint.key.clone().into());
                if !taint.value.is_empty() {
                    record.insert("value".into(), taint.value.clone().into());
                }
                record.insert("effect".into(), taint.effect.clone().into());
                Value::Mapping(record)
            })
            .collect(),
    )
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
