//! Node labels
//!
//! Kubelet runs without a cloud provider, so the well-known topology labels
//! it would normally set are derived here instead.

use crate::facts::InstanceFacts;
use std::collections::BTreeMap;
use tracing::warn;

pub const INSTANCE_TYPE_LABEL: &str = "node.kubernetes.io/instance-type";
pub const ZONE_LABEL: &str = "topology.kubernetes.io/zone";
pub const REGION_LABEL: &str = "topology.kubernetes.io/region";

/// Labels from instance facts, overlaid with the operator's labels
pub fn build(facts: &InstanceFacts, overrides: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::from([
        (INSTANCE_TYPE_LABEL.to_string(), facts.instance_type.clone()),
        (ZONE_LABEL.to_string(), facts.availability_zone.clone()),
        (REGION_LABEL.to_string(), facts.region.clone()),
    ]);
    labels.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    labels
}

/// One `key: value` record per line
///
/// Labels with a line break in the key or value would split into extra
/// records, so they are dropped.
pub fn render(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .filter(|(key, value)| {
            let single_line = !has_line_break(key) && !has_line_break(value);
            if !single_line {
                warn!(label = ?key, "Dropping node label containing a line break");
            }
            single_line
        })
        .map(|(key, value)| format!("{}: {}\n", key, value))
        .collect()
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\n', '\r'])
}
