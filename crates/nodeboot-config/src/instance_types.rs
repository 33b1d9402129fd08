//! Instance type interface capacity
//!
//! Each entry is the number of secondary IPv4 addresses the instance type
//! can attach across all of its network interfaces, i.e.
//! `interfaces * (addresses per interface - 1)`. With the VPC CNI every pod
//! takes one of these addresses, so this is the base of the pod limit.

use std::collections::HashMap;

/// Built in capacity table, sorted by instance type
pub const INTERFACE_CAPACITY: &[(&str, u32)] = &[
    ("a1.2xlarge", 56),
    ("a1.4xlarge", 232),
    ("a1.large", 27),
    ("a1.medium", 6),
    ("a1.metal", 735),
    ("a1.xlarge", 56),
    ("c5.12xlarge", 232),
    ("c5.18xlarge", 735),
    ("c5.24xlarge", 735),
    ("c5.2xlarge", 56),
    ("c5.4xlarge", 232),
    ("c5.9xlarge", 232),
    ("c5.large", 27),
    ("c5.metal", 735),
    ("c5.xlarge", 56),
    ("c6g.12xlarge", 232),
    ("c6g.16xlarge", 735),
    ("c6g.2xlarge", 56),
    ("c6g.4xlarge", 232),
    ("c6g.8xlarge", 232),
    ("c6g.large", 27),
    ("c6g.medium", 6),
    ("c6g.metal", 735),
    ("c6g.xlarge", 56),
    ("c6i.12xlarge", 232),
    ("c6i.16xlarge", 735),
    ("c6i.24xlarge", 735),
    ("c6i.2xlarge", 56),
    ("c6i.32xlarge", 735),
    ("c6i.4xlarge", 232),
    ("c6i.8xlarge", 232),
    ("c6i.large", 27),
    ("c6i.xlarge", 56),
    ("c7g.12xlarge", 232),
    ("c7g.16xlarge", 735),
    ("c7g.2xlarge", 56),
    ("c7g.4xlarge", 232),
    ("c7g.8xlarge", 232),
    ("c7g.large", 27),
    ("c7g.medium", 6),
    ("c7g.xlarge", 56),
    ("m5.12xlarge", 232),
    ("m5.16xlarge", 735),
    ("m5.24xlarge", 735),
    ("m5.2xlarge", 56),
    ("m5.4xlarge", 232),
    ("m5.8xlarge", 232),
    ("m5.large", 27),
    ("m5.metal", 735),
    ("m5.xlarge", 56),
    ("m5a.12xlarge", 232),
    ("m5a.16xlarge", 735),
    ("m5a.24xlarge", 735),
    ("m5a.2xlarge", 56),
    ("m5a.4xlarge", 232),
    ("m5a.8xlarge", 232),
    ("m5a.large", 27),
    ("m5a.xlarge", 56),
    ("m6a.12xlarge", 232),
    ("m6a.16xlarge", 735),
    ("m6a.24xlarge", 735),
    ("m6a.2xlarge", 56),
    ("m6a.32xlarge", 735),
    ("m6a.4xlarge", 232),
    ("m6a.8xlarge", 232),
    ("m6a.large", 27),
    ("m6a.xlarge", 56),
    ("m6g.12xlarge", 232),
    ("m6g.16xlarge", 735),
    ("m6g.2xlarge", 56),
    ("m6g.4xlarge", 232),
    ("m6g.8xlarge", 232),
    ("m6g.large", 27),
    ("m6g.medium", 6),
    ("m6g.metal", 735),
    ("m6g.xlarge", 56),
    ("m6i.12xlarge", 232),
    ("m6i.16xlarge", 735),
    ("m6i.24xlarge", 735),
    ("m6i.2xlarge", 56),
    ("m6i.32xlarge", 735),
    ("m6i.4xlarge", 232),
    ("m6i.8xlarge", 232),
    ("m6i.large", 27),
    ("m6i.xlarge", 56),
    ("m7g.12xlarge", 232),
    ("m7g.16xlarge", 735),
    ("m7g.2xlarge", 56),
    ("m7g.4xlarge", 232),
    ("m7g.8xlarge", 232),
    ("m7g.large", 27),
    ("m7g.medium", 6),
    ("m7g.xlarge", 56),
    ("m7i.12xlarge", 232),
    ("m7i.16xlarge", 735),
    ("m7i.24xlarge", 735),
    ("m7i.2xlarge", 56),
    ("m7i.4xlarge", 232),
    ("m7i.8xlarge", 232),
    ("m7i.large", 27),
    ("m7i.xlarge", 56),
    ("r5.12xlarge", 232),
    ("r5.16xlarge", 735),
    ("r5.24xlarge", 735),
    ("r5.2xlarge", 56),
    ("r5.4xlarge", 232),
    ("r5.8xlarge", 232),
    ("r5.large", 27),
    ("r5.metal", 735),
    ("r5.xlarge", 56),
    ("r6g.12xlarge", 232),
    ("r6g.16xlarge", 735),
    ("r6g.2xlarge", 56),
    ("r6g.4xlarge", 232),
    ("r6g.8xlarge", 232),
    ("r6g.large", 27),
    ("r6g.medium", 6),
    ("r6g.metal", 735),
    ("r6g.xlarge", 56),
    ("r6i.12xlarge", 232),
    ("r6i.16xlarge", 735),
    ("r6i.24xlarge", 735),
    ("r6i.2xlarge", 56),
    ("r6i.32xlarge", 735),
    ("r6i.4xlarge", 232),
    ("r6i.8xlarge", 232),
    ("r6i.large", 27),
    ("r6i.xlarge", 56),
    ("t2.2xlarge", 42),
    ("t2.large", 33),
    ("t2.medium", 15),
    ("t2.micro", 2),
    ("t2.nano", 2),
    ("t2.small", 9),
    ("t2.xlarge", 42),
    ("t3.2xlarge", 56),
    ("t3.large", 33),
    ("t3.medium", 15),
    ("t3.micro", 2),
    ("t3.nano", 2),
    ("t3.small", 9),
    ("t3.xlarge", 56),
    ("t3a.2xlarge", 56),
    ("t3a.large", 33),
    ("t3a.medium", 15),
    ("t3a.micro", 2),
    ("t3a.nano", 2),
    ("t3a.small", 9),
    ("t3a.xlarge", 56),
    ("t4g.2xlarge", 56),
    ("t4g.large", 33),
    ("t4g.medium", 15),
    ("t4g.micro", 2),
    ("t4g.nano", 2),
    ("t4g.small", 9),
    ("t4g.xlarge", 56),
];

/// Instance type to interface address capacity lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceCapacities(HashMap<String, u32>);

impl Default for InstanceCapacities {
    fn default() -> Self {
        INTERFACE_CAPACITY
            .iter()
            .map(|(name, capacity)| (name.to_string(), *capacity))
            .collect()
    }
}

impl FromIterator<(String, u32)> for InstanceCapacities {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl InstanceCapacities {
    /// Capacity for an instance type. Unknown types have no capacity.
    pub fn capacity(&self, instance_type: &str) -> u32 {
        self.0.get(instance_type).copied().unwrap_or(0)
    }

    pub fn contains(&self, instance_type: &str) -> bool {
        self.0.contains_key(instance_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_and_unique() {
        for pair in INTERFACE_CAPACITY.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} before {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn test_known_capacities() {
        let table = InstanceCapacities::default();
        assert_eq!(table.capacity("t3.medium"), 15);
        assert_eq!(table.capacity("m5.large"), 27);
        assert_eq!(table.capacity("m5.4xlarge"), 232);
        assert_eq!(table.capacity("c5.18xlarge"), 735);
    }

    #[test]
    fn test_unknown_type_is_zero() {
        let table = InstanceCapacities::default();
        assert!(!table.contains("x99.enormous"));
        assert_eq!(table.capacity("x99.enormous"), 0);
        assert_eq!(table.capacity(""), 0);
    }

    #[test]
    fn test_custom_table() {
        let table: InstanceCapacities = [("test.large".to_string(), 20)].into_iter().collect();
        assert_eq!(table.capacity("test.large"), 20);
        assert_eq!(table.capacity("m5.large"), 0);
    }
}
