//! Bootstrap document types
//!
//! The bootstrap document is supplied as instance user-data when the
//! instance is launched. Every field is optional: an absent field takes its
//! default, and unknown fields are ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// API version this crate understands
pub const API_VERSION: &str = "nodeboot.dev/v1alpha1";

/// Document kind
pub const KIND: &str = "BootstrapDocument";

/// Bootstrap document read from `user-data`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BootstrapDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Cluster the node should join
    pub api_server: ApiServer,

    /// Node level declarations
    pub node: Node,
}

/// API server identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiServer {
    /// Cluster name, passed to the IAM authenticator as the cluster id
    pub name: String,

    /// API server URL
    pub endpoint: String,

    /// Base64 encoded cluster CA certificate
    #[serde(rename = "b64ClusterCA")]
    pub b64_cluster_ca: String,
}

/// Node declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Node {
    /// Extra node labels. These win over the labels derived from metadata.
    pub labels: BTreeMap<String, String>,

    /// Taints the node registers with
    pub taints: Vec<Taint>,

    /// Pod density limit
    pub max_pods: Limits,

    /// Raw YAML or JSON overlaid on the kubelet configuration template
    pub kubelet_configuration: String,

    /// Container runtime overrides
    pub container_runtime: ContainerRuntime,
}

/// A node taint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taint {
    pub key: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,

    pub effect: String,
}

/// Pod limit toggle and offset
///
/// When `set` is true the pod limit is computed from the instance type's
/// interface address capacity plus `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub set: bool,
    pub offset: i32,
}

impl Default for Limits {
    fn default() -> Self {
        Self { set: true, offset: 3 }
    }
}

impl Limits {
    /// Limits that leave the pod limit untouched
    pub fn disabled() -> Self {
        Self { set: false, offset: 0 }
    }
}

/// Container runtime overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContainerRuntime {
    /// Value for CRI-O's `image_volumes` setting
    pub image_volumes: String,
}

impl BootstrapDocument {
    /// Parse a document, failing on malformed YAML or JSON
    pub fn parse(raw: &[u8]) -> std::result::Result<Self, serde_yaml::Error> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_yaml::from_slice(raw)
    }

    /// Parse a document, falling back to the defaults when it is malformed
    pub fn parse_lenient(raw: &[u8]) -> Self {
        match Self::parse(raw) {
            Ok(doc) => {
                if let Some(version) = doc.api_version.as_deref() {
                    if version != API_VERSION {
                        warn!(api_version = %version, expected = API_VERSION, "Unrecognised bootstrap document version");
                    }
                }
                doc
            }
            Err(e) => {
                warn!(error = %e, "Could not parse bootstrap document, using defaults");
                Self::default()
            }
        }
    }
}
