//! Artifact locations and baseline templates
//!
//! Artifacts are written beneath a root directory where the host
//! filesystem is mounted. Paths that end up inside other artifacts (the CA
//! in the kubeconfig, the authenticator binary) are the paths as the host
//! sees them.

use crate::error::{ConfigError, Result};
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Where the host filesystem is mounted
pub const DEFAULT_ROOT: &str = "/host";

/// Directory holding the baseline templates
pub const DEFAULT_TEMPLATE_DIR: &str = "/usr/share/nodeboot/templates";

pub const KUBELET_TEMPLATE: &str = "kubelet.yaml";
pub const CREDENTIAL_PROVIDER_TEMPLATE: &str = "credential-providers.yaml";

pub const CLUSTER_CA_PATH: &str = "/etc/kubernetes/pki/ca.crt";
pub const KUBECONFIG_PATH: &str = "/etc/kubernetes/kubelet.conf";
pub const CREDENTIAL_PROVIDER_CONFIG_PATH: &str = "/etc/kubernetes/credential-providers.yaml";
pub const NODE_LABELS_PATH: &str = "/etc/kubernetes/node-labels";
pub const CRIO_CONFIG_PATH: &str = "/etc/crio/crio.conf";
pub const KUBELET_CONFIG_PATH: &str = "/etc/kubernetes/kubelet.yaml";
pub const HOSTNAME_FILE_PATH: &str = "/etc/hostname";

/// Kubelet's credential plugin directory; also holds the IAM authenticator
pub const CREDENTIAL_PLUGIN_DIR: &str = "/usr/libexec/kubernetes/kubelet-plugins/credential-provider/exec";

pub const IAM_AUTHENTICATOR: &str = "aws-iam-authenticator";

/// Host path of the IAM authenticator binary
pub fn authenticator_path() -> String {
    format!("{}/{}", CREDENTIAL_PLUGIN_DIR, IAM_AUTHENTICATOR)
}

/// Artifact paths beneath a root directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    root: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl ArtifactPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a host path beneath the root
    pub fn host(&self, host_path: &str) -> PathBuf {
        self.root.join(host_path.trim_start_matches('/'))
    }

    pub fn cluster_ca(&self) -> PathBuf {
        self.host(CLUSTER_CA_PATH)
    }

    pub fn kubeconfig(&self) -> PathBuf {
        self.host(KUBECONFIG_PATH)
    }

    pub fn credential_providers(&self) -> PathBuf {
        self.host(CREDENTIAL_PROVIDER_CONFIG_PATH)
    }

    pub fn node_labels(&self) -> PathBuf {
        self.host(NODE_LABELS_PATH)
    }

    pub fn crio_config(&self) -> PathBuf {
        self.host(CRIO_CONFIG_PATH)
    }

    pub fn hostname(&self) -> PathBuf {
        self.host(HOSTNAME_FILE_PATH)
    }

    pub fn kubelet_config(&self) -> PathBuf {
        self.host(KUBELET_CONFIG_PATH)
    }

    pub fn credential_plugins(&self) -> PathBuf {
        self.host(CREDENTIAL_PLUGIN_DIR)
    }
}

/// Baseline documents the generated configuration is layered on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Templates {
    pub kubelet: Value,
    pub credential_providers: Value,
}

impl Templates {
    /// Read both templates from a directory
    pub async fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            kubelet: load_template(&dir.join(KUBELET_TEMPLATE)).await?,
            credential_providers: load_template(&dir.join(CREDENTIAL_PROVIDER_TEMPLATE)).await?,
        })
    }
}

async fn load_template(path: &Path) -> Result<Value> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::TemplateParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths_are_rooted() {
        let paths = ArtifactPaths::new("/mnt/host");
        assert_eq!(paths.kubelet_config(), PathBuf::from("/mnt/host/etc/kubernetes/kubelet.yaml"));
        assert_eq!(paths.cluster_ca(), PathBuf::from("/mnt/host/etc/kubernetes/pki/ca.crt"));
        assert_eq!(
            paths.credential_plugins(),
            PathBuf::from("/mnt/host/usr/libexec/kubernetes/kubelet-plugins/credential-provider/exec")
        );
        assert_eq!(ArtifactPaths::default().root(), Path::new("/host"));
    }

    #[test]
    fn test_authenticator_path() {
        assert_eq!(
            authenticator_path(),
            "/usr/libexec/kubernetes/kubelet-plugins/credential-provider/exec/aws-iam-authenticator"
        );
    }

    #[tokio::test]
    async fn test_load_templates() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(KUBELET_TEMPLATE), "kind: KubeletConfiguration\n").unwrap();
        std::fs::write(dir.path().join(CREDENTIAL_PROVIDER_TEMPLATE), "providers: []\n").unwrap();

        let templates = Templates::load(dir.path()).await.unwrap();
        assert_eq!(templates.kubelet["kind"].as_str(), Some("KubeletConfiguration"));
        assert!(templates.credential_providers["providers"].is_sequence());
    }

    #[tokio::test]
    async fn test_missing_template() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Templates::load(dir.path()).await,
            Err(ConfigError::TemplateRead { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_template() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(KUBELET_TEMPLATE), "kind: [oops").unwrap();
        std::fs::write(dir.path().join(CREDENTIAL_PROVIDER_TEMPLATE), "providers: []\n").unwrap();

        assert!(matches!(
            Templates::load(dir.path()).await,
            Err(ConfigError::TemplateParse { .. })
        ));
    }
}
