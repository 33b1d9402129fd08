//! Kubeconfig for kubelet
//!
//! Kubelet authenticates to the API server with the instance's IAM role
//! through the `aws-iam-authenticator` exec plugin.

use serde::{Deserialize, Serialize};

/// Name used for the single cluster, user and context
pub const DEFAULT_NAME: &str = "default";

/// API version of the exec credential plugin
pub const EXEC_API_VERSION: &str = "client.authentication.k8s.io/v1beta1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KubeConfig {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub clusters: Vec<NamedCluster>,
    pub users: Vec<NamedUser>,
    pub contexts: Vec<NamedContext>,
    pub current_context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: Cluster,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Cluster {
    pub server: String,
    pub certificate_authority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedUser {
    pub name: String,
    pub user: AuthInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthInfo {
    pub exec: ExecConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecConfig {
    pub api_version: String,
    pub command: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: Context,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub cluster: String,
    pub user: String,
}

impl KubeConfig {
    /// Kubeconfig for a cluster authenticated through `aws-iam-authenticator`
    ///
    /// `ca_path` and `authenticator` are paths as the host sees them.
    pub fn for_cluster(
        endpoint: &str,
        cluster_name: &str,
        region: &str,
        ca_path: &str,
        authenticator: &str,
    ) -> Self {
        Self {
            api_version: "v1".to_string(),
            kind: "Config".to_string(),
            clusters: vec![NamedCluster {
                name: DEFAULT_NAME.to_string(),
                cluster: Cluster {
                    server: endpoint.to_string(),
                    certificate_authority: ca_path.to_string(),
                },
            }],
            users: vec![NamedUser {
                name: DEFAULT_NAME.to_string(),
                user: AuthInfo {
                    exec: ExecConfig {
                        api_version: EXEC_API_VERSION.to_string(),
                        command: authenticator.to_string(),
                        args: authenticator_args(cluster_name, region),
                    },
                },
            }],
            contexts: vec![NamedContext {
                name: DEFAULT_NAME.to_string(),
                context: Context {
                    cluster: DEFAULT_NAME.to_string(),
                    user: DEFAULT_NAME.to_string(),
                },
            }],
            current_context: DEFAULT_NAME.to_string(),
        }
    }

    /// API server URL of the only cluster
    pub fn server(&self) -> Option<&str> {
        self.clusters.first().map(|c| c.cluster.server.as_str())
    }

    /// Exec plugin arguments of the only user
    pub fn exec_args(&self) -> Option<&[String]> {
        self.users.first().map(|u| u.user.exec.args.as_slice())
    }
}

/// `token -i <cluster> --region <region>`
pub fn authenticator_args(cluster_name: &str, region: &str) -> Vec<String> {
    vec![
        "token".to_string(),
        "-i".to_string(),
        cluster_name.to_string(),
        "--region".to_string(),
        region.to_string(),
    ]
}
