//! Image credential provider configuration
//!
//! Kubelet pulls from ECR with credentials from `ecr-credential-provider`.
//! The entry is fixed and appended to whatever the template declares.

use crate::merge::into_mapping;
use serde::Serialize;
use serde_yaml::Value;

pub const ECR_PROVIDER_NAME: &str = "ecr-credential-provider";

pub const ECR_PROVIDER_API_VERSION: &str = "credentialprovider.kubelet.k8s.io/v1alpha1";

/// Registries served by ECR across partitions
pub const ECR_MATCH_IMAGES: &[&str] = &[
    "*.dkr.ecr.*.amazonaws.com",
    "*.dkr.ecr.*.amazonaws.cn",
    "*.dkr.ecr-fips.*.amazonaws.com",
    "*.dkr.ecr.us-iso-east-1.c2s.ic.gov",
    "*.dkr.ecr.us-isob-east-1.sc2s.sgov.gov",
];

/// Twelve hours, written the way kubelet prints durations
pub const ECR_CACHE_DURATION: &str = "12h0m0s";

/// One `providers` entry of a `CredentialProviderConfig`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProvider {
    pub name: String,
    pub match_images: Vec<String>,
    pub default_cache_duration: String,
    pub api_version: String,
    pub args: Vec<String>,
}

impl CredentialProvider {
    pub fn ecr() -> Self {
        Self {
            name: ECR_PROVIDER_NAME.to_string(),
            match_images: ECR_MATCH_IMAGES.iter().map(|s| s.to_string()).collect(),
            default_cache_duration: ECR_CACHE_DURATION.to_string(),
            api_version: ECR_PROVIDER_API_VERSION.to_string(),
            args: vec!["get-credentials".to_string()],
        }
    }
}

/// Template plus the ECR provider
pub fn build(template: &Value) -> Result<Value, serde_yaml::Error> {
    let ecr = serde_yaml::to_value(CredentialProvider::ecr())?;

    let mut config = into_mapping(template.clone());
    let providers = config
        .entry("providers".into())
        .or_insert_with(|| Value::Sequence(Vec::new()));
    if !providers.is_sequence() {
        *providers = Value::Sequence(Vec::new());
    }
    if let Value::Sequence(list) = providers {
        list.push(ecr);
    }

    Ok(Value::Mapping(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecr_appended_to_template() {
        let template: Value = serde_yaml::from_str(
            r#"
apiVersion: kubelet.config.k8s.io/v1alpha1
kind: CredentialProviderConfig
providers:
  - name: custom
    matchImages: ["registry.example.com"]
    defaultCacheDuration: 1h0m0s
    apiVersion: credentialprovider.kubelet.k8s.io/v1alpha1
"#,
        )
        .unwrap();

        let config = build(&template).unwrap();
        let providers = config["providers"].as_sequence().unwrap();
        assert_eq!(providers.len(), 2);
        assert_eq!(providers[0]["name"].as_str(), Some("custom"));

        let ecr = &providers[1];
        assert_eq!(ecr["name"].as_str(), Some(ECR_PROVIDER_NAME));
        assert_eq!(ecr["matchImages"].as_sequence().map(Vec::len), Some(5));
        assert_eq!(ecr["defaultCacheDuration"].as_str(), Some("12h0m0s"));
        assert_eq!(ecr["args"][0].as_str(), Some("get-credentials"));
        assert_eq!(config["kind"].as_str(), Some("CredentialProviderConfig"));
    }

    #[test]
    fn test_shipped_template_matches_provider_version() {
        let template: Value = serde_yaml::from_str(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../templates/credential-providers.yaml"
        )))
        .unwrap();

        let config = build(&template).unwrap();
        let config_version = config["apiVersion"].as_str().unwrap().rsplit('/').next();
        let provider_version = ECR_PROVIDER_API_VERSION.rsplit('/').next();
        assert_eq!(config_version, provider_version);
        assert_eq!(config["providers"].as_sequence().map(Vec::len), Some(1));
    }

    #[test]
    fn test_template_without_providers() {
        let config = build(&Value::Null).unwrap();
        assert_eq!(config["providers"].as_sequence().map(Vec::len), Some(1));
    }
}
