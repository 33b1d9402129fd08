//! Artifact writer
//!
//! The kubelet configuration is written last. Its presence tells the
//! supervisor that bootstrap finished, so any earlier failure returns
//! before it is written.

use crate::error::{ConfigError, Result};
use crate::labels;
use crate::paths::ArtifactPaths;
use crate::synth::Artifacts;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// What the writer did beyond the mandatory artifacts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// CRI-O settings were written and CRI-O needs a restart to pick them up
    pub container_runtime_written: bool,
}

/// Writes [`Artifacts`] beneath an [`ArtifactPaths`] root
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    paths: ArtifactPaths,
}

impl ArtifactWriter {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Write every artifact, kubelet configuration last
    pub async fn write(&self, artifacts: &Artifacts) -> Result<WriteOutcome> {
        write_file(&self.paths.cluster_ca(), &artifacts.cluster_ca).await?;
        write_file(
            &self.paths.kubeconfig(),
            to_yaml("kubeconfig", &artifacts.kubeconfig)?.as_bytes(),
        )
        .await?;
        write_file(
            &self.paths.credential_providers(),
            to_yaml("credential provider configuration", &artifacts.credential_providers)?.as_bytes(),
        )
        .await?;
        append_file(
            &self.paths.node_labels(),
            labels::render(&artifacts.node_labels).as_bytes(),
        )
        .await?;

        // Always rewritten so settings from an earlier boot do not linger.
        let runtime = artifacts.container_runtime.as_deref().unwrap_or_default();
        write_file(&self.paths.crio_config(), runtime.as_bytes()).await?;

        if let Some(hostname) = &artifacts.hostname {
            write_file(&self.paths.hostname(), format!("{}\n", hostname).as_bytes()).await?;
        }

        write_file(
            &self.paths.kubelet_config(),
            to_yaml("kubelet configuration", &artifacts.kubelet)?.as_bytes(),
        )
        .await?;

        Ok(WriteOutcome {
            container_runtime_written: artifacts.container_runtime.is_some(),
        })
    }
}

fn to_yaml<T: Serialize>(artifact: &'static str, value: &T) -> Result<String> {
    serde_yaml::to_string(value).map_err(|source| ConfigError::Serialize { artifact, source })
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    Ok(())
}

/// Sibling path a file is staged at before being renamed into place
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write through a staging file and rename, so readers never see a
/// partially written file
async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    ensure_parent(path).await?;

    let tmp = staging_path(path);
    let staged = async {
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        fs::rename(&tmp, path).await
    }
    .await;

    if let Err(source) = staged {
        let _ = fs::remove_file(&tmp).await;
        return Err(ConfigError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    info!(path = %path.display(), bytes = contents.len(), "Wrote artifact");
    Ok(())
}

async fn append_file(path: &Path, contents: &[u8]) -> Result<()> {
    let map_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    ensure_parent(path).await?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(map_err)?;
    file.write_all(contents).await.map_err(map_err)?;
    file.flush().await.map_err(map_err)?;
    info!(path = %path.display(), bytes = contents.len(), "Appended artifact");
    Ok(())
}
