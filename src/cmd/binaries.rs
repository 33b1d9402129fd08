use color_eyre::eyre::{eyre, Result, WrapErr};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tokio::fs;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Helper executables kubelet calls for credentials
pub const HELPER_BINARIES: &[&str] = &["aws-iam-authenticator", "ecr-credential-provider"];

/// Copy every binary from `src_dir` into `dst_dir` and make it executable
///
/// Each binary is copied by its own task. Returns once all of them have
/// reported, with the first error encountered.
pub async fn provision(src_dir: &Path, dst_dir: &Path, binaries: &[&str]) -> Result<()> {
    fs::create_dir_all(dst_dir)
        .await
        .wrap_err_with(|| format!("Could not create binary directory {}", dst_dir.display()))?;

    let (tx, mut rx) = mpsc::channel(binaries.len().max(1));
    for name in binaries {
        let tx = tx.clone();
        let src = src_dir.join(name);
        let dst = dst_dir.join(name);
        tokio::spawn(async move {
            let _ = tx.send(copy_executable(&src, &dst).await).await;
        });
    }
    drop(tx);

    let mut first_error = None;
    for _ in 0..binaries.len() {
        match rx.recv().await {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                first_error.get_or_insert(e);
            }
            None => {
                first_error.get_or_insert_with(|| eyre!("A binary copy task exited without reporting"));
                break;
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            info!(count = binaries.len(), dir = %dst_dir.display(), "Provisioned helper binaries");
            Ok(())
        }
    }
}

async fn copy_executable(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)
        .await
        .wrap_err_with(|| format!("Could not copy {} to {}", src.display(), dst.display()))?;
    fs::set_permissions(dst, std::fs::Permissions::from_mode(0o755))
        .await
        .wrap_err_with(|| format!("Could not make {} executable", dst.display()))?;
    debug!(binary = %dst.display(), "Copied binary");
    Ok(())
}
