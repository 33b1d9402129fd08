use assert_cmd::prelude::*;
use color_eyre::Result;
use std::process::Command;

#[test]
fn test_help_lists_options() -> Result<()> {
    let output = Command::cargo_bin("nodeboot")?.arg("--help").output()?;

    assert!(
        output.status.success(),
        "nodeboot --help failed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout_str = String::from_utf8_lossy(&output.stdout);
    assert!(stdout_str.contains("Usage: nodeboot [OPTIONS]"), "Missing usage text");
    for option in [
        "--root",
        "--template-dir",
        "--binary-dir",
        "--socket",
        "--token-ttl",
        "--resolve-timeout",
        "--skip-binaries",
        "--no-notify",
        "--verbose",
    ] {
        assert!(stdout_str.contains(option), "Missing {} option", option);
    }
    assert!(stdout_str.contains("[env: NODEBOOT_ROOT="), "Missing env fallback");

    Ok(())
}

#[test]
fn test_missing_binaries_fail_the_run() -> Result<()> {
    let root = tempfile::tempdir()?;
    let bin = tempfile::tempdir()?;

    let output = Command::cargo_bin("nodeboot")?
        .env_remove("RUST_LOG")
        .arg("--root")
        .arg(root.path())
        .arg("--binary-dir")
        .arg(bin.path())
        .arg("--no-notify")
        .output()?;

    assert!(!output.status.success(), "nodeboot should fail without helper binaries");
    let stderr_str = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr_str.contains("Failed to provision helper binaries"),
        "Unexpected stderr: {}",
        stderr_str
    );
    assert!(!root.path().join("etc/kubernetes/kubelet.yaml").exists());

    Ok(())
}
