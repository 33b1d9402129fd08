use crate::cmd::binaries::{self, HELPER_BINARIES};
use color_eyre::eyre::{Result, WrapErr};
use nodeboot_config::paths::{DEFAULT_ROOT, DEFAULT_TEMPLATE_DIR};
use nodeboot_config::{ArtifactPaths, ArtifactWriter, Synthesizer, Templates, WriteOutcome};
use nodeboot_imds::resolver::{DEFAULT_DEADLINE, DEFAULT_TOKEN_TTL};
use nodeboot_imds::{EndpointResolver, MetadataSource};
use nodeboot_socket::{Command, SystemSocket, SYSTEM_SOCKET_PATH};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where the helper binaries ship in the image
pub const DEFAULT_BINARY_DIR: &str = "/bin";

/// Everything one bootstrap pass needs to know
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub root: PathBuf,
    pub template_dir: PathBuf,
    pub binary_dir: PathBuf,
    pub socket: PathBuf,
    pub token_ttl: u32,
    pub resolve_timeout: Duration,
    pub provision_binaries: bool,
    pub notify: bool,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
            binary_dir: PathBuf::from(DEFAULT_BINARY_DIR),
            socket: PathBuf::from(SYSTEM_SOCKET_PATH),
            token_ttl: DEFAULT_TOKEN_TTL,
            resolve_timeout: DEFAULT_DEADLINE,
            provision_binaries: true,
            notify: true,
        }
    }
}

impl BootstrapOptions {
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = dir.into();
        self
    }

    pub fn with_binary_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.binary_dir = dir.into();
        self
    }

    pub fn with_socket(mut self, socket: impl Into<PathBuf>) -> Self {
        self.socket = socket.into();
        self
    }

    pub fn with_token_ttl(mut self, ttl_secs: u32) -> Self {
        self.token_ttl = ttl_secs;
        self
    }

    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    pub fn with_binaries(mut self, enabled: bool) -> Self {
        self.provision_binaries = enabled;
        self
    }

    pub fn with_notify(mut self, enabled: bool) -> Self {
        self.notify = enabled;
        self
    }
}

/// Run one bootstrap pass against the live metadata service
pub async fn run_bootstrap(options: BootstrapOptions) -> Result<()> {
    let paths = ArtifactPaths::new(&options.root);

    if options.provision_binaries {
        binaries::provision(&options.binary_dir, &paths.credential_plugins(), HELPER_BINARIES)
            .await
            .wrap_err("Failed to provision helper binaries")?;
    } else {
        debug!("Skipping helper binary provisioning");
    }

    let session = EndpointResolver::default()
        .with_token_ttl(options.token_ttl)
        .with_deadline(options.resolve_timeout)
        .resolve()
        .await
        .wrap_err("Failed to create a metadata session")?;
    info!(base_url = %session.base_url(), "Metadata session established");

    let outcome = configure(&session, &options.template_dir, paths).await?;

    if options.notify {
        notify(&options.socket, outcome).await;
    } else {
        debug!("Skipping control socket notification");
    }

    info!("Bootstrap complete");
    Ok(())
}

/// Fetch the override document, synthesize every artifact and write it
pub async fn configure(
    source: &dyn MetadataSource,
    template_dir: &Path,
    paths: ArtifactPaths,
) -> Result<WriteOutcome> {
    let document = source
        .fetch_document()
        .await
        .wrap_err("Failed to fetch user data")?;

    let templates = Templates::load(template_dir)
        .await
        .wrap_err_with(|| format!("Failed to load templates from {}", template_dir.display()))?;

    let artifacts = Synthesizer::new(source, &document, templates)
        .synthesize()
        .await
        .wrap_err("Failed to build node configuration")?;

    ArtifactWriter::new(paths)
        .write(&artifacts)
        .await
        .wrap_err("Failed to write node configuration")
}

/// Ask the supervisor to pick up the new configuration
///
/// Artifacts are already on disk at this point, so failures are logged
/// rather than returned.
async fn notify(socket_path: &Path, outcome: WriteOutcome) {
    let mut commands = Vec::with_capacity(2);
    if outcome.container_runtime_written {
        commands.push(Command::RestartCrio);
    }
    commands.push(Command::RestartKubelet);

    let mut socket = match SystemSocket::connect_to(socket_path).await {
        Ok(socket) => socket,
        Err(e) => {
            warn!(error = %e, "Could not reach the supervisor, services were not restarted");
            return;
        }
    };

    for command in commands {
        if let Err(e) = socket.send(command).await {
            warn!(command = ?command, error = %e, "Failed to send control command");
            return;
        }
        info!(command = ?command, "Requested service restart");
    }
}
