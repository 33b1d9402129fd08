// Node bootstrap agent: turns instance metadata into kubelet configuration
use clap::Parser;
use color_eyre::eyre::Result;
use std::io::stderr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

mod cmd;

use cmd::run::{run_bootstrap, BootstrapOptions};

#[derive(Parser, Debug)]
#[command(author, version, about = "Bootstraps a kubelet node from EC2 instance metadata", long_about = None)]
struct Cli {
    /// Host filesystem root that artifacts are written under
    #[arg(long, env = "NODEBOOT_ROOT", default_value = nodeboot_config::paths::DEFAULT_ROOT)]
    root: PathBuf,

    /// Directory holding kubelet.yaml and credential-providers.yaml
    #[arg(long, env = "NODEBOOT_TEMPLATE_DIR", default_value = nodeboot_config::paths::DEFAULT_TEMPLATE_DIR)]
    template_dir: PathBuf,

    /// Directory the helper binaries are copied from
    #[arg(long, env = "NODEBOOT_BINARY_DIR", default_value = cmd::run::DEFAULT_BINARY_DIR)]
    binary_dir: PathBuf,

    /// Supervisor control socket
    #[arg(long, env = "NODEBOOT_SOCKET", default_value = nodeboot_socket::SYSTEM_SOCKET_PATH)]
    socket: PathBuf,

    /// Lifetime requested for the metadata token, in seconds
    #[arg(long, default_value_t = nodeboot_imds::resolver::DEFAULT_TOKEN_TTL)]
    token_ttl: u32,

    /// Give up on the metadata service after this many seconds
    #[arg(long, default_value_t = 10)]
    resolve_timeout: u64,

    /// Do not copy the credential helper binaries
    #[arg(long, default_value_t = false)]
    skip_binaries: bool,

    /// Do not ask the supervisor to restart services
    #[arg(long, default_value_t = false)]
    no_notify: bool,

    /// Verbose output - shows more detailed logs
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl From<&Cli> for BootstrapOptions {
    fn from(cli: &Cli) -> Self {
        BootstrapOptions::default()
            .with_root(&cli.root)
            .with_template_dir(&cli.template_dir)
            .with_binary_dir(&cli.binary_dir)
            .with_socket(&cli.socket)
            .with_token_ttl(cli.token_ttl)
            .with_resolve_timeout(Duration::from_secs(cli.resolve_timeout))
            .with_binaries(!cli.skip_binaries)
            .with_notify(!cli.no_notify)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flag
    let level = if cli.verbose { "debug" } else { "info" };
    let default_directives = format!(
        "nodeboot={level},nodeboot_imds={level},nodeboot_config={level},nodeboot_socket={level},hyper=warn,reqwest=warn",
        level = level
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));
    registry().with(filter).with(fmt::layer().with_writer(stderr)).init();

    let options = BootstrapOptions::from(&cli);
    debug!(?options, "Starting bootstrap");

    if let Err(e) = run_bootstrap(options).await {
        error!("Bootstrap failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}
