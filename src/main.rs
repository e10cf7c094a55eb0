use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pathserve::{Server, ServerConfig, Signals};

/// Serves a fixed set of registered paths.
#[derive(Debug, Parser)]
#[command(name = "pathserve", version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "SERVER_CONFIG")]
    config: Option<PathBuf>,

    /// Host to bind; also the host part of the expected Host header
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Directory registered files are read from
    #[arg(long, env = "SERVER_ROOT")]
    root: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, env = "SERVER_DEBUG")]
    debug: bool,
}

impl Cli {
    fn load_config(&self) -> Result<ServerConfig, pathserve::error::ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(root) = &self.root {
            config.resource_root = root.clone();
        }
        config.debug |= self.debug;

        Ok(config)
    }
}

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(unix)]
fn watch_termination(signals: Signals) -> std::io::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};

    let mut os_signals = signal_hook::iterator::Signals::new([SIGINT, SIGTERM])?;
    std::thread::spawn(move || {
        if let Some(sig) = os_signals.forever().next() {
            info!(signal = sig, "termination signal received");
            if let Err(err) = signals.request_shutdown() {
                error!(error = %err, "failed to request shutdown");
            }
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn watch_termination(_signals: Signals) -> std::io::Result<()> {
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.debug);

    let registry = match config.registry() {
        Ok(registry) => registry,
        Err(err) => {
            error!(error = %err, "invalid route configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(
        addr = %config.bind_addr(),
        root = %config.resource_root.display(),
        routes = registry.len(),
        "starting server"
    );

    let signals = Signals::new();
    if let Err(err) = watch_termination(signals.clone()) {
        error!(error = %err, "failed to install signal handler");
        return ExitCode::FAILURE;
    }

    let server = Server::new(config, registry, signals);
    match async_std::task::block_on(server.run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "server failed to start");
            ExitCode::FAILURE
        }
    }
}
