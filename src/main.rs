//! slirc-exthost - run native extensions over a stream of IRC lines.
//!
//! Reads protocol lines from stdin, hands each one to every active
//! extension, and writes whatever the extensions send back to stdout.
//! Lines of the form `/extension <text>` are user commands for extensions.

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use slirc_ext::config::{self, Config};
use slirc_ext::error::HostError;
use slirc_ext::extension::{ExtensionHost, ExtensionManager};
use slirc_ext::input::{Input, InputCodec};
use slirc_ext::telemetry::spans;
use slirc_wire::{IrcCodec, RawIrcMsg};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable naming the config file when no argument is given.
const CONFIG_ENV: &str = "SLIRC_EXT_CONFIG";

/// Outbound messages one dispatch may queue.
const MAX_OUTBOUND: usize = 256;

/// Host state lent to extensions for one dispatch.
struct StdoutHost {
    network: String,
    outbound: Vec<RawIrcMsg>,
}

impl ExtensionHost for StdoutHost {
    fn send_message(&mut self, network: &str, msg: RawIrcMsg) -> Result<(), HostError> {
        if network != self.network {
            return Err(HostError::UnknownNetwork(network.to_owned()));
        }
        if msg.command.is_empty() {
            return Err(HostError::EmptyCommand);
        }
        if self.outbound.len() >= MAX_OUTBOUND {
            return Err(HostError::QueueFull);
        }
        self.outbound.push(msg);
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stdout carries protocol lines)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .unwrap_or_else(|| "slirc-ext.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for err in &errors {
            error!(error = %err, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {config_path}", errors.len());
    }

    info!(
        network = %config.host.network,
        max_line_len = config.host.max_line_len,
        "Starting slirc-exthost"
    );

    let mut manager = ExtensionManager::native();
    let paths = config
        .extension_paths()
        .with_context(|| format!("scanning extensions for {config_path}"))?;
    for path in &paths {
        let _span = spans::extension(path).entered();
        // Failures are logged by the manager; the rest still load.
        let _ = manager.activate(path);
    }
    info!(active = manager.len(), configured = paths.len(), "Extensions ready");

    let mut lines = FramedRead::new(
        tokio::io::stdin(),
        InputCodec::with_max_len(config.host.max_line_len),
    );
    let mut sink = FramedWrite::new(tokio::io::stdout(), IrcCodec::new());

    let mut host = StdoutHost {
        network: config.host.network.clone(),
        outbound: Vec::new(),
    };

    while let Some(next) = lines.next().await {
        let input = match next {
            Ok(input) => input,
            Err(e) => {
                error!(error = %e, "Input stream failed");
                break;
            }
        };

        match input {
            Input::Command(text) => {
                let _span = spans::command(&text).entered();
                manager.notify_command(&mut host, &text);
            }
            Input::Message(msg) => {
                let network = host.network.clone();
                let _span = spans::dispatch(&network, &msg).entered();
                manager.notify(&network, &mut host, &msg);
            }
        }

        for out in host.outbound.drain(..) {
            if let Err(e) = sink.send(out).await {
                warn!(error = %e, "Dropping outbound message");
            }
        }
    }

    manager.deactivate_all();
    info!("Input closed, shutting down");
    Ok(())
}
