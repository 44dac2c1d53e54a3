//! padlink - relay a wired Xbox controller to a local key-injection socket
//!
//! Finds the single supported controller on the USB bus, brings it up
//! (LED spin on Xbox 360 pads, start handshake on Xbox One pads), then
//! decodes input reports and sends mapped button edges as two-byte
//! `d<key>` / `u<key>` datagrams.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod config;
mod error;
mod led;
mod session;
mod sink;
mod usb;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use padlink_hid_xbox_protocol::product_name;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::session::{Session, SessionSettings};
use crate::sink::DatagramSink;

#[derive(Parser, Debug)]
#[command(name = "padlink")]
#[command(about = "Relay Xbox controller input to a local key-injection socket")]
#[command(version)]
struct Cli {
    /// Only dump raw reads; no LED, handshake, decoding or sink
    #[arg(long)]
    readonly: bool,

    /// USB backend log level (0 = warnings only)
    #[arg(long, default_value_t = 0)]
    debug: u8,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// YAML configuration file
    #[arg(long, env = "PADLINK_CONFIG")]
    config: Option<PathBuf>,

    /// Key server socket (overrides the config file)
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Player slot shown on the Xbox 360 LED ring (overrides the config file)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    player: Option<u8>,
}

impl Cli {
    fn load_config(&self) -> Result<BridgeConfig, BridgeError> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::load(path)?,
            None => BridgeConfig::default(),
        };
        if let Some(socket) = &self.socket {
            config.socket_path = socket.clone();
        }
        if let Some(player) = self.player {
            config.player = player;
        }
        config.validate()?;
        Ok(config)
    }
}

fn level(n: u8) -> &'static str {
    match n {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Default filter when `RUST_LOG` is unset.
fn log_filter(verbose: u8, usb_debug: u8) -> String {
    let usb = match usb_debug {
        0 => "warn",
        n => level(n.saturating_sub(1)),
    };
    format!("padlink={},nusb={}", level(verbose), usb)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter(cli.verbose, cli.debug).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(&cli).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            let exit_code = e
                .downcast_ref::<BridgeError>()
                .map_or(1, BridgeError::exit_code);
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;

    let devices = usb::enumerate()?;
    let (device, model) = usb::select(&devices)?;
    info!(
        device = %device.path(),
        name = %device.display_name(),
        model = product_name(device.vendor_id, device.product_id).unwrap_or("unknown"),
        family = %model.family,
        "found controller"
    );

    let mut controller = usb::open(device, model).await?;

    if cli.readonly {
        let reports = session::run_readonly(&mut controller.input, config.read_timeout()).await;
        info!(reports, device = %controller.info.path(), "readonly dump finished");
        return Ok(());
    }

    let sink = DatagramSink::connect(&config.socket_path).map_err(|source| {
        BridgeError::SinkUnavailable {
            path: config.socket_path.clone(),
            source,
        }
    })?;
    info!(socket = %sink.peer().display(), "connected to key server");

    let settings = SessionSettings {
        read_timeout: config.read_timeout(),
        drain_timeout: config.drain_timeout(),
        player: config.player_slot()?,
    };
    let session = Session::new(
        controller.model,
        controller.input,
        controller.output,
        sink,
        config.keymap()?,
        settings,
    );
    let stats = session.run().await?;
    info!(?stats, "session finished");
    Ok(())
}
