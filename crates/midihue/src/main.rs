//! MIDIHue - stream MIDI-controlled colors to a Philips Hue entertainment group
//!
//! Loads the configuration, opens the MIDI input, enables streaming on the
//! bridge and runs the tick loop until Ctrl-C.

mod config;
mod logging_setup;

use anyhow::{Context, Result};
use clap::Parser;
use midihue_control::effect::EffectEngine;
use midihue_control::hue::api::{
    GroupStreamControl, HueGroupStreamControl, NoopGroupStreamControl,
};
use midihue_control::hue::stream::{DryRunChannel, SecureDatagramChannel, StreamingSession};
use midihue_control::hue::{EntertainmentEngine, HueConfig};
use midihue_control::midi::MidiInputSource;
use midihue_control::{EventSource, LightSet};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "midihue")]
#[command(about = "Drive Philips Hue entertainment lights from MIDI")]
#[command(version)]
struct Cli {
    /// Config file path (defaults to <config dir>/midihue/config.toml)
    #[arg(short, long, env = "MIDIHUE_CONFIG")]
    config: Option<PathBuf>,

    /// Entertainment group to stream to
    #[arg(short, long)]
    group_id: Option<u32>,

    /// MIDI input port name (substring match)
    #[arg(short, long)]
    input_name: Option<String>,

    /// Bridge IP address
    #[arg(short, long, env = "MIDIHUE_BRIDGE_IP")]
    bridge_ip: Option<String>,

    /// Log frames instead of talking to a bridge
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

impl Cli {
    /// Flags win over file values
    fn apply(&self, config: &mut AppConfig) {
        if let Some(group_id) = self.group_id {
            config.hue.group_id = group_id;
        }
        if let Some(name) = &self.input_name {
            config.midi.input_name = Some(name.clone());
        }
        if let Some(ip) = &self.bridge_ip {
            config.hue.bridge_ip = ip.clone();
        }
        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    let _log_guard = logging_setup::init(&config.log)?;
    info!("Starting MIDIHue v{}", env!("CARGO_PKG_VERSION"));
    info!("Bridge: {:?}", config.hue);

    let (light_configs, binding_configs) = config.mapping();
    let lights = LightSet::from_specs(
        light_configs.iter().map(|l| (l.id, l.color_space)),
        config.stream.bits_per_channel,
    )
    .context("Invalid light configuration")?;
    let effects =
        EffectEngine::from_config(&binding_configs, &lights).context("Invalid bindings")?;
    info!(
        "{} lights, {} bindings",
        lights.len(),
        effects.bindings().len()
    );

    let source = MidiInputSource::open(config.midi.input_name.as_deref())
        .context("Failed to open MIDI input")?;

    let interval = config.stream.tick_interval();
    let settings = config.stream.session_settings();
    let group_id = config.hue.group_id;

    if cli.dry_run {
        info!("Dry run: no bridge traffic");
        let session = StreamingSession::new(
            group_id,
            Box::new(dry_run_directory(&config.hue)),
            Box::new(NoopGroupStreamControl),
            DryRunChannel::new(),
            settings,
        );
        run(EntertainmentEngine::new(source, effects, lights, session), interval).await
    } else {
        let control: Box<dyn GroupStreamControl> = Box::new(
            HueGroupStreamControl::new(&config.hue).context("Failed to create bridge client")?,
        );
        let session = StreamingSession::new(
            group_id,
            Box::new(config.hue.clone()),
            control,
            stream_channel(),
            settings,
        );
        run(EntertainmentEngine::new(source, effects, lights, session), interval).await
    }
}

#[cfg(feature = "dtls")]
fn stream_channel() -> midihue_control::hue::stream::DtlsChannel {
    midihue_control::hue::stream::DtlsChannel::new()
}

#[cfg(not(feature = "dtls"))]
fn stream_channel() -> midihue_control::hue::stream::UnavailableChannel {
    warn!("Built without the `dtls` feature; the stream cannot connect");
    midihue_control::hue::stream::UnavailableChannel
}

/// Fill in placeholder credentials so a dry run works without a bridge
fn dry_run_directory(hue: &HueConfig) -> HueConfig {
    let mut hue = hue.clone();
    if hue.bridge_ip.is_empty() {
        hue.bridge_ip = "127.0.0.1".to_string();
    }
    if hue.username.is_empty() {
        hue.username = "dry-run".to_string();
    }
    if hue.client_key.is_empty() {
        hue.client_key = "00".to_string();
    }
    hue
}

async fn run<S, C>(mut engine: EntertainmentEngine<S, C>, interval: Duration) -> Result<()>
where
    S: EventSource,
    C: SecureDatagramChannel,
{
    if let Err(e) = engine.session_mut().start().await {
        // Stream mode may already be enabled on the bridge
        if let Err(stop_err) = engine.session_mut().stop().await {
            warn!("Failed to disable stream mode: {}", stop_err);
        }
        return Err(e).context("Failed to start entertainment stream");
    }

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received"),
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    };
    let result = engine.run(interval, shutdown).await;

    info!("Shutting down...");
    if let Err(e) = engine.session_mut().stop().await {
        warn!("Failed to disable stream mode: {}", e);
    }
    result.context("Tick loop failed")
}
