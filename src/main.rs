//! Eye care monitor: reminds the user to blink and wakes them when their
//! eyes stay closed.

use anyhow::{Context, Result};
use clap::Parser;
use eye_care_monitor::{
    app::EyeCareApp, audio::RodioAlarm, camera::CameraSource, config::Config, dispatcher::ActionDispatcher,
    notification::DesktopNotifier, signals,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use
    #[arg(long, default_value = "0")]
    cam: i32,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Alarm sound file, overrides the configured one
    #[arg(long)]
    alarm: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Eye Care Monitor");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    if let Some(alarm) = args.alarm {
        config.alarm.sound = alarm;
    }
    config.validate().context("Invalid configuration")?;

    let alarm = RodioAlarm::load(&config.alarm.sound).context("Failed to load alarm sound")?;
    let notifier = DesktopNotifier::new(env!("CARGO_PKG_NAME"));
    let dispatcher = ActionDispatcher::new(Arc::new(notifier), Arc::new(alarm), config.dispatcher_settings())?;

    let source = CameraSource::open(args.cam, &config.models, config.display.flip_x)
        .with_context(|| format!("Failed to start camera {}", args.cam))?;

    // Ctrl-C ends the loop cleanly, which is the only way out without a window
    let interrupted = Arc::new(AtomicBool::new(false));
    signals::listen_for_shutdown(Arc::clone(&interrupted)).context("Failed to install signal handlers")?;

    // Create and run application
    let mut app = EyeCareApp::new(&config, source, dispatcher, interrupted)?;
    app.run()?;

    Ok(())
}
