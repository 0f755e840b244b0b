//! Buzzer - rings an alarm when a chosen sender messages you on Discord.
//!
//! This is the main entry point for buzzer, which watches desktop notifications
//! and plays an alarm sound until the sender asks for it to stop.
//!
//! # Overview
//!
//! Buzzer runs `dbus-monitor` on the `org.freedesktop.Notifications` interface
//! and decodes every `Notify` call sent by Discord. When a notification arrives
//! from one of the target senders, the alarm sound starts playing in a loop. It
//! keeps ringing until a target sender sends a message containing the stop
//! phrase (`stop the alarm` by default, case-insensitive).
//!
//! # Usage
//!
//! ```bash
//! buzzer "Alice" "Bob"
//! buzzer --sound /usr/share/sounds/siren.wav --stop-phrase "i'm up" "Alice"
//! ```
//!
//! Target senders are matched as substrings of the notification sender, so
//! `Alice` also matches `Alice (#general, Server)`.
//!
//! # Architecture
//!
//! - [`alarm`] - Alarm state machine and repeating sound playback
//! - [`config`] - Defaults and `BUZZER_` environment overrides
//! - [`listener`] - Control loop over the monitor process output
//! - [`notification`] - Block reader, parser and notification record
//! - [`utils`] - Path helpers
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)
//! - `BUZZER_*` - Configuration overrides, see [`config`]

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::{
    alarm::{CommandPlayer, TargetSenders},
    config::Config,
    listener::Listener,
};

mod alarm;
mod config;
mod listener;
mod notification;
mod utils;

/// Command-line arguments for buzzer.
///
/// # Examples
///
/// ```bash
/// buzzer "Alice"
/// buzzer -s siren.wav "Alice" "Bob"
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Sender names that ring the alarm, matched as substrings.
    #[arg(required = true, num_args = 1.., value_name = "SENDER")]
    senders: Vec<String>,

    /// Sound file to play, relative to the executable directory unless absolute.
    #[arg(short, long)]
    sound: Option<String>,

    /// Phrase that stops the alarm, case-insensitive.
    #[arg(long)]
    stop_phrase: Option<String>,
}

/// Main entry point for buzzer.
///
/// 1. **Logging Setup**: `info` level by default, overridable with `RUST_LOG`
/// 2. **Argument Parsing**: clap exits with usage and a non-zero status when
///    no sender is given
/// 3. **Configuration Loading**: defaults, then `BUZZER_` variables, then flags
/// 4. **Listening**: runs until `Ctrl+C` or until the monitor exits
///
/// Exits with status 1 if the configuration is invalid or the listener fails.
#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    let args = Args::parse();

    info!("Starting buzzer {}...", env!("CARGO_PKG_VERSION"));

    let mut config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(sound) = args.sound {
        config.sound_file = sound;
    }
    if let Some(stop_phrase) = args.stop_phrase {
        config.stop_phrase = stop_phrase;
    }

    info!("monitoring for senders: {:?}", args.senders);

    let player = CommandPlayer::new(&config.player);
    let listener = Listener::new(&config, TargetSenders::new(args.senders), player);

    if let Err(e) = listener.start().await {
        error!("Listener failed: {:#}", e);
        std::process::exit(1);
    }
}
