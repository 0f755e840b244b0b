//! Runtime configuration for buzzer.
//!
//! There is no configuration file. Settings are layered with `figment`:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. Environment variables prefixed with `BUZZER_`, nested keys split on `__`
//! 3. Command-line overrides applied by `main`
//!
//! # Environment Variables
//!
//! ```bash
//! export BUZZER_APP_NAME="discord"
//! export BUZZER_STOP_PHRASE="stop the alarm"
//! export BUZZER_SOUND_FILE="/usr/share/sounds/alarm.wav"
//! export BUZZER_PLAYER="paplay"
//! export BUZZER_MONITOR__PROGRAM="dbus-monitor"
//! export BUZZER_MONITOR__ARGS="[\"--session\", \"interface='org.freedesktop.Notifications'\"]"
//! ```

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

/// Prefix of the environment variables read by [`Config::load`].
const ENV_PREFIX: &str = "BUZZER_";

/// Root configuration.
///
/// # Examples
///
/// ```ignore
/// let config = Config::load()?;
/// println!("ringing with {}", config.sound_file);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Application name a notification must carry, matched exactly.
    pub app_name: String,

    /// Phrase that silences the alarm, matched case-insensitively.
    pub stop_phrase: String,

    /// Sound file played by the alarm.
    ///
    /// Relative paths are resolved against the directory of the executable.
    pub sound_file: String,

    /// Program used to play the sound file, invoked as `<player> <file>`.
    pub player: String,

    /// Notification bus monitor process.
    pub monitor: Monitor,
}

/// External process whose output is watched.
///
/// # Examples
///
/// - `dbus-monitor interface='org.freedesktop.Notifications'`
/// - `dbus-monitor --session interface='org.freedesktop.Notifications'`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    /// Program to run, looked up in `PATH`.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app_name: "discord".to_string(),
            stop_phrase: "stop the alarm".to_string(),
            sound_file: "alarm.wav".to_string(),
            player: "paplay".to_string(),
            monitor: Monitor::default(),
        }
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Monitor {
            program: "dbus-monitor".to_string(),
            args: vec!["interface='org.freedesktop.Notifications'".to_string()],
        }
    }
}

impl Config {
    /// Loads the configuration from defaults and `BUZZER_` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable cannot be converted to the
    /// type of its key.
    pub fn load() -> Result<Config, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
