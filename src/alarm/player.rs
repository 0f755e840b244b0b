//! Sound playback through an external program.
//!
//! This module provides the [`SoundPlayer`] trait and [`CommandPlayer`], its
//! implementation that shells out to a command-line player such as `paplay`.

use std::{
    path::Path,
    process::{Command, Stdio},
};

use anyhow::{Context, bail};
use log::debug;
use mockall::automock;

/// Plays a sound file once, blocking until playback finishes.
///
/// This trait abstracts the playback facility for easier testing with mocks.
#[automock]
pub trait SoundPlayer: Send + Sync {
    /// Plays `sound` to completion.
    fn play(&self, sound: &Path) -> anyhow::Result<()>;
}

/// Plays sounds by running `<program> <sound>`.
///
/// The program's output is discarded. A non-zero exit status is a failure.
///
/// # Examples
///
/// ```ignore
/// let player = CommandPlayer::new("paplay");
/// player.play(Path::new("alarm.wav"))?;
/// ```
#[derive(Clone, Debug)]
pub struct CommandPlayer {
    /// Playback program, looked up in `PATH`
    program: String,
}

impl CommandPlayer {
    /// Creates a player running `program`.
    pub fn new(program: &str) -> Self {
        CommandPlayer {
            program: program.to_string(),
        }
    }
}

impl SoundPlayer for CommandPlayer {
    fn play(&self, sound: &Path) -> anyhow::Result<()> {
        debug!("running {} {}", self.program, sound.display());

        let status = Command::new(&self.program)
            .arg(sound)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("could not run '{}', is it installed?", self.program))?;

        if !status.success() {
            bail!("'{}' exited with {}", self.program, status);
        }

        Ok(())
    }
}
