//! Repeating, cancellable alarm playback.
//!
//! This module provides the [`Playback`] background activity and the [`Alarm`]
//! executor that carries out the [`AlarmCommand`]s produced by the state machine.
//!
//! # Cancellation
//!
//! Playback runs on a blocking thread and checks its [`CancellationToken`] between
//! repetitions only. A stop request therefore takes effect after the current
//! repetition finishes; an in-progress playback is never interrupted.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, error, info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::alarm::{AlarmCommand, SoundPlayer};

/// A running playback activity.
///
/// Dropping a `Playback` does not stop it; call [`Playback::stop`].
pub struct Playback {
    /// Stop signal observed between repetitions
    token: CancellationToken,
    /// Handle of the activity, only used to observe liveness
    handle: JoinHandle<()>,
}

impl Playback {
    /// Spawns a playback activity repeating `sound` until stopped.
    ///
    /// If `previous` is still finishing its last repetition, the new activity
    /// waits for it to exit before playing, so two repetitions never overlap.
    /// The caller is never blocked.
    ///
    /// # Arguments
    ///
    /// * `player` - Facility used to play each repetition
    /// * `sound` - Sound file to play
    /// * `previous` - Earlier activity, usually already stopped
    pub fn spawn<P: SoundPlayer + 'static>(
        player: Arc<P>,
        sound: PathBuf,
        previous: Option<Playback>,
    ) -> Self {
        let token = CancellationToken::new();
        let loop_token = token.clone();

        let handle = tokio::spawn(async move {
            if let Some(previous) = previous {
                previous.stop();
                let _ = previous.handle.await;
            }

            let result = tokio::task::spawn_blocking(move || {
                play_until_cancelled(&*player, &sound, &loop_token)
            })
            .await;

            if let Err(e) = result {
                error!("alarm playback task failed: {}", e);
            }
        });

        Playback { token, handle }
    }

    /// Signals the activity to stop after the current repetition.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Returns whether the activity is still running.
    pub fn is_alive(&self) -> bool {
        !self.handle.is_finished()
    }
}

/// Plays `sound` repeatedly until `token` is cancelled or playback fails.
///
/// A missing sound file or a player failure ends the loop immediately, with
/// no retry.
fn play_until_cancelled(player: &dyn SoundPlayer, sound: &Path, token: &CancellationToken) {
    info!("alarm playback started");

    if !sound.exists() {
        error!("alarm sound file not found at '{}'", sound.display());
        return;
    }

    let mut repetitions: u64 = 0;
    while !token.is_cancelled() {
        if let Err(e) = player.play(sound) {
            error!("could not play alarm sound: {:#}", e);
            break;
        }
        repetitions += 1;
    }

    debug!("alarm played {} times", repetitions);
    info!("alarm playback stopped");
}

/// Executes playback commands and tracks the single playback activity.
///
/// # Examples
///
/// ```ignore
/// let mut alarm = Alarm::new(Arc::new(CommandPlayer::new("paplay")), sound_path);
/// alarm.apply(AlarmCommand::StartPlayback);
/// // ...
/// alarm.apply(AlarmCommand::StopPlayback);
/// ```
pub struct Alarm<P: SoundPlayer> {
    /// Facility shared with every playback activity
    player: Arc<P>,
    /// Sound file to ring
    sound: PathBuf,
    /// Most recently started activity
    playback: Option<Playback>,
}

impl<P: SoundPlayer + 'static> Alarm<P> {
    /// Creates an alarm with no playback running.
    pub fn new(player: Arc<P>, sound: PathBuf) -> Self {
        Alarm {
            player,
            sound,
            playback: None,
        }
    }

    /// Carries out a playback command.
    ///
    /// [`AlarmCommand::StartPlayback`] launches a fresh activity with a fresh stop
    /// signal; [`AlarmCommand::StopPlayback`] signals the current one.
    pub fn apply(&mut self, command: AlarmCommand) {
        match command {
            AlarmCommand::StartPlayback => {
                let previous = self.playback.take();
                self.playback = Some(Playback::spawn(
                    Arc::clone(&self.player),
                    self.sound.clone(),
                    previous,
                ));
            }
            AlarmCommand::StopPlayback => {
                if let Some(playback) = &self.playback {
                    playback.stop();
                }
            }
        }
    }

    /// Returns whether a playback activity is still running.
    pub fn is_playing(&self) -> bool {
        self.playback.as_ref().is_some_and(Playback::is_alive)
    }

    /// Signals any running activity to stop, without waiting for it.
    pub fn shutdown(&self) {
        if let Some(playback) = &self.playback {
            playback.stop();
        }
    }
}
