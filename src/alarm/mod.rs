//! Alarm lifecycle for messages from designated senders.
//!
//! This module decides when the alarm rings and runs the ringing itself. It
//! consists of four components:
//!
//! - [`AlarmState`] / [`AlarmCommand`]: The two alarm states and the playback
//!   side effects a transition can request
//! - [`AlarmController`]: The state machine evaluating each notification
//!   against the [`TargetSenders`] and the stop phrase
//! - [`SoundPlayer`]: The playback facility, implemented by [`CommandPlayer`]
//! - [`Alarm`]: Executes commands by starting and stopping the playback activity
//!
//! # Example Usage
//!
//! ```ignore
//! let mut controller = AlarmController::new(targets, "stop the alarm");
//! let mut alarm = Alarm::new(Arc::new(CommandPlayer::new("paplay")), sound);
//!
//! let (_, command) = controller.handle(&record);
//! if let Some(command) = command {
//!     alarm.apply(command);
//! }
//! ```

mod controller;
mod playback;
mod player;
mod state;

pub use crate::alarm::{
    controller::{AlarmController, TargetSenders},
    playback::Alarm,
    player::{CommandPlayer, SoundPlayer},
    state::{AlarmCommand, AlarmState},
};

#[cfg(test)]
pub use crate::alarm::player::MockSoundPlayer;
