//! Alarm lifecycle states and the commands that drive playback.

use std::fmt;

/// Current state of the alarm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlarmState {
    /// No alarm is sounding
    #[default]
    Idle,
    /// The alarm has been triggered and playback is running
    Ringing,
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlarmState::Idle => write!(f, "idle"),
            AlarmState::Ringing => write!(f, "ringing"),
        }
    }
}

/// Side effect requested by a state transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlarmCommand {
    /// Launch a new playback activity
    StartPlayback,
    /// Signal the running playback activity to stop
    StopPlayback,
}
