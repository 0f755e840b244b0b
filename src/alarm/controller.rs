//! Alarm state machine.
//!
//! This module provides the [`AlarmController`] which decides, for each parsed
//! notification, whether the alarm should start ringing, stop, or stay as it is,
//! and the [`TargetSenders`] set it matches senders against.
//!
//! # Transitions
//!
//! ```text
//!           target message              target message with stop phrase
//!   Idle ──────────────────▶ Ringing ──────────────────────────────────▶ Idle
//! ```
//!
//! Every other combination leaves the state unchanged and produces no command.

use log::{debug, info, warn};

use crate::{
    alarm::{AlarmCommand, AlarmState},
    notification::NotificationRecord,
};

/// Sender names the alarm reacts to.
///
/// Matching is substring containment: a sender matches if any target is
/// contained in it. Matching is case-sensitive.
///
/// # Examples
///
/// ```ignore
/// let targets = TargetSenders::new(vec!["Alice".to_string()]);
/// assert!(targets.matches("Alice (#general)"));
/// assert!(!targets.matches("alice"));
/// ```
#[derive(Clone, Debug)]
pub struct TargetSenders {
    senders: Vec<String>,
}

impl TargetSenders {
    /// Creates a target set from the given sender substrings.
    pub fn new(senders: Vec<String>) -> Self {
        TargetSenders { senders }
    }

    /// Returns whether `sender` contains any of the targets.
    pub fn matches(&self, sender: &str) -> bool {
        self.senders.iter().any(|target| sender.contains(target.as_str()))
    }
}

/// Owns the alarm state and evaluates notifications against it.
///
/// The controller is pure bookkeeping: it never touches playback itself and
/// only returns the [`AlarmCommand`] the caller must carry out.
///
/// # Examples
///
/// ```ignore
/// let mut controller = AlarmController::new(targets, "stop the alarm");
/// let (state, command) = controller.handle(&record);
/// if let Some(command) = command {
///     alarm.apply(command);
/// }
/// ```
#[derive(Debug)]
pub struct AlarmController {
    /// Current alarm state
    state: AlarmState,
    /// Senders that can start and stop the alarm
    targets: TargetSenders,
    /// Lowercased phrase that silences the alarm
    stop_phrase: String,
}

impl AlarmController {
    /// Creates a controller in the [`AlarmState::Idle`] state.
    ///
    /// # Arguments
    ///
    /// * `targets` - Senders the alarm reacts to
    /// * `stop_phrase` - Phrase that stops the alarm, matched case-insensitively
    pub fn new(targets: TargetSenders, stop_phrase: &str) -> Self {
        AlarmController {
            state: AlarmState::Idle,
            targets,
            stop_phrase: stop_phrase.to_lowercase(),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Evaluates one notification.
    ///
    /// # Returns
    ///
    /// The state after the notification and the playback command to run, if any:
    ///
    /// - non-target sender: unchanged, no command
    /// - target with stop phrase while ringing: `Idle`, [`AlarmCommand::StopPlayback`]
    /// - target with stop phrase while idle: unchanged, no command
    /// - target without stop phrase while idle: `Ringing`, [`AlarmCommand::StartPlayback`]
    /// - target without stop phrase while ringing: unchanged, no command
    pub fn handle(&mut self, record: &NotificationRecord) -> (AlarmState, Option<AlarmCommand>) {
        if !self.targets.matches(&record.sender) {
            return (self.state, None);
        }

        let is_stop = record.body.to_lowercase().contains(&self.stop_phrase);

        let command = match (self.state, is_stop) {
            (AlarmState::Ringing, true) => {
                info!("stop phrase received from {}, stopping alarm", record.sender);
                self.state = AlarmState::Idle;
                Some(AlarmCommand::StopPlayback)
            }
            (AlarmState::Idle, false) => {
                info!("message from {}, starting alarm", record.sender);
                self.state = AlarmState::Ringing;
                Some(AlarmCommand::StartPlayback)
            }
            (state, _) => {
                debug!("message from {} ignored while {}", record.sender, state);
                None
            }
        };

        (self.state, command)
    }

    /// Reconciles the state with a playback activity that ended by itself.
    ///
    /// When the state is [`AlarmState::Ringing`] but playback is no longer
    /// alive (missing sound, player failure), the controller falls back to
    /// [`AlarmState::Idle`] so the next target message can ring again.
    ///
    /// # Returns
    ///
    /// `true` if the state was reset.
    pub fn playback_ended(&mut self) -> bool {
        if self.state != AlarmState::Ringing {
            return false;
        }

        warn!("alarm playback ended on its own, returning to idle");
        self.state = AlarmState::Idle;
        true
    }
}
