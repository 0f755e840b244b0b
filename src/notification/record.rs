//! Parsed notification value.
//!
//! This module provides the [`NotificationRecord`] struct, the immutable result of
//! decoding one notification block from the bus monitor output.

use std::fmt;

use chrono::{DateTime, Local};

/// Width of the value column in the console card.
const CARD_VALUE_WIDTH: usize = 46;

/// A chat notification extracted from one bus method call.
///
/// Records are built once per successfully parsed block and never mutated.
/// The timestamp is the moment the block was parsed, not a time reported by
/// the bus.
///
/// # Examples
///
/// ```ignore
/// let record = NotificationRecord::new("Alice", "urgent ping");
/// println!("{record}");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationRecord {
    /// Sender shown in the notification summary.
    pub sender: String,
    /// Message text. May be empty.
    pub body: String,
    /// Local wall-clock time at which the record was captured.
    pub timestamp: DateTime<Local>,
}

impl NotificationRecord {
    /// Creates a record stamped with the current local time.
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        NotificationRecord {
            sender: sender.into(),
            body: body.into(),
            timestamp: Local::now(),
        }
    }
}

/// Renders the record as a fixed-width card for the console.
///
/// Values longer than the column are printed in full and push the right
/// border out.
impl fmt::Display for NotificationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        let w = CARD_VALUE_WIDTH;

        writeln!(f, "┌─────────────────────────────────────────────────────────┐")?;
        writeln!(f, "│  New Discord Notification                               │")?;
        writeln!(f, "├─────────────────────────────────────────────────────────┤")?;
        writeln!(f, "│ Time:    {:<w$} │", time)?;
        writeln!(f, "│ From:    {:<w$} │", self.sender)?;
        writeln!(f, "│ Message: {:<w$} │", self.body)?;
        write!(f, "└─────────────────────────────────────────────────────────┘")
    }
}
