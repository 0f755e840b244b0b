//! Block parser for `dbus-monitor` notification calls.
//!
//! This module provides the [`NotificationParser`] which turns one block of monitor
//! output into an optional [`NotificationRecord`].
//!
//! # Decoding
//!
//! The decoder is positional and deliberately minimal. A `Notify` call prints its
//! arguments one per line, and the string arguments look like:
//!
//! ```text
//!    string "discord"
//!    string ""
//!    string "Alice"
//!    string "urgent ping"
//! ```
//!
//! The third and fourth `string` lines are taken as sender and body. Differently
//! shaped notifications from the same application will produce a meaningless
//! record; no further validation is done.

use log::debug;

use crate::notification::NotificationRecord;

/// Marker identifying a `Notify` method invocation.
const NOTIFY_MARKER: &str = "member=Notify";

/// Prefix of a string argument line, after trimming.
const STRING_FIELD_PREFIX: &str = "string";

/// Number of characters in `string "` stripped from the start of a field.
const QUOTED_PREFIX_LEN: usize = 8;

/// Minimum number of string fields a notification block must carry.
const MIN_STRING_FIELDS: usize = 4;

/// Index of the sender among the string fields.
const SENDER_FIELD: usize = 2;

/// Index of the body among the string fields.
const BODY_FIELD: usize = 3;

/// Parses notification blocks for a single chat application.
///
/// # Examples
///
/// ```ignore
/// let parser = NotificationParser::new("discord");
/// let record = parser.parse(&block);
/// ```
#[derive(Clone, Debug)]
pub struct NotificationParser {
    /// Literal `string "<app>"` that must appear in the block.
    app_marker: String,
}

impl NotificationParser {
    /// Creates a parser accepting notifications whose application name is
    /// exactly `app_name`.
    pub fn new(app_name: &str) -> Self {
        NotificationParser {
            app_marker: format!("{STRING_FIELD_PREFIX} \"{app_name}\""),
        }
    }

    /// Parses one block of monitor lines.
    ///
    /// # Returns
    ///
    /// * `Some(NotificationRecord)` - The block is a `Notify` call from the
    ///   configured application with at least four string fields
    /// * `None` - Any marker is missing or there are too few string fields
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Option<NotificationRecord> {
        let block_text = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join("\n");

        if !block_text.contains(NOTIFY_MARKER) || !block_text.contains(&self.app_marker) {
            return None;
        }

        let fields: Vec<&str> = lines
            .iter()
            .map(|line| line.as_ref().trim())
            .filter(|line| line.starts_with(STRING_FIELD_PREFIX))
            .collect();

        if fields.len() < MIN_STRING_FIELDS {
            debug!("ignoring notify block with {} string fields", fields.len());
            return None;
        }

        Some(NotificationRecord::new(
            unquote(fields[SENDER_FIELD]),
            unquote(fields[BODY_FIELD]),
        ))
    }
}

/// Strips the `string "` prefix and the closing character from a field line.
///
/// Lines too short to hold both yield an empty string.
fn unquote(field: &str) -> String {
    let chars: Vec<char> = field.chars().collect();
    if chars.len() <= QUOTED_PREFIX_LEN + 1 {
        return String::new();
    }
    chars[QUOTED_PREFIX_LEN..chars.len() - 1].iter().collect()
}
