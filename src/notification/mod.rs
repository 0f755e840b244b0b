//! Notification intake from the desktop notification bus.
//!
//! This module turns the raw text output of `dbus-monitor` into structured
//! notifications. It consists of three components:
//!
//! - [`BlockReader`]: Groups monitor lines into one block per bus method call
//! - [`NotificationParser`]: Decodes a block into an optional record
//! - [`NotificationRecord`]: The immutable sender/body/timestamp value
//!
//! # Flow
//!
//! ```text
//! dbus-monitor stdout → BlockReader → NotificationParser → NotificationRecord
//! ```

mod parser;
mod reader;
mod record;

pub use crate::notification::{
    parser::NotificationParser, reader::BlockReader, record::NotificationRecord,
};
