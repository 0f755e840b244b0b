//! Event stream reader grouping monitor lines into blocks.
//!
//! This module provides the [`BlockReader`] which consumes the line-oriented output
//! of `dbus-monitor` and yields one block per bus method call.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// Prefix of a line that opens a new bus method call.
const BOUNDARY_PREFIX: &str = "method call";

/// Splits a stream of monitor lines into method-call blocks.
///
/// A block starts with a boundary line and holds every following line up to
/// the next boundary. A block is only emitted once the next boundary is seen,
/// so:
///
/// - lines before the first boundary are dropped
/// - the final, unterminated block is dropped when the stream ends
///
/// Only the lines of the current block are buffered.
///
/// # Examples
///
/// ```ignore
/// let stdout = BufReader::new(child.stdout.take().unwrap());
/// let mut reader = BlockReader::new(stdout);
/// while let Some(block) = reader.next_block().await? {
///     // ...
/// }
/// ```
pub struct BlockReader<R> {
    /// Underlying line source
    lines: Lines<R>,
    /// Block being accumulated, `None` until the first boundary
    current: Option<Vec<String>>,
}

impl<R: AsyncBufRead + Unpin> BlockReader<R> {
    /// Creates a reader over `source`.
    pub fn new(source: R) -> Self {
        BlockReader {
            lines: source.lines(),
            current: None,
        }
    }

    /// Returns the next complete block.
    ///
    /// Cancel-safe: lines already consumed stay in the pending block, so the
    /// call can be raced in a `select!` and resumed.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(lines))` - A complete block, boundary line first
    /// * `Ok(None)` - The line source ended; any partial block is discarded
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the source fails (including invalid UTF-8).
    pub async fn next_block(&mut self) -> std::io::Result<Option<Vec<String>>> {
        while let Some(line) = self.lines.next_line().await? {
            if line.starts_with(BOUNDARY_PREFIX) {
                if let Some(block) = self.current.replace(vec![line]) {
                    return Ok(Some(block));
                }
            } else if let Some(block) = self.current.as_mut() {
                block.push(line);
            }
        }

        self.current = None;
        Ok(None)
    }
}
