//! Synchronous `Write` adapter for the terminal backend that hands each flushed frame to
//! the connection's async writer task.

use std::io::{self, Write};

use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::error::TrySendError;

pub struct ChannelWriter {
    tx: Sender<Vec<u8>>,
    buffer: Vec<u8>,
}

impl ChannelWriter {
    pub fn new(tx: Sender<Vec<u8>>) -> Self {
        Self {
            tx,
            buffer: Vec::new(),
        }
    }
}

impl Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    /// Queue the buffered frame. A full queue is an error: skipping a frame would leave the
    /// client's screen out of step with the terminal diff.
    fn flush(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        match self.tx.try_send(std::mem::take(&mut self.buffer)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                "client is not reading output",
            )),
            Err(TrySendError::Closed(_)) => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "connection closed",
            )),
        }
    }
}
