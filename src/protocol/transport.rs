//! Link abstraction — the byte channel between the two nodes.
//!
//! Concrete implementations:
//! - UART (ESP-IDF `UartDriver`, 8N1)
//! - In-memory duplex pair (simulator and tests)
//!
//! Both node services are generic over `Link`, so swapping the physical
//! channel requires zero changes to the protocol logic.

use crate::error::LinkError;

/// Byte-oriented, in-order serial channel.
pub trait Link {
    /// Error type for this link.
    type Error: core::fmt::Debug;

    /// Next received byte, or `None` if nothing is waiting (non-blocking).
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Write `data` to the link.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Write the whole buffer or report why not.
pub fn send_all<L: Link>(link: &mut L, data: &[u8]) -> Result<(), LinkError> {
    let written = link.write(data).map_err(|e| {
        log::warn!("link write failed: {e:?}");
        LinkError::WriteFailed
    })?;
    if written != data.len() {
        return Err(LinkError::ShortWrite {
            written,
            expected: data.len(),
        });
    }
    link.flush().map_err(|_| LinkError::WriteFailed)
}

/// A null link that discards all writes and never reads.
/// Useful as a placeholder before the UART is up.
pub struct NullLink;

impl Link for NullLink {
    type Error = ();

    fn read_byte(&mut self) -> Result<Option<u8>, ()> {
        Ok(None)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}
