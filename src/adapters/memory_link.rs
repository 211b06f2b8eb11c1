//! In-memory duplex link — two [`Link`] ends wired back to back.
//!
//! Used by the simulator and the integration tests in place of the UART.
//! Each direction is a fixed-capacity FIFO; a write into a full FIFO is
//! short, exactly like a UART TX ring that is out of room.

use core::cell::RefCell;
use core::convert::Infallible;
use std::rc::Rc;

use heapless::Deque;

use crate::protocol::transport::Link;

/// Bytes buffered per direction.
pub const LINK_FIFO_LEN: usize = 64;

type Fifo = Rc<RefCell<Deque<u8, LINK_FIFO_LEN>>>;

pub struct MemoryLink {
    rx: Fifo,
    tx: Fifo,
}

impl MemoryLink {
    /// Two connected ends: what one writes, the other reads.
    pub fn pair() -> (Self, Self) {
        let a: Fifo = Rc::default();
        let b: Fifo = Rc::default();
        (
            Self {
                rx: Rc::clone(&a),
                tx: Rc::clone(&b),
            },
            Self { rx: b, tx: a },
        )
    }

    /// Bytes waiting to be read on this end.
    pub fn pending(&self) -> usize {
        self.rx.borrow().len()
    }
}

impl Link for MemoryLink {
    type Error = Infallible;

    fn read_byte(&mut self) -> Result<Option<u8>, Infallible> {
        Ok(self.rx.borrow_mut().pop_front())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Infallible> {
        let mut tx = self.tx.borrow_mut();
        let mut written = 0;
        for &b in data {
            if tx.push_back(b).is_err() {
                break;
            }
            written += 1;
        }
        Ok(written)
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}
