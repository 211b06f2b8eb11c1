//! Interrupt-to-foreground tick hand-off.
//!
//! The periodic timer callback is the only writer that increments; the
//! foreground loop is the only reader and drains the count with a single
//! atomic swap.  Ticks that arrive while the foreground is busy (waiting on
//! the link, redrawing the display) accumulate and are replayed in order.

use core::sync::atomic::{AtomicU32, Ordering};

/// Pending-tick cell shared between the timer ISR and one node loop.
pub struct TickCounter {
    pending: AtomicU32,
}

impl TickCounter {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU32::new(0),
        }
    }

    /// Timer context: record one elapsed period.
    #[inline]
    pub fn on_tick(&self) {
        self.pending.fetch_add(1, Ordering::Release);
    }

    /// Foreground: take every tick accrued since the last call.
    #[inline]
    pub fn take(&self) -> u32 {
        self.pending.swap(0, Ordering::AcqRel)
    }

    /// Peek without consuming (diagnostics only).
    pub fn pending(&self) -> u32 {
        self.pending.load(Ordering::Acquire)
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}
