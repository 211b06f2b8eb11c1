//! Mismatch counting and timed lockout.
//!
//! Counts consecutive verification failures regardless of which action
//! (open door or change password) asked for the verification.  Reaching the
//! threshold freezes the counter and starts a fixed tick budget; the counter
//! returns to zero only once that budget has fully elapsed.
//!
//! The HMI uses this to refuse attempts locally; the Control node runs its
//! own instance to drive the alarm buzzer.

use log::info;

use crate::config::SystemConfig;
use crate::error::LockoutError;

/// Result of recording one failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchOutcome {
    /// Below the threshold; `attempts_left` more failures trigger a lockout.
    Retry { attempts_left: u8 },
    /// Threshold reached; the lockout budget has started.
    LockedOut,
}

#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    threshold: u8,
    lockout_ticks: u32,
    mismatches: u8,
    /// `Some(elapsed)` while locked.
    locked_elapsed: Option<u32>,
}

impl LockoutPolicy {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            threshold: config.mismatch_threshold.max(1),
            lockout_ticks: config.lockout_ticks,
            mismatches: 0,
            locked_elapsed: None,
        }
    }

    /// Successful verification.  No effect while locked: the counter is
    /// frozen until the budget elapses.
    pub fn record_match(&mut self) {
        if !self.is_locked() {
            self.mismatches = 0;
        }
    }

    /// Failed verification.  Ignored while already locked.
    pub fn record_mismatch(&mut self) -> MismatchOutcome {
        if self.is_locked() {
            return MismatchOutcome::LockedOut;
        }
        self.mismatches = self.mismatches.saturating_add(1);
        if self.mismatches >= self.threshold {
            info!(
                "Lockout engaged after {} mismatches ({} ticks)",
                self.mismatches, self.lockout_ticks
            );
            self.locked_elapsed = Some(0);
            MismatchOutcome::LockedOut
        } else {
            MismatchOutcome::Retry {
                attempts_left: self.threshold - self.mismatches,
            }
        }
    }

    /// Count one tick.  Returns `true` on the tick that ends the lockout.
    pub fn on_tick(&mut self) -> bool {
        let Some(elapsed) = self.locked_elapsed.as_mut() else {
            return false;
        };
        *elapsed += 1;
        if *elapsed >= self.lockout_ticks {
            self.locked_elapsed = None;
            self.mismatches = 0;
            info!("Lockout released");
            true
        } else {
            false
        }
    }

    /// Gate a new verification attempt.
    pub fn check_attempt(&self) -> Result<(), LockoutError> {
        if self.is_locked() {
            Err(LockoutError::Locked {
                remaining_ticks: self.remaining_ticks(),
            })
        } else {
            Ok(())
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked_elapsed.is_some()
    }

    pub fn mismatches(&self) -> u8 {
        self.mismatches
    }

    /// Ticks left in the current lockout (0 when not locked).
    pub fn remaining_ticks(&self) -> u32 {
        self.locked_elapsed
            .map_or(0, |e| self.lockout_ticks.saturating_sub(e))
    }
}
