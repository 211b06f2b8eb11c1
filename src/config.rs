//! System configuration parameters
//!
//! Timing and policy parameters for both ECUs.  The defaults reproduce the
//! reference timing budget (0.5 s tick); values can be overridden via NVS.
//! Password length is not configurable: it fixes the wire format.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Symbols per password.  Every payload on the link is exactly this long.
pub const PASSWORD_LEN: usize = 5;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Lockout ---
    /// Consecutive mismatches that trigger a lockout
    pub mismatch_threshold: u8,
    /// Lockout duration (ticks)
    pub lockout_ticks: u32,

    // --- Door ---
    /// Motor run time for unlocking and for locking (ticks)
    pub motor_ticks: u32,
    /// Time the door is held open between the two motor phases (ticks)
    pub hold_ticks: u32,

    // --- Timing ---
    /// Tick source period (milliseconds)
    pub tick_period_ms: u32,

    // --- Link ---
    /// UART bit rate shared by both ECUs
    pub baud_rate: u32,
    /// Ticks to wait for a peer response before abandoning an exchange (0 = wait forever)
    pub response_timeout_ticks: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Lockout
            mismatch_threshold: 3,
            lockout_ticks: 120, // 60 s

            // Door
            motor_ticks: 30, // 15 s
            hold_ticks: 6,   // 3 s

            // Timing
            tick_period_ms: 500,

            // Link
            baud_rate: 9600,
            response_timeout_ticks: 20, // 10 s
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=10).contains(&self.mismatch_threshold) {
            return Err(ConfigError::ValidationFailed(
                "mismatch_threshold must be 1–10",
            ));
        }
        if !(1..=7200).contains(&self.lockout_ticks) {
            return Err(ConfigError::ValidationFailed(
                "lockout_ticks must be 1–7200",
            ));
        }
        if !(1..=600).contains(&self.motor_ticks) {
            return Err(ConfigError::ValidationFailed("motor_ticks must be 1–600"));
        }
        if self.hold_ticks > 600 {
            return Err(ConfigError::ValidationFailed("hold_ticks must be 0–600"));
        }
        if !(10..=10_000).contains(&self.tick_period_ms) {
            return Err(ConfigError::ValidationFailed(
                "tick_period_ms must be 10–10000",
            ));
        }
        if !matches!(self.baud_rate, 2400 | 4800 | 9600 | 19_200 | 38_400 | 57_600 | 115_200) {
            return Err(ConfigError::ValidationFailed(
                "baud_rate must be a standard UART rate",
            ));
        }
        if self.response_timeout_ticks > 7200 {
            return Err(ConfigError::ValidationFailed(
                "response_timeout_ticks must be 0–7200",
            ));
        }
        Ok(())
    }

    /// Length of one full door cycle (unlock, hold, lock) in ticks.
    pub fn door_cycle_ticks(&self) -> u32 {
        2 * self.motor_ticks + self.hold_ticks
    }

    /// Convert a tick count into milliseconds of wall time.
    pub fn ticks_to_ms(&self, ticks: u32) -> u64 {
        u64::from(ticks) * u64::from(self.tick_period_ms)
    }
}
