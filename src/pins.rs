//! GPIO / peripheral pin assignments for both door locker boards.
//!
//! Single source of truth: the firmware binaries reference this module
//! rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Inter-node link (UART1, 8N1)
// ---------------------------------------------------------------------------

/// TX on either board; cross-wired to the peer's RX.
pub const LINK_TX_GPIO: i32 = 17;
pub const LINK_RX_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// Control board: lock motor (L293D H-bridge)
// ---------------------------------------------------------------------------

/// HIGH = drive forward (unlock).
pub const MOTOR_IN1_GPIO: i32 = 4;
/// HIGH = drive reverse (lock).
pub const MOTOR_IN2_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Control board: alarm
// ---------------------------------------------------------------------------

/// Active buzzer, HIGH = sounding.
pub const BUZZER_GPIO: i32 = 6;
