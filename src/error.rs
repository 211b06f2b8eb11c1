//! Unified error types for the door locker firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! node loops' error handling uniform.  All variants are `Copy` so they can
//! be passed through the state machines without allocation.

use core::fmt;

use crate::app::ports::StorageError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The peer violated the opcode / turn-taking contract.
    Protocol(ProtocolError),
    /// The serial link could not carry a byte.
    Link(LinkError),
    /// Nonvolatile storage failed.
    Storage(StorageError),
    /// A verification attempt was refused by the lockout policy.
    Lockout(LockoutError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Lockout(e) => write!(f, "lockout: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Byte is not part of the opcode vocabulary.
    UnknownOpcode(u8),
    /// A valid byte arrived at a point in the exchange where it has no meaning.
    UnexpectedByte { got: u8, expected: &'static str },
    /// Message bytes did not have the shape its opcode requires.
    BadLength { opcode: u8, len: usize },
    /// No response arrived within the configured tick budget.
    ResponseTimeout { ticks: u32 },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOpcode(b) => write!(f, "unknown opcode 0x{b:02X}"),
            Self::UnexpectedByte { got, expected } => {
                write!(f, "unexpected byte 0x{got:02X} (expected {expected})")
            }
            Self::BadLength { opcode, len } => {
                write!(f, "opcode 0x{opcode:02X} with {len} message bytes")
            }
            Self::ResponseTimeout { ticks } => write!(f, "no response after {ticks} ticks"),
        }
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The transport rejected a write.
    WriteFailed,
    /// The transport accepted fewer bytes than requested.
    ShortWrite { written: usize, expected: usize },
    /// The transport failed while reading.
    ReadFailed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed => write!(f, "write failed"),
            Self::ShortWrite { written, expected } => {
                write!(f, "short write ({written}/{expected} bytes)")
            }
            Self::ReadFailed => write!(f, "read failed"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Lockout
// ---------------------------------------------------------------------------

/// Policy rejection, not a link-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutError {
    Locked { remaining_ticks: u32 },
}

impl fmt::Display for LockoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked { remaining_ticks } => {
                write!(f, "locked out for {remaining_ticks} more ticks")
            }
        }
    }
}

impl From<LockoutError> for Error {
    fn from(e: LockoutError) -> Self {
        Self::Lockout(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
