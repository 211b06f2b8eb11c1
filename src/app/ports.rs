//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ HmiService / ControlService (domain)
//! ```
//!
//! Driven adapters (keypad, display, motor, buzzer, storage, event sinks)
//! implement these traits.  The services consume them via generics, so the
//! domain core never touches hardware directly.  The serial link has its own
//! port, [`Link`](crate::protocol::transport::Link).
//!
//! ## Storage notes
//!
//! - **ConfigPort** implementations MUST validate before persisting.
//! - **CredentialStore** writes replace the whole credential or nothing.
//! - All port errors are typed; callers handle every variant explicitly.

use crate::config::SystemConfig;
use crate::credential::{Credential, Key};
use crate::door::MotorCommand;

// ───────────────────────────────────────────────────────────────
// Keypad port (driven adapter: hardware → HMI)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the HMI keypad.
pub trait Keypad {
    /// Next decoded key press, if one is waiting.  Never blocks.
    ///
    /// Raw symbols outside the key vocabulary are filtered by the adapter.
    fn poll_key(&mut self) -> Option<Key>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: HMI → character LCD)
// ───────────────────────────────────────────────────────────────

/// Two-line character display.
pub trait Display {
    /// Clear the screen and write both lines.
    fn show(&mut self, top: &str, bottom: &str);
}

// ───────────────────────────────────────────────────────────────
// Actuator ports (driven adapter: Control → hardware)
// ───────────────────────────────────────────────────────────────

/// Door lock motor.  No feedback: commands are fire-and-forget.
pub trait DoorActuator {
    fn set_motor(&mut self, cmd: MotorCommand);
}

/// Alarm buzzer.
pub trait Buzzer {
    fn set_buzzer(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Credential port (driven adapter: Control ↔ EEPROM / NVS)
// ───────────────────────────────────────────────────────────────

/// Single-slot persistent credential store, owned by the Control node.
pub trait CredentialStore {
    /// Stored credential, or `None` on first boot.
    fn read(&self) -> Result<Option<Credential>, StorageError>;

    /// Replace the stored credential atomically.
    fn write(&mut self, credential: &Credential) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    ///
    /// Both nodes derive door and lockout timing from the config, so a
    /// stored config is only honoured where one value feeds both (the
    /// simulator).  The boards run [`SystemConfig::default()`].
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.
///
/// - Keys are namespaced to prevent collisions between subsystems.
/// - Write operations MUST be atomic: no partial writes on power loss.
///   The ESP-IDF NVS API guarantees this natively; in-memory simulation
///   achieves it trivially.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] and [`CredentialStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
    /// Stored bytes are not a valid value (e.g. non-digit credential).
    Corrupted,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
            Self::Corrupted => write!(f, "stored value corrupted"),
        }
    }
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => Self::NotFound,
            StorageError::Full => Self::StorageFull,
            StorageError::IoError => Self::IoError,
            StorageError::Corrupted => Self::Corrupted,
        }
    }
}
