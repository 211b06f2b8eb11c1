//! Outbound application events.
//!
//! Both node services emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; the stock one writes a tagged log
//! line per event.

use crate::app::ports::StorageError;
use crate::door::DoorPhase;
use crate::error::ProtocolError;
use crate::fsm::StateId;
use crate::protocol::{Opcode, Verdict};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The HMI service has started (carries initial state).
    Started(StateId),

    /// The Control service has started.
    ControlStarted { provisioned: bool },

    /// The HMI FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// Set/change confirmation differed from the first entry; nothing sent.
    EntryMismatch,

    /// Set/change first entry was shorter than a full password.
    EntryTooShort,

    /// The Control node answered a verification.
    Verified { verdict: Verdict, mismatches: u8 },

    /// A set or change request was acknowledged.
    PasswordAck { request: Opcode, verdict: Verdict },

    /// The Control node answered a request.
    RequestServed { request: Opcode, verdict: Verdict },

    /// A user action was refused locally during a lockout.
    AttemptRefused { remaining_ticks: u32 },

    /// Mismatch threshold reached.
    LockoutEngaged { ticks: u32 },

    /// Lockout budget elapsed; the mismatch counter is back to zero.
    LockoutReleased,

    /// The door sequence entered a new phase.
    DoorPhase(DoorPhase),

    /// A credential was written to storage.
    CredentialStored { replaced: bool },

    /// Storage refused a read or write.
    StorageFault(StorageError),

    /// Alarm buzzer switched.
    AlarmChanged(bool),

    /// No response within the tick budget; the exchange was abandoned.
    LinkTimeout { ticks: u32 },

    /// A byte arrived that the protocol does not allow at this point.
    ProtocolViolation(ProtocolError),
}
