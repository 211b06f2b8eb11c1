//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one tagged line per application
//! event to the `log` facade (UART console on the boards, stderr in the
//! simulator).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink {
    node: &'static str,
}

impl LogEventSink {
    /// `node` prefixes every line so the two ECUs can share a console.
    pub fn new(node: &'static str) -> Self {
        Self { node }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        let node = self.node;
        match event {
            AppEvent::Started(state) => {
                info!("{node} START | initial_state={:?}", state);
            }
            AppEvent::ControlStarted { provisioned } => {
                info!("{node} START | provisioned={}", provisioned);
            }
            AppEvent::StateChanged { from, to } => {
                info!("{node} STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::EntryMismatch => {
                info!("{node} ENTRY | confirmation differs, nothing sent");
            }
            AppEvent::EntryTooShort => {
                info!("{node} ENTRY | too short");
            }
            AppEvent::Verified { verdict, mismatches } => {
                info!("{node} VERIFY | {:?} | mismatches={}", verdict, mismatches);
            }
            AppEvent::PasswordAck { request, verdict } => {
                info!("{node} VERIFY | {} acked {:?}", request, verdict);
            }
            AppEvent::RequestServed { request, verdict } => {
                info!("{node} LINK | served {} -> {:?}", request, verdict);
            }
            AppEvent::AttemptRefused { remaining_ticks } => {
                info!("{node} LOCKOUT | refused, {} ticks left", remaining_ticks);
            }
            AppEvent::LockoutEngaged { ticks } => {
                warn!("{node} LOCKOUT | engaged for {} ticks", ticks);
            }
            AppEvent::LockoutReleased => {
                info!("{node} LOCKOUT | released");
            }
            AppEvent::DoorPhase(phase) => {
                info!("{node} DOOR | {}", phase.label());
            }
            AppEvent::CredentialStored { replaced } => {
                info!("{node} STORE | credential written (replaced={})", replaced);
            }
            AppEvent::StorageFault(e) => {
                warn!("{node} STORE | {}", e);
            }
            AppEvent::AlarmChanged(on) => {
                info!("{node} ALARM | {}", if *on { "ON" } else { "OFF" });
            }
            AppEvent::LinkTimeout { ticks } => {
                warn!("{node} LINK | no response after {} ticks", ticks);
            }
            AppEvent::ProtocolViolation(e) => {
                warn!("{node} LINK | {}", e);
            }
        }
    }
}
