//! Control application service — the server side of the link.
//!
//! [`ControlService`] owns the credential, the request decoder, the door
//! sequence and the alarm policy.  Like the HMI service it never touches
//! hardware directly: storage, motor, buzzer, link and event sink are
//! injected at each call.
//!
//! ```text
//!   Link (rx) ──▶ ┌──────────────────────────┐ ──▶ Link (tx)
//!                 │      ControlService      │ ──▶ DoorActuator / Buzzer
//! CredentialStore◀│ Decoder · Door · Alarm   │ ──▶ EventSink
//!                 └──────────────────────────┘
//! ```
//!
//! Rules:
//! - `SET_PASSWORD` only creates; an existing credential is never replaced by it.
//! - `CHANGE_PASSWORD` and `OPEN_DOOR` need a successful `SEND_PASSWORD`
//!   as the immediately preceding request.  Any request consumes it.
//! - Non-digit payloads and failed writes are answered `MISMATCHED`.

use log::{debug, error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{Buzzer, CredentialStore, DoorActuator, EventSink};
use crate::config::SystemConfig;
use crate::credential::{Credential, Payload};
use crate::door::{DoorPhase, DoorSequence, MotorCommand};
use crate::error::{LinkError, Result};
use crate::lockout::{LockoutPolicy, MismatchOutcome};
use crate::protocol::transport::{send_all, Link};
use crate::protocol::{DecodeStep, Message, MessageDecoder, Opcode, Verdict};

pub struct ControlService {
    config: SystemConfig,
    credential: Option<Credential>,
    decoder: MessageDecoder,
    /// Last request was a successful verification.
    verified: bool,
    door: DoorSequence,
    alarm: LockoutPolicy,
    /// Ticks spent waiting for the rest of a payload.
    payload_wait: u32,
}

impl ControlService {
    pub fn new(config: SystemConfig) -> Self {
        let door = DoorSequence::new(&config);
        let alarm = LockoutPolicy::new(&config);
        Self {
            config,
            credential: None,
            decoder: MessageDecoder::new(),
            verified: false,
            door,
            alarm,
            payload_wait: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load the stored credential and park all actuators.
    ///
    /// A storage error is reported and the node starts unprovisioned; the
    /// caller decides whether that is fatal.
    pub fn start(
        &mut self,
        store: &impl CredentialStore,
        hw: &mut (impl DoorActuator + Buzzer),
        sink: &mut impl EventSink,
    ) -> Result<()> {
        hw.set_motor(MotorCommand::Stop);
        hw.set_buzzer(false);

        let loaded = store.read();
        let result = match loaded {
            Ok(cred) => {
                self.credential = cred;
                Ok(())
            }
            Err(e) => {
                error!("Control: credential read failed: {}", e);
                sink.emit(&AppEvent::StorageFault(e));
                Err(e.into())
            }
        };

        let provisioned = self.credential.is_some();
        info!(
            "ControlService started ({})",
            if provisioned { "provisioned" } else { "awaiting SET_PASSWORD" }
        );
        sink.emit(&AppEvent::ControlStarted { provisioned });
        result
    }

    // ── Link input ────────────────────────────────────────────

    /// Handle one byte from the HMI.
    ///
    /// Protocol violations are logged and dropped; only a failing link
    /// write is returned as an error.
    pub fn on_byte<L: Link>(
        &mut self,
        byte: u8,
        link: &mut L,
        store: &mut impl CredentialStore,
        hw: &mut (impl DoorActuator + Buzzer),
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match self.decoder.feed(byte) {
            Err(e) => {
                warn!("Control: {}", e);
                sink.emit(&AppEvent::ProtocolViolation(e));
                Ok(())
            }
            Ok(DecodeStep::Pending) => Ok(()),
            Ok(DecodeStep::NeedReady(op)) => {
                debug!("Control: {} received, ready for payload", op);
                self.payload_wait = 0;
                send_all(link, &[Opcode::ReadyToReceive as u8])?;
                Ok(())
            }
            Ok(DecodeStep::Complete(msg)) => {
                if !msg.opcode().is_request() {
                    warn!("Control: unexpected {} from HMI dropped", msg.opcode());
                    sink.emit(&AppEvent::ProtocolViolation(
                        crate::error::ProtocolError::UnexpectedByte {
                            got: byte,
                            expected: "a request opcode",
                        },
                    ));
                    return Ok(());
                }
                let verdict = self.serve(msg, store, hw, sink);
                sink.emit(&AppEvent::RequestServed {
                    request: msg.opcode(),
                    verdict,
                });
                send_all(
                    link,
                    &[Opcode::SendingStatus as u8, verdict.opcode() as u8],
                )?;
                Ok(())
            }
        }
    }

    // ── Time ──────────────────────────────────────────────────

    /// Advance door, alarm and payload timeout by one tick.
    pub fn on_tick(&mut self, hw: &mut (impl DoorActuator + Buzzer), sink: &mut impl EventSink) {
        if let Some(phase) = self.door.on_tick() {
            info!("Control: door {:?}", phase);
            hw.set_motor(phase.motor_command());
            sink.emit(&AppEvent::DoorPhase(phase));
        }

        if self.alarm.on_tick() {
            hw.set_buzzer(false);
            sink.emit(&AppEvent::AlarmChanged(false));
            sink.emit(&AppEvent::LockoutReleased);
        }

        if let Some(op) = self.decoder.awaiting_payload() {
            self.payload_wait = self.payload_wait.saturating_add(1);
            let budget = self.config.response_timeout_ticks;
            if budget != 0 && self.payload_wait >= budget {
                warn!(
                    "Control: payload for {} not completed after {} ticks, discarded",
                    op, self.payload_wait
                );
                sink.emit(&AppEvent::LinkTimeout {
                    ticks: self.payload_wait,
                });
                self.decoder.reset();
                self.payload_wait = 0;
            }
        }
    }

    /// One foreground iteration: drain received bytes, then replay ticks.
    pub fn poll<L: Link>(
        &mut self,
        ticks: u32,
        link: &mut L,
        store: &mut impl CredentialStore,
        hw: &mut (impl DoorActuator + Buzzer),
        sink: &mut impl EventSink,
    ) -> Result<()> {
        while let Some(byte) = link.read_byte().map_err(|_| LinkError::ReadFailed)? {
            self.on_byte(byte, link, store, hw, sink)?;
        }
        for _ in 0..ticks {
            self.on_tick(hw, sink);
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_provisioned(&self) -> bool {
        self.credential.is_some()
    }

    pub fn door_phase(&self) -> DoorPhase {
        self.door.phase()
    }

    pub fn is_alarm_on(&self) -> bool {
        self.alarm.is_locked()
    }

    /// Compare against the stored credential without touching any state.
    pub fn would_match(&self, payload: &Payload) -> bool {
        self.credential.is_some_and(|c| c.matches(payload))
    }

    // ── Internal ──────────────────────────────────────────────

    fn serve(
        &mut self,
        msg: Message,
        store: &mut impl CredentialStore,
        hw: &mut (impl DoorActuator + Buzzer),
        sink: &mut impl EventSink,
    ) -> Verdict {
        let verified = core::mem::take(&mut self.verified);

        match msg {
            Message::SetPassword(p) => {
                if self.credential.is_some() {
                    warn!("Control: SET_PASSWORD refused, a password already exists");
                    Verdict::Mismatched
                } else {
                    self.store(p, store, sink)
                }
            }
            Message::SendPassword(p) => self.verify(&p, hw, sink),
            Message::ChangePassword(p) => {
                if verified {
                    self.store(p, store, sink)
                } else {
                    warn!("Control: CHANGE_PASSWORD without prior verification");
                    Verdict::Mismatched
                }
            }
            Message::OpenDoor => {
                if !verified {
                    warn!("Control: OPEN_DOOR without prior verification");
                    return Verdict::Mismatched;
                }
                match self.door.start() {
                    Ok(phase) => {
                        info!("Control: door {:?}", phase);
                        hw.set_motor(phase.motor_command());
                        sink.emit(&AppEvent::DoorPhase(phase));
                        Verdict::Matched
                    }
                    Err(busy) => {
                        warn!("Control: door sequence already running ({:?})", busy.0);
                        Verdict::Mismatched
                    }
                }
            }
            // Responses never reach here; see `on_byte`.
            Message::SendingStatus
            | Message::ReadyToReceive
            | Message::PasswordsMatched
            | Message::PasswordsMismatched => Verdict::Mismatched,
        }
    }

    fn verify(
        &mut self,
        payload: &Payload,
        hw: &mut impl Buzzer,
        sink: &mut impl EventSink,
    ) -> Verdict {
        let verdict = Verdict::from(self.would_match(payload));
        match verdict {
            Verdict::Matched => {
                self.verified = true;
                self.alarm.record_match();
            }
            Verdict::Mismatched => {
                let was_locked = self.alarm.is_locked();
                if self.alarm.record_mismatch() == MismatchOutcome::LockedOut && !was_locked {
                    warn!("Control: mismatch threshold reached, alarm on");
                    hw.set_buzzer(true);
                    sink.emit(&AppEvent::AlarmChanged(true));
                    sink.emit(&AppEvent::LockoutEngaged {
                        ticks: self.alarm.remaining_ticks(),
                    });
                }
            }
        }
        verdict
    }

    fn store(
        &mut self,
        payload: Payload,
        store: &mut impl CredentialStore,
        sink: &mut impl EventSink,
    ) -> Verdict {
        let Ok(credential) = Credential::try_from(payload) else {
            warn!("Control: payload is not all digits, not stored");
            return Verdict::Mismatched;
        };
        if let Err(e) = store.write(&credential) {
            error!("Control: credential write failed: {}", e);
            sink.emit(&AppEvent::StorageFault(e));
            return Verdict::Mismatched;
        }
        let replaced = self.credential.replace(credential).is_some();
        info!(
            "Control: password {}",
            if replaced { "changed" } else { "stored" }
        );
        sink.emit(&AppEvent::CredentialStored { replaced });
        Verdict::Matched
    }
}
