//! Concrete HMI state handlers and table builder.
//!
//! Each state is defined by three plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap.  This is the classic embedded C FSM pattern
//! expressed in safe Rust.
//!
//! ```text
//!  SETUP_ENTRY ──5 digits──▶ SETUP_CONFIRM ──same──▶ AWAITING_SET_ACK ──ack──▶ MAIN_MENU
//!       ▲                         │  └─differs─┐                                 │
//!       └─────────timeout (unprovisioned)──────┴──────────────────┐              │
//!                                                                                 │
//!  MAIN_MENU ──+ / -──▶ VERIFY_ENTRY ──=──▶ AWAITING_VERIFY ──MATCHED──┬─(+)─▶ AWAITING_DOOR_ACK ──▶ DOOR_OPEN ──▶ MAIN_MENU
//!                                                 │                    └─(-)─▶ CHANGE_ENTRY ──▶ CHANGE_CONFIRM ──▶ AWAITING_CHANGE_ACK ──▶ MAIN_MENU
//!                                                 └──MISMATCHED──▶ MAIN_MENU, or LOCKOUT at the threshold
//!
//!  LOCKOUT ──lockout_ticks──▶ MAIN_MENU
//! ```

use log::{debug, info, warn};

use super::context::{FsmContext, MenuAction};
use super::{StateDescriptor, StateId};
use crate::app::events::AppEvent;
use crate::app::input::HmiInput;
use crate::credential::Key;
use crate::door::DoorPhase;
use crate::error::ProtocolError;
use crate::lockout::MismatchOutcome;
use crate::protocol::{ExchangeStep, Opcode, Request, Verdict};

const PROMPT_ENTER: &str = "Plz enter pass:";
const PROMPT_REENTER: (&str, &str) = ("Plz re-enter the", "same pass:");
const MENU: (&str, &str) = ("+ : Open Door", "- : Change Pass");

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — SetupEntry
        StateDescriptor {
            id: StateId::SetupEntry,
            name: "SetupEntry",
            on_enter: Some(first_entry_enter),
            on_exit: None,
            on_update: setup_entry_update,
        },
        // Index 1 — SetupConfirm
        StateDescriptor {
            id: StateId::SetupConfirm,
            name: "SetupConfirm",
            on_enter: Some(confirm_enter),
            on_exit: None,
            on_update: setup_confirm_update,
        },
        // Index 2 — AwaitingSetAck
        StateDescriptor {
            id: StateId::AwaitingSetAck,
            name: "AwaitingSetAck",
            on_enter: None,
            on_exit: Some(exchange_exit),
            on_update: awaiting_set_ack_update,
        },
        // Index 3 — MainMenu
        StateDescriptor {
            id: StateId::MainMenu,
            name: "MainMenu",
            on_enter: Some(main_menu_enter),
            on_exit: None,
            on_update: main_menu_update,
        },
        // Index 4 — VerifyEntry
        StateDescriptor {
            id: StateId::VerifyEntry,
            name: "VerifyEntry",
            on_enter: Some(verify_entry_enter),
            on_exit: None,
            on_update: verify_entry_update,
        },
        // Index 5 — AwaitingVerify
        StateDescriptor {
            id: StateId::AwaitingVerify,
            name: "AwaitingVerify",
            on_enter: None,
            on_exit: Some(exchange_exit),
            on_update: awaiting_verify_update,
        },
        // Index 6 — AwaitingDoorAck
        StateDescriptor {
            id: StateId::AwaitingDoorAck,
            name: "AwaitingDoorAck",
            on_enter: Some(door_ack_enter),
            on_exit: Some(exchange_exit),
            on_update: awaiting_door_ack_update,
        },
        // Index 7 — ChangeEntry
        StateDescriptor {
            id: StateId::ChangeEntry,
            name: "ChangeEntry",
            on_enter: Some(first_entry_enter),
            on_exit: None,
            on_update: change_entry_update,
        },
        // Index 8 — ChangeConfirm
        StateDescriptor {
            id: StateId::ChangeConfirm,
            name: "ChangeConfirm",
            on_enter: Some(confirm_enter),
            on_exit: None,
            on_update: change_confirm_update,
        },
        // Index 9 — AwaitingChangeAck
        StateDescriptor {
            id: StateId::AwaitingChangeAck,
            name: "AwaitingChangeAck",
            on_enter: None,
            on_exit: Some(exchange_exit),
            on_update: awaiting_change_ack_update,
        },
        // Index 10 — DoorOpen
        StateDescriptor {
            id: StateId::DoorOpen,
            name: "DoorOpen",
            on_enter: Some(door_open_enter),
            on_exit: None,
            on_update: door_open_update,
        },
        // Index 11 — Lockout
        StateDescriptor {
            id: StateId::Lockout,
            name: "Lockout",
            on_enter: Some(lockout_enter),
            on_exit: None,
            on_update: lockout_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Shared helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Result of feeding the current input to the entry editor.
enum EntryEdit {
    /// Nothing to act on yet (digit, clear, or an ignored input).
    Editing,
    /// Enter pressed.
    Submitted,
    /// `C` on an empty entry.
    Cancelled,
}

fn edit_entry(ctx: &mut FsmContext, top: &str) -> EntryEdit {
    match ctx.input {
        HmiInput::Key(Key::Digit(d)) => {
            if ctx.entry.push_digit(d) {
                ctx.echo_entry(top);
            }
            EntryEdit::Editing
        }
        HmiInput::Key(Key::Clear) => {
            if ctx.entry.is_empty() {
                return EntryEdit::Cancelled;
            }
            ctx.entry.clear();
            ctx.echo_entry(top);
            EntryEdit::Editing
        }
        HmiInput::Key(Key::Enter) => EntryEdit::Submitted,
        HmiInput::Key(_) | HmiInput::Tick => EntryEdit::Editing,
        HmiInput::Byte(b) => {
            unsolicited_byte(ctx, b);
            EntryEdit::Editing
        }
    }
}

fn unsolicited_byte(ctx: &mut FsmContext, byte: u8) {
    if late_verdict_byte(ctx, byte) {
        return;
    }
    warn!("HMI: unsolicited byte 0x{:02X} dropped", byte);
    ctx.emit(AppEvent::ProtocolViolation(ProtocolError::UnexpectedByte {
        got: byte,
        expected: "nothing",
    }));
}

/// Offer a byte to a verification that timed out.  The Control node counts
/// every verdict it sends, so a late one is counted here too.  Returns
/// `false` when the byte does not belong to it.
fn late_verdict_byte(ctx: &mut FsmContext, byte: u8) -> bool {
    let Some(late) = ctx.late_verify.as_mut() else {
        return false;
    };
    match late.on_byte(byte) {
        Ok(ExchangeStep::Pending) => true,
        Ok(ExchangeStep::Complete(verdict)) => {
            ctx.late_verify = None;
            info!("HMI: late verdict {:?} counted", verdict);
            match verdict {
                Verdict::Matched => ctx.lockout.record_match(),
                Verdict::Mismatched => {
                    ctx.lockout.record_mismatch();
                }
            }
            ctx.emit(AppEvent::Verified {
                verdict,
                mismatches: ctx.lockout.mismatches(),
            });
            true
        }
        // READY without a payload to follow, or noise: no verdict is coming.
        Ok(ExchangeStep::SendPayload(_)) | Err(_) => {
            ctx.late_verify = None;
            false
        }
    }
}

/// How an outstanding exchange ended, if it did.
enum ExchangeEnd {
    Verdict(Verdict),
    TimedOut,
}

/// Feed the current input to the outstanding exchange.
fn drive_exchange(ctx: &mut FsmContext) -> Option<ExchangeEnd> {
    let timeout = ctx.config.response_timeout_ticks;
    let Some(exchange) = ctx.exchange.as_mut() else {
        warn!("HMI: awaiting a response with no exchange open");
        return Some(ExchangeEnd::TimedOut);
    };

    match ctx.input {
        HmiInput::Byte(b) => match exchange.on_byte(b) {
            Ok(ExchangeStep::SendPayload(payload)) => {
                debug!("HMI: peer ready, sending payload");
                ctx.send(payload.as_bytes());
                None
            }
            Ok(ExchangeStep::Pending) => None,
            Ok(ExchangeStep::Complete(v)) => Some(ExchangeEnd::Verdict(v)),
            Err(e) => {
                warn!("HMI: {}", e);
                ctx.emit(AppEvent::ProtocolViolation(e));
                None
            }
        },
        HmiInput::Tick => match exchange.on_tick(timeout) {
            Ok(()) => None,
            Err(e) => {
                let ticks = match e {
                    ProtocolError::ResponseTimeout { ticks } => ticks,
                    _ => timeout,
                };
                warn!("HMI: {} waiting for {:?}", e, exchange.request().opcode());
                ctx.emit(AppEvent::LinkTimeout { ticks });
                Some(ExchangeEnd::TimedOut)
            }
        },
        HmiInput::Key(k) => {
            debug!("HMI: key {:?} ignored while waiting", k);
            None
        }
    }
}

fn exchange_exit(ctx: &mut FsmContext) {
    ctx.exchange = None;
}

fn link_error(ctx: &mut FsmContext) -> StateId {
    ctx.late_verify = ctx
        .exchange
        .take()
        .filter(|e| e.request().opcode() == Opcode::SendPassword);
    ctx.show("Link error", "");
    if ctx.provisioned {
        StateId::MainMenu
    } else {
        StateId::SetupEntry
    }
}

/// First pass of a new password: exactly five digits required.
fn first_entry_update(ctx: &mut FsmContext, cancel_to: Option<StateId>) -> Option<StateId> {
    match edit_entry(ctx, PROMPT_ENTER) {
        EntryEdit::Editing => None,
        EntryEdit::Cancelled => cancel_to,
        EntryEdit::Submitted if !ctx.entry.is_complete() => {
            info!("HMI: new password needs 5 digits, got {}", ctx.entry.len());
            ctx.emit(AppEvent::EntryTooShort);
            ctx.entry.clear();
            ctx.show("5 digits required", PROMPT_ENTER);
            None
        }
        EntryEdit::Submitted => {
            ctx.first_entry = Some(ctx.entry.clone());
            Some(match cancel_to {
                None => StateId::SetupConfirm,
                Some(_) => StateId::ChangeConfirm,
            })
        }
    }
}

/// Second pass: must equal the first byte-for-byte, length included.
/// Returns `true` once both passes agree.
fn confirm_matches(ctx: &mut FsmContext) -> bool {
    if ctx.first_entry.as_ref() == Some(&ctx.entry) {
        return true;
    }
    info!("HMI: confirmation differs from first entry, re-prompting");
    ctx.emit(AppEvent::EntryMismatch);
    ctx.entry.clear();
    ctx.show(PROMPT_REENTER.0, PROMPT_REENTER.1);
    false
}

fn first_entry_enter(ctx: &mut FsmContext) {
    ctx.entry.clear();
    ctx.first_entry = None;
    ctx.show(PROMPT_ENTER, "");
}

fn confirm_enter(ctx: &mut FsmContext) {
    ctx.entry.clear();
    ctx.show(PROMPT_REENTER.0, PROMPT_REENTER.1);
}

// ═══════════════════════════════════════════════════════════════════════════
//  SETUP — first password on an unprovisioned system
// ═══════════════════════════════════════════════════════════════════════════

fn setup_entry_update(ctx: &mut FsmContext) -> Option<StateId> {
    first_entry_update(ctx, None)
}

fn setup_confirm_update(ctx: &mut FsmContext) -> Option<StateId> {
    match edit_entry(ctx, PROMPT_REENTER.0) {
        EntryEdit::Editing => None,
        EntryEdit::Cancelled => Some(StateId::SetupEntry),
        EntryEdit::Submitted => {
            if !confirm_matches(ctx) {
                return None;
            }
            let payload = ctx.entry.to_payload();
            ctx.begin_exchange(Request::SetPassword(payload));
            Some(StateId::AwaitingSetAck)
        }
    }
}

fn awaiting_set_ack_update(ctx: &mut FsmContext) -> Option<StateId> {
    match drive_exchange(ctx)? {
        ExchangeEnd::Verdict(verdict) => {
            // Any acknowledgment completes setup; show which one it was.
            // A refusal leaves `C` at the menu as the way back to setup.
            ctx.provisioned = verdict == Verdict::Matched;
            ctx.emit(AppEvent::PasswordAck {
                request: Opcode::SetPassword,
                verdict,
            });
            match verdict {
                Verdict::Matched => ctx.show("Pass saved", ""),
                Verdict::Mismatched => ctx.show("Pass not saved", "C: set again"),
            }
            Some(StateId::MainMenu)
        }
        ExchangeEnd::TimedOut => Some(link_error(ctx)),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  MAIN MENU
// ═══════════════════════════════════════════════════════════════════════════

fn main_menu_enter(ctx: &mut FsmContext) {
    ctx.entry.clear();
    ctx.first_entry = None;
    ctx.show(MENU.0, MENU.1);
}

fn main_menu_update(ctx: &mut FsmContext) -> Option<StateId> {
    let action = match ctx.input {
        HmiInput::Key(Key::OpenDoor) => MenuAction::OpenDoor,
        HmiInput::Key(Key::ChangePassword) => MenuAction::ChangePassword,
        HmiInput::Tick if ctx.lockout.is_locked() => return Some(StateId::Lockout),
        HmiInput::Key(Key::Clear) if !ctx.provisioned => {
            info!("HMI: no password acknowledged yet, back to setup");
            return Some(StateId::SetupEntry);
        }
        HmiInput::Byte(b) => {
            unsolicited_byte(ctx, b);
            return None;
        }
        _ => return None,
    };

    if let Err(e) = ctx.lockout.check_attempt() {
        warn!("HMI: {}", e);
        return Some(StateId::Lockout);
    }
    ctx.action = action;
    Some(StateId::VerifyEntry)
}

// ═══════════════════════════════════════════════════════════════════════════
//  VERIFY — current password before open / change
// ═══════════════════════════════════════════════════════════════════════════

fn verify_entry_enter(ctx: &mut FsmContext) {
    ctx.entry.clear();
    ctx.show(PROMPT_ENTER, "");
}

fn verify_entry_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.input == HmiInput::Tick && ctx.lockout.is_locked() {
        return Some(StateId::Lockout);
    }
    match edit_entry(ctx, PROMPT_ENTER) {
        EntryEdit::Editing => None,
        EntryEdit::Cancelled => Some(StateId::MainMenu),
        EntryEdit::Submitted => {
            if let Err(e) = ctx.lockout.check_attempt() {
                warn!("HMI: attempt refused, {}", e);
                return Some(StateId::Lockout);
            }
            // Short entries go out padded; they can only mismatch.
            let payload = ctx.entry.to_payload();
            ctx.entry.clear();
            ctx.begin_exchange(Request::Verify(payload));
            Some(StateId::AwaitingVerify)
        }
    }
}

fn awaiting_verify_update(ctx: &mut FsmContext) -> Option<StateId> {
    match drive_exchange(ctx)? {
        ExchangeEnd::Verdict(Verdict::Matched) => {
            // A match proves the Control node holds a password.
            ctx.provisioned = true;
            ctx.lockout.record_match();
            ctx.emit(AppEvent::Verified {
                verdict: Verdict::Matched,
                mismatches: 0,
            });
            match ctx.action {
                MenuAction::OpenDoor => Some(StateId::AwaitingDoorAck),
                MenuAction::ChangePassword => Some(StateId::ChangeEntry),
            }
        }
        ExchangeEnd::Verdict(Verdict::Mismatched) => {
            let outcome = ctx.lockout.record_mismatch();
            ctx.emit(AppEvent::Verified {
                verdict: Verdict::Mismatched,
                mismatches: ctx.lockout.mismatches(),
            });
            match outcome {
                MismatchOutcome::Retry { attempts_left } => {
                    info!("HMI: wrong password, {} attempts left", attempts_left);
                    ctx.show("Wrong password", "");
                    Some(StateId::MainMenu)
                }
                MismatchOutcome::LockedOut => Some(StateId::Lockout),
            }
        }
        ExchangeEnd::TimedOut => Some(link_error(ctx)),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  DOOR — open request and mirrored sequence
// ═══════════════════════════════════════════════════════════════════════════

/// Opened on entry: the verify exchange is torn down by its own exit.
fn door_ack_enter(ctx: &mut FsmContext) {
    ctx.begin_exchange(Request::OpenDoor);
}

fn awaiting_door_ack_update(ctx: &mut FsmContext) -> Option<StateId> {
    match drive_exchange(ctx)? {
        ExchangeEnd::Verdict(Verdict::Matched) => Some(StateId::DoorOpen),
        ExchangeEnd::Verdict(Verdict::Mismatched) => {
            warn!("HMI: control node refused to open the door");
            ctx.show("Door busy", "");
            Some(StateId::MainMenu)
        }
        ExchangeEnd::TimedOut => Some(link_error(ctx)),
    }
}

fn door_open_enter(ctx: &mut FsmContext) {
    match ctx.door.start() {
        Ok(phase) => {
            ctx.emit(AppEvent::DoorPhase(phase));
            ctx.show(phase.label(), "");
        }
        Err(busy) => warn!("HMI: door mirror already running ({:?})", busy.0),
    }
}

fn door_open_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.input {
        HmiInput::Tick => {
            let phase = ctx.door.on_tick()?;
            ctx.emit(AppEvent::DoorPhase(phase));
            if phase == DoorPhase::Closed {
                return Some(StateId::MainMenu);
            }
            ctx.show(phase.label(), "");
            None
        }
        HmiInput::Byte(b) => {
            unsolicited_byte(ctx, b);
            None
        }
        HmiInput::Key(k) => {
            debug!("HMI: key {:?} ignored while the door is moving", k);
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  CHANGE — new password after a successful verification
// ═══════════════════════════════════════════════════════════════════════════

fn change_entry_update(ctx: &mut FsmContext) -> Option<StateId> {
    first_entry_update(ctx, Some(StateId::MainMenu))
}

fn change_confirm_update(ctx: &mut FsmContext) -> Option<StateId> {
    match edit_entry(ctx, PROMPT_REENTER.0) {
        EntryEdit::Editing => None,
        EntryEdit::Cancelled => Some(StateId::MainMenu),
        EntryEdit::Submitted => {
            if !confirm_matches(ctx) {
                return None;
            }
            let payload = ctx.entry.to_payload();
            ctx.begin_exchange(Request::ChangePassword(payload));
            Some(StateId::AwaitingChangeAck)
        }
    }
}

fn awaiting_change_ack_update(ctx: &mut FsmContext) -> Option<StateId> {
    match drive_exchange(ctx)? {
        ExchangeEnd::Verdict(verdict) => {
            ctx.emit(AppEvent::PasswordAck {
                request: Opcode::ChangePassword,
                verdict,
            });
            match verdict {
                Verdict::Matched => ctx.show("Pass changed", ""),
                Verdict::Mismatched => ctx.show("Pass unchanged", ""),
            }
            Some(StateId::MainMenu)
        }
        ExchangeEnd::TimedOut => Some(link_error(ctx)),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  LOCKOUT — every user action refused until the budget elapses
// ═══════════════════════════════════════════════════════════════════════════

fn lockout_enter(ctx: &mut FsmContext) {
    ctx.emit(AppEvent::LockoutEngaged {
        ticks: ctx.lockout.remaining_ticks(),
    });
    ctx.show("ERROR! Locked", "");
}

fn lockout_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.input {
        HmiInput::Tick => {
            if ctx.lockout.on_tick() {
                ctx.emit(AppEvent::LockoutReleased);
                return Some(StateId::MainMenu);
            }
            // Entered without an active lockout: nothing to wait for.
            if !ctx.lockout.is_locked() {
                return Some(StateId::MainMenu);
            }
            None
        }
        HmiInput::Key(_) => {
            let remaining_ticks = ctx.lockout.remaining_ticks();
            ctx.emit(AppEvent::AttemptRefused { remaining_ticks });
            None
        }
        HmiInput::Byte(b) => {
            unsolicited_byte(ctx, b);
            None
        }
    }
}
