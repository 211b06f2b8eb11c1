//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It holds the input being dispatched, the entry buffers, the
//! outstanding exchange, the lockout policy, the mirrored door sequence
//! and the outputs (link bytes, screens, events) that the owning service
//! flushes after each dispatch.  Think of it as the "blackboard" in a
//! blackboard architecture.

use heapless::{String, Vec};
use log::warn;

use crate::app::events::AppEvent;
use crate::app::input::HmiInput;
use crate::config::SystemConfig;
use crate::credential::Candidate;
use crate::door::DoorSequence;
use crate::lockout::LockoutPolicy;
use crate::protocol::{Exchange, Request};

/// Character columns on the display.
pub const LCD_COLS: usize = 16;

const OUTBOX_CAP: usize = 16;
const SCREEN_QUEUE: usize = 4;
const EVENT_QUEUE: usize = 8;

// ---------------------------------------------------------------------------
// Display frame
// ---------------------------------------------------------------------------

/// One full two-line screen, truncated to the display width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub top: String<LCD_COLS>,
    pub bottom: String<LCD_COLS>,
}

impl Screen {
    pub fn new(top: &str, bottom: &str) -> Self {
        Self {
            top: fit(top),
            bottom: fit(bottom),
        }
    }
}

fn fit(s: &str) -> String<LCD_COLS> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Menu selection
// ---------------------------------------------------------------------------

/// What the user asked for from the main menu; decides where a successful
/// verification leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    OpenDoor,
    ChangePassword,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

pub struct FsmContext {
    pub config: SystemConfig,

    /// Input being dispatched.
    pub input: HmiInput,

    /// Digits typed at the current prompt.
    pub entry: Candidate,
    /// First pass of a set/change, kept for the confirmation compare.
    pub first_entry: Option<Candidate>,
    pub action: MenuAction,

    /// Request in flight, if any.
    pub exchange: Option<Exchange>,
    /// Verification abandoned on timeout whose verdict may still arrive.
    pub late_verify: Option<Exchange>,
    pub lockout: LockoutPolicy,
    /// Display-side mirror of the Control node's door cycle.
    pub door: DoorSequence,
    /// Set once the Control node has accepted a `SET_PASSWORD` or matched a
    /// verification.
    pub provisioned: bool,

    // --- Outputs, drained by the service after every dispatch ---
    pub outbox: Vec<u8, OUTBOX_CAP>,
    pub screens: Vec<Screen, SCREEN_QUEUE>,
    pub events: Vec<AppEvent, EVENT_QUEUE>,
}

impl FsmContext {
    pub fn new(config: SystemConfig) -> Self {
        let lockout = LockoutPolicy::new(&config);
        let door = DoorSequence::new(&config);
        Self {
            config,
            input: HmiInput::Tick,
            entry: Candidate::new(),
            first_entry: None,
            action: MenuAction::OpenDoor,
            exchange: None,
            late_verify: None,
            lockout,
            door,
            provisioned: false,
            outbox: Vec::new(),
            screens: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Queue bytes for the link.
    pub fn send(&mut self, bytes: &[u8]) {
        if self.outbox.extend_from_slice(bytes).is_err() {
            warn!("HMI outbox full, dropped {} bytes", bytes.len());
        }
    }

    /// Queue a screen.  When the queue is full the newest screen replaces
    /// the last queued one, so the display always ends on the latest frame.
    pub fn show(&mut self, top: &str, bottom: &str) {
        let screen = Screen::new(top, bottom);
        if let Err(screen) = self.screens.push(screen) {
            if let Some(last) = self.screens.last_mut() {
                *last = screen;
            }
        }
    }

    pub fn emit(&mut self, event: AppEvent) {
        if self.events.push(event).is_err() {
            warn!("HMI event queue full, dropped {:?}", event);
        }
    }

    /// Open a request and queue its opcode.
    pub fn begin_exchange(&mut self, request: Request) {
        let exchange = Exchange::begin(request);
        self.late_verify = None;
        self.send(&[exchange.opening_byte()]);
        self.exchange = Some(exchange);
    }

    /// Redraw the entry line: one `*` per typed digit.
    pub fn echo_entry(&mut self, prompt: &str) {
        let mut stars: String<LCD_COLS> = String::new();
        for _ in 0..self.entry.len() {
            let _ = stars.push('*');
        }
        self.show(prompt, &stars);
    }
}
