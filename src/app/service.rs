//! HMI application service — the hexagonal core of the keypad node.
//!
//! [`HmiService`] owns the FSM and its context.  It exposes a clean,
//! hardware-agnostic API.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!     Keypad ──▶ ┌────────────────────────┐ ──▶ Display
//!                │       HmiService       │
//!   Link (rx) ──▶│  FSM · Exchange · Lock │ ──▶ Link (tx)
//!                └────────────────────────┘ ──▶ EventSink
//! ```

use log::info;

use crate::config::SystemConfig;
use crate::credential::Key;
use crate::error::{LinkError, Result};
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::protocol::transport::{send_all, Link};

use super::events::AppEvent;
use super::input::HmiInput;
use super::ports::{Display, EventSink, Keypad};

// ───────────────────────────────────────────────────────────────
// HmiService
// ───────────────────────────────────────────────────────────────

pub struct HmiService {
    fsm: Fsm,
    ctx: FsmContext,
    ticks: u64,
}

impl HmiService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::SetupEntry);
        Self { fsm, ctx, ticks: 0 }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start at the first-password prompt.
    ///
    /// The HMI never stores the credential; every boot begins with setup,
    /// and the Control node refuses a second `SET_PASSWORD`.
    pub fn start(&mut self, display: &mut impl Display, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("HmiService started in {:?}", self.fsm.current_state());
        self.flush_screens(display);
        self.flush_events(sink);
    }

    // ── Input handling ────────────────────────────────────────

    /// Deliver one input to the FSM and flush everything it produced.
    pub fn handle<L: Link>(
        &mut self,
        input: HmiInput,
        link: &mut L,
        display: &mut impl Display,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if input == HmiInput::Tick {
            self.ticks += 1;
        }
        let prev_state = self.fsm.current_state();

        self.ctx.input = input;
        self.fsm.dispatch(&mut self.ctx);

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            self.ctx.emit(AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }

        let sent = self.flush_outbox(link);
        self.flush_screens(display);
        self.flush_events(sink);
        sent.map_err(Into::into)
    }

    pub fn handle_key<L: Link>(
        &mut self,
        key: Key,
        link: &mut L,
        display: &mut impl Display,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.handle(HmiInput::Key(key), link, display, sink)
    }

    pub fn on_tick<L: Link>(
        &mut self,
        link: &mut L,
        display: &mut impl Display,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.handle(HmiInput::Tick, link, display, sink)
    }

    /// One foreground iteration: drain received bytes, read at most one key
    /// press, then replay `ticks` accrued timer ticks.
    ///
    /// The keypad is not scanned while a request is outstanding; presses
    /// stay with the keypad until the node is back at a prompt.
    pub fn poll<L: Link>(
        &mut self,
        ticks: u32,
        keypad: &mut impl Keypad,
        link: &mut L,
        display: &mut impl Display,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        while let Some(byte) = link.read_byte().map_err(|_| LinkError::ReadFailed)? {
            self.handle(HmiInput::Byte(byte), link, display, sink)?;
        }
        if !self.fsm.current_state().is_awaiting_response() {
            if let Some(key) = keypad.poll_key() {
                self.handle(HmiInput::Key(key), link, display, sink)?;
            }
        }
        for _ in 0..ticks {
            self.handle(HmiInput::Tick, link, display, sink)?;
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Idle at a prompt with nothing outstanding on the link.
    pub fn is_awaiting_input(&self) -> bool {
        self.fsm.current_state().is_prompt() && self.ctx.exchange.is_none()
    }

    /// Consecutive mismatches seen by the local lockout policy.
    pub fn mismatches(&self) -> u8 {
        self.ctx.lockout.mismatches()
    }

    pub fn is_locked_out(&self) -> bool {
        self.ctx.lockout.is_locked()
    }

    /// Timer ticks delivered since construction.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn flush_outbox<L: Link>(&mut self, link: &mut L) -> core::result::Result<(), LinkError> {
        if self.ctx.outbox.is_empty() {
            return Ok(());
        }
        let result = send_all(link, &self.ctx.outbox);
        self.ctx.outbox.clear();
        result
    }

    fn flush_screens(&mut self, display: &mut impl Display) {
        for screen in &self.ctx.screens {
            display.show(&screen.top, &screen.bottom);
        }
        self.ctx.screens.clear();
    }

    fn flush_events(&mut self, sink: &mut impl EventSink) {
        for event in &self.ctx.events {
            sink.emit(event);
        }
        self.ctx.events.clear();
    }
}
