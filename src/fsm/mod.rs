//! Function-pointer finite state machine engine for the HMI node.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  StateTable                                                   │
//! │  ┌──────────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ StateId      │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├──────────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ SetupEntry   │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ MainMenu     │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ AwaitingX    │ -         │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Lockout      │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ ...          │           │          │                   │  │
//! │  └──────────────┴───────────┴──────────┴───────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each input (key, link byte or tick) is placed in the context and the
//! engine calls `on_update` for the **current** state.  If it returns
//! `Some(next_id)`, the engine runs `on_exit` for the current state, then
//! `on_enter` for the next, and updates the current pointer.  All functions
//! receive `&mut FsmContext`, which holds the input, the entry buffers,
//! the running exchange, the lockout policy and the outgoing bytes.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all HMI states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    /// First password entry on an unprovisioned system.
    SetupEntry = 0,
    /// Re-entry of the first password.
    SetupConfirm = 1,
    /// `SET_PASSWORD` in flight.
    AwaitingSetAck = 2,
    /// "+ : Open Door / - : Change Pass".
    MainMenu = 3,
    /// Current password entry before open/change.
    VerifyEntry = 4,
    /// `SEND_PASSWORD` in flight.
    AwaitingVerify = 5,
    /// `OPEN_DOOR` in flight.
    AwaitingDoorAck = 6,
    /// New password entry after a successful verification.
    ChangeEntry = 7,
    /// Re-entry of the new password.
    ChangeConfirm = 8,
    /// `CHANGE_PASSWORD` in flight.
    AwaitingChangeAck = 9,
    /// Door sequence running; input ignored.
    DoorOpen = 10,
    /// Too many mismatches; input refused.
    Lockout = 11,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 12;

    /// States with a request outstanding on the link.
    pub fn is_awaiting_response(self) -> bool {
        matches!(
            self,
            Self::AwaitingSetAck
                | Self::AwaitingVerify
                | Self::AwaitingDoorAck
                | Self::AwaitingChangeAck
        )
    }

    /// States that sit at a prompt waiting for the user.
    pub fn is_prompt(self) -> bool {
        matches!(
            self,
            Self::SetupEntry
                | Self::SetupConfirm
                | Self::MainMenu
                | Self::VerifyEntry
                | Self::ChangeEntry
                | Self::ChangeConfirm
        )
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-input update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]); the mutable
/// [`FsmContext`] is threaded through every handler call by the owner.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `dispatch()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Deliver the input currently stored in `ctx` to the active state.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn dispatch(&mut self, ctx: &mut FsmContext) {
        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        self.table[self.current].id
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        // Exit current state
        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        // Enter new state
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
