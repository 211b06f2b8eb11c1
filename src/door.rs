//! Door timing engine.
//!
//! ```text
//!  Closed ──start──▶ Unlocking ──motor_ticks──▶ Open ──hold_ticks──▶ Locking ──motor_ticks──▶ Closed
//!                    motor fwd                  motor off            motor rev
//! ```
//!
//! Purely tick-counted: each phase owns an elapsed counter that restarts at
//! zero on entry.  A running sequence cannot be cancelled or restarted.
//! Both nodes run one: the Control node to drive the motor, the HMI node to
//! drive its status screen.

use crate::config::SystemConfig;

/// H-bridge command derived from the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCommand {
    Stop,
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorPhase {
    Closed,
    Unlocking,
    Open,
    Locking,
}

impl DoorPhase {
    pub fn motor_command(self) -> MotorCommand {
        match self {
            Self::Unlocking => MotorCommand::Forward,
            Self::Locking => MotorCommand::Reverse,
            Self::Closed | Self::Open => MotorCommand::Stop,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Closed => "Door is Closed",
            Self::Unlocking => "Door is Unlocking",
            Self::Open => "Door is Open",
            Self::Locking => "Door is Locking",
        }
    }
}

/// Returned by [`DoorSequence::start`] while a sequence is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorBusy(pub DoorPhase);

/// One unlock/hold/lock cycle, advanced once per tick.
#[derive(Debug, Clone)]
pub struct DoorSequence {
    phase: DoorPhase,
    elapsed: u32,
    motor_ticks: u32,
    hold_ticks: u32,
}

impl DoorSequence {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            phase: DoorPhase::Closed,
            elapsed: 0,
            motor_ticks: config.motor_ticks,
            hold_ticks: config.hold_ticks,
        }
    }

    /// Begin unlocking.  Rejected while a previous cycle is still running.
    pub fn start(&mut self) -> Result<DoorPhase, DoorBusy> {
        if self.is_active() {
            return Err(DoorBusy(self.phase));
        }
        self.enter(DoorPhase::Unlocking);
        Ok(self.phase)
    }

    /// Count one tick.  Returns the new phase when a phase boundary is
    /// crossed (`Closed` marks the end of the cycle).
    pub fn on_tick(&mut self) -> Option<DoorPhase> {
        if !self.is_active() {
            return None;
        }
        self.elapsed += 1;

        let next = match self.phase {
            DoorPhase::Unlocking if self.elapsed >= self.motor_ticks => {
                if self.hold_ticks == 0 {
                    DoorPhase::Locking
                } else {
                    DoorPhase::Open
                }
            }
            DoorPhase::Open if self.elapsed >= self.hold_ticks => DoorPhase::Locking,
            DoorPhase::Locking if self.elapsed >= self.motor_ticks => DoorPhase::Closed,
            _ => return None,
        };
        self.enter(next);
        Some(next)
    }

    pub fn phase(&self) -> DoorPhase {
        self.phase
    }

    /// Ticks spent in the current phase.
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn is_active(&self) -> bool {
        self.phase != DoorPhase::Closed
    }

    fn enter(&mut self, phase: DoorPhase) {
        self.phase = phase;
        self.elapsed = 0;
    }
}
