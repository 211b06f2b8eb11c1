//! Door lock motor driver (L293D-style H-bridge).
//!
//! Two direction inputs, no PWM: the lock bolt is either driven open,
//! driven closed, or left idle.
//!
//! | Command | IN1 | IN2 |
//! |---------|-----|-----|
//! | Stop    |  0  |  0  |
//! | Forward |  1  |  0  |
//! | Reverse |  0  |  1  |
//!
//! ## Dual-target design
//!
//! Generic over `embedded_hal::digital::OutputPin`: ESP-IDF `PinDriver`s on
//! the board, simulated pins on the host.  The driver is a dumb actuator;
//! sequencing belongs to the door timing engine.

use embedded_hal::digital::OutputPin;

use crate::door::MotorCommand;

pub struct MotorDriver<P: OutputPin> {
    in1: P,
    in2: P,
    state: MotorCommand,
}

impl<P: OutputPin> MotorDriver<P> {
    /// Take ownership of both inputs and park the motor.
    pub fn new(in1: P, in2: P) -> Result<Self, P::Error> {
        let mut m = Self {
            in1,
            in2,
            state: MotorCommand::Stop,
        };
        m.set(MotorCommand::Stop)?;
        Ok(m)
    }

    pub fn set(&mut self, cmd: MotorCommand) -> Result<(), P::Error> {
        // Drop both lines first so the bridge never sees IN1 = IN2 = 1.
        self.in1.set_low()?;
        self.in2.set_low()?;
        match cmd {
            MotorCommand::Stop => {}
            MotorCommand::Forward => self.in1.set_high()?,
            MotorCommand::Reverse => self.in2.set_high()?,
        }
        self.state = cmd;
        Ok(())
    }

    pub fn state(&self) -> MotorCommand {
        self.state
    }
}
