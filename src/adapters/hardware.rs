//! Hardware adapter — bridges the Control node's actuators to port traits.
//!
//! Owns the motor and buzzer drivers and exposes them through
//! [`DoorActuator`] and [`Buzzer`].  Pin failures are logged and swallowed:
//! the ports have no feedback channel and the door timing continues
//! regardless.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::{Buzzer, DoorActuator};
use crate::door::MotorCommand;
use crate::drivers::buzzer::BuzzerDriver;
use crate::drivers::motor::MotorDriver;

/// Concrete adapter that combines the Control node's outputs.
pub struct ControlHardware<P: OutputPin> {
    motor: MotorDriver<P>,
    buzzer: BuzzerDriver<P>,
}

impl<P: OutputPin> ControlHardware<P> {
    pub fn new(motor: MotorDriver<P>, buzzer: BuzzerDriver<P>) -> Self {
        Self { motor, buzzer }
    }

    pub fn motor(&self) -> MotorCommand {
        self.motor.state()
    }

    pub fn is_buzzing(&self) -> bool {
        self.buzzer.is_on()
    }
}

// ── DoorActuator implementation ───────────────────────────────

impl<P: OutputPin> DoorActuator for ControlHardware<P> {
    fn set_motor(&mut self, cmd: MotorCommand) {
        if let Err(e) = self.motor.set(cmd) {
            warn!("motor {:?} failed: {:?}", cmd, e);
        }
    }
}

// ── Buzzer implementation ─────────────────────────────────────

impl<P: OutputPin> Buzzer for ControlHardware<P> {
    fn set_buzzer(&mut self, on: bool) {
        if let Err(e) = self.buzzer.set(on) {
            warn!("buzzer {} failed: {:?}", on, e);
        }
    }
}

// ── Simulation pin ────────────────────────────────────────────

/// Output pin that only remembers its level.  Stands in for GPIO on the
/// host.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct SimPin {
    high: bool,
}

#[cfg(not(target_os = "espidf"))]
impl SimPin {
    pub fn is_high(&self) -> bool {
        self.high
    }
}

#[cfg(not(target_os = "espidf"))]
impl embedded_hal::digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

#[cfg(not(target_os = "espidf"))]
impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

/// Motor and buzzer wired to simulated pins.
#[cfg(not(target_os = "espidf"))]
pub fn simulated() -> ControlHardware<SimPin> {
    let Ok(motor) = MotorDriver::new(SimPin::default(), SimPin::default());
    let Ok(buzzer) = BuzzerDriver::new(SimPin::default());
    ControlHardware::new(motor, buzzer)
}
