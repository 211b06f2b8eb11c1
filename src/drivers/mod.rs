//! Actuator drivers and the tick timer.

pub mod buzzer;
pub mod hw_timer;
pub mod motor;
