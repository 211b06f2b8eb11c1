//! Control node: credential owner, door actuator, alarm.

pub mod service;

pub use service::ControlService;
