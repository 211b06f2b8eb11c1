//! Application core — pure domain logic, zero I/O.
//!
//! Business rules for both nodes: the HMI service (UI flow and the
//! client side of the protocol) and the Control service (credential
//! ownership, door actuation, alarm).  All interaction with hardware
//! happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals.

pub mod events;
pub mod input;
pub mod ports;
pub mod service;
