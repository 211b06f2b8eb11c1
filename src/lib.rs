//! Door locker firmware library.
//!
//! Two nodes share this crate: the HMI ECU (keypad + LCD, drives the
//! dialogue) and the Control ECU (credential store, door motor, alarm).
//! All protocol and state logic is pure and host-testable; ESP-IDF code is
//! guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod credential;
pub mod door;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod lockout;
pub mod pins;
pub mod protocol;
pub mod tick;
