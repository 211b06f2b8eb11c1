//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  Both nodes run on the host over the in-memory
//! link; no real hardware required.

#![cfg(not(target_os = "espidf"))]

mod control_wire_tests;
mod lockout_tests;
mod mock_hw;
mod session_tests;
