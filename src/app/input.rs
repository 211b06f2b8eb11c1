//! Inbound stimuli for the HMI service.
//!
//! Everything that can move the HMI state machine arrives as one of
//! these: a key press, a byte from the Control node, or one timer tick.

use crate::credential::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HmiInput {
    Key(Key),
    Byte(u8),
    Tick,
}
