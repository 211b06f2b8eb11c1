//! Streaming request decoder (receiving side of the handshake).
//!
//! ```text
//!   Idle ──payload opcode──▶ ReadingPayload ──5 bytes──▶ Idle (Complete)
//!     │                      (caller answers READY_TO_RECEIVE first)
//!     └──bare opcode──▶ Idle (Complete)
//! ```
//!
//! Bytes are fed one at a time as the link delivers them, so a message
//! split across any number of reads decodes the same way.  Payload bytes
//! are taken raw; judging them is the caller's job.

use crate::config::PASSWORD_LEN;
use crate::credential::Payload;
use crate::error::ProtocolError;

use super::message::Message;
use super::opcode::Opcode;

/// Decoder state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    /// Waiting for an opcode byte.
    Idle,
    /// Opcode received, collecting its payload.
    ReadingPayload { opcode: Opcode, collected: usize },
}

/// What the caller should do after feeding a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStep {
    /// Mid-payload; nothing to do yet.
    Pending,
    /// A payload-bearing opcode arrived.  Answer `READY_TO_RECEIVE` now.
    NeedReady(Opcode),
    /// A full message is available.
    Complete(Message),
}

pub struct MessageDecoder {
    state: DecoderState,
    payload_buf: [u8; PASSWORD_LEN],
}

impl MessageDecoder {
    pub const fn new() -> Self {
        Self {
            state: DecoderState::Idle,
            payload_buf: [0; PASSWORD_LEN],
        }
    }

    /// Feed one received byte.
    ///
    /// An unknown byte in opcode position is reported and dropped; the
    /// decoder stays idle.
    pub fn feed(&mut self, byte: u8) -> Result<DecodeStep, ProtocolError> {
        match &mut self.state {
            DecoderState::Idle => {
                let opcode = Opcode::try_from(byte)?;
                if opcode.carries_payload() {
                    self.state = DecoderState::ReadingPayload {
                        opcode,
                        collected: 0,
                    };
                    Ok(DecodeStep::NeedReady(opcode))
                } else {
                    Message::bare(opcode)
                        .map(DecodeStep::Complete)
                        .ok_or(ProtocolError::BadLength {
                            opcode: byte,
                            len: 1,
                        })
                }
            }

            DecoderState::ReadingPayload { opcode, collected } => {
                self.payload_buf[*collected] = byte;
                *collected += 1;

                if *collected < PASSWORD_LEN {
                    return Ok(DecodeStep::Pending);
                }

                let opcode = *opcode;
                self.state = DecoderState::Idle;
                Message::with_payload(opcode, Payload(self.payload_buf))
                    .map(DecodeStep::Complete)
                    .ok_or(ProtocolError::BadLength {
                        opcode: opcode as u8,
                        len: 1 + PASSWORD_LEN,
                    })
            }
        }
    }

    /// Opcode whose payload is being collected, if any.
    pub fn awaiting_payload(&self) -> Option<Opcode> {
        match self.state {
            DecoderState::Idle => None,
            DecoderState::ReadingPayload { opcode, .. } => Some(opcode),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == DecoderState::Idle
    }

    /// Drop any half-received message (e.g. after a payload timeout).
    pub fn reset(&mut self) {
        self.state = DecoderState::Idle;
    }
}

impl Default for MessageDecoder {
    fn default() -> Self {
        Self::new()
    }
}
