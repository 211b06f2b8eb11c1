//! HMI-side request/response exchange.
//!
//! One `Exchange` covers one request and its complete response.  The HMI
//! holds at most one at a time (no pipelining).
//!
//! ```text
//!  payload requests:  AwaitingReady ──READY──▶ AwaitingStatus ──STATUS──▶ AwaitingVerdict ──E8/E2──▶ Done
//!                     (payload is sent on the READY edge)
//!  OPEN_DOOR:                                  AwaitingStatus ──STATUS──▶ AwaitingVerdict ──E8/E2──▶ Done
//! ```
//!
//! Every tick spent waiting counts against the response budget; any
//! expected byte restarts it.

use crate::credential::Payload;
use crate::error::ProtocolError;

use super::message::{Message, Verdict};
use super::opcode::Opcode;

/// What the HMI is asking the Control node for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    SetPassword(Payload),
    Verify(Payload),
    ChangePassword(Payload),
    OpenDoor,
}

impl Request {
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::SetPassword(_) => Opcode::SetPassword,
            Self::Verify(_) => Opcode::SendPassword,
            Self::ChangePassword(_) => Opcode::ChangePassword,
            Self::OpenDoor => Opcode::OpenDoor,
        }
    }

    fn payload(&self) -> Option<Payload> {
        match self {
            Self::SetPassword(p) | Self::Verify(p) | Self::ChangePassword(p) => Some(*p),
            Self::OpenDoor => None,
        }
    }
}

impl From<Request> for Message {
    fn from(r: Request) -> Self {
        match r {
            Request::SetPassword(p) => Self::SetPassword(p),
            Request::Verify(p) => Self::SendPassword(p),
            Request::ChangePassword(p) => Self::ChangePassword(p),
            Request::OpenDoor => Self::OpenDoor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    AwaitingReady,
    AwaitingStatus,
    AwaitingVerdict,
    Done(Verdict),
}

impl Stage {
    fn expected(self) -> &'static str {
        match self {
            Self::AwaitingReady => "READY_TO_RECEIVE",
            Self::AwaitingStatus => "SENDING_STATUS",
            Self::AwaitingVerdict => "PASSWORDS_ARE_MATCHED/MISMATCHED",
            Self::Done(_) => "nothing",
        }
    }
}

/// Progress reported by [`Exchange::on_byte`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeStep {
    /// Still waiting for more response bytes.
    Pending,
    /// The peer is ready: transmit these payload bytes now.
    SendPayload(Payload),
    /// Final verdict received; the exchange is over.
    Complete(Verdict),
}

#[derive(Debug, Clone)]
pub struct Exchange {
    request: Request,
    stage: Stage,
    waited_ticks: u32,
}

impl Exchange {
    /// Open an exchange.  The caller transmits [`opening_byte`](Self::opening_byte).
    pub fn begin(request: Request) -> Self {
        let stage = if request.payload().is_some() {
            Stage::AwaitingReady
        } else {
            Stage::AwaitingStatus
        };
        Self {
            request,
            stage,
            waited_ticks: 0,
        }
    }

    pub fn opening_byte(&self) -> u8 {
        self.request.opcode() as u8
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Feed one byte from the Control node.
    ///
    /// A byte that does not fit the current stage is reported and the
    /// exchange keeps waiting; only the tick budget abandons it.
    pub fn on_byte(&mut self, byte: u8) -> Result<ExchangeStep, ProtocolError> {
        let op = Opcode::try_from(byte)?;
        let unexpected = ProtocolError::UnexpectedByte {
            got: byte,
            expected: self.stage.expected(),
        };

        let step = match (self.stage, op) {
            (Stage::AwaitingReady, Opcode::ReadyToReceive) => {
                self.stage = Stage::AwaitingStatus;
                let payload = self.request.payload().ok_or(unexpected)?;
                ExchangeStep::SendPayload(payload)
            }
            (Stage::AwaitingStatus, Opcode::SendingStatus) => {
                self.stage = Stage::AwaitingVerdict;
                ExchangeStep::Pending
            }
            (Stage::AwaitingVerdict, _) => {
                let verdict = Verdict::from_opcode(op).ok_or(unexpected)?;
                self.stage = Stage::Done(verdict);
                ExchangeStep::Complete(verdict)
            }
            _ => return Err(unexpected),
        };
        self.waited_ticks = 0;
        Ok(step)
    }

    /// Count one tick of waiting.  `timeout_ticks == 0` waits forever.
    pub fn on_tick(&mut self, timeout_ticks: u32) -> Result<(), ProtocolError> {
        if self.is_done() {
            return Ok(());
        }
        self.waited_ticks = self.waited_ticks.saturating_add(1);
        if timeout_ticks != 0 && self.waited_ticks >= timeout_ticks {
            return Err(ProtocolError::ResponseTimeout {
                ticks: self.waited_ticks,
            });
        }
        Ok(())
    }

    pub fn is_done(&self) -> bool {
        matches!(self.stage, Stage::Done(_))
    }

    pub fn verdict(&self) -> Option<Verdict> {
        match self.stage {
            Stage::Done(v) => Some(v),
            _ => None,
        }
    }
}
