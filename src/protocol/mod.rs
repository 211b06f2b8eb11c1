//! Door-lock wire protocol.
//!
//! Single-byte opcodes over a byte-oriented serial link.  No length
//! prefixes, checksums or delimiters: the opcode alone fixes the shape of
//! what follows.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Protocol stack                        │
//! │                                                              │
//! │  HMI node                               Control node         │
//! │  ┌──────────┐    opcode ──▶             ┌───────────────┐   │
//! │  │ Exchange │    ◀── READY_TO_RECEIVE   │ MessageDecoder│   │
//! │  │ (client) │    payload (5 B) ──▶      │ (server)      │   │
//! │  └──────────┘    ◀── SENDING_STATUS     └───────────────┘   │
//! │       │          ◀── MATCHED/MISMATCHED         │           │
//! │       ▼                                         ▼           │
//! │  ┌──────────┐                             ┌──────────┐      │
//! │  │   Link   │ ◀──────── UART ───────────▶ │   Link   │      │
//! │  └──────────┘                             └──────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A payload byte is never sent before the receiver has answered with
//! `READY_TO_RECEIVE`.

pub mod decoder;
pub mod exchange;
pub mod message;
pub mod opcode;
pub mod transport;

pub use decoder::{DecodeStep, MessageDecoder};
pub use exchange::{Exchange, ExchangeStep, Request};
pub use message::{Message, Verdict};
pub use opcode::Opcode;
pub use transport::{Link, NullLink};
