//! Fuzz target: `MessageDecoder::feed`
//!
//! Drives arbitrary byte sequences into the streaming request decoder and
//! asserts that it never panics, that every completed message encodes to
//! at most six bytes, and that a reset always returns it to idle.
//!
//! cargo fuzz run fuzz_message_decoder

#![no_main]

use doorlock::protocol::{DecodeStep, Message, MessageDecoder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = MessageDecoder::new();

    for &b in data {
        if let Ok(DecodeStep::Complete(msg)) = decoder.feed(b) {
            let bytes = msg.encode();
            assert!(bytes.len() <= 6, "message longer than opcode + payload");
            assert_eq!(Message::decode(&bytes), Ok(msg));
        }
    }

    decoder.reset();
    assert!(decoder.is_idle());

    // Whole-buffer decoding must agree on length rules and never panic.
    let _ = Message::decode(data);
});
