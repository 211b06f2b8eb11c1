//! Property and fuzz-style tests for robustness of the protocol and policy
//! cores.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32 targets.
//! On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use doorlock::adapters::memory_link::MemoryLink;
use doorlock::app::events::AppEvent;
use doorlock::app::ports::{Buzzer, CredentialStore, DoorActuator, EventSink, StorageError};
use doorlock::config::SystemConfig;
use doorlock::control::ControlService;
use doorlock::credential::{Candidate, Credential, Payload};
use doorlock::door::{DoorSequence, MotorCommand};
use doorlock::lockout::{LockoutPolicy, MismatchOutcome};
use doorlock::protocol::{DecodeStep, Link, Message, MessageDecoder};
use proptest::prelude::*;

// ── Minimal ports ─────────────────────────────────────────────

#[derive(Default)]
struct Slot(Option<Credential>);

impl CredentialStore for Slot {
    fn read(&self) -> Result<Option<Credential>, StorageError> {
        Ok(self.0)
    }

    fn write(&mut self, c: &Credential) -> Result<(), StorageError> {
        self.0 = Some(*c);
        Ok(())
    }
}

struct Pins;

impl DoorActuator for Pins {
    fn set_motor(&mut self, _: MotorCommand) {}
}

impl Buzzer for Pins {
    fn set_buzzer(&mut self, _: bool) {}
}

struct Quiet;

impl EventSink for Quiet {
    fn emit(&mut self, _: &AppEvent) {}
}

fn digits() -> impl Strategy<Value = [u8; 5]> {
    proptest::array::uniform5(b'0'..=b'9')
}

// ── Decoder ───────────────────────────────────────────────────

proptest! {
    /// Arbitrary bytes never panic the decoder, and every completed
    /// message re-encodes to exactly the bytes that produced it.
    #[test]
    fn decoder_completes_only_what_was_sent(
        bytes in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut dec = MessageDecoder::new();
        let mut start = 0;
        for (i, &b) in bytes.iter().enumerate() {
            match dec.feed(b) {
                Ok(DecodeStep::NeedReady(_)) => start = i,
                Ok(DecodeStep::Complete(msg)) => {
                    let from = if msg.payload().is_some() { start } else { i };
                    let encoded = msg.encode();
                    prop_assert_eq!(encoded.as_slice(), &bytes[from..=i]);
                }
                Ok(DecodeStep::Pending) | Err(_) => {}
            }
        }
    }

    #[test]
    fn payload_messages_decode_whole(op in prop_oneof![Just(0xD3u8), Just(0xD7), Just(0xC1)], p in digits()) {
        let mut bytes = vec![op];
        bytes.extend_from_slice(&p);
        let msg = Message::decode(&bytes).unwrap();
        prop_assert_eq!(msg.payload(), Some(&Payload(p)));
    }
}

// ── Credentials ───────────────────────────────────────────────

proptest! {
    /// However many digits are typed, at most five are kept and the wire
    /// form is always five bytes.
    #[test]
    fn candidate_never_exceeds_five(typed in proptest::collection::vec(0u8..10, 0..20)) {
        let mut c = Candidate::new();
        for d in &typed {
            c.push_digit(*d);
        }
        prop_assert_eq!(c.len(), typed.len().min(5));
        prop_assert_eq!(c.to_payload().as_bytes().len(), 5);
    }

    /// Only a complete, identical entry matches.
    #[test]
    fn only_identical_entries_match(stored in digits(), typed in proptest::collection::vec(0u8..10, 0..6)) {
        let cred = Credential::try_from(Payload(stored)).unwrap();
        let mut c = Candidate::new();
        for d in &typed {
            c.push_digit(*d);
        }
        let typed_ascii: Vec<u8> = typed.iter().take(5).map(|d| b'0' + d).collect();
        let expected = typed_ascii.as_slice() == stored.as_slice();
        prop_assert_eq!(cred.matches(&c.to_payload()), expected);
    }
}

// ── Policies ──────────────────────────────────────────────────

proptest! {
    /// The counter never passes the threshold and a lockout happens exactly
    /// when it is reached.
    #[test]
    fn lockout_tracks_threshold(
        threshold in 1u8..6,
        outcomes in proptest::collection::vec(any::<bool>(), 0..40),
    ) {
        let config = SystemConfig { mismatch_threshold: threshold, ..SystemConfig::default() };
        let mut policy = LockoutPolicy::new(&config);
        let mut run = 0u8;
        for matched in outcomes {
            if policy.is_locked() {
                break;
            }
            if matched {
                policy.record_match();
                run = 0;
            } else {
                run += 1;
                let outcome = policy.record_mismatch();
                prop_assert_eq!(outcome == MismatchOutcome::LockedOut, run >= threshold);
            }
            prop_assert!(policy.mismatches() <= threshold);
            prop_assert_eq!(policy.is_locked(), run >= threshold);
        }
    }

    /// A door cycle always lasts exactly two motor runs plus the hold.
    #[test]
    fn door_cycle_length(motor in 1u32..50, hold in 0u32..20) {
        let config = SystemConfig { motor_ticks: motor, hold_ticks: hold, ..SystemConfig::default() };
        let mut door = DoorSequence::new(&config);
        door.start().unwrap();
        let mut ticks = 0;
        while door.is_active() {
            door.on_tick();
            ticks += 1;
            prop_assert!(ticks <= 2 * motor + hold);
        }
        prop_assert_eq!(ticks, config.door_cycle_ticks());
    }
}

// ── Control node ──────────────────────────────────────────────

proptest! {
    /// Arbitrary traffic never panics the Control node, every reply is
    /// READY or a two-byte status, and nothing but digits is ever stored.
    #[test]
    fn control_survives_arbitrary_traffic(
        bytes in proptest::collection::vec(any::<u8>(), 0..200),
    ) {
        let (mut peer, mut end) = MemoryLink::pair();
        let mut control = ControlService::new(SystemConfig::default());
        let mut slot = Slot::default();
        control.start(&slot, &mut Pins, &mut Quiet).unwrap();

        for chunk in bytes.chunks(8) {
            peer.write(chunk).unwrap();
            control.poll(1, &mut end, &mut slot, &mut Pins, &mut Quiet).unwrap();

            let mut reply = Vec::new();
            while let Ok(Some(b)) = peer.read_byte() {
                reply.push(b);
            }
            let mut rest = reply.as_slice();
            while let Some((&first, tail)) = rest.split_first() {
                match first {
                    0xAA => rest = tail,
                    0xC6 => {
                        prop_assert!(matches!(tail.first(), Some(0xE8 | 0xE2)));
                        rest = &tail[1..];
                    }
                    other => prop_assert!(false, "unexpected reply byte 0x{:02X}", other),
                }
            }
        }

        if let Some(c) = slot.0 {
            prop_assert!(c.as_bytes().iter().all(u8::is_ascii_digit));
        }
    }
}
