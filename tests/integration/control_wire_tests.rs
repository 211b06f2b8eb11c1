//! Control node driven byte by byte, the way a UART peer would.

use doorlock::adapters::memory_link::MemoryLink;
use doorlock::app::events::AppEvent;
use doorlock::config::SystemConfig;
use doorlock::control::ControlService;
use doorlock::credential::Credential;
use doorlock::door::MotorCommand;
use doorlock::protocol::Link;

use crate::mock_hw::{EventLog, MockHardware, MockStore};

struct Wire {
    control: ControlService,
    ctrl_end: MemoryLink,
    peer: MemoryLink,
    store: MockStore,
    hw: MockHardware,
    events: EventLog,
}

impl Wire {
    fn new(stored: Option<&str>) -> Self {
        let (peer, ctrl_end) = MemoryLink::pair();
        let store = MockStore {
            credential: stored.and_then(Credential::parse),
            ..MockStore::default()
        };
        let mut wire = Self {
            control: ControlService::new(SystemConfig::default()),
            ctrl_end,
            peer,
            store,
            hw: MockHardware::default(),
            events: EventLog::default(),
        };
        wire.control
            .start(&wire.store, &mut wire.hw, &mut wire.events)
            .unwrap();
        wire
    }

    /// Write `bytes` as the HMI, let the Control node run, return its reply.
    fn send(&mut self, bytes: &[u8]) -> Vec<u8> {
        assert_eq!(self.peer.write(bytes), Ok(bytes.len()));
        self.control
            .poll(0, &mut self.ctrl_end, &mut self.store, &mut self.hw, &mut self.events)
            .unwrap();
        let mut reply = Vec::new();
        while let Ok(Some(b)) = self.peer.read_byte() {
            reply.push(b);
        }
        reply
    }

    fn request(&mut self, opcode: u8, payload: &[u8]) -> Vec<u8> {
        assert_eq!(self.send(&[opcode]), vec![0xAA]);
        self.send(payload)
    }

    fn tick(&mut self, n: u32) {
        self.control
            .poll(n, &mut self.ctrl_end, &mut self.store, &mut self.hw, &mut self.events)
            .unwrap();
    }
}

#[test]
fn matching_password_is_acknowledged() {
    let mut w = Wire::new(Some("13579"));
    assert_eq!(w.request(0xD7, b"13579"), vec![0xC6, 0xE8]);
}

#[test]
fn set_on_blank_store_creates_the_credential() {
    let mut w = Wire::new(None);
    assert!(w.events.contains(&AppEvent::ControlStarted { provisioned: false }));
    assert_eq!(w.request(0xD3, b"24680"), vec![0xC6, 0xE8]);
    assert_eq!(w.store.credential, Credential::parse("24680"));
}

#[test]
fn non_digit_payload_is_never_stored() {
    let mut w = Wire::new(None);
    assert_eq!(w.request(0xD3, b"12#45"), vec![0xC6, 0xE2]);
    assert_eq!(w.store.credential, None);
    assert!(!w.control.is_provisioned());
}

#[test]
fn open_without_verification_is_refused() {
    let mut w = Wire::new(Some("13579"));
    assert_eq!(w.send(&[0xBB]), vec![0xC6, 0xE2]);
    assert_eq!(w.hw.motor(), MotorCommand::Stop);
}

#[test]
fn verification_is_consumed_by_the_next_request() {
    let mut w = Wire::new(Some("13579"));
    w.request(0xD7, b"13579");
    assert_eq!(w.request(0xD7, b"00000"), vec![0xC6, 0xE2]);
    assert_eq!(w.send(&[0xBB]), vec![0xC6, 0xE2]);
}

#[test]
fn second_open_during_a_cycle_is_refused() {
    let mut w = Wire::new(Some("13579"));
    w.request(0xD7, b"13579");
    assert_eq!(w.send(&[0xBB]), vec![0xC6, 0xE8]);
    assert_eq!(w.hw.motor(), MotorCommand::Forward);

    w.tick(10);
    w.request(0xD7, b"13579");
    assert_eq!(w.send(&[0xBB]), vec![0xC6, 0xE2]);

    w.tick(56);
    assert_eq!(w.hw.motor(), MotorCommand::Stop);
    w.request(0xD7, b"13579");
    assert_eq!(w.send(&[0xBB]), vec![0xC6, 0xE8]);
}

#[test]
fn change_requires_fresh_verification() {
    let mut w = Wire::new(Some("13579"));
    assert_eq!(w.request(0xC1, b"24680"), vec![0xC6, 0xE2]);
    assert_eq!(w.store.credential, Credential::parse("13579"));

    w.request(0xD7, b"13579");
    assert_eq!(w.request(0xC1, b"24680"), vec![0xC6, 0xE8]);
    assert_eq!(w.request(0xD7, b"24680"), vec![0xC6, 0xE8]);
    assert_eq!(w.request(0xD7, b"13579"), vec![0xC6, 0xE2]);
}

#[test]
fn response_opcodes_from_the_hmi_are_dropped() {
    let mut w = Wire::new(Some("13579"));
    assert!(w.send(&[0xC6, 0xE8, 0xAA]).is_empty());
    assert_eq!(
        w.events
            .count(|e| matches!(e, AppEvent::ProtocolViolation(_))),
        3
    );
    assert_eq!(w.request(0xD7, b"13579"), vec![0xC6, 0xE8]);
}

#[test]
fn noise_is_dropped_and_service_continues() {
    let mut w = Wire::new(Some("13579"));
    assert!(w.send(&[0x00, 0xFF, b'5']).is_empty());
    assert_eq!(w.request(0xD7, b"13579"), vec![0xC6, 0xE8]);
}

#[test]
fn stalled_payload_is_discarded_after_the_timeout() {
    let mut w = Wire::new(Some("13579"));
    assert_eq!(w.send(&[0xD7]), vec![0xAA]);
    assert!(w.send(b"13").is_empty());

    w.tick(20);

    assert!(w.events.contains(&AppEvent::LinkTimeout { ticks: 20 }));
    assert_eq!(w.send(&[0xD7]), vec![0xAA]);
    assert_eq!(w.send(b"13579"), vec![0xC6, 0xE8]);
}

#[test]
fn alarm_follows_the_mismatch_threshold() {
    let mut w = Wire::new(Some("13579"));
    w.request(0xD7, b"00000");
    w.request(0xD7, b"00000");
    assert!(!w.hw.buzzer_on());
    assert_eq!(w.request(0xD7, b"00000"), vec![0xC6, 0xE2]);
    assert!(w.hw.buzzer_on());

    w.tick(119);
    assert!(w.hw.buzzer_on());
    w.tick(1);
    assert!(!w.hw.buzzer_on());
    assert!(w.events.contains(&AppEvent::LockoutReleased));
}
