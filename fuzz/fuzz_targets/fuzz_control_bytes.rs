//! Fuzz target: `ControlService::on_byte` / `on_tick`
//!
//! Treats the input as an interleaving of link bytes and timer ticks
//! (0x00 followed by a count byte means "tick that many times") and
//! asserts the Control node never panics and never stores a credential
//! that is not five ASCII digits.
//!
//! cargo fuzz run fuzz_control_bytes

#![no_main]

use doorlock::app::events::AppEvent;
use doorlock::app::ports::{Buzzer, CredentialStore, DoorActuator, EventSink, StorageError};
use doorlock::config::SystemConfig;
use doorlock::control::ControlService;
use doorlock::credential::Credential;
use doorlock::door::MotorCommand;
use doorlock::protocol::NullLink;
use libfuzzer_sys::fuzz_target;

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

fuzz_target!(|data: &[u8]| {
    let mut control = ControlService::new(SystemConfig::default());
    let mut slot = Slot::default();
    let mut link = NullLink;
    let _ = control.start(&slot, &mut Pins, &mut Quiet);

    let mut bytes = data.iter().copied();
    while let Some(b) = bytes.next() {
        if b == 0x00 {
            let n = bytes.next().unwrap_or(1);
            for _ in 0..n {
                control.on_tick(&mut Pins, &mut Quiet);
            }
        } else {
            let _ = control.on_byte(b, &mut link, &mut slot, &mut Pins, &mut Quiet);
        }
    }

    if let Some(c) = slot.0 {
        assert!(c.as_bytes().iter().all(u8::is_ascii_digit));
    }
});
