//! Mock hardware and a two-node test bench.
//!
//! Records every actuator call and every byte each node puts on the link
//! so tests can assert on the full history without touching real GPIO or
//! UART registers.

#![allow(dead_code)]

use doorlock::adapters::memory_link::MemoryLink;
use doorlock::app::events::AppEvent;
use doorlock::app::ports::{
    Buzzer, CredentialStore, Display, DoorActuator, EventSink, Keypad, StorageError,
};
use doorlock::app::service::HmiService;
use doorlock::config::SystemConfig;
use doorlock::control::ControlService;
use doorlock::credential::{Credential, Key};
use doorlock::door::MotorCommand;
use doorlock::fsm::StateId;
use doorlock::protocol::Link;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    Motor(MotorCommand),
    Buzzer(bool),
}

// ── MockHardware ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
}

impl MockHardware {
    pub fn motor(&self) -> MotorCommand {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Motor(m) => Some(*m),
                ActuatorCall::Buzzer(_) => None,
            })
            .unwrap_or(MotorCommand::Stop)
    }

    pub fn buzzer_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Buzzer(on) => Some(*on),
                ActuatorCall::Motor(_) => None,
            })
            .unwrap_or(false)
    }
}

impl DoorActuator for MockHardware {
    fn set_motor(&mut self, cmd: MotorCommand) {
        self.calls.push(ActuatorCall::Motor(cmd));
    }
}

impl Buzzer for MockHardware {
    fn set_buzzer(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Buzzer(on));
    }
}

// ── MockStore ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockStore {
    pub credential: Option<Credential>,
    pub fail_writes: bool,
    pub writes: u32,
}

impl CredentialStore for MockStore {
    fn read(&self) -> Result<Option<Credential>, StorageError> {
        Ok(self.credential)
    }

    fn write(&mut self, credential: &Credential) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.writes += 1;
        self.credential = Some(*credential);
        Ok(())
    }
}

// ── Display / events / keypad ─────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    pub frames: Vec<(String, String)>,
}

impl MockDisplay {
    pub fn top(&self) -> &str {
        self.frames.last().map_or("", |f| f.0.as_str())
    }

    pub fn bottom(&self) -> &str {
        self.frames.last().map_or("", |f| f.1.as_str())
    }

    pub fn has_shown(&self, top: &str) -> bool {
        self.frames.iter().any(|f| f.0 == top)
    }
}

impl Display for MockDisplay {
    fn show(&mut self, top: &str, bottom: &str) {
        self.frames.push((top.to_owned(), bottom.to_owned()));
    }
}

#[derive(Default)]
pub struct EventLog(pub Vec<AppEvent>);

impl EventLog {
    pub fn contains(&self, event: &AppEvent) -> bool {
        self.0.contains(event)
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.0.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.0.push(*event);
    }
}

/// Keypad with nothing pressed; the bench injects keys directly.
pub struct NoKeys;

impl Keypad for NoKeys {
    fn poll_key(&mut self) -> Option<Key> {
        None
    }
}

// ── TapLink ───────────────────────────────────────────────────

/// Link end that remembers everything written through it.
pub struct TapLink {
    inner: MemoryLink,
    pub sent: Vec<u8>,
}

impl TapLink {
    pub fn pending(&self) -> usize {
        self.inner.pending()
    }
}

impl Link for TapLink {
    type Error = <MemoryLink as Link>::Error;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        self.inner.read_byte()
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        let n = self.inner.write(data)?;
        self.sent.extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}

// ── Bench ─────────────────────────────────────────────────────

/// Both nodes wired back to back, driven one input at a time.
pub struct Bench {
    pub hmi: HmiService,
    pub control: ControlService,
    pub hmi_link: TapLink,
    pub ctrl_link: TapLink,
    pub display: MockDisplay,
    pub hmi_events: EventLog,
    pub ctrl_events: EventLog,
    pub store: MockStore,
    pub hw: MockHardware,
    /// Motor command in effect during each tick delivered so far.
    pub motor_trace: Vec<MotorCommand>,
    /// When false the Control node is unplugged: it neither reads nor ticks.
    pub control_online: bool,
}

impl Bench {
    pub fn new(config: SystemConfig) -> Self {
        Self::with_store(config, MockStore::default())
    }

    pub fn with_store(config: SystemConfig, store: MockStore) -> Self {
        let (hmi_end, ctrl_end) = MemoryLink::pair();
        let mut bench = Self {
            hmi: HmiService::new(config.clone()),
            control: ControlService::new(config),
            hmi_link: TapLink {
                inner: hmi_end,
                sent: Vec::new(),
            },
            ctrl_link: TapLink {
                inner: ctrl_end,
                sent: Vec::new(),
            },
            display: MockDisplay::default(),
            hmi_events: EventLog::default(),
            ctrl_events: EventLog::default(),
            store,
            hw: MockHardware::default(),
            motor_trace: Vec::new(),
            control_online: true,
        };
        bench
            .control
            .start(&bench.store, &mut bench.hw, &mut bench.ctrl_events)
            .unwrap();
        bench.hmi.start(&mut bench.display, &mut bench.hmi_events);
        bench
    }

    /// Fresh system with `password` set through the keypad; ends at the menu.
    pub fn provisioned(password: &str) -> Self {
        let mut bench = Self::new(SystemConfig::default());
        bench.press(&format!("{password}={password}="));
        assert_eq!(bench.state(), StateId::MainMenu);
        assert_eq!(bench.store.credential, Credential::parse(password));
        bench
    }

    pub fn state(&self) -> StateId {
        self.hmi.state()
    }

    /// Press each legend in turn, letting the link settle after every key.
    pub fn press(&mut self, keys: &str) {
        for c in keys.chars() {
            let key = Key::from_char(c).unwrap();
            self.hmi
                .handle_key(key, &mut self.hmi_link, &mut self.display, &mut self.hmi_events)
                .unwrap();
            self.pump();
        }
    }

    /// Deliver `n` timer ticks to both nodes.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.motor_trace.push(self.hw.motor());
            self.hmi
                .on_tick(&mut self.hmi_link, &mut self.display, &mut self.hmi_events)
                .unwrap();
            if self.control_online {
                self.control.on_tick(&mut self.hw, &mut self.ctrl_events);
            }
            self.pump();
        }
    }

    /// Shuttle bytes until neither direction has anything pending.
    pub fn pump(&mut self) {
        for _ in 0..64 {
            let control_has_input = self.control_online && self.ctrl_link.pending() > 0;
            if !control_has_input && self.hmi_link.pending() == 0 {
                return;
            }
            if self.control_online {
                self.control
                    .poll(
                        0,
                        &mut self.ctrl_link,
                        &mut self.store,
                        &mut self.hw,
                        &mut self.ctrl_events,
                    )
                    .unwrap();
            }
            self.hmi
                .poll(
                    0,
                    &mut NoKeys,
                    &mut self.hmi_link,
                    &mut self.display,
                    &mut self.hmi_events,
                )
                .unwrap();
        }
        panic!("link never settled");
    }

    /// Bytes the HMI has written since the last call.
    pub fn take_hmi_sent(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.hmi_link.sent)
    }

    pub fn take_ctrl_sent(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.ctrl_link.sent)
    }
}

/// Number of consecutive trace entries equal to `cmd` starting at `from`.
pub fn run_length(trace: &[MotorCommand], from: usize, cmd: MotorCommand) -> usize {
    trace[from..].iter().take_while(|&&c| c == cmd).count()
}
