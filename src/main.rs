//! Door locker simulator — both ECUs in one host process.
//!
//! ```text
//! ┌──────────────────────────┐   MemoryLink    ┌──────────────────────────┐
//! │         HMI ECU          │ ◀─────────────▶ │       Control ECU        │
//! │ ScriptedKeypad LogDisplay│                 │ NvsAdapter SimPin motor  │
//! │ HmiService (FSM)         │                 │ ControlService           │
//! └──────────────────────────┘                 └──────────────────────────┘
//!        ▲ tick thread                                ▲ tick thread
//! ```
//!
//! Usage: `doorlock-sim [KEYS] [TICK_MS]`
//!
//! KEYS is a keypad script (`0-9 = + - C`), one press per loop iteration
//! while the HMI sits at a prompt.  The run ends once the script is spent
//! and both nodes are idle.  `DOORLOCK_LOG` sets the log level.

#![deny(unused_must_use)]

#[cfg(not(target_os = "espidf"))]
use anyhow::{anyhow, Context, Result};

#[cfg(not(target_os = "espidf"))]
const DEFAULT_SCRIPT: &str = "13579=13579=+13579=";

#[cfg(not(target_os = "espidf"))]
static HMI_TICKS: doorlock::tick::TickCounter = doorlock::tick::TickCounter::new();
#[cfg(not(target_os = "espidf"))]
static CONTROL_TICKS: doorlock::tick::TickCounter = doorlock::tick::TickCounter::new();

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    use std::time::Duration;

    use log::{info, warn};

    use doorlock::adapters::console::{self, LogDisplay, ScriptedKeypad};
    use doorlock::adapters::hardware;
    use doorlock::adapters::log_sink::LogEventSink;
    use doorlock::adapters::memory_link::MemoryLink;
    use doorlock::adapters::nvs::NvsAdapter;
    use doorlock::app::ports::ConfigPort;
    use doorlock::app::service::HmiService;
    use doorlock::config::SystemConfig;
    use doorlock::control::ControlService;
    use doorlock::door::DoorPhase;
    use doorlock::drivers::hw_timer;

    // ── 1. Console ────────────────────────────────────────────
    console::init()?;
    info!("╔══════════════════════════════════════╗");
    info!("║  Doorlock simulator v{}           ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let mut args = std::env::args().skip(1);
    let script = args.next().unwrap_or_else(|| DEFAULT_SCRIPT.to_owned());

    // ── 2. Storage + config ───────────────────────────────────
    let mut nvs = NvsAdapter::new().map_err(|e| anyhow!("NVS init failed: {e}"))?;
    let mut config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };
    if let Some(ms) = args.next() {
        config.tick_period_ms = ms.parse().context("TICK_MS must be an integer")?;
    }
    config
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {e}"))?;
    nvs.save(&config)
        .map_err(|e| anyhow!("config save failed: {e}"))?;
    info!("Config: {}", serde_json::to_string(&config)?);

    // ── 3. Nodes ──────────────────────────────────────────────
    let (mut hmi_link, mut ctrl_link) = MemoryLink::pair();
    let mut hw = hardware::simulated();
    let mut keypad = ScriptedKeypad::new(&script);
    let mut display = LogDisplay::new();
    let mut hmi_sink = LogEventSink::new("HMI ");
    let mut ctrl_sink = LogEventSink::new("CTRL");

    let mut control = ControlService::new(config.clone());
    if let Err(e) = control.start(&nvs, &mut hw, &mut ctrl_sink) {
        warn!("Control starting unprovisioned: {}", e);
    }
    let mut hmi = HmiService::new(config.clone());
    hmi.start(&mut display, &mut hmi_sink);

    let _hmi_timer = hw_timer::start(&HMI_TICKS, config.tick_period_ms)?;
    let _ctrl_timer = hw_timer::start(&CONTROL_TICKS, config.tick_period_ms)?;

    info!("Running script {:?} ({} keys)", script, keypad.remaining());

    // ── 4. Super-loop ─────────────────────────────────────────
    loop {
        hmi.poll(
            HMI_TICKS.take(),
            &mut keypad,
            &mut hmi_link,
            &mut display,
            &mut hmi_sink,
        )?;
        control.poll(
            CONTROL_TICKS.take(),
            &mut ctrl_link,
            &mut nvs,
            &mut hw,
            &mut ctrl_sink,
        )?;

        let idle = keypad.is_exhausted()
            && hmi.is_awaiting_input()
            && control.door_phase() == DoorPhase::Closed
            && hmi_link.pending() == 0
            && ctrl_link.pending() == 0;
        if idle {
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    }

    info!(
        "Done after {} ticks: state={:?} lcd=[{} | {}] provisioned={} alarm={}",
        hmi.tick_count(),
        hmi.state(),
        display.top(),
        display.bottom(),
        control.is_provisioned(),
        control.is_alarm_on(),
    );
    Ok(())
}

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    anyhow::bail!("doorlock-sim is a host tool; flash hmi_ecu or control_ecu instead")
}
