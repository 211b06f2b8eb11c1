//! Control ECU firmware — credential store, door motor and alarm.
//!
//! Serves HMI requests arriving on UART1.  All policy lives in
//! [`ControlService`]; this file only wires peripherals to ports and runs
//! the super-loop.

use anyhow::{anyhow, Result};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use log::{info, warn};

use doorlock::adapters::hardware::ControlHardware;
use doorlock::adapters::log_sink::LogEventSink;
use doorlock::adapters::nvs::NvsAdapter;
use doorlock::adapters::uart::UartLink;
use doorlock::config::SystemConfig;
use doorlock::control::ControlService;
use doorlock::drivers::buzzer::BuzzerDriver;
use doorlock::drivers::hw_timer;
use doorlock::drivers::motor::MotorDriver;
use doorlock::pins;
use doorlock::tick::TickCounter;

static TICKS: TickCounter = TickCounter::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Doorlock Control ECU v{}         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let p = Peripherals::take()?;

    // ── 2. Storage + config ───────────────────────────────────
    // Door and lockout timing must match the HMI board, which has no config
    // store of its own, so both boards run the built-in defaults.
    let mut nvs = NvsAdapter::new().map_err(|e| anyhow!("NVS init failed: {e}"))?;
    let config = SystemConfig::default();

    // ── 3. Actuators ──────────────────────────────────────────
    // SAFETY: pin numbers come from `pins` and are claimed exactly once.
    let (in1, in2, bz) = unsafe {
        (
            AnyOutputPin::new(pins::MOTOR_IN1_GPIO),
            AnyOutputPin::new(pins::MOTOR_IN2_GPIO),
            AnyOutputPin::new(pins::BUZZER_GPIO),
        )
    };
    let motor = MotorDriver::new(PinDriver::output(in1)?, PinDriver::output(in2)?)?;
    let buzzer = BuzzerDriver::new(PinDriver::output(bz)?)?;
    let mut hw = ControlHardware::new(motor, buzzer);

    // ── 4. Link ───────────────────────────────────────────────
    // SAFETY: as above.
    let (tx, rx) = unsafe {
        (
            AnyIOPin::new(pins::LINK_TX_GPIO),
            AnyIOPin::new(pins::LINK_RX_GPIO),
        )
    };
    let mut link = UartLink::new(p.uart1, tx, rx, config.baud_rate)?;

    // ── 5. Service ────────────────────────────────────────────
    let mut sink = LogEventSink::new("CTRL");
    let mut control = ControlService::new(config.clone());
    if let Err(e) = control.start(&nvs, &mut hw, &mut sink) {
        warn!("Starting unprovisioned: {}", e);
    }

    let _timer = hw_timer::start(&TICKS, config.tick_period_ms)?;

    // ── 6. Super-loop ─────────────────────────────────────────
    loop {
        if let Err(e) = control.poll(TICKS.take(), &mut link, &mut nvs, &mut hw, &mut sink) {
            warn!("Control loop: {}", e);
        }
        FreeRtos::delay_ms(1);
    }
}
