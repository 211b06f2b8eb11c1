//! HMI ECU firmware — keypad, display and the user dialogue.
//!
//! Keys arrive as legends on the serial console and the 16x2 display is
//! rendered to the log; the dialogue itself is [`HmiService`].

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::peripherals::Peripherals;
use log::{info, warn};

use doorlock::adapters::console::{ConsoleKeypad, LogDisplay};
use doorlock::adapters::log_sink::LogEventSink;
use doorlock::adapters::uart::UartLink;
use doorlock::app::service::HmiService;
use doorlock::config::SystemConfig;
use doorlock::drivers::hw_timer;
use doorlock::pins;
use doorlock::tick::TickCounter;

static TICKS: TickCounter = TickCounter::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Doorlock HMI ECU v{}             ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let p = Peripherals::take()?;
    let config = SystemConfig::default();

    // ── 2. Link ───────────────────────────────────────────────
    // SAFETY: pin numbers come from `pins` and are claimed exactly once.
    let (tx, rx) = unsafe {
        (
            AnyIOPin::new(pins::LINK_TX_GPIO),
            AnyIOPin::new(pins::LINK_RX_GPIO),
        )
    };
    let mut link = UartLink::new(p.uart1, tx, rx, config.baud_rate)?;

    // ── 3. Service ────────────────────────────────────────────
    let mut keypad = ConsoleKeypad;
    let mut display = LogDisplay::new();
    let mut sink = LogEventSink::new("HMI ");
    let mut hmi = HmiService::new(config.clone());
    hmi.start(&mut display, &mut sink);

    let _timer = hw_timer::start(&TICKS, config.tick_period_ms)?;

    // ── 4. Super-loop ─────────────────────────────────────────
    loop {
        if let Err(e) = hmi.poll(TICKS.take(), &mut keypad, &mut link, &mut display, &mut sink) {
            warn!("HMI loop: {}", e);
        }
        FreeRtos::delay_ms(1);
    }
}
