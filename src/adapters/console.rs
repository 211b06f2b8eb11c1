//! Console adapters.
//!
//! - [`init`] installs a `tracing-subscriber` stderr backend for the `log`
//!   facade on the host (the boards use `esp_idf_logger` instead).  Filter
//!   directives come from `DOORLOCK_LOG`.
//! - [`LogDisplay`] renders the 16x2 LCD as log lines.
//! - [`ScriptedKeypad`] replays a key script one press per poll.
//! - `ConsoleKeypad` (ESP-IDF) reads key legends from the serial console.

use std::collections::VecDeque;

use log::info;

use crate::app::ports::{Display, Keypad};
use crate::credential::Key;

// ───────────────────────────────────────────────────────────────
// Logger
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub const LOG_ENV: &str = "DOORLOCK_LOG";

/// Install an env-filtered stderr subscriber and route `log` records into
/// it.  Filter directives come from `DOORLOCK_LOG`; defaults to `info`.
#[cfg(not(target_os = "espidf"))]
pub fn init() -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init()?;
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Display
// ───────────────────────────────────────────────────────────────

/// LCD stand-in that logs each frame and keeps the last one.
#[derive(Debug, Default)]
pub struct LogDisplay {
    top: String,
    bottom: String,
    frames: u32,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top(&self) -> &str {
        &self.top
    }

    pub fn bottom(&self) -> &str {
        &self.bottom
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }
}

impl Display for LogDisplay {
    fn show(&mut self, top: &str, bottom: &str) {
        top.clone_into(&mut self.top);
        bottom.clone_into(&mut self.bottom);
        self.frames += 1;
        info!("LCD | {:<16} | {:<16} |", top, bottom);
    }
}

// ───────────────────────────────────────────────────────────────
// Keypad
// ───────────────────────────────────────────────────────────────

/// Keypad that replays a fixed script of legends (`0-9 = + - C`).
/// Characters without a key are skipped.
#[derive(Debug, Default)]
pub struct ScriptedKeypad {
    keys: VecDeque<Key>,
}

impl ScriptedKeypad {
    pub fn new(script: &str) -> Self {
        Self {
            keys: script.chars().filter_map(Key::from_char).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Keypad for ScriptedKeypad {
    fn poll_key(&mut self) -> Option<Key> {
        self.keys.pop_front()
    }
}

/// Keypad fed from the serial console: each received legend is one press.
#[cfg(target_os = "espidf")]
#[derive(Debug, Default)]
pub struct ConsoleKeypad;

#[cfg(target_os = "espidf")]
impl Keypad for ConsoleKeypad {
    fn poll_key(&mut self) -> Option<Key> {
        loop {
            // SAFETY: stdin is the VFS console; getchar returns EOF when
            // nothing is buffered.
            let c = unsafe { esp_idf_svc::sys::getchar() };
            if c < 0 {
                return None;
            }
            if let Some(key) = char::from_u32(c as u32).and_then(Key::from_char) {
                return Some(key);
            }
        }
    }
}
