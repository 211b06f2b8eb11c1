//! Periodic tick source using ESP-IDF's esp_timer API.
//!
//! Arms one periodic timer whose callback increments a [`TickCounter`].
//! On simulation targets a background thread sleeps for the period and
//! does the same, so the foreground loop is identical on both.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR); the
//! callback only touches the counter's atomic.

use crate::tick::TickCounter;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

/// Running tick source.  Stops when dropped.
pub struct TickTimer {
    #[cfg(target_os = "espidf")]
    handle: esp_timer_handle_t,

    #[cfg(not(target_os = "espidf"))]
    stop: std::sync::Arc<std::sync::atomic::AtomicBool>,
    #[cfg(not(target_os = "espidf"))]
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the `&'static TickCounter` passed to `start`.
    let counter = unsafe { &*(arg as *const TickCounter) };
    counter.on_tick();
}

/// Start a periodic tick every `period_ms` milliseconds.
#[cfg(target_os = "espidf")]
pub fn start(counter: &'static TickCounter, period_ms: u32) -> crate::error::Result<TickTimer> {
    let args = esp_timer_create_args_t {
        callback: Some(tick_cb),
        arg: counter as *const TickCounter as *mut core::ffi::c_void,
        dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
        name: b"tick\0".as_ptr() as *const _,
        // Missed periods are still delivered so no tick is lost.
        skip_unhandled_events: false,
    };
    let mut handle: esp_timer_handle_t = core::ptr::null_mut();

    // SAFETY: args outlives the call; the callback argument is 'static.
    let ret = unsafe { esp_timer_create(&args, &mut handle) };
    if ret != ESP_OK {
        log::error!("hw_timer: create failed (rc={})", ret);
        return Err(crate::error::Error::Init("tick timer create"));
    }
    // SAFETY: handle was just created.
    let ret = unsafe { esp_timer_start_periodic(handle, u64::from(period_ms) * 1000) };
    if ret != ESP_OK {
        log::error!("hw_timer: start failed (rc={})", ret);
        // SAFETY: handle is valid and not running.
        unsafe { esp_timer_delete(handle) };
        return Err(crate::error::Error::Init("tick timer start"));
    }

    info!("hw_timer: tick every {} ms", period_ms);
    Ok(TickTimer { handle })
}

#[cfg(target_os = "espidf")]
impl Drop for TickTimer {
    fn drop(&mut self) {
        // SAFETY: handle is valid for the lifetime of TickTimer.
        unsafe {
            esp_timer_stop(self.handle);
            esp_timer_delete(self.handle);
        }
    }
}

/// Start a periodic tick every `period_ms` milliseconds.
#[cfg(not(target_os = "espidf"))]
pub fn start(counter: &'static TickCounter, period_ms: u32) -> crate::error::Result<TickTimer> {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let period = Duration::from_millis(u64::from(period_ms.max(1)));

    let thread = std::thread::Builder::new()
        .name("tick".into())
        .spawn(move || {
            while !flag.load(Ordering::Acquire) {
                std::thread::sleep(period);
                counter.on_tick();
            }
        })
        .map_err(|_| crate::error::Error::Init("tick thread spawn"))?;

    info!("hw_timer(sim): tick every {} ms", period_ms);
    Ok(TickTimer {
        stop,
        thread: Some(thread),
    })
}

#[cfg(not(target_os = "espidf"))]
impl Drop for TickTimer {
    fn drop(&mut self) {
        self.stop
            .store(true, std::sync::atomic::Ordering::Release);
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}
