//! Mismatch counting and the lockout window, seen from both nodes.

use doorlock::app::events::AppEvent;
use doorlock::config::SystemConfig;
use doorlock::fsm::StateId;

use crate::mock_hw::{Bench, MockStore};

fn locked_bench() -> Bench {
    let mut bench = Bench::provisioned("13579");
    bench.press("+00000=+00000=");
    assert_eq!(bench.state(), StateId::MainMenu);
    bench.take_ctrl_sent();
    bench.press("+00000=");
    bench
}

#[test]
fn third_mismatch_is_still_answered_then_locks_out() {
    let mut bench = locked_bench();

    assert_eq!(bench.take_ctrl_sent(), vec![0xAA, 0xC6, 0xE2]);
    assert_eq!(bench.state(), StateId::Lockout);
    assert!(bench.hmi.is_locked_out());
    assert_eq!(bench.display.top(), "ERROR! Locked");
    assert!(bench
        .hmi_events
        .contains(&AppEvent::LockoutEngaged { ticks: 120 }));
}

#[test]
fn control_node_sounds_the_alarm_for_the_window() {
    let mut bench = locked_bench();
    assert!(bench.hw.buzzer_on());
    assert!(bench.control.is_alarm_on());
    assert!(bench.ctrl_events.contains(&AppEvent::AlarmChanged(true)));

    bench.tick(120);

    assert!(!bench.hw.buzzer_on());
    assert!(bench.ctrl_events.contains(&AppEvent::AlarmChanged(false)));
}

#[test]
fn attempts_during_lockout_are_refused_locally() {
    let mut bench = locked_bench();
    bench.take_hmi_sent();

    bench.press("+00000=");

    assert!(bench.take_hmi_sent().is_empty());
    assert_eq!(bench.state(), StateId::Lockout);
    assert!(bench
        .hmi_events
        .count(|e| matches!(e, AppEvent::AttemptRefused { .. }))
        >= 1);
}

#[test]
fn lockout_releases_after_exactly_the_budget() {
    let mut bench = locked_bench();

    bench.tick(119);
    assert_eq!(bench.state(), StateId::Lockout);
    bench.tick(1);

    assert_eq!(bench.state(), StateId::MainMenu);
    assert_eq!(bench.hmi.mismatches(), 0);
    assert!(bench.hmi_events.contains(&AppEvent::LockoutReleased));

    bench.press("+13579=");
    assert_eq!(bench.state(), StateId::DoorOpen);
}

#[test]
fn mismatches_from_open_and_change_share_one_counter() {
    let mut bench = Bench::provisioned("13579");
    bench.press("+00000=");
    bench.press("-11111=");
    assert_eq!(bench.hmi.mismatches(), 2);
    bench.press("+22222=");
    assert_eq!(bench.state(), StateId::Lockout);
}

#[test]
fn threshold_comes_from_config() {
    let config = SystemConfig {
        mismatch_threshold: 1,
        lockout_ticks: 4,
        ..SystemConfig::default()
    };
    let mut bench = Bench::with_store(config, MockStore::default());
    bench.press("13579=13579=+00000=");
    assert_eq!(bench.state(), StateId::Lockout);
    bench.tick(4);
    assert_eq!(bench.state(), StateId::MainMenu);
}
