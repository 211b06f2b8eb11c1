//! End-to-end HMI ⇄ Control sessions: setup, open, change.

use doorlock::app::events::AppEvent;
use doorlock::app::ports::StorageError;
use doorlock::config::SystemConfig;
use doorlock::credential::{Credential, Payload};
use doorlock::door::{DoorPhase, MotorCommand};
use doorlock::fsm::StateId;
use doorlock::protocol::{Opcode, Verdict};

use crate::mock_hw::{run_length, Bench, MockStore};

fn payload(digits: &str) -> Payload {
    Credential::parse(digits).unwrap().into()
}

// ── Setup ─────────────────────────────────────────────────────

#[test]
fn first_password_is_stored_over_the_link() {
    let mut bench = Bench::new(SystemConfig::default());
    assert_eq!(bench.display.top(), "Plz enter pass:");

    bench.press("13579=13579=");

    assert_eq!(bench.state(), StateId::MainMenu);
    assert_eq!(bench.take_hmi_sent(), b"\xD313579".to_vec());
    assert_eq!(bench.take_ctrl_sent(), vec![0xAA, 0xC6, 0xE8]);
    assert!(bench.display.has_shown("Pass saved"));
    assert_eq!(bench.display.top(), "+ : Open Door");
    assert_eq!(bench.store.credential, Credential::parse("13579"));
    assert!(bench.control.is_provisioned());
    assert!(bench
        .ctrl_events
        .contains(&AppEvent::CredentialStored { replaced: false }));
}

#[test]
fn differing_confirmation_reprompts_and_sends_nothing() {
    let mut bench = Bench::new(SystemConfig::default());
    bench.press("13579=24680=");

    assert_eq!(bench.state(), StateId::SetupConfirm);
    assert!(bench.take_hmi_sent().is_empty());
    assert!(bench.hmi_events.contains(&AppEvent::EntryMismatch));
    assert_eq!(bench.display.top(), "Plz re-enter the");

    bench.press("13579=");
    assert_eq!(bench.state(), StateId::MainMenu);
    assert_eq!(bench.store.credential, Credential::parse("13579"));
}

#[test]
fn short_first_entry_is_rejected_locally() {
    let mut bench = Bench::new(SystemConfig::default());
    bench.press("123=");

    assert_eq!(bench.state(), StateId::SetupEntry);
    assert!(bench.hmi_events.contains(&AppEvent::EntryTooShort));
    assert!(bench.display.has_shown("5 digits required"));
    assert!(bench.take_hmi_sent().is_empty());
}

#[test]
fn entry_echoes_one_star_per_digit() {
    let mut bench = Bench::new(SystemConfig::default());
    bench.press("135");
    assert_eq!(bench.display.bottom(), "***");
    bench.press("C");
    assert_eq!(bench.display.bottom(), "");
    assert_eq!(bench.state(), StateId::SetupEntry);
}

#[test]
fn second_set_is_refused_and_keeps_the_stored_password() {
    let store = MockStore {
        credential: Credential::parse("13579"),
        ..MockStore::default()
    };
    let mut bench = Bench::with_store(SystemConfig::default(), store);
    assert!(bench.control.is_provisioned());

    bench.press("24680=24680=");

    assert_eq!(bench.state(), StateId::MainMenu);
    assert!(bench.display.has_shown("Pass not saved"));
    assert_eq!(bench.store.credential, Credential::parse("13579"));
    assert_eq!(bench.store.writes, 0);
    assert!(bench.hmi_events.contains(&AppEvent::PasswordAck {
        request: Opcode::SetPassword,
        verdict: Verdict::Mismatched,
    }));
}

#[test]
fn failed_write_is_answered_mismatched() {
    let store = MockStore {
        fail_writes: true,
        ..MockStore::default()
    };
    let mut bench = Bench::with_store(SystemConfig::default(), store);
    bench.press("13579=13579=");

    assert!(bench.display.has_shown("Pass not saved"));
    assert!(bench
        .ctrl_events
        .contains(&AppEvent::StorageFault(StorageError::IoError)));
    assert!(!bench.control.is_provisioned());
}

#[test]
fn setup_can_be_retried_after_a_failed_write() {
    let store = MockStore {
        fail_writes: true,
        ..MockStore::default()
    };
    let mut bench = Bench::with_store(SystemConfig::default(), store);
    bench.press("13579=13579=");
    assert_eq!(bench.state(), StateId::MainMenu);

    bench.store.fail_writes = false;
    bench.press("+13579=");
    assert_eq!(bench.state(), StateId::MainMenu);
    assert_eq!(bench.hmi.mismatches(), 1);

    bench.press("C");
    assert_eq!(bench.state(), StateId::SetupEntry);
    bench.press("13579=13579=");
    assert_eq!(bench.state(), StateId::MainMenu);
    assert!(bench.control.is_provisioned());
    assert_eq!(bench.store.credential, Credential::parse("13579"));

    bench.press("C");
    assert_eq!(bench.state(), StateId::MainMenu);
}

#[test]
fn refused_setup_still_reaches_a_stored_password() {
    let store = MockStore {
        credential: Credential::parse("13579"),
        ..MockStore::default()
    };
    let mut bench = Bench::with_store(SystemConfig::default(), store);
    bench.press("24680=24680=");
    bench.press("+13579=");

    assert_eq!(bench.state(), StateId::DoorOpen);
    bench.tick(66);
    bench.press("C");
    assert_eq!(bench.state(), StateId::MainMenu);
}

// ── Open door ─────────────────────────────────────────────────

#[test]
fn correct_password_runs_one_exact_door_cycle() {
    let mut bench = Bench::provisioned("13579");
    bench.take_hmi_sent();
    bench.take_ctrl_sent();

    bench.press("+13579=");

    assert_eq!(bench.state(), StateId::DoorOpen);
    assert_eq!(bench.take_hmi_sent(), b"\xD713579\xBB".to_vec());
    assert_eq!(bench.take_ctrl_sent(), vec![0xAA, 0xC6, 0xE8, 0xC6, 0xE8]);
    assert_eq!(bench.hw.motor(), MotorCommand::Forward);
    assert_eq!(bench.display.top(), "Door is Unlocking");

    bench.tick(80);

    let trace = &bench.motor_trace;
    assert_eq!(run_length(trace, 0, MotorCommand::Forward), 30);
    assert_eq!(run_length(trace, 30, MotorCommand::Stop), 6);
    assert_eq!(run_length(trace, 36, MotorCommand::Reverse), 30);
    assert_eq!(trace[66], MotorCommand::Stop);
    assert_eq!(bench.control.door_phase(), DoorPhase::Closed);

    assert_eq!(bench.state(), StateId::MainMenu);
    assert!(bench.display.has_shown("Door is Open"));
    assert!(bench.display.has_shown("Door is Locking"));
    assert_eq!(bench.display.top(), "+ : Open Door");
}

#[test]
fn hmi_returns_to_menu_when_the_cycle_ends() {
    let mut bench = Bench::provisioned("13579");
    bench.press("+13579=");
    bench.tick(65);
    assert_eq!(bench.state(), StateId::DoorOpen);
    bench.tick(1);
    assert_eq!(bench.state(), StateId::MainMenu);
}

#[test]
fn shared_config_keeps_the_door_mirror_in_step() {
    let config = SystemConfig {
        motor_ticks: 10,
        hold_ticks: 2,
        ..SystemConfig::default()
    };
    let mut bench = Bench::new(config);
    bench.press("13579=13579=+13579=");

    bench.tick(21);
    assert_eq!(bench.state(), StateId::DoorOpen);
    assert_ne!(bench.control.door_phase(), DoorPhase::Closed);
    bench.tick(1);
    assert_eq!(bench.state(), StateId::MainMenu);
    assert_eq!(bench.control.door_phase(), DoorPhase::Closed);
}

#[test]
fn keys_are_ignored_while_the_door_moves() {
    let mut bench = Bench::provisioned("13579");
    bench.press("+13579=");
    bench.take_hmi_sent();

    bench.press("+13579=");

    assert_eq!(bench.state(), StateId::DoorOpen);
    assert!(bench.take_hmi_sent().is_empty());
}

#[test]
fn wrong_password_counts_and_keeps_the_door_shut() {
    let mut bench = Bench::provisioned("13579");
    bench.take_ctrl_sent();

    bench.press("+00000=");

    assert_eq!(bench.state(), StateId::MainMenu);
    assert_eq!(bench.hmi.mismatches(), 1);
    assert!(bench.display.has_shown("Wrong password"));
    assert_eq!(bench.take_ctrl_sent(), vec![0xAA, 0xC6, 0xE2]);
    assert_eq!(bench.hw.motor(), MotorCommand::Stop);
    assert!(bench.hmi_events.contains(&AppEvent::Verified {
        verdict: Verdict::Mismatched,
        mismatches: 1,
    }));
}

#[test]
fn short_verification_entry_is_padded_and_mismatches() {
    let mut bench = Bench::provisioned("13579");
    bench.take_hmi_sent();

    bench.press("+135=");

    assert_eq!(bench.take_hmi_sent(), b"\xD7135##".to_vec());
    assert_eq!(bench.hmi.mismatches(), 1);
}

#[test]
fn match_resets_the_mismatch_counter() {
    let mut bench = Bench::provisioned("13579");
    bench.press("+00000=+11111=");
    assert_eq!(bench.hmi.mismatches(), 2);

    bench.press("-13579=C");

    assert_eq!(bench.hmi.mismatches(), 0);
    assert_eq!(bench.state(), StateId::MainMenu);
}

// ── Change password ───────────────────────────────────────────

#[test]
fn change_after_verification_replaces_the_password() {
    let mut bench = Bench::provisioned("13579");

    bench.press("-13579=24680=24680=");

    assert_eq!(bench.state(), StateId::MainMenu);
    assert!(bench.display.has_shown("Pass changed"));
    assert_eq!(bench.store.credential, Credential::parse("24680"));
    assert!(bench.control.would_match(&payload("24680")));
    assert!(!bench.control.would_match(&payload("13579")));
    assert!(bench
        .ctrl_events
        .contains(&AppEvent::CredentialStored { replaced: true }));

    bench.press("+13579=");
    assert_eq!(bench.state(), StateId::MainMenu);
    assert_eq!(bench.hmi.mismatches(), 1);

    bench.press("+24680=");
    assert_eq!(bench.state(), StateId::DoorOpen);
}

#[test]
fn change_confirmation_mismatch_sends_nothing() {
    let mut bench = Bench::provisioned("13579");
    bench.press("-13579=24680=");
    bench.take_hmi_sent();

    bench.press("11111=");

    assert_eq!(bench.state(), StateId::ChangeConfirm);
    assert!(bench.take_hmi_sent().is_empty());
    assert!(bench.hmi_events.contains(&AppEvent::EntryMismatch));
}

#[test]
fn cancelling_a_change_keeps_the_old_password() {
    let mut bench = Bench::provisioned("13579");
    bench.press("-13579=C");

    assert_eq!(bench.state(), StateId::MainMenu);
    assert_eq!(bench.store.credential, Credential::parse("13579"));
}

// ── Link failure ──────────────────────────────────────────────

#[test]
fn silent_peer_times_out_back_to_the_menu() {
    let mut bench = Bench::provisioned("13579");
    bench.control_online = false;

    bench.press("+13579=");
    assert_eq!(bench.state(), StateId::AwaitingVerify);

    bench.tick(19);
    assert_eq!(bench.state(), StateId::AwaitingVerify);
    bench.tick(1);

    assert_eq!(bench.state(), StateId::MainMenu);
    assert!(bench.display.has_shown("Link error"));
    assert!(bench
        .hmi_events
        .contains(&AppEvent::LinkTimeout { ticks: 20 }));
    assert_eq!(bench.hmi.mismatches(), 0);
}

#[test]
fn peer_returning_after_a_timeout_leaves_both_streaks_clear() {
    let mut bench = Bench::provisioned("13579");
    bench.control_online = false;
    bench.press("+11111=");
    bench.tick(20);
    assert_eq!(bench.state(), StateId::MainMenu);

    // The stale request is answered with READY only; no verdict follows.
    bench.control_online = true;
    bench.pump();
    bench.tick(20);
    assert_eq!(bench.hmi.mismatches(), 0);
    assert!(!bench.control.is_alarm_on());

    bench.press("+13579=");
    assert_eq!(bench.state(), StateId::DoorOpen);
}

#[test]
fn zero_timeout_waits_forever() {
    let config = SystemConfig {
        response_timeout_ticks: 0,
        ..SystemConfig::default()
    };
    let mut bench = Bench::new(config);
    bench.control_online = false;
    bench.press("13579=13579=");
    bench.tick(1_000);
    assert_eq!(bench.state(), StateId::AwaitingSetAck);
}
