// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

//! Whole-session scenarios on the simulated board.

use crate::protocol::{MSG_3WB_COMPLETE, MSG_SRAM_LOAD_COMPLETE, MSG_SRAM_LOAD_READY};
use crate::sim::SimProgrammer;
use crate::tap::TapState;
use crate::{Config, Error, ProgrammerState, IMAGE_SIZE};

fn programmer() -> SimProgrammer {
    SimProgrammer::new(Config::DEFAULT)
}

fn test_image() -> Vec<u8> {
    (0..IMAGE_SIZE).map(|i| (i * 7 + (i >> 8)) as u8).collect()
}

fn concat(parts: &[&[u8]]) -> Vec<u8> {
    parts.iter().flat_map(|p| p.iter().copied()).collect()
}

#[test]
fn end_to_end() {
    let mut p = programmer();
    let image = test_image();

    p.host_write(b"transfersram\n").unwrap();
    assert_eq!(p.take_host_output(), MSG_SRAM_LOAD_READY);
    assert_eq!(p.session.state(), ProgrammerState::LoadingImage);

    p.host_write(&image[..IMAGE_SIZE - 1]).unwrap();
    assert!(p.take_host_output().is_empty());
    assert!(p.wire.borrow().samples.is_empty());

    p.host_write(&image[IMAGE_SIZE - 1..]).unwrap();
    assert_eq!(p.take_host_output(), concat(&[MSG_SRAM_LOAD_COMPLETE, MSG_3WB_COMPLETE]));

    {
        let w = p.wire.borrow();
        assert_eq!(w.decoded(), image);
        assert_eq!(w.strobes().len(), IMAGE_SIZE / 4);
        assert!(w.strobes().iter().all(|&i| i % 32 == 31));
        assert_eq!(w.reset_log, vec![(0, false), (14_000_000, true)]);
        assert!(w.tap_high());
        assert!(w.timer_running);
        assert!(!w.target_masked);
        assert_eq!(w.indicator_log, vec![true, false]);
    }
    assert_eq!(p.session.state(), ProgrammerState::LoadingImage);
    assert_eq!(p.session.tap_state(), TapState::DrivenHigh);
    assert_eq!(p.session.counters().bootloads, 1);

    p.target_write(b"hello from the target\n");
    assert_eq!(p.take_host_output(), b"hello from the target\n");
    assert_eq!(p.session.counters().target_bytes, 22);
}

#[test]
fn malformed_lines_return_to_waiting() {
    let mut p = programmer();
    let lines: [&[u8]; 4] = [b"boot\n", b"transfer sram\n", b"\r", b"xyzzy\r"];
    for line in lines {
        p.host_write(line).unwrap();
        assert_eq!(p.session.state(), ProgrammerState::WaitingForCommand);
        assert_eq!(p.session.command_len(), 0);
    }

    p.host_write(&[b'z'; 200]).unwrap();
    assert_eq!(p.session.state(), ProgrammerState::WaitingForCommand);
    assert!(p.session.command_len() < 64);
    assert!(p.take_host_output().is_empty());

    // The framer is still usable afterwards.
    p.host_write(b"\ntransfersram\r").unwrap();
    assert_eq!(p.take_host_output(), MSG_SRAM_LOAD_READY);
}

#[test]
fn one_short_of_image_does_not_boot() {
    let mut p = programmer();
    p.host_write(b"transfersram\n").unwrap();
    p.host_write(&vec![0x55; IMAGE_SIZE - 1]).unwrap();
    assert_eq!(p.session.state(), ProgrammerState::LoadingImage);
    assert_eq!(p.session.image().fill(), IMAGE_SIZE - 1);
    assert_eq!(p.wire.borrow().reset_log.len(), 0);
}

#[test]
fn commands_ignored_while_loading() {
    let mut p = programmer();
    p.host_write(b"transfersram\n").unwrap();
    p.take_host_output();
    p.host_write(b"boot3wb\n").unwrap();
    assert_eq!(p.session.state(), ProgrammerState::LoadingImage);
    assert_eq!(p.session.image().fill(), 8);
    assert!(p.take_host_output().is_empty());
}

#[test]
fn no_target_bytes_during_host_handling() {
    let mut p = programmer();
    p.target_write(b"early");
    assert_eq!(p.pending_target(), 5);

    p.host_write(b"transfersram\n").unwrap();
    p.host_write(&test_image()).unwrap();
    assert!(!p.wire.borrow().unmasked_during_transfer);
    // Held back until the bridge opens, then forwarded after the boot message.
    assert_eq!(p.pending_target(), 0);
    assert_eq!(p.take_host_output(),
               concat(&[MSG_SRAM_LOAD_READY, MSG_SRAM_LOAD_COMPLETE, MSG_3WB_COMPLETE, b"early"]));
}

#[test]
fn host_activity_closes_bridge() {
    let mut p = programmer();
    p.host_write(b"boot3wb\n").unwrap();
    assert_eq!(p.take_host_output(), MSG_3WB_COMPLETE);
    assert!(p.session.bridge_live());

    p.host_write(b"x").unwrap();
    assert!(!p.session.bridge_live());
    assert!(p.wire.borrow().target_masked);

    p.target_write(b"lost");
    assert!(p.take_host_output().is_empty());
    assert_eq!(p.pending_target(), 4);
}

#[test]
fn host_error_recovers_and_closes_bridge() {
    let mut p = programmer();
    p.host_write(b"boot3wb\n").unwrap();
    p.host_error();
    assert_eq!(p.wire.borrow().host_recoveries, 1);
    assert_eq!(p.session.counters().host_rx_errors, 1);
    assert!(!p.session.bridge_live());
    assert!(p.wire.borrow().target_masked);
}

#[test]
fn calibration_releases_tap_then_stops() {
    let mut p = programmer();
    p.host_write(b"boot3wb\n").unwrap();
    assert_eq!(p.wire.borrow().timer_config, Some((100_000, 20)));

    p.calibration_periods(10);
    assert!(p.wire.borrow().tap_high());

    p.calibration_periods(1);
    assert_eq!(p.session.tap_state(), TapState::Released);
    assert!(!p.wire.borrow().tap_driven);

    p.calibration_periods(109);
    assert!(p.session.calibration().is_running());
    assert_eq!(p.session.calibration().periods(), 120);

    p.calibration_periods(1);
    assert!(!p.session.calibration().is_running());
    assert_eq!(p.session.calibration().periods(), 0);
    assert!(!p.wire.borrow().timer_running);
    assert_eq!(p.wire.borrow().tap_releases, 1);
    assert_eq!(p.session.counters().calibration_periods, 121);
}

#[test]
fn calibration_stop_clears_command_buffer() {
    let mut p = programmer();
    p.host_write(b"boot3wb\n").unwrap();
    p.calibration_periods(121);
    assert_eq!(p.session.command_len(), 0);
    assert_eq!(p.session.state(), ProgrammerState::LoadingImage);
}

#[test]
fn calibration_stop_discards_stray_bytes() {
    let mut p = programmer();
    p.host_write(b"boot3wb\n").unwrap();
    p.host_write(b"ab\r").unwrap();
    assert_eq!(p.session.image().fill(), 3);

    p.calibration_periods(121);
    assert_eq!(p.session.image().fill(), 0);
    assert_eq!(p.session.state(), ProgrammerState::LoadingImage);

    let image = test_image();
    p.host_write(&image).unwrap();
    let decoded = p.wire.borrow().decoded();
    assert_eq!(&decoded[decoded.len() - IMAGE_SIZE..], &image[..]);
    assert_eq!(p.session.counters().bootloads, 2);
}

#[test]
fn tap_never_driven_low() {
    let mut p = programmer();
    p.host_write(b"boot3wb\n").unwrap();
    p.calibration_periods(130);
    p.host_write(&test_image()).unwrap();
    p.calibration_periods(5);

    let w = p.wire.borrow();
    assert!(w.tap_latch);
    assert!(!w.tap_driven_low);
    assert!(w.tap_high());
    assert_eq!(p.session.counters().bootloads, 2);
}

#[test]
fn rebootload_stops_running_clock() {
    let mut p = programmer();
    p.host_write(b"boot3wb\n").unwrap();
    p.calibration_periods(50);
    assert_eq!(p.wire.borrow().timer_stops, 0);

    // Back in LoadingImage after the first boot, so a full image reboots.
    p.host_write(&test_image()).unwrap();
    let w = p.wire.borrow();
    assert_eq!(w.timer_stops, 1);
    assert_eq!(w.timer_starts, 2);
    assert!(w.timer_running);
    drop(w);
    assert_eq!(p.session.calibration().periods(), 0);
}

#[test]
fn transfer_failure_returns_to_waiting() {
    let mut p = programmer();
    p.wire.borrow_mut().fail_lines = true;
    assert_eq!(p.host_write(b"boot3wb\n"), Err(Error::Line));
    assert_eq!(p.session.state(), ProgrammerState::WaitingForCommand);
    assert!(!p.session.bridge_live());
    assert_eq!(p.session.tap_state(), TapState::Floating);
    assert!(p.take_host_output().is_empty());
    assert!(p.wire.borrow().target_masked);
    assert_eq!(p.wire.borrow().indicator_log, vec![true, false]);
}

#[test]
fn load_on_first_byte() {
    let mut p = SimProgrammer::new(Config::DEFAULT.load_on_first_byte(true));
    let image = test_image();
    p.host_write(&image).unwrap();
    // No ready message, but the image still completes and boots.
    assert_eq!(p.take_host_output(), concat(&[MSG_SRAM_LOAD_COMPLETE, MSG_3WB_COMPLETE]));
    assert_eq!(p.wire.borrow().decoded(), image);
}

#[test]
fn counters_track_events() {
    let mut p = programmer();
    p.host_write(b"abc").unwrap();
    p.session.on_idle();
    let c = p.session.counters();
    assert_eq!(c.host_events, 3);
    assert_eq!(c.host_bytes, 3);
    assert_eq!(c.task_loops, 1);
    assert_eq!(c.bootloads, 0);
}
