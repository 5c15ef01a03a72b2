//! Telemetry loop integration tests — cycle ordering, packet shape and
//! stop conditions against a scripted [`MockLink`].

use chrono::{TimeZone, Utc};
use core::time::Duration;

use seatlink::adapters::time::FixedClock;
use seatlink::app::ports::Link;
use seatlink::app::telemetry::{CycleOutcome, LoopState, LoopTiming, StopReason, TelemetryLoop};
use seatlink::error::{Error, LinkError};

use crate::mock_hw::{FixedSensors, MockLink};

const FAST: LoopTiming = LoopTiming {
    cycle_interval: Duration::ZERO,
    packet_gap: Duration::ZERO,
};

fn clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap())
}

fn json(s: &str) -> serde_json::Value {
    serde_json::from_str(s).unwrap()
}

#[test]
fn cycle_sends_occupancy_then_pressure() {
    let mut sensors = FixedSensors::new([0, 10, 20, 300, 0, 0, 0, 1023], true);
    let link = MockLink::open();
    let clock = clock();
    let mut lp = TelemetryLoop::new(&mut sensors, &link, &clock, FAST);

    assert_eq!(lp.run_cycle(), CycleOutcome::Sent);
    assert_eq!(lp.packets_sent(), 2);
    assert_eq!(*lp.state(), LoopState::Running);
    drop(lp);

    let sent = link.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[0],
        r#"{"isSeated":true,"detectedAt":"2026-05-04T12:00:00.000Z"}"#
    );
    let pressure = json(&sent[1]);
    assert_eq!(pressure["sensors"]["back_top_right"], 0);
    assert_eq!(pressure["sensors"]["back_bottom_left"], 300);
    assert_eq!(pressure["sensors"]["seat_top_left"], 1023);
    assert_eq!(pressure["timestamp"], "2026-05-04T12:00:00.000Z");

    // Occupancy is read before pressure.
    assert_eq!(sensors.reads, vec!["occupancy", "pressure"]);
}

#[test]
fn pressure_keys_follow_channel_order() {
    let mut sensors = FixedSensors::new([0; 8], false);
    let link = MockLink::open();
    let clock = clock();
    TelemetryLoop::new(&mut sensors, &link, &clock, FAST).run_cycle();

    let sent = link.sent();
    let start = sent[1].find("back_top_right").unwrap();
    let end = sent[1].find("seat_top_left").unwrap();
    assert!(start < end);
    let keys: Vec<_> = json(&sent[1])["sensors"]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys.len(), 8);
}

#[test]
fn both_packets_carry_identical_timestamp_text() {
    let mut sensors = FixedSensors::new([0; 8], false);
    let link = MockLink::open();
    let clock = clock();
    let mut lp = TelemetryLoop::new(&mut sensors, &link, &clock, FAST);
    lp.run_cycle();
    clock.advance(chrono::Duration::milliseconds(3050));
    lp.run_cycle();
    drop(lp);

    let sent = link.sent();
    for pair in sent.chunks(2) {
        let occ = json(&pair[0]);
        let prs = json(&pair[1]);
        assert_eq!(occ["detectedAt"].as_str(), prs["timestamp"].as_str());
    }
    assert_eq!(json(&sent[2])["detectedAt"], "2026-05-04T12:00:03.050Z");
}

#[test]
fn link_lost_after_occupancy_sends_exactly_one_packet() {
    let mut sensors = FixedSensors::new([0; 8], true);
    let link = MockLink::closing_after(1);
    let clock = clock();
    let mut lp = TelemetryLoop::new(&mut sensors, &link, &clock, FAST);

    assert_eq!(
        lp.run_cycle(),
        CycleOutcome::Stopped {
            packets: 1,
            reason: StopReason::LinkUnusable
        }
    );
    assert_eq!(*lp.state(), LoopState::Stopped(StopReason::LinkUnusable));
    drop(lp);
    assert_eq!(link.sent().len(), 1);
    assert!(link.sent()[0].contains("isSeated"));
}

#[test]
fn unusable_link_stops_before_any_send() {
    let mut sensors = FixedSensors::new([0; 8], true);
    let link = MockLink::open();
    link.fail("already gone");
    let clock = clock();
    let mut lp = TelemetryLoop::new(&mut sensors, &link, &clock, FAST);

    assert_eq!(
        lp.run_cycle(),
        CycleOutcome::Stopped {
            packets: 0,
            reason: StopReason::LinkUnusable
        }
    );
    drop(lp);
    assert!(link.sent().is_empty());
}

#[test]
fn send_error_fails_the_link_and_stops() {
    let mut sensors = FixedSensors::new([0; 8], false);
    let link = MockLink::rejecting(LinkError::QueueFull);
    let clock = clock();
    let mut lp = TelemetryLoop::new(&mut sensors, &link, &clock, FAST);

    let outcome = lp.run_cycle();
    assert_eq!(
        outcome,
        CycleOutcome::Stopped {
            packets: 0,
            reason: StopReason::CycleFailed(Error::Link(LinkError::QueueFull))
        }
    );
    drop(lp);
    assert!(!link.is_open());
    assert_eq!(link.failures().len(), 1);
}

#[test]
fn stopped_loop_stays_stopped() {
    let mut sensors = FixedSensors::new([0; 8], false);
    let link = MockLink::closing_after(2);
    let clock = clock();
    let mut lp = TelemetryLoop::new(&mut sensors, &link, &clock, FAST);

    assert_eq!(lp.run_cycle(), CycleOutcome::Sent);
    assert!(matches!(lp.run_cycle(), CycleOutcome::Stopped { packets: 0, .. }));
    let cycles = lp.cycles();
    assert!(matches!(lp.run_cycle(), CycleOutcome::Stopped { .. }));
    assert_eq!(lp.cycles(), cycles);
}

#[test]
fn run_returns_report_when_link_closes() {
    let mut sensors = FixedSensors::new([0; 8], false);
    let link = MockLink::closing_after(5);
    let clock = clock();
    let report = TelemetryLoop::new(&mut sensors, &link, &clock, FAST).run();

    // Two full cycles, then the occupancy packet of the third.
    assert_eq!(report.packets_sent, 5);
    assert_eq!(report.cycles, 3);
    assert_eq!(report.reason, StopReason::LinkUnusable);
}

#[test]
fn usability_checks_do_not_change_link_state() {
    let link = MockLink::open();
    for _ in 0..100 {
        assert!(link.is_usable());
    }
    assert!(link.is_open());
    assert!(link.failures().is_empty());
}
