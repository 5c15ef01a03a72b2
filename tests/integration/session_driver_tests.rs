//! Session driver integration tests — retry policy and per-connection
//! telemetry lifetime against [`MockConnector`].

use std::time::{Duration, Instant};

use seatlink::adapters::time::SystemClock;
use seatlink::app::telemetry::StopReason;
use seatlink::config::TelemetryConfig;
use seatlink::sensors::HardwareRegistry;
use seatlink::session::{Phase, SessionDriver};

use crate::mock_hw::{MockConnector, PanickingChannel, StaticChannel, StaticRange};

const RETRY_MS: u32 = 20;

fn fast_config() -> TelemetryConfig {
    TelemetryConfig {
        retry_delay_ms: RETRY_MS,
        cycle_interval_ms: 1,
        packet_gap_ms: 0,
        ..TelemetryConfig::default()
    }
}

fn seated_registry() -> HardwareRegistry {
    let mut reg = HardwareRegistry::new().with_distance(Box::new(StaticRange(Some(0.05))));
    for i in 0..8 {
        reg.set_channel(i, Box::new(StaticChannel(0.5)));
    }
    reg
}

#[test]
fn connect_failures_retry_until_running() {
    const FAILURES: usize = 3;
    let mut driver = SessionDriver::new(
        MockConnector::new(FAILURES, 2),
        HardwareRegistry::new(),
        SystemClock::new(),
        fast_config(),
    );
    assert_eq!(driver.phase(), Phase::Connecting);

    let start = Instant::now();
    let mut steps = 0;
    while driver.phase() != Phase::Running {
        driver.step();
        steps += 1;
        assert!(steps < 100, "driver never reached Running");
    }

    assert_eq!(driver.attempts(), FAILURES as u64 + 1);
    assert_eq!(driver.retries(), FAILURES as u64);
    assert!(start.elapsed() >= Duration::from_millis(u64::from(RETRY_MS) * FAILURES as u64));
}

#[test]
fn failed_connect_waits_before_next_attempt() {
    let mut driver = SessionDriver::new(
        MockConnector::new(1, 2),
        HardwareRegistry::new(),
        SystemClock::new(),
        fast_config(),
    );
    driver.step();
    assert_eq!(driver.phase(), Phase::WaitingRetry);
    assert_eq!(driver.attempts(), 1);

    driver.step();
    assert_eq!(driver.phase(), Phase::Connecting);
    assert_eq!(driver.retries(), 1);
}

#[test]
fn session_streams_until_link_closes_then_retries() {
    let mut driver = SessionDriver::new(
        MockConnector::new(0, 4),
        seated_registry(),
        SystemClock::new(),
        fast_config(),
    );
    driver.step();
    assert_eq!(driver.phase(), Phase::Running);

    driver.step();
    assert_eq!(driver.phase(), Phase::WaitingRetry);
    assert_eq!(driver.sessions(), 1);

    let report = driver.last_report().unwrap();
    let lp = report.loop_report.as_ref().unwrap();
    assert_eq!(lp.packets_sent, 4);
    assert_eq!(lp.reason, StopReason::LinkUnusable);
    assert_eq!(report.close.reason, "closed by peer");

    // A fresh connection follows the retry delay.
    driver.step();
    driver.step();
    assert_eq!(driver.phase(), Phase::Running);
    assert_eq!(driver.attempts(), 2);
}

#[test]
fn telemetry_panic_is_contained_and_retried() {
    let registry = seated_registry().with_channel(2, Box::new(PanickingChannel));
    let mut driver = SessionDriver::new(
        MockConnector::new(0, 100),
        registry,
        SystemClock::new(),
        fast_config(),
    );
    driver.step();
    driver.step();

    assert_eq!(driver.phase(), Phase::WaitingRetry);
    let report = driver.last_report().unwrap();
    assert!(report.loop_report.is_none());
    assert_eq!(report.close.reason, "telemetry loop ended");
}
