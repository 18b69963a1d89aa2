//! Arbitrage live/simulé vu depuis la barre de navigation, en temps virtuel.

use serde_json::json;
use skymonitor_devkit::{ShellEventBuilder, TestHarness};
use skymonitor_shell::models::ScanRequest;
use skymonitor_shell::{MetricReading, Mode, ShellEvent};

fn percent(text: Option<String>) -> f64 {
    text.as_deref()
        .and_then(|t| t.trim_end_matches('%').parse().ok())
        .unwrap_or(f64::NAN)
}

fn booted() -> TestHarness {
    let mut harness = TestHarness::new();
    harness.boot();
    harness
}

fn in_range(value: f64, low: f64, high: f64) -> bool {
    value >= low && value <= high
}

#[test]
fn test_live_reading_is_displayed_and_hides_badge() {
    let mut harness = booted();
    assert!(harness.display().simulated_badge);

    harness.push(ShellEventBuilder::push("system_metrics", &json!({ "cpu_percent": 42.3 })).unwrap());

    let display = harness.display();
    assert_eq!(display.cpu.as_deref(), Some("42.3%"));
    assert!(!display.simulated_badge);
    assert_eq!(harness.shell.metrics().mode(), Mode::Live);
}

#[test]
fn test_no_live_event_for_8000ms_shows_simulated_values() {
    let mut harness = booted();
    let seed = harness.shell.reading().unwrap();
    assert!(in_range(seed.cpu, 5.0, 15.0));
    assert!(in_range(seed.memory, 20.0, 40.0));
    assert!(in_range(seed.disk, 30.0, 50.0));

    harness.advance(8000).unwrap();
    let display = harness.display();
    assert!(display.simulated_badge);
    assert_eq!(harness.shell.metrics().mode(), Mode::Simulated);

    // ticks à 9000, 11000, ... : chaque tick déplace de ±3 au plus
    harness.advance(12_000).unwrap();
    let ticks = 6.0;
    let cpu = percent(harness.display().cpu);
    let memory = percent(harness.display().memory);
    assert!(in_range(cpu, 5.0 - 6.0 * ticks, 15.0 + 6.0 * ticks), "cpu {cpu}");
    assert!(in_range(memory, 20.0 - 6.0 * ticks, 40.0 + 6.0 * ticks), "memory {memory}");
    assert!(harness.display().simulated_badge);
}

#[test]
fn test_mode_is_live_for_the_inactivity_window() {
    let mut harness = booted();
    harness.advance(1000).unwrap();
    harness.push(ShellEventBuilder::system_metrics(30.0, 40.0, 50.0).unwrap());

    for _ in 0..6 {
        harness.advance(1000).unwrap();
        assert_eq!(harness.shell.metrics().mode(), Mode::Live);
    }
    harness.advance(999).unwrap();
    assert_eq!(harness.shell.metrics().mode(), Mode::Live);
    assert!(!harness.display().simulated_badge);
    assert_eq!(harness.timers.active_intervals(), 0);

    harness.advance(1).unwrap();
    assert_eq!(harness.shell.metrics().mode(), Mode::Simulated);
    assert!(harness.display().simulated_badge);
    assert_eq!(harness.timers.active_intervals(), 1);
}

#[test]
fn test_single_tick_timer_across_transitions() {
    let mut harness = booted();
    harness.advance(7000).unwrap();
    assert_eq!(harness.timers.active_intervals(), 1);

    harness.push(ShellEventBuilder::system_metrics(10.0, 10.0, 10.0).unwrap());
    assert_eq!(harness.timers.active_intervals(), 0);

    harness.advance(7000).unwrap();
    assert_eq!(harness.timers.active_intervals(), 1);
    harness.advance(20_000).unwrap();
    assert_eq!(harness.timers.active_intervals(), 1);
}

#[test]
fn test_unreadable_live_event_still_stops_simulation() {
    let mut harness = booted();
    harness.advance(8000).unwrap();
    assert_eq!(harness.timers.active_intervals(), 1);
    let before = harness.shell.reading();

    harness.push(ShellEventBuilder::push("system_metrics", &json!({ "cpu_percent": "n/a" })).unwrap());

    assert_eq!(harness.shell.metrics().mode(), Mode::Live);
    assert!(!harness.display().simulated_badge);
    assert_eq!(harness.timers.active_intervals(), 0);
    assert_eq!(harness.shell.reading(), before);

    harness.advance(7000).unwrap();
    assert_eq!(harness.shell.metrics().mode(), Mode::Simulated);
}

#[test]
fn test_invalid_seed_config_is_rejected_before_boot() {
    let err = skymonitor_shell::config::parse_config("metrics:\n  seed:\n    cpu: [15.0, 5.0]\n");
    assert!(err.is_err());

    // une config construite en code avec une plage inversée démarre quand même
    let mut config = skymonitor_shell::ShellConfig::default();
    config.metrics.seed.cpu = [15.0, 5.0];
    let mut harness = TestHarness::with_config(config);
    harness.boot();
    let cpu = harness.shell.reading().unwrap().cpu;
    assert!((5.0..=15.0).contains(&cpu));
}

#[test]
fn test_partial_live_update_keeps_other_fields() {
    let mut harness = booted();
    harness.push(ShellEventBuilder::system_metrics(10.0, 20.0, 30.0).unwrap());
    harness.push(ShellEventBuilder::push("system_metrics", &json!({ "memory_percent": 55 })).unwrap());

    assert_eq!(harness.shell.reading(), Some(MetricReading { cpu: 10.0, memory: 55.0, disk: 30.0 }));
    assert_eq!(harness.display().memory.as_deref(), Some("55.0%"));
}

#[test]
fn test_malformed_and_out_of_range_values() {
    let mut harness = booted();
    harness.push(ShellEventBuilder::system_metrics(10.0, 20.0, 30.0).unwrap());
    harness.push(
        ShellEventBuilder::push(
            "system_metrics",
            &json!({ "cpu_percent": 150, "memory_percent": -5, "disk_percent": "n/a" }),
        )
        .unwrap(),
    );

    assert_eq!(harness.shell.reading(), Some(MetricReading { cpu: 100.0, memory: 0.0, disk: 30.0 }));
}

#[test]
fn test_random_walk_stays_clamped() {
    let mut harness = booted();
    harness.push(ShellEventBuilder::system_metrics(99.0, 1.0, 50.0).unwrap());
    harness.advance(7000).unwrap();

    for _ in 0..500 {
        harness.advance(2000).unwrap();
        let reading = harness.shell.reading().unwrap();
        for value in [reading.cpu, reading.memory, reading.disk] {
            assert!(in_range(value, 0.0, 100.0), "out of range: {value}");
            assert_eq!((value * 10.0).round() / 10.0, value);
        }
    }
}

#[test]
fn test_connection_status_and_notifications() {
    let mut harness = booted();
    harness.push(ShellEventBuilder::connected().unwrap());
    assert_eq!(harness.html("connection-status").as_deref(), Some("Connecté"));
    assert_eq!(harness.shell.document().notification_count(), 1);

    harness.push(ShellEventBuilder::disconnected().unwrap());
    assert_eq!(harness.html("connection-status").as_deref(), Some("Déconnecté"));
    assert_eq!(harness.shell.document().notification_count(), 2);

    harness.advance(3000).unwrap();
    assert_eq!(harness.shell.document().notification_count(), 0);
}

#[tokio::test]
async fn test_network_scan_flow() {
    let mut harness = TestHarness::new();
    harness.content_page("/", r#"<div id="scan-progress"></div><div id="scan-results"></div>"#);
    harness.api("/api/scan/network", &json!({ "status": "started" }));
    harness.boot();
    harness.settle().await;

    let request = ScanRequest::new("192.168.1.0/24", vec![22, 80], true).unwrap();
    harness.push(ShellEvent::StartScan(request));
    harness.settle().await;
    assert_eq!(harness.shell.document().notification_count(), 1);

    harness.push(ShellEventBuilder::scan_progress("192.168.1.10").unwrap());
    harness.push(ShellEventBuilder::scan_progress("192.168.1.11").unwrap());
    let progress = harness.html("scan-progress").unwrap_or_default();
    assert!(progress.contains("192.168.1.10") && progress.contains("192.168.1.11"));

    harness.push(ShellEventBuilder::scan_complete(&[("192.168.1.10", &[22u16, 80][..])], 4.2).unwrap());
    assert!(harness.html("scan-results").unwrap_or_default().contains("22, 80"));
    let last = harness.shell.document().notification_count();
    assert_eq!(last, 2);
}

#[tokio::test]
async fn test_scan_rejected_by_backend_notifies_error() {
    let mut harness = booted();
    harness.fetcher.fail("/api/scan/network", skymonitor_shell::fetch::FetchError::Status(500));
    harness.push(ShellEvent::StartScan(ScanRequest::new("10.0.0.0/24", vec![22], false).unwrap()));
    harness.settle().await;

    let notes = harness.shell.document().notification_count();
    assert_eq!(notes, 1);
}
