use stationhub::console::{execute, ConsoleCommand};
use stationhub::hub::{Hub, LedSource};
use stationhub::HubConfig;
use std::time::Instant;

fn hub_with_data() -> Hub {
    let mut hub = Hub::new(HubConfig::default());
    let t0 = Instant::now();
    hub.ingest_metric("Ultrasonic", "distance_cm", "42.00", t0);
    hub.ingest_metric("Ultrasonic", "status", "online", t0);
    hub.ingest_metric("Temperature", "temperature_c", "21.50", t0);
    hub
}

#[test]
fn test_command_parsing() {
    assert_eq!(ConsoleCommand::parse("list"), ConsoleCommand::List);
    assert_eq!(ConsoleCommand::parse("devices"), ConsoleCommand::Devices);
    assert_eq!(ConsoleCommand::parse("current"), ConsoleCommand::Current);
    assert_eq!(ConsoleCommand::parse("q"), ConsoleCommand::Quiet);
    assert_eq!(ConsoleCommand::parse("exit"), ConsoleCommand::Exit);
    assert_eq!(ConsoleCommand::parse(""), ConsoleCommand::Empty);
    assert_eq!(ConsoleCommand::parse("   "), ConsoleCommand::Empty);
    assert_eq!(ConsoleCommand::parse("bogus"), ConsoleCommand::Unknown);
}

#[test]
fn test_show_parsing() {
    assert_eq!(
        ConsoleCommand::parse("show 1"),
        ConsoleCommand::Show("1".to_string())
    );
    assert_eq!(
        ConsoleCommand::parse("show ultra dist"),
        ConsoleCommand::Show("ultra dist".to_string())
    );
    assert_eq!(ConsoleCommand::parse("show"), ConsoleCommand::ShowUsage);
}

#[test]
fn test_led_parsing() {
    assert_eq!(ConsoleCommand::parse("led"), ConsoleCommand::LedQuery);
    assert_eq!(ConsoleCommand::parse("led on"), ConsoleCommand::LedLog(true));
    assert_eq!(ConsoleCommand::parse("led OFF"), ConsoleCommand::LedLog(false));
    assert_eq!(ConsoleCommand::parse("led blue"), ConsoleCommand::LedLogUsage);
}

#[test]
fn test_source_parsing() {
    assert_eq!(
        ConsoleCommand::parse("source imu"),
        ConsoleCommand::Source(LedSource::Imu)
    );
    assert_eq!(
        ConsoleCommand::parse("source i"),
        ConsoleCommand::Source(LedSource::Imu)
    );
    assert_eq!(
        ConsoleCommand::parse("source us"),
        ConsoleCommand::Source(LedSource::Ultrasonic)
    );
    assert_eq!(
        ConsoleCommand::parse("source ultrasonic"),
        ConsoleCommand::Source(LedSource::Ultrasonic)
    );
    assert_eq!(ConsoleCommand::parse("source"), ConsoleCommand::SourceUsage);
    assert_eq!(
        ConsoleCommand::parse("source lidar"),
        ConsoleCommand::SourceUsage
    );
}

#[test]
fn test_list_on_empty_hub() {
    let mut hub = Hub::new(HubConfig::default());
    let reply = execute(ConsoleCommand::List, &mut hub);
    assert_eq!(reply.lines, vec!["No topics seen yet."]);
    assert!(!reply.exit);
}

#[test]
fn test_list_shows_numbered_sorted_topics() {
    let mut hub = hub_with_data();
    let reply = execute(ConsoleCommand::List, &mut hub);
    assert_eq!(
        reply.lines,
        vec![
            "Topics:",
            "  1) esp/Temperature/temperature_c",
            "  2) esp/Ultrasonic/distance_cm",
            "  3) esp/Ultrasonic/status",
            "Use 'list' again to refresh as new topics appear.",
        ]
    );
}

#[test]
fn test_devices_lists_stations_with_status() {
    let mut hub = hub_with_data();
    let reply = execute(ConsoleCommand::Devices, &mut hub);
    assert_eq!(
        reply.lines,
        vec![
            "Stations:",
            "  Temperature (unknown)",
            "  Ultrasonic (online)",
        ]
    );
}

#[test]
fn test_show_selects_by_index_and_reports() {
    let mut hub = hub_with_data();
    let reply = execute(ConsoleCommand::Show("1".to_string()), &mut hub);
    assert_eq!(
        reply.lines,
        vec!["Selected topic: esp/Temperature/temperature_c"]
    );
    assert_eq!(
        hub.selected().map(|t| t.wire("esp")),
        Some("esp/Temperature/temperature_c".to_string())
    );
}

#[test]
fn test_show_station_lists_metrics() {
    let mut hub = hub_with_data();
    let reply = execute(ConsoleCommand::Show("ultra".to_string()), &mut hub);
    assert_eq!(
        reply.lines,
        vec![
            "Metrics for Ultrasonic:",
            "  - distance_cm",
            "  - status",
        ]
    );
    // Listing metrics is not a selection.
    assert!(hub.selected().is_none());
}

#[test]
fn test_show_reports_resolution_failures() {
    let mut hub = hub_with_data();

    let reply = execute(ConsoleCommand::Show("99".to_string()), &mut hub);
    assert_eq!(reply.lines, vec!["Invalid topic number."]);

    let reply = execute(ConsoleCommand::Show("nothere x".to_string()), &mut hub);
    assert_eq!(reply.lines, vec!["Unknown station. Use 'devices' or 'list'."]);

    let reply = execute(ConsoleCommand::Show("t nothere".to_string()), &mut hub);
    assert_eq!(
        reply.lines,
        vec!["Unknown metric. Use 'show <station>' or 'list'."]
    );
    assert!(hub.selected().is_none());
}

#[test]
fn test_current_and_quiet() {
    let mut hub = hub_with_data();

    let reply = execute(ConsoleCommand::Current, &mut hub);
    assert_eq!(reply.lines, vec!["No topic selected."]);

    execute(ConsoleCommand::Show("2".to_string()), &mut hub);
    let reply = execute(ConsoleCommand::Current, &mut hub);
    assert_eq!(
        reply.lines,
        vec!["Current topic: esp/Ultrasonic/distance_cm"]
    );

    let reply = execute(ConsoleCommand::Quiet, &mut hub);
    assert_eq!(reply.lines, vec!["Topic output paused."]);
    assert!(hub.selected().is_none());
}

#[test]
fn test_led_query_before_and_after_publish() {
    let mut hub = hub_with_data();

    // hub_with_data drove the distance pipeline, so a payload exists.
    let reply = execute(ConsoleCommand::LedQuery, &mut hub);
    assert_eq!(reply.lines.len(), 1);
    assert!(reply.lines[0].starts_with("Last LED payload: "));

    let mut fresh = Hub::new(HubConfig::default());
    let reply = execute(ConsoleCommand::LedQuery, &mut fresh);
    assert_eq!(reply.lines, vec!["No LED payload sent yet."]);
}

#[test]
fn test_led_log_toggle() {
    let mut hub = hub_with_data();
    assert!(hub.led_log_enabled());

    let reply = execute(ConsoleCommand::LedLog(false), &mut hub);
    assert_eq!(reply.lines, vec!["LED publish logging disabled."]);
    assert!(!hub.led_log_enabled());

    let reply = execute(ConsoleCommand::LedLog(true), &mut hub);
    assert_eq!(reply.lines, vec!["LED publish logging enabled."]);
    assert!(hub.led_log_enabled());
}

#[test]
fn test_source_switch_via_console() {
    let mut hub = hub_with_data();
    assert_eq!(hub.source(), LedSource::Ultrasonic);

    let reply = execute(ConsoleCommand::Source(LedSource::Imu), &mut hub);
    assert_eq!(reply.lines, vec!["LED source set to IMU."]);
    assert_eq!(hub.source(), LedSource::Imu);
}

#[test]
fn test_exit_sets_flag() {
    let mut hub = hub_with_data();
    let reply = execute(ConsoleCommand::Exit, &mut hub);
    assert!(reply.exit);
    assert!(reply.lines.is_empty());
}

#[test]
fn test_unknown_command_help() {
    let mut hub = hub_with_data();
    let reply = execute(ConsoleCommand::Unknown, &mut hub);
    assert_eq!(
        reply.lines,
        vec!["Unknown command. Try: list, devices, show <n|topic>, current, q, exit"]
    );
}
