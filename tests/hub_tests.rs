use stationhub::hub::{parse_reading, Hub, HubEvent, LedSource, TelemetryEvent};
use stationhub::store::Topic;
use stationhub::{ColorMode, HubConfig, LedPayload};
use std::time::{Duration, Instant};

const INTERVAL: Duration = Duration::from_secs(1);

fn linear_config() -> HubConfig {
    HubConfig {
        color_mode: ColorMode::Linear,
        distance_min_cm: 5.0,
        distance_max_cm: 200.0,
        publish_interval: INTERVAL,
        ..HubConfig::default()
    }
}

fn led_publishes(events: &[HubEvent]) -> Vec<LedPayload> {
    events
        .iter()
        .filter_map(|e| match e {
            HubEvent::PublishLed(payload) => Some(*payload),
            _ => None,
        })
        .collect()
}

#[test]
fn test_distance_sweep_end_to_end() {
    // Range endpoints map to pure red and pure green in linear mode; the
    // first is emitted because nothing was ever sent, the second because the
    // payload changed.
    let mut hub = Hub::new(linear_config());
    let t0 = Instant::now();

    let events = hub.ingest_metric("Ultrasonic", "distance_cm", "5.0", t0);
    assert_eq!(led_publishes(&events), vec![LedPayload::Rgb(255, 0, 0)]);

    let events = hub.ingest_metric("Ultrasonic", "distance_cm", "200.0", t0 + Duration::from_millis(100));
    assert_eq!(led_publishes(&events), vec![LedPayload::Rgb(0, 255, 0)]);
}

#[test]
fn test_default_hue_mapping_endpoints() {
    // Default config: near is red (hue 0), far is blue (hue 240).
    let mut hub = Hub::new(HubConfig {
        publish_interval: INTERVAL,
        ..HubConfig::default()
    });
    let t0 = Instant::now();

    let events = hub.ingest_metric("Ultrasonic", "distance_cm", "5.0", t0);
    assert_eq!(led_publishes(&events), vec![LedPayload::Rgb(255, 0, 0)]);

    let events = hub.ingest_metric("Ultrasonic", "distance_cm", "200.0", t0 + Duration::from_millis(10));
    assert_eq!(led_publishes(&events), vec![LedPayload::Rgb(0, 0, 255)]);
}

#[test]
fn test_unchanged_payload_suppressed_then_heartbeat() {
    let mut hub = Hub::new(linear_config());
    let t0 = Instant::now();

    assert_eq!(led_publishes(&hub.ingest_metric("Ultrasonic", "distance_cm", "5.0", t0)).len(), 1);

    // Same reading inside the window: suppressed.
    let events = hub.ingest_metric("Ultrasonic", "distance_cm", "5.0", t0 + Duration::from_millis(200));
    assert!(led_publishes(&events).is_empty());

    // Same reading once the interval elapsed: heartbeat re-emission.
    let events = hub.ingest_metric("Ultrasonic", "distance_cm", "5.0", t0 + INTERVAL);
    assert_eq!(led_publishes(&events), vec![LedPayload::Rgb(255, 0, 0)]);
}

#[test]
fn test_nan_and_garbage_payloads_map_to_undefined() {
    let mut hub = Hub::new(linear_config());
    let t0 = Instant::now();

    let events = hub.ingest_metric("Ultrasonic", "distance_cm", "NaN", t0);
    assert_eq!(led_publishes(&events), vec![LedPayload::Undefined]);

    // Garbage is the same undefined payload, so it is suppressed in-window.
    let events = hub.ingest_metric("Ultrasonic", "distance_cm", "garbage", t0 + Duration::from_millis(10));
    assert!(led_publishes(&events).is_empty());
}

#[test]
fn test_degenerate_range_always_undefined() {
    let mut hub = Hub::new(HubConfig {
        color_mode: ColorMode::Linear,
        distance_min_cm: 200.0,
        distance_max_cm: 5.0,
        publish_interval: INTERVAL,
        ..HubConfig::default()
    });

    let events = hub.ingest_metric("Ultrasonic", "distance_cm", "50.0", Instant::now());
    assert_eq!(led_publishes(&events), vec![LedPayload::Undefined]);
}

#[test]
fn test_other_stations_never_drive_the_led() {
    let mut hub = Hub::new(linear_config());
    let events = hub.ingest_metric("Temperature", "distance_cm", "5.0", Instant::now());
    assert!(led_publishes(&events).is_empty());

    let events = hub.ingest_metric("Ultrasonic", "echo_us", "5.0", Instant::now());
    assert!(led_publishes(&events).is_empty());
}

#[test]
fn test_source_switch_takes_effect_immediately() {
    let mut hub = Hub::new(linear_config());
    let t0 = Instant::now();

    hub.set_source(LedSource::Imu);
    let events = hub.ingest_metric("Ultrasonic", "distance_cm", "5.0", t0);
    assert!(led_publishes(&events).is_empty());

    let events = hub.ingest_imu(0.0, 0.0, t0);
    assert_eq!(led_publishes(&events).len(), 1);

    hub.set_source(LedSource::Ultrasonic);
    let events = hub.ingest_imu(10.0, 0.0, t0 + Duration::from_millis(10));
    assert!(led_publishes(&events).is_empty());
}

#[test]
fn test_imu_sample_tracked_even_when_inactive() {
    let mut hub = Hub::new(linear_config());
    assert!(hub.latest_imu().is_none());

    // Ultrasonic is the active source, but the sample still lands.
    hub.ingest_imu(12.5, -3.2, Instant::now());
    let sample = hub.latest_imu().expect("sample should be stored");
    assert_eq!(sample.pitch, 12.5);
    assert_eq!(sample.roll, -3.2);
}

#[test]
fn test_imu_mapping_ignores_roll() {
    // Known limitation preserved from the deployed hub: roll is captured
    // but only pitch participates in the color mapping.
    let mut a = Hub::new(HubConfig::default());
    let mut b = Hub::new(HubConfig::default());
    a.set_source(LedSource::Imu);
    b.set_source(LedSource::Imu);

    let t0 = Instant::now();
    let from_a = led_publishes(&a.ingest_imu(10.0, -30.0, t0));
    let from_b = led_publishes(&b.ingest_imu(10.0, 30.0, t0));
    assert_eq!(from_a, from_b);
    assert_eq!(from_a.len(), 1);
}

#[test]
fn test_pitch_maps_across_configured_range() {
    let mut hub = Hub::new(HubConfig {
        publish_interval: INTERVAL,
        ..HubConfig::default()
    });
    hub.set_source(LedSource::Imu);
    let t0 = Instant::now();

    // Pitch at the bottom of the range is hue 0 (red), top is hue 240 (blue).
    let events = hub.ingest_imu(-45.0, 0.0, t0);
    assert_eq!(led_publishes(&events), vec![LedPayload::Rgb(255, 0, 0)]);

    let events = hub.ingest_imu(45.0, 0.0, t0 + Duration::from_millis(10));
    assert_eq!(led_publishes(&events), vec![LedPayload::Rgb(0, 0, 255)]);
}

#[test]
fn test_topic_listing_fires_exactly_once() {
    let mut hub = Hub::new(HubConfig::default());
    let t0 = Instant::now();

    let events = hub.ingest_metric("Ultrasonic", "distance_cm", "42.0", t0);
    let listings: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, HubEvent::TopicListing(_)))
        .collect();
    assert_eq!(listings.len(), 1);

    // Later novelty never re-triggers the listing.
    let events = hub.ingest_metric("Temperature", "temperature_c", "21.0", t0);
    assert!(!events.iter().any(|e| matches!(e, HubEvent::TopicListing(_))));
}

#[test]
fn test_status_changes_surface_as_events() {
    let mut hub = Hub::new(HubConfig::default());
    let t0 = Instant::now();

    let events = hub.ingest_metric("Ultrasonic", "status", "online", t0);
    assert!(events.iter().any(|e| matches!(
        e,
        HubEvent::StatusChanged { station, previous: None, current }
            if station == "Ultrasonic" && current == "online"
    )));

    let events = hub.ingest_metric("Ultrasonic", "status", "online", t0);
    assert!(!events.iter().any(|e| matches!(e, HubEvent::StatusChanged { .. })));

    let events = hub.ingest_metric("Ultrasonic", "status", "offline", t0);
    assert!(events.iter().any(|e| matches!(
        e,
        HubEvent::StatusChanged { previous: Some(prev), current, .. }
            if prev == "online" && current == "offline"
    )));
}

#[test]
fn test_selected_topic_forwards_readings() {
    let mut hub = Hub::new(HubConfig::default());
    let t0 = Instant::now();
    hub.ingest_metric("Temperature", "temperature_c", "21.0", t0);

    hub.select(Some(Topic::new("Temperature", "temperature_c")));
    let events = hub.ingest_metric("Temperature", "temperature_c", "21.5", t0);
    assert!(events.iter().any(|e| matches!(
        e,
        HubEvent::SelectedReading { topic, value }
            if topic == "esp/Temperature/temperature_c" && value == "21.5"
    )));

    // Other topics do not reach the display.
    let events = hub.ingest_metric("Ultrasonic", "distance_cm", "9.0", t0);
    assert!(!events.iter().any(|e| matches!(e, HubEvent::SelectedReading { .. })));

    // Clearing the selection pauses the display.
    hub.select(None);
    let events = hub.ingest_metric("Temperature", "temperature_c", "22.0", t0);
    assert!(!events.iter().any(|e| matches!(e, HubEvent::SelectedReading { .. })));
}

#[test]
fn test_ingest_event_enum_dispatch() {
    let mut hub = Hub::new(linear_config());
    let t0 = Instant::now();

    let events = hub.ingest(
        TelemetryEvent::Metric {
            station: "Ultrasonic".to_string(),
            metric: "distance_cm".to_string(),
            value: "5.0".to_string(),
        },
        t0,
    );
    assert_eq!(led_publishes(&events), vec![LedPayload::Rgb(255, 0, 0)]);

    hub.set_source(LedSource::Imu);
    let events = hub.ingest(TelemetryEvent::Orientation { pitch: 0.0, roll: 1.0 }, t0 + Duration::from_millis(10));
    assert_eq!(led_publishes(&events).len(), 1);
}

#[test]
fn test_last_led_payload_visible_to_console() {
    let mut hub = Hub::new(linear_config());
    assert!(hub.last_led_payload().is_none());

    hub.ingest_metric("Ultrasonic", "distance_cm", "5.0", Instant::now());
    assert_eq!(hub.last_led_payload(), Some(&LedPayload::Rgb(255, 0, 0)));
}

#[test]
fn test_parse_reading_accepts_nan_marker_and_floats() {
    assert_eq!(parse_reading("42.5"), 42.5);
    assert_eq!(parse_reading("  -3.0  "), -3.0);
    assert!(parse_reading("nan").is_nan());
    assert!(parse_reading("NaN").is_nan());
    assert!(parse_reading("not a number").is_nan());
    assert!(parse_reading("").is_nan());
}
