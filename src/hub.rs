use crate::color::{self, ColorMode, LedPayload};
use crate::config::HubConfig;
use crate::gate::PublishGate;
use crate::imu::ImuSample;
use crate::store::{StationStore, StatusChange, Topic};
use std::str::FromStr;
use std::time::Instant;

/// Which upstream signal currently drives the LED output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedSource {
    Ultrasonic,
    Imu,
}

impl FromStr for LedSource {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "imu" | "i" => Ok(LedSource::Imu),
            "us" | "u" | "ultrasonic" => Ok(LedSource::Ultrasonic),
            _ => Err("expected 'imu' or 'us'"),
        }
    }
}

/// One decoded inbound telemetry event, from either ingestion path.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    Metric {
        station: String,
        metric: String,
        value: String,
    },
    Orientation {
        pitch: f64,
        roll: f64,
    },
}

/// Side effects requested by one ingestion step.
///
/// The hub itself performs no I/O; the calling task acts on these after
/// releasing the hub lock.
#[derive(Debug, Clone, PartialEq)]
pub enum HubEvent {
    /// Publish this payload on the LED topic.
    PublishLed(LedPayload),
    /// Print the one-time topic listing (fires at most once per process).
    TopicListing(Vec<String>),
    /// A station's status metric transitioned.
    StatusChanged {
        station: String,
        previous: Option<String>,
        current: String,
    },
    /// The currently selected display topic received a value.
    SelectedReading { topic: String, value: String },
}

/// The hub aggregate: the station store, the LED publish gate, and the
/// operator session settings, mutated only through `ingest_*` and the
/// console setters.
///
/// One `Hub` exists per process, shared behind a single coarse lock by the
/// bus reader, the IMU listener, and the console loop. Each inbound event
/// consults the live source/selection values under that lock, so a `source`
/// switch takes effect on the very next event.
pub struct Hub {
    config: HubConfig,
    store: StationStore,
    gate: PublishGate,
    source: LedSource,
    selected: Option<Topic>,
    imu: Option<ImuSample>,
    led_log_enabled: bool,
    topics_listed: bool,
}

impl Hub {
    pub fn new(config: HubConfig) -> Self {
        let gate = PublishGate::new(config.publish_interval);
        Self {
            config,
            store: StationStore::new(),
            gate,
            source: LedSource::Ultrasonic,
            selected: None,
            imu: None,
            led_log_enabled: true,
            topics_listed: false,
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn store(&self) -> &StationStore {
        &self.store
    }

    pub fn source(&self) -> LedSource {
        self.source
    }

    pub fn set_source(&mut self, source: LedSource) {
        self.source = source;
    }

    pub fn selected(&self) -> Option<&Topic> {
        self.selected.as_ref()
    }

    pub fn select(&mut self, topic: Option<Topic>) {
        self.selected = topic;
    }

    pub fn led_log_enabled(&self) -> bool {
        self.led_log_enabled
    }

    pub fn set_led_log_enabled(&mut self, enabled: bool) {
        self.led_log_enabled = enabled;
    }

    pub fn last_led_payload(&self) -> Option<&LedPayload> {
        self.gate.last_payload()
    }

    pub fn latest_imu(&self) -> Option<&ImuSample> {
        self.imu.as_ref()
    }

    /// Sorted wire-form names of every topic observed so far.
    pub fn topic_listing(&self) -> Vec<String> {
        self.store
            .topics()
            .map(|t| t.wire(&self.config.topic_prefix))
            .collect()
    }

    /// Routes one decoded telemetry event through the store, the mapping
    /// pipelines, and the publish gate.
    pub fn ingest(&mut self, event: TelemetryEvent, now: Instant) -> Vec<HubEvent> {
        match event {
            TelemetryEvent::Metric {
                station,
                metric,
                value,
            } => self.ingest_metric(&station, &metric, &value, now),
            TelemetryEvent::Orientation { pitch, roll } => self.ingest_imu(pitch, roll, now),
        }
    }

    /// Records a station metric and derives any resulting side effects:
    /// the one-time topic listing, status-change notices, an LED publish
    /// when this event drives the active source, and the display forward
    /// for the selected topic.
    pub fn ingest_metric(
        &mut self,
        station: &str,
        metric: &str,
        value: &str,
        now: Instant,
    ) -> Vec<HubEvent> {
        let mut events = Vec::new();
        let outcome = self.store.record_metric(station, metric, value);

        // One-shot latch: the listing prints for the first new topic this
        // process ever sees, never again regardless of later novelty.
        if outcome.new_topic && !self.topics_listed {
            self.topics_listed = true;
            events.push(HubEvent::TopicListing(self.topic_listing()));
        }

        if let Some(StatusChange { previous, current }) = outcome.status_change {
            events.push(HubEvent::StatusChanged {
                station: station.to_string(),
                previous,
                current,
            });
        }

        if self.source == LedSource::Ultrasonic
            && station == self.config.distance_station
            && metric == self.config.distance_metric
        {
            let payload = self.map_distance(parse_reading(value));
            self.offer(payload, now, &mut events);
        }

        let selected = self
            .selected
            .as_ref()
            .map_or(false, |t| t.station == station && t.metric == metric);
        if selected {
            events.push(HubEvent::SelectedReading {
                topic: Topic::new(station, metric).wire(&self.config.topic_prefix),
                value: value.to_string(),
            });
        }

        events
    }

    /// Stores the latest orientation sample (always, regardless of source)
    /// and drives the LED from pitch when the IMU source is active.
    pub fn ingest_imu(&mut self, pitch: f64, roll: f64, now: Instant) -> Vec<HubEvent> {
        self.imu = Some(ImuSample {
            pitch,
            roll,
            received_at: now,
        });

        let mut events = Vec::new();
        if self.source == LedSource::Imu {
            let payload = self.map_pitch(pitch);
            self.offer(payload, now, &mut events);
        }
        events
    }

    fn offer(&mut self, payload: LedPayload, now: Instant, events: &mut Vec<HubEvent>) {
        if self.gate.should_emit(&payload, now) {
            self.gate.record_emit(payload, now);
            events.push(HubEvent::PublishLed(payload));
        }
    }

    fn map_distance(&self, value: f64) -> LedPayload {
        let c = &self.config;
        match c.color_mode {
            ColorMode::Linear => color::linear_ramp(value, c.distance_min_cm, c.distance_max_cm),
            ColorMode::Hue => color::hue_sweep(
                value,
                c.distance_min_cm,
                c.distance_max_cm,
                c.hue_min,
                c.hue_max,
                c.saturation,
                c.brightness,
            ),
        }
    }

    // Pitch only; roll is recorded but not part of the mapping.
    fn map_pitch(&self, pitch: f64) -> LedPayload {
        let c = &self.config;
        color::hue_sweep(
            pitch,
            c.pitch_min,
            c.pitch_max,
            c.hue_min,
            c.hue_max,
            c.saturation,
            c.brightness,
        )
    }
}

/// Parses a raw metric payload into a reading. The literal `nan` marker
/// (any case) and unparsable text both yield NaN, which flows through the
/// color mapping as an undefined payload rather than an error.
pub fn parse_reading(raw: &str) -> f64 {
    let text = raw.trim();
    if text.eq_ignore_ascii_case("nan") {
        return f64::NAN;
    }
    text.parse::<f64>().unwrap_or(f64::NAN)
}
