use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Metric name carrying the station liveness string.
pub const STATUS_METRIC: &str = "status";

/// Addressable (station, metric) pair on the bus.
///
/// Wire names have the shape `prefix/station/metric`, where the metric part
/// may itself contain further `/` segments (kept rejoined, not truncated).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Topic {
    pub station: String,
    pub metric: String,
}

impl Topic {
    pub fn new(station: &str, metric: &str) -> Self {
        Self {
            station: station.to_string(),
            metric: metric.to_string(),
        }
    }

    /// Full bus topic name under the given prefix.
    pub fn wire(&self, prefix: &str) -> String {
        format!("{}/{}/{}", prefix, self.station, self.metric)
    }

    /// Parses a wire name back into a topic. Returns `None` when the name is
    /// outside the prefix namespace or has fewer than three segments.
    pub fn from_wire(prefix: &str, name: &str) -> Option<Topic> {
        let mut parts = name.splitn(3, '/');
        if parts.next()? != prefix {
            return None;
        }
        let station = parts.next()?;
        let metric = parts.next()?;
        if station.is_empty() || metric.is_empty() {
            return None;
        }
        Some(Topic::new(station, metric))
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.station, self.metric)
    }
}

/// Result of recording one metric observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub new_topic: bool,
    pub status_change: Option<StatusChange>,
}

/// A station's status metric moved to a new value. The first observed status
/// counts as a transition from `previous: None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub previous: Option<String>,
    pub current: String,
}

/// Latest-value store for everything the hub has heard from the stations.
///
/// Retains only the most recent raw value per (station, metric), the set of
/// distinct topics ever observed, and each station's last known status. The
/// store itself is plain data; the owning `Hub` is kept behind a single
/// coarse lock shared by all ingestion paths.
#[derive(Debug, Default)]
pub struct StationStore {
    stations: BTreeMap<String, BTreeMap<String, String>>,
    status: BTreeMap<String, String>,
    topics: BTreeSet<Topic>,
}

impl StationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one observation and reports whether the topic is new and
    /// whether the station's status changed.
    pub fn record_metric(&mut self, station: &str, metric: &str, value: &str) -> RecordOutcome {
        let new_topic = self.topics.insert(Topic::new(station, metric));

        self.stations
            .entry(station.to_string())
            .or_default()
            .insert(metric.to_string(), value.to_string());

        let status_change = if metric == STATUS_METRIC {
            let previous = self.status.insert(station.to_string(), value.to_string());
            match previous {
                Some(ref prev) if prev.as_str() == value => None,
                previous => Some(StatusChange {
                    previous,
                    current: value.to_string(),
                }),
            }
        } else {
            None
        };

        RecordOutcome {
            new_topic,
            status_change,
        }
    }

    /// Every distinct topic observed so far, in sorted order.
    pub fn topics(&self) -> impl Iterator<Item = &Topic> + '_ {
        self.topics.iter()
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Station ids in sorted order.
    pub fn stations(&self) -> impl Iterator<Item = &str> + '_ {
        self.stations.keys().map(String::as_str)
    }

    /// Metric names observed for one station, sorted. Empty for unknown ids.
    pub fn metrics_for(&self, station: &str) -> Vec<&str> {
        self.stations
            .get(station)
            .map(|metrics| metrics.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Last known status string for a station, if any was ever published.
    pub fn status_of(&self, station: &str) -> Option<&str> {
        self.status.get(station).map(String::as_str)
    }

    /// Latest raw value recorded for a topic, if observed.
    pub fn value_of(&self, topic: &Topic) -> Option<&str> {
        self.stations
            .get(&topic.station)
            .and_then(|metrics| metrics.get(&topic.metric))
            .map(String::as_str)
    }
}
