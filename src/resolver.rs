use crate::store::{StationStore, Topic};
use thiserror::Error;

/// Outcome of matching operator input against a candidate name list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatch {
    Exact(String),
    Ambiguous(Vec<String>),
    NoMatch,
}

/// Matches a partial name against candidates, case-insensitively.
///
/// A unique exact match wins outright; otherwise a unique prefix match is
/// accepted; multiple prefix matches are reported back for the operator to
/// disambiguate. Candidate order is preserved in the ambiguous listing.
pub fn match_name<'a, I>(input: &str, candidates: I) -> NameMatch
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = input.to_lowercase();
    let mut exact: Vec<&str> = Vec::new();
    let mut prefixed: Vec<&str> = Vec::new();

    for candidate in candidates {
        let lowered = candidate.to_lowercase();
        if lowered == needle {
            exact.push(candidate);
        }
        if lowered.starts_with(&needle) {
            prefixed.push(candidate);
        }
    }

    if exact.len() == 1 {
        return NameMatch::Exact(exact[0].to_string());
    }
    match prefixed.len() {
        0 => NameMatch::NoMatch,
        1 => NameMatch::Exact(prefixed[0].to_string()),
        _ => NameMatch::Ambiguous(prefixed.iter().map(|c| c.to_string()).collect()),
    }
}

/// A successful `show` resolution: either a concrete topic selection or a
/// request to list one station's metrics (station named without a metric).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Topic(Topic),
    MetricListing(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("invalid topic number")]
    BadIndex,
    #[error("topic not seen yet")]
    NotSeen,
    #[error("ambiguous station ({})", .matches.join(", "))]
    AmbiguousStation { matches: Vec<String> },
    #[error("unknown station")]
    UnknownStation,
    #[error("ambiguous metric ({})", .matches.join(", "))]
    AmbiguousMetric { matches: Vec<String> },
    #[error("unknown metric")]
    UnknownMetric,
}

/// Resolves operator input to a topic.
///
/// Tried in order: a 1-based index into the sorted topic list, a verbatim
/// wire-form topic name, then fuzzy `station [metric]` resolution via
/// `match_name`. A station with no recorded metrics accepts the metric part
/// literally, selecting the topic before it has ever been observed.
///
/// Pure over the store snapshot; no state is mutated on any path.
pub fn resolve_selection(
    input: &str,
    store: &StationStore,
    prefix: &str,
) -> Result<Selection, SelectError> {
    let input = input.trim();
    let topics: Vec<&Topic> = store.topics().collect();

    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        let index: usize = input.parse().map_err(|_| SelectError::BadIndex)?;
        if index >= 1 && index <= topics.len() {
            return Ok(Selection::Topic(topics[index - 1].clone()));
        }
        return Err(SelectError::BadIndex);
    }

    if let Some(topic) = topics.iter().find(|t| t.wire(prefix) == input) {
        return Ok(Selection::Topic((*topic).clone()));
    }

    let mut parts = input
        .split(|c: char| c.is_whitespace() || c == '/')
        .filter(|part| !part.is_empty());
    let Some(station_part) = parts.next() else {
        return Err(SelectError::NotSeen);
    };
    let metric_part = parts.next();

    let station = match match_name(station_part, store.stations()) {
        NameMatch::Exact(station) => station,
        NameMatch::Ambiguous(matches) => return Err(SelectError::AmbiguousStation { matches }),
        NameMatch::NoMatch => return Err(SelectError::UnknownStation),
    };

    let Some(metric_part) = metric_part else {
        return Ok(Selection::MetricListing(station));
    };

    let metrics = store.metrics_for(&station);
    let metric = match match_name(metric_part, metrics.iter().copied()) {
        NameMatch::Exact(metric) => metric,
        NameMatch::Ambiguous(matches) => return Err(SelectError::AmbiguousMetric { matches }),
        // A station that has never reported accepts any metric name as a
        // speculative, not-yet-observed topic.
        NameMatch::NoMatch if metrics.is_empty() => metric_part.to_string(),
        NameMatch::NoMatch => return Err(SelectError::UnknownMetric),
    };

    Ok(Selection::Topic(Topic::new(&station, &metric)))
}
