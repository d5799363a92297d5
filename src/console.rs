use crate::hub::{Hub, LedSource};
use crate::resolver::{self, SelectError, Selection};

pub const COMMAND_SUMMARY: &str =
    "Commands: list, devices, show <n|topic|station metric>, current, led, source, q, exit";

/// One parsed console line. Parsing is pure; execution happens against the
/// hub under its lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    List,
    Devices,
    Show(String),
    ShowUsage,
    Current,
    LedQuery,
    LedLog(bool),
    LedLogUsage,
    Source(LedSource),
    SourceUsage,
    Quiet,
    Exit,
    Empty,
    Unknown,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> ConsoleCommand {
        let line = line.trim();
        if line.is_empty() {
            return ConsoleCommand::Empty;
        }

        let mut parts = line.splitn(2, char::is_whitespace);
        let head = parts.next().unwrap_or("");
        let rest = parts.next().map(str::trim).unwrap_or("");

        match (head, rest) {
            ("list", "") => ConsoleCommand::List,
            ("devices", "") => ConsoleCommand::Devices,
            ("current", "") => ConsoleCommand::Current,
            ("q", "") => ConsoleCommand::Quiet,
            ("exit", "") => ConsoleCommand::Exit,
            ("led", "") => ConsoleCommand::LedQuery,
            ("led", arg) => match arg.to_lowercase().as_str() {
                "on" => ConsoleCommand::LedLog(true),
                "off" => ConsoleCommand::LedLog(false),
                _ => ConsoleCommand::LedLogUsage,
            },
            ("source", "") => ConsoleCommand::SourceUsage,
            ("source", arg) => arg
                .parse::<LedSource>()
                .map(ConsoleCommand::Source)
                .unwrap_or(ConsoleCommand::SourceUsage),
            ("show", "") => ConsoleCommand::ShowUsage,
            ("show", arg) => ConsoleCommand::Show(arg.to_string()),
            _ => ConsoleCommand::Unknown,
        }
    }
}

/// Lines to print back to the operator, plus the exit flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleReply {
    pub lines: Vec<String>,
    pub exit: bool,
}

impl ConsoleReply {
    fn lines(lines: Vec<String>) -> Self {
        Self { lines, exit: false }
    }

    fn line(line: impl Into<String>) -> Self {
        Self::lines(vec![line.into()])
    }
}

/// Executes one command against the hub. Only selection, source, and LED
/// logging commands mutate state; everything else is read-only.
pub fn execute(command: ConsoleCommand, hub: &mut Hub) -> ConsoleReply {
    match command {
        ConsoleCommand::List => ConsoleReply::lines(render_topic_listing(hub)),
        ConsoleCommand::Devices => ConsoleReply::lines(render_stations(hub)),
        ConsoleCommand::Show(arg) => ConsoleReply::lines(run_show(&arg, hub)),
        ConsoleCommand::ShowUsage => ConsoleReply::line("Usage: show <n|topic|station metric>"),
        ConsoleCommand::Current => match hub.selected() {
            Some(topic) => ConsoleReply::line(format!(
                "Current topic: {}",
                topic.wire(&hub.config().topic_prefix)
            )),
            None => ConsoleReply::line("No topic selected."),
        },
        ConsoleCommand::LedQuery => match hub.last_led_payload() {
            Some(payload) => ConsoleReply::line(format!("Last LED payload: {}", payload)),
            None => ConsoleReply::line("No LED payload sent yet."),
        },
        ConsoleCommand::LedLog(enabled) => {
            hub.set_led_log_enabled(enabled);
            if enabled {
                ConsoleReply::line("LED publish logging enabled.")
            } else {
                ConsoleReply::line("LED publish logging disabled.")
            }
        }
        ConsoleCommand::LedLogUsage => ConsoleReply::line("Usage: led on | led off"),
        ConsoleCommand::Source(source) => {
            hub.set_source(source);
            match source {
                LedSource::Imu => ConsoleReply::line("LED source set to IMU."),
                LedSource::Ultrasonic => ConsoleReply::line("LED source set to ultrasonic."),
            }
        }
        ConsoleCommand::SourceUsage => ConsoleReply::line("Usage: source imu | source us"),
        ConsoleCommand::Quiet => {
            hub.select(None);
            ConsoleReply::line("Topic output paused.")
        }
        ConsoleCommand::Exit => ConsoleReply {
            lines: Vec::new(),
            exit: true,
        },
        ConsoleCommand::Empty => ConsoleReply::lines(Vec::new()),
        ConsoleCommand::Unknown => {
            ConsoleReply::line("Unknown command. Try: list, devices, show <n|topic>, current, q, exit")
        }
    }
}

/// Numbered topic listing, also printed by the one-shot first-topic latch.
pub fn render_topic_lines(topics: &[String]) -> Vec<String> {
    if topics.is_empty() {
        return vec!["No topics seen yet.".to_string()];
    }
    let mut lines = vec!["Topics:".to_string()];
    for (index, topic) in topics.iter().enumerate() {
        lines.push(format!("  {}) {}", index + 1, topic));
    }
    lines.push("Use 'list' again to refresh as new topics appear.".to_string());
    lines
}

fn render_topic_listing(hub: &Hub) -> Vec<String> {
    render_topic_lines(&hub.topic_listing())
}

fn render_stations(hub: &Hub) -> Vec<String> {
    let store = hub.store();
    let stations: Vec<&str> = store.stations().collect();
    if stations.is_empty() {
        return vec!["No stations seen yet.".to_string()];
    }
    let mut lines = vec!["Stations:".to_string()];
    for station in stations {
        let status = store.status_of(station).unwrap_or("unknown");
        lines.push(format!("  {} ({})", station, status));
    }
    lines
}

fn run_show(arg: &str, hub: &mut Hub) -> Vec<String> {
    let prefix = hub.config().topic_prefix.clone();
    match resolver::resolve_selection(arg, hub.store(), &prefix) {
        Ok(Selection::Topic(topic)) => {
            let wire = topic.wire(&prefix);
            hub.select(Some(topic));
            vec![format!("Selected topic: {}", wire)]
        }
        Ok(Selection::MetricListing(station)) => {
            let metrics = hub.store().metrics_for(&station);
            if metrics.is_empty() {
                return vec![format!("No metrics seen yet for {}.", station)];
            }
            let mut lines = vec![format!("Metrics for {}:", station)];
            for metric in metrics {
                lines.push(format!("  - {}", metric));
            }
            lines
        }
        Err(e) => vec![render_select_error(&e)],
    }
}

fn render_select_error(error: &SelectError) -> String {
    match error {
        SelectError::BadIndex => "Invalid topic number.".to_string(),
        SelectError::NotSeen => {
            "Topic not seen yet. Use 'list' to see available topics.".to_string()
        }
        SelectError::AmbiguousStation { matches } => {
            format!("Ambiguous station. Matches: {}", matches.join(", "))
        }
        SelectError::UnknownStation => "Unknown station. Use 'devices' or 'list'.".to_string(),
        SelectError::AmbiguousMetric { matches } => {
            format!("Ambiguous metric. Matches: {}", matches.join(", "))
        }
        SelectError::UnknownMetric => "Unknown metric. Use 'show <station>' or 'list'.".to_string(),
    }
}
