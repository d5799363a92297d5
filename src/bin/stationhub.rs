use clap::{App, Arg};
use colored::*;
use stationhub::bus::{self, BusEvent, BusHandle};
use stationhub::console::{self, ConsoleCommand};
use stationhub::hub::{Hub, HubEvent, LedSource};
use stationhub::imu;
use stationhub::store::Topic;
use stationhub::{ColorMode, HubConfig};
use std::io::Write;
use std::process;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let matches = App::new("stationhub")
        .version("0.1.0")
        .about("📡 Station telemetry hub - aggregates station metrics and drives the LED")
        .arg(
            Arg::with_name("broker")
                .short("b")
                .long("broker")
                .value_name("ADDR")
                .help("Bus broker address")
                .takes_value(true)
                .default_value(stationhub::config::DEFAULT_BROKER_ADDR),
        )
        .arg(
            Arg::with_name("prefix")
                .long("prefix")
                .value_name("PREFIX")
                .help("Station topic namespace")
                .takes_value(true)
                .default_value(stationhub::config::DEFAULT_TOPIC_PREFIX),
        )
        .arg(
            Arg::with_name("led-topic")
                .long("led-topic")
                .value_name("TOPIC")
                .help("Topic the derived LED payload is published on")
                .takes_value(true)
                .default_value(stationhub::config::DEFAULT_LED_TOPIC),
        )
        .arg(
            Arg::with_name("station")
                .long("station")
                .value_name("NAME")
                .help("Station whose distance metric drives the LED")
                .takes_value(true)
                .default_value(stationhub::config::DEFAULT_DISTANCE_STATION),
        )
        .arg(
            Arg::with_name("min-cm")
                .long("min-cm")
                .value_name("CM")
                .help("Distance mapped to the start of the color range")
                .takes_value(true)
                .default_value("5.0"),
        )
        .arg(
            Arg::with_name("max-cm")
                .long("max-cm")
                .value_name("CM")
                .help("Distance mapped to the end of the color range")
                .takes_value(true)
                .default_value("200.0"),
        )
        .arg(
            Arg::with_name("interval-ms")
                .long("interval-ms")
                .value_name("MS")
                .help("LED publish heartbeat interval")
                .takes_value(true)
                .default_value("1000"),
        )
        .arg(
            Arg::with_name("mode")
                .short("m")
                .long("mode")
                .value_name("MODE")
                .help("Distance color mapping")
                .takes_value(true)
                .possible_values(&["hue", "linear"])
                .default_value("hue"),
        )
        .arg(
            Arg::with_name("source")
                .short("s")
                .long("source")
                .value_name("SOURCE")
                .help("Initial LED source")
                .takes_value(true)
                .possible_values(&["us", "imu"])
                .default_value("us"),
        )
        .arg(
            Arg::with_name("imu-bind")
                .long("imu-bind")
                .value_name("ADDR")
                .help("Local address for the IMU datagram listener")
                .takes_value(true)
                .default_value(stationhub::config::DEFAULT_IMU_BIND),
        )
        .get_matches();

    let config = HubConfig {
        broker_addr: matches.value_of("broker").unwrap().to_string(),
        topic_prefix: matches.value_of("prefix").unwrap().to_string(),
        led_topic: matches.value_of("led-topic").unwrap().to_string(),
        distance_station: matches.value_of("station").unwrap().to_string(),
        distance_min_cm: matches.value_of("min-cm").unwrap().parse::<f64>()?,
        distance_max_cm: matches.value_of("max-cm").unwrap().parse::<f64>()?,
        publish_interval: std::time::Duration::from_millis(
            matches.value_of("interval-ms").unwrap().parse::<u64>()?,
        ),
        imu_bind: matches.value_of("imu-bind").unwrap().to_string(),
        color_mode: matches.value_of("mode").unwrap().parse::<ColorMode>()?,
        ..HubConfig::default()
    };
    let source: LedSource = matches.value_of("source").unwrap().parse()?;

    if config.distance_max_cm <= config.distance_min_cm {
        warn!("degenerate distance range, LED payload will stay 'nan'");
    }

    println!("{}", "📡 Station Telemetry Hub".bright_blue().bold());
    info!("Connecting to bus broker at {} ...", config.broker_addr);
    let (bus, mut bus_events) = match bus::connect(&config.broker_addr).await {
        Ok(connection) => connection,
        Err(e) => {
            error!("Failed to connect to bus broker: {}", e);
            process::exit(1);
        }
    };
    if bus.subscribe(&config.subscription_pattern()).is_err() {
        error!("Bus connection dropped before subscribing");
        process::exit(1);
    }
    info!("Subscribed to: {}", config.subscription_pattern());
    println!("Type 'list' to see topics, 'devices' to see stations.");
    println!("Use 'show <n|topic|station metric>' to select.");

    let prefix = config.topic_prefix.clone();
    let imu_bind = config.imu_bind.clone();
    let led_topic = config.led_topic.clone();

    let mut hub = Hub::new(config);
    hub.set_source(source);
    let hub = Arc::new(Mutex::new(hub));

    // Bus ingestion task: decodes station topics and routes them through the hub.
    let bus_hub = Arc::clone(&hub);
    let bus_handle = bus.clone();
    let bus_led_topic = led_topic.clone();
    let bus_task = tokio::spawn(async move {
        while let Some(event) = bus_events.recv().await {
            match event {
                BusEvent::Message { topic, payload } => {
                    let decoded = match Topic::from_wire(&prefix, &topic) {
                        Some(decoded) => decoded,
                        None => {
                            debug!("ignoring message on unexpected topic {}", topic);
                            continue;
                        }
                    };
                    let (events, led_log) = {
                        let mut hub = bus_hub.lock().await;
                        let events = hub.ingest_metric(
                            &decoded.station,
                            &decoded.metric,
                            &payload,
                            Instant::now(),
                        );
                        (events, hub.led_log_enabled())
                    };
                    handle_hub_events(events, &bus_handle, &bus_led_topic, led_log);
                }
                BusEvent::Disconnected { reason } => {
                    warn!("Bus connection lost: {}", reason);
                    break;
                }
            }
        }
    });

    // IMU datagram listener: best-effort, malformed packets are dropped.
    let imu_hub = Arc::clone(&hub);
    let imu_bus = bus.clone();
    let imu_led_topic = led_topic.clone();
    let imu_task = tokio::spawn(async move {
        let socket = match UdpSocket::bind(&imu_bind).await {
            Ok(socket) => socket,
            Err(e) => {
                error!("Failed to bind IMU listener on {}: {}", imu_bind, e);
                return;
            }
        };
        info!("IMU listener bound on {}", imu_bind);
        let mut buf = [0u8; 256];
        loop {
            let len = match socket.recv_from(&mut buf).await {
                Ok((len, _addr)) => len,
                Err(e) => {
                    warn!("IMU receive error: {}", e);
                    continue;
                }
            };
            let text = String::from_utf8_lossy(&buf[..len]);
            let (pitch, roll) = match imu::parse_imu_payload(&text) {
                Some(angles) => angles,
                None => {
                    debug!("dropping malformed IMU datagram");
                    continue;
                }
            };
            let (events, led_log) = {
                let mut hub = imu_hub.lock().await;
                let events = hub.ingest_imu(pitch, roll, Instant::now());
                (events, hub.led_log_enabled())
            };
            handle_hub_events(events, &imu_bus, &imu_led_topic, led_log);
        }
    });

    // Interactive console on stdin drives selection and session settings.
    println!("{}", console::COMMAND_SUMMARY);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        let command = ConsoleCommand::parse(&line);
                        let reply = {
                            let mut hub = hub.lock().await;
                            console::execute(command, &mut hub)
                        };
                        for line in reply.lines {
                            println!("{}", line);
                        }
                        if reply.exit {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!("Console read error: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    println!("\nDisconnecting...");
    bus_task.abort();
    imu_task.abort();

    Ok(())
}

/// Performs the side effects an ingestion step requested, outside the hub
/// lock: LED publishes go through the buffered bus writer, notices print to
/// the operator console.
fn handle_hub_events(events: Vec<HubEvent>, bus: &BusHandle, led_topic: &str, led_log: bool) {
    for event in events {
        match event {
            HubEvent::PublishLed(payload) => {
                if bus.publish(led_topic, &payload.to_string()).is_err() {
                    warn!("LED publish failed: bus connection closed");
                } else if led_log {
                    println!("[{}] LED publish -> {}", timestamp(), payload);
                }
            }
            HubEvent::TopicListing(topics) => {
                for line in console::render_topic_lines(&topics) {
                    println!("{}", line);
                }
            }
            HubEvent::StatusChanged {
                station, current, ..
            } => {
                println!("[{}] Station {} status={}", timestamp(), station, current);
            }
            HubEvent::SelectedReading { topic, value } => {
                println!("[{}] {} -> {}", timestamp(), topic, value);
            }
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
