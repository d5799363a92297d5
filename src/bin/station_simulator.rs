use clap::{App, Arg};
use stationhub::bus;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let matches = App::new("station-simulator")
        .version("0.1.0")
        .about("🛠  Simulated sensor station - publishes sweeping readings for development")
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
            Arg::with_name("name")
                .short("n")
                .long("name")
                .value_name("NAME")
                .help("Station id to publish under")
                .takes_value(true)
                .default_value(stationhub::config::DEFAULT_DISTANCE_STATION),
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
            Arg::with_name("interval-ms")
                .long("interval-ms")
                .value_name("MS")
                .help("Reading period")
                .takes_value(true)
                .default_value("1000"),
        )
        .arg(
            Arg::with_name("dropout-every")
                .long("dropout-every")
                .value_name("N")
                .help("Publish 'nan' every Nth reading, like an out-of-range echo (0 = never)")
                .takes_value(true)
                .default_value("16"),
        )
        .arg(
            Arg::with_name("imu")
                .long("imu")
                .help("Stream pitch/roll datagrams instead of publishing distance"),
        )
        .arg(
            Arg::with_name("imu-target")
                .long("imu-target")
                .value_name("ADDR")
                .help("Hub datagram address for --imu mode")
                .takes_value(true)
                .default_value("127.0.0.1:9000"),
        )
        .get_matches();

    let interval = Duration::from_millis(matches.value_of("interval-ms").unwrap().parse::<u64>()?);

    if matches.is_present("imu") {
        let target = matches.value_of("imu-target").unwrap();
        run_imu_stream(target, interval).await
    } else {
        let broker = matches.value_of("broker").unwrap();
        let prefix = matches.value_of("prefix").unwrap();
        let name = matches.value_of("name").unwrap();
        let dropout_every = matches.value_of("dropout-every").unwrap().parse::<u64>()?;
        run_distance_station(broker, prefix, name, interval, dropout_every).await
    }
}

/// Emulates the ultrasonic station: a retained-style `status` announcement,
/// then a distance reading per tick sweeping the hub's default range.
async fn run_distance_station(
    broker: &str,
    prefix: &str,
    name: &str,
    interval: Duration,
    dropout_every: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Connecting to bus broker at {} ...", broker);
    let (bus, mut events) = bus::connect(broker).await?;

    let status_topic = format!("{}/{}/status", prefix, name);
    let distance_topic = format!("{}/{}/distance_cm", prefix, name);
    bus.publish(&status_topic, "online")?;
    info!("📡 Station {} online, publishing {}", name, distance_topic);

    // The read channel only matters for noticing a dead broker.
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let bus::BusEvent::Disconnected { reason } = event {
                error!("Bus connection lost: {}", reason);
                std::process::exit(1);
            }
        }
    });

    let mut ticker = time::interval(interval);
    let mut step = 0u64;
    loop {
        ticker.tick().await;
        step = step.wrapping_add(1);

        let payload = if dropout_every > 0 && step % dropout_every == 0 {
            "nan".to_string()
        } else {
            let sweep = 0.5 + 0.5 * (step as f64 * 0.1).sin();
            let distance = stationhub::config::DEFAULT_DISTANCE_MIN_CM
                + (stationhub::config::DEFAULT_DISTANCE_MAX_CM
                    - stationhub::config::DEFAULT_DISTANCE_MIN_CM)
                    * sweep;
            format!("{:.2}", distance)
        };

        if bus.publish(&distance_topic, &payload).is_err() {
            warn!("Publish failed, broker gone");
            break;
        }
        info!("📤 {} -> {}", distance_topic, payload);
    }

    Ok(())
}

/// Emulates the IMU station firmware: `pitch=..,roll=..` datagrams on a
/// fixed cadence, oscillating through the hub's default pitch range.
async fn run_imu_stream(target: &str, interval: Duration) -> Result<(), Box<dyn std::error::Error>> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(target).await?;
    info!("📡 Streaming IMU datagrams to {}", target);

    let mut ticker = time::interval(interval);
    let mut step = 0u64;
    loop {
        ticker.tick().await;
        step = step.wrapping_add(1);

        let pitch = 45.0 * (step as f64 * 0.1).sin();
        let roll = 30.0 * (step as f64 * 0.07).cos();
        let message = format!("pitch={:.2},roll={:.2}", pitch, roll);

        if let Err(e) = socket.send(message.as_bytes()).await {
            warn!("Datagram send failed: {}", e);
        } else {
            info!("📤 {}", message);
        }
    }
}
