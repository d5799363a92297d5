use clap::{App, Arg};
use stationhub::bus::{topic_matches, Frame};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

type ClientId = u64;

/// Connected clients and their subscription patterns. Outbound delivery goes
/// through per-client channels so one slow client never stalls the fan-out.
struct Registry {
    next_id: ClientId,
    clients: HashMap<ClientId, ClientEntry>,
}

struct ClientEntry {
    tx: mpsc::UnboundedSender<String>,
    subscriptions: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let matches = App::new("stationhub-broker")
        .version("0.1.0")
        .about("🌐 Line-frame pub/sub broker for the station bus")
        .arg(
            Arg::with_name("bind")
                .short("b")
                .long("bind")
                .value_name("ADDR")
                .help("Listen address")
                .takes_value(true)
                .default_value(stationhub::config::DEFAULT_BROKER_ADDR),
        )
        .get_matches();

    let bind = matches.value_of("bind").unwrap();
    let listener = TcpListener::bind(bind).await?;
    info!("🌐 Bus broker listening on {}", bind);

    let registry = Arc::new(Mutex::new(Registry {
        next_id: 1,
        clients: HashMap::new(),
    }));

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("🔗 Client connected: {}", addr);
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, registry).await {
                        warn!("Client {} error: {}", addr, e);
                    }
                    info!("🔌 Client {} disconnected", addr);
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

async fn handle_client(stream: TcpStream, registry: Arc<Mutex<Registry>>) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let id = {
        let mut registry = registry.lock().await;
        let id = registry.next_id;
        registry.next_id += 1;
        registry.clients.insert(
            id,
            ClientEntry {
                tx,
                subscriptions: Vec::new(),
            },
        );
        id
    };

    // Writer task drains this client's delivery queue.
    let writer_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
        }
    });

    let result = serve_client(id, reader, &registry).await;

    registry.lock().await.clients.remove(&id);
    writer_task.abort();
    result
}

async fn serve_client(
    id: ClientId,
    reader: tokio::net::tcp::OwnedReadHalf,
    registry: &Arc<Mutex<Registry>>,
) -> std::io::Result<()> {
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Frame>(line) {
            Ok(Frame::Subscribe { pattern }) => {
                debug!("client {} subscribed to {}", id, pattern);
                let mut registry = registry.lock().await;
                if let Some(entry) = registry.clients.get_mut(&id) {
                    entry.subscriptions.push(pattern);
                }
            }
            Ok(Frame::Publish { topic, payload }) => {
                deliver(registry, &topic, payload).await;
            }
            Ok(other) => {
                debug!("client {} sent unexpected frame: {:?}", id, other);
            }
            Err(e) => {
                debug!("client {} sent malformed line: {}", id, e);
            }
        }
    }
    Ok(())
}

/// Fans one published payload out to every client with a matching
/// subscription, the publisher included if it subscribed to itself.
async fn deliver(registry: &Arc<Mutex<Registry>>, topic: &str, payload: String) {
    let frame = Frame::Message {
        topic: topic.to_string(),
        payload,
    };
    let line = match serde_json::to_string(&frame) {
        Ok(line) => line,
        Err(e) => {
            warn!("failed to encode delivery for {}: {}", topic, e);
            return;
        }
    };

    let mut dead = Vec::new();
    {
        let registry = registry.lock().await;
        for (client_id, entry) in &registry.clients {
            let subscribed = entry
                .subscriptions
                .iter()
                .any(|pattern| topic_matches(pattern, topic));
            if subscribed && entry.tx.send(line.clone()).is_err() {
                dead.push(*client_id);
            }
        }
    }

    if !dead.is_empty() {
        let mut registry = registry.lock().await;
        for client_id in dead {
            registry.clients.remove(&client_id);
        }
    }
}
