//! Bus transport: line-delimited JSON frames over TCP.
//!
//! Each frame is one JSON document per line. Clients send `Subscribe` and
//! `Publish`; the broker fans published payloads out to matching subscribers
//! as `Message` frames. Delivery is best-effort to currently connected
//! subscribers; there is no retained state or QoS.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    Subscribe { pattern: String },
    Publish { topic: String, payload: String },
    Message { topic: String, payload: String },
}

#[derive(Debug, Error)]
pub enum BusError {
    #[error("bus connection failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("bus connection closed")]
    Closed,
}

/// Inbound events delivered to a connected client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Message { topic: String, payload: String },
    Disconnected { reason: String },
}

/// Matches a subscription pattern against a concrete topic name.
///
/// Patterns are `/`-segmented: `+` matches exactly one segment and a
/// trailing `#` matches any remainder, including none (`esp/#` covers
/// `esp/A/x` as well as `esp`).
pub fn topic_matches(pattern: &str, topic: &str) -> bool {
    let mut pattern_parts = pattern.split('/');
    let mut topic_parts = topic.split('/');
    loop {
        match (pattern_parts.next(), topic_parts.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => {}
            (Some(expected), Some(actual)) if expected == actual => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}

/// Sender half of a bus connection.
///
/// Frames are queued to a dedicated writer task, so `publish` never blocks
/// on the socket; callers may treat it as fire-and-forget. An `Err` means
/// the connection is gone for good.
#[derive(Debug, Clone)]
pub struct BusHandle {
    tx: mpsc::UnboundedSender<Frame>,
}

impl BusHandle {
    pub fn subscribe(&self, pattern: &str) -> Result<(), BusError> {
        self.send(Frame::Subscribe {
            pattern: pattern.to_string(),
        })
    }

    pub fn publish(&self, topic: &str, payload: &str) -> Result<(), BusError> {
        self.send(Frame::Publish {
            topic: topic.to_string(),
            payload: payload.to_string(),
        })
    }

    fn send(&self, frame: Frame) -> Result<(), BusError> {
        self.tx.send(frame).map_err(|_| BusError::Closed)
    }
}

/// Connects to the broker and splits the connection into a cloneable send
/// handle and a receive channel.
///
/// Two background tasks service the socket: a writer draining the frame
/// queue and a reader decoding inbound lines. Malformed lines are dropped
/// with a debug trace. When the connection dies the receive channel yields a
/// terminal `Disconnected` event.
pub async fn connect(addr: &str) -> Result<(BusHandle, mpsc::UnboundedReceiver<BusEvent>), BusError> {
    let stream = TcpStream::connect(addr).await?;
    let (reader, mut writer) = stream.into_split();
    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel::<Frame>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<BusEvent>();

    tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            let line = match serde_json::to_string(&frame) {
                Ok(line) => line,
                Err(e) => {
                    warn!("failed to encode bus frame: {}", e);
                    continue;
                }
            };
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
        }
    });

    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Frame>(line) {
                        Ok(Frame::Message { topic, payload }) => {
                            if event_tx.send(BusEvent::Message { topic, payload }).is_err() {
                                break;
                            }
                        }
                        Ok(other) => debug!("ignoring unexpected bus frame: {:?}", other),
                        Err(e) => debug!("dropping malformed bus line: {}", e),
                    }
                }
                Ok(None) => {
                    let _ = event_tx.send(BusEvent::Disconnected {
                        reason: "connection closed by broker".to_string(),
                    });
                    break;
                }
                Err(e) => {
                    let _ = event_tx.send(BusEvent::Disconnected {
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }
    });

    Ok((BusHandle { tx: frame_tx }, event_rx))
}
