//! # Station Telemetry Hub
//!
//! A hub for distributed sensor stations: aggregates metrics arriving over a
//! publish/subscribe bus and an IMU datagram channel, keeps the latest value
//! per station and metric, and derives an RGB command for an LED station
//! from whichever sensor source the operator has selected.
//!
//! ## Features
//!
//! - **Live station store**: latest value per (station, metric), status
//!   transition tracking, sorted topic listings
//! - **Two LED pipelines**: distance-driven (linear ramp or HSV hue sweep)
//!   and orientation-driven (hue sweep over pitch)
//! - **Gated publishing**: change detection plus a heartbeat interval, on a
//!   monotonic clock
//! - **Fuzzy topic selection**: pick a live stream by index, full name, or
//!   partial station/metric names
//! - **Line-frame bus transport**: JSON frames over TCP with wildcard
//!   subscriptions
//!
//! ## Quick Start
//!
//! ```rust
//! use stationhub::{Hub, HubConfig, HubEvent};
//! use std::time::Instant;
//!
//! let mut hub = Hub::new(HubConfig::default());
//!
//! // Feed one distance reading; the default source maps it to an LED command.
//! let events = hub.ingest_metric("Ultrasonic", "distance_cm", "42.00", Instant::now());
//! assert!(events.iter().any(|e| matches!(e, HubEvent::PublishLed(_))));
//! ```
//!
//! ## Architecture
//!
//! - [`store`] - latest-value station store and topic set
//! - [`color`] - reading-to-RGB mapping (linear ramp, HSV sweep)
//! - [`gate`] - change-or-heartbeat publish gating
//! - [`resolver`] - operator topic selection and name disambiguation
//! - [`hub`] - the ingestion router and session aggregate
//! - [`bus`] - line-frame pub/sub transport client
//! - [`imu`] - orientation datagram decoding
//! - [`console`] - interactive command parsing and execution
//!
//! The `stationhub` binary wires one [`hub::Hub`] to a bus reader task, a
//! UDP listener task, and the operator console, all sharing the hub behind a
//! single lock. `stationhub-broker` provides the bus collaborator and
//! `station-simulator` stands in for station firmware during development.

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bus;
pub mod color;
pub mod config;
pub mod console;
pub mod gate;
pub mod hub;
pub mod imu;
pub mod resolver;
pub mod store;

// Re-export main public types for convenience
pub use color::{ColorMode, LedPayload};
pub use config::HubConfig;
pub use hub::{Hub, HubEvent, LedSource, TelemetryEvent};
pub use store::{StationStore, Topic};
