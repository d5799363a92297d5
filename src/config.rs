use crate::color::ColorMode;
use std::time::Duration;

pub const DEFAULT_BROKER_ADDR: &str = "127.0.0.1:1883";
pub const DEFAULT_TOPIC_PREFIX: &str = "esp";
pub const DEFAULT_LED_TOPIC: &str = "LED";

pub const DEFAULT_DISTANCE_STATION: &str = "Ultrasonic";
pub const DEFAULT_DISTANCE_METRIC: &str = "distance_cm";
pub const DEFAULT_DISTANCE_MIN_CM: f64 = 5.0;
pub const DEFAULT_DISTANCE_MAX_CM: f64 = 200.0;

pub const DEFAULT_PUBLISH_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_HUE_MIN: f64 = 0.0;
pub const DEFAULT_HUE_MAX: f64 = 240.0;
pub const DEFAULT_SATURATION: f64 = 1.0;
pub const DEFAULT_BRIGHTNESS: f64 = 1.0;

pub const DEFAULT_IMU_BIND: &str = "0.0.0.0:9000";
pub const DEFAULT_PITCH_MIN: f64 = -45.0;
pub const DEFAULT_PITCH_MAX: f64 = 45.0;

/// Every tunable the hub reads, owned in one place and handed to the `Hub`
/// at construction. Defaults mirror the deployed configuration: stations
/// publish under `esp/`, the LED takes `r,g,b` commands on `LED`, distance
/// maps 5-200 cm onto the red-to-blue hue arc with a 1 s publish heartbeat,
/// and the IMU streams datagrams to port 9000 with a +/-45 degree pitch
/// range.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub broker_addr: String,
    pub topic_prefix: String,
    pub led_topic: String,
    pub distance_station: String,
    pub distance_metric: String,
    pub distance_min_cm: f64,
    pub distance_max_cm: f64,
    pub publish_interval: Duration,
    pub hue_min: f64,
    pub hue_max: f64,
    pub saturation: f64,
    pub brightness: f64,
    pub imu_bind: String,
    pub pitch_min: f64,
    pub pitch_max: f64,
    pub color_mode: ColorMode,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            broker_addr: DEFAULT_BROKER_ADDR.to_string(),
            topic_prefix: DEFAULT_TOPIC_PREFIX.to_string(),
            led_topic: DEFAULT_LED_TOPIC.to_string(),
            distance_station: DEFAULT_DISTANCE_STATION.to_string(),
            distance_metric: DEFAULT_DISTANCE_METRIC.to_string(),
            distance_min_cm: DEFAULT_DISTANCE_MIN_CM,
            distance_max_cm: DEFAULT_DISTANCE_MAX_CM,
            publish_interval: Duration::from_millis(DEFAULT_PUBLISH_INTERVAL_MS),
            hue_min: DEFAULT_HUE_MIN,
            hue_max: DEFAULT_HUE_MAX,
            saturation: DEFAULT_SATURATION,
            brightness: DEFAULT_BRIGHTNESS,
            imu_bind: DEFAULT_IMU_BIND.to_string(),
            pitch_min: DEFAULT_PITCH_MIN,
            pitch_max: DEFAULT_PITCH_MAX,
            color_mode: ColorMode::Hue,
        }
    }
}

impl HubConfig {
    /// Wildcard subscription covering every station topic under the prefix.
    pub fn subscription_pattern(&self) -> String {
        format!("{}/#", self.topic_prefix)
    }
}
