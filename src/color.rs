use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mapping used for the distance-driven LED pipeline.
///
/// `Linear` fades red into green across the configured range; `Hue` sweeps
/// through the HSV hue circle between the configured hue endpoints. The
/// orientation pipeline always uses the hue sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    Linear,
    Hue,
}

impl FromStr for ColorMode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(ColorMode::Linear),
            "hue" => Ok(ColorMode::Hue),
            _ => Err("expected 'linear' or 'hue'"),
        }
    }
}

/// The actuator command sent to the LED station.
///
/// Renders as `"r,g,b"` with decimal channels in 0-255, or the literal
/// `"nan"` when the input reading is undefined or the mapping range is
/// degenerate. The LED firmware blinks blue on `"nan"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedPayload {
    Rgb(u8, u8, u8),
    Undefined,
}

impl fmt::Display for LedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedPayload::Rgb(r, g, b) => write!(f, "{},{},{}", r, g, b),
            LedPayload::Undefined => write!(f, "nan"),
        }
    }
}

/// Normalizes a reading into [0, 1] over the given range.
///
/// Returns `None` for NaN readings and for degenerate ranges (`max <= min`),
/// which callers must surface as an undefined payload rather than an error.
fn normalize(value: f64, min: f64, max: f64) -> Option<f64> {
    if value.is_nan() || max <= min {
        return None;
    }
    Some(((value - min) / (max - min)).clamp(0.0, 1.0))
}

/// Two-channel ramp: full red at `min`, full green at `max`, blue unused.
pub fn linear_ramp(value: f64, min: f64, max: f64) -> LedPayload {
    match normalize(value, min, max) {
        Some(t) => LedPayload::Rgb(channel(1.0 - t), channel(t), 0),
        None => LedPayload::Undefined,
    }
}

/// HSV sweep: the normalized reading picks a hue between `hue_min` and
/// `hue_max`, converted to RGB at the given saturation and brightness.
pub fn hue_sweep(
    value: f64,
    min: f64,
    max: f64,
    hue_min: f64,
    hue_max: f64,
    saturation: f64,
    brightness: f64,
) -> LedPayload {
    match normalize(value, min, max) {
        Some(t) => {
            let hue = hue_min + (hue_max - hue_min) * t;
            hsv_to_rgb(hue, saturation, brightness)
        }
        None => LedPayload::Undefined,
    }
}

// Standard six-sector HSV to RGB conversion. Rounding is half-away-from-zero
// (f64::round), pinned by the tests below.
fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> LedPayload {
    let hue = hue.rem_euclid(360.0);
    let saturation = saturation.clamp(0.0, 1.0);
    let value = value.clamp(0.0, 1.0);

    let c = value * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = value - c;

    let (r, g, b) = if hue < 60.0 {
        (c, x, 0.0)
    } else if hue < 120.0 {
        (x, c, 0.0)
    } else if hue < 180.0 {
        (0.0, c, x)
    } else if hue < 240.0 {
        (0.0, x, c)
    } else if hue < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    LedPayload::Rgb(channel(r + m), channel(g + m), channel(b + m))
}

fn channel(component: f64) -> u8 {
    (component * 255.0).round() as u8
}
