use std::time::Instant;

/// Most recent orientation reading from the IMU datagram channel.
///
/// Roll is tracked alongside pitch but does not currently feed the LED
/// mapping; only pitch drives the hue sweep.
#[derive(Debug, Clone, Copy)]
pub struct ImuSample {
    pub pitch: f64,
    pub roll: f64,
    pub received_at: Instant,
}

/// Extracts (pitch, roll) from a datagram's text.
///
/// The station firmware sends `pitch=12.50,roll=-3.20`, but any packet
/// carrying at least two numeric tokens is accepted, in order of appearance.
/// Short or malformed packets yield `None` and are dropped by the listener.
pub fn parse_imu_payload(text: &str) -> Option<(f64, f64)> {
    let mut numbers = numeric_tokens(text);
    let pitch = numbers.next()?;
    let roll = numbers.next()?;
    Some((pitch, roll))
}

fn numeric_tokens(text: &str) -> impl Iterator<Item = f64> + '_ {
    text.split(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firmware_format_parses() {
        assert_eq!(parse_imu_payload("pitch=12.50,roll=-3.20"), Some((12.5, -3.2)));
    }

    #[test]
    fn test_bare_numbers_parse() {
        assert_eq!(parse_imu_payload("1.5 -2.5"), Some((1.5, -2.5)));
        assert_eq!(parse_imu_payload("roll=7,pitch=8,extra=9"), Some((7.0, 8.0)));
    }

    #[test]
    fn test_short_packets_dropped() {
        assert_eq!(parse_imu_payload(""), None);
        assert_eq!(parse_imu_payload("pitch=1.0"), None);
        assert_eq!(parse_imu_payload("hello world"), None);
    }

    #[test]
    fn test_garbage_tokens_skipped() {
        // Unparsable runs are skipped, later numeric tokens still count.
        assert_eq!(parse_imu_payload("x=1.2.3 4.0 5.0"), Some((4.0, 5.0)));
    }
}
