/// Formats a duration in seconds as `HH:MM:SS`.
///
/// Every component is floored, never rounded. Hours are not capped at 24,
/// so a 30 hour recording formats as `30:00:00`. Negative and non-finite
/// inputs format as `00:00:00`.
pub fn format_hms(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total / 60) % 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Parses a strict `HH:MM:SS` timestamp into whole seconds.
///
/// Minutes and seconds must be two digits below 60; hours need at least two
/// digits and may exceed 99. Values too large to count in seconds are
/// rejected.
pub fn parse_hms(value: &str) -> Option<u64> {
    let mut parts = value.split(':');
    let (h, m, s) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || h.len() < 2 || m.len() != 2 || s.len() != 2 {
        return None;
    }
    if ![h, m, s].iter().all(|p| p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    let hours: u64 = h.parse().ok()?;
    let minutes: u64 = m.parse().ok()?;
    let secs: u64 = s.parse().ok()?;
    if minutes >= 60 || secs >= 60 {
        return None;
    }
    hours.checked_mul(3600)?.checked_add(minutes * 60 + secs)
}
