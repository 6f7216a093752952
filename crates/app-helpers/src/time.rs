use once_cell::sync::Lazy;
use regex::Regex;

static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?P<hours>\d+):)?(?P<minutes>\d{1,2}):(?P<seconds>\d{1,2})$")
        .expect("Invalid regex")
});

static SECONDS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("Invalid regex"));

/// Formats a number of seconds as `HH:MM:SS`.
///
/// Hours are not wrapped, so 100 hours is `100:00:00`.
#[must_use]
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[must_use]
pub fn minutes_to_hms(minutes: u32) -> String {
    format_hms(u64::from(minutes) * 60)
}

/// Parses `HH:MM:SS`, `MM:SS` or a bare number of seconds.
pub fn parse_timestamp(value: &str) -> Result<u64, String> {
    let value = value.trim();

    if SECONDS_ONLY.is_match(value) {
        return value
            .parse::<u64>()
            .map_err(|e| format!("Invalid number of seconds {value:?}: {e}"));
    }

    let captures = TIMESTAMP
        .captures(value)
        .ok_or_else(|| format!("Invalid timestamp {value:?}, expected HH:MM:SS or seconds"))?;

    let field = |name: &str| -> Result<u64, String> {
        captures
            .name(name)
            .map_or(Ok(0), |m| m.as_str().parse::<u64>())
            .map_err(|e| format!("Invalid {name} in timestamp {value:?}: {e}"))
    };

    let hours = field("hours")?;
    let minutes = field("minutes")?;
    let seconds = field("seconds")?;

    if seconds >= 60 {
        return Err(format!("Seconds out of range in timestamp {value:?}"));
    }

    if captures.name("hours").is_some() && minutes >= 60 {
        return Err(format!("Minutes out of range in timestamp {value:?}"));
    }

    hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes * 60 + seconds))
        .ok_or_else(|| format!("Timestamp {value:?} is too large"))
}
