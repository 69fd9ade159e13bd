//! Relative time labels such as "in 3 days" or "5 minutes ago".

use chrono::{DateTime, Utc};

const MINUTES_PER_HOUR: u64 = 60;
const MINUTES_PER_DAY: u64 = 1_440;
const MINUTES_PER_MONTH: u64 = 43_200;
const MINUTES_PER_YEAR: u64 = 525_600;

/// Describes the distance between `instant` and `now`.
///
/// Future instants read "in …", past (and present) ones "… ago". Distances
/// are bucketed coarsely: seconds collapse to "less than a minute", hours
/// are approximate, days and months are rounded.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use taskboard::board::projection::relative_time;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("valid");
/// assert_eq!(relative_time(now + Duration::days(3), now), "in 3 days");
/// assert_eq!(relative_time(now - Duration::minutes(5), now), "5 minutes ago");
/// ```
#[must_use]
pub fn relative_time(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = instant.signed_duration_since(now).num_seconds();
    let distance = describe(seconds.unsigned_abs());
    if seconds > 0 {
        format!("in {distance}")
    } else {
        format!("{distance} ago")
    }
}

fn rounded(value: u64, unit: u64) -> u64 {
    value.saturating_add(unit.div_euclid(2)).div_euclid(unit)
}

fn describe(seconds: u64) -> String {
    let minutes = rounded(seconds, 60);
    match seconds {
        0..30 => "less than a minute".to_owned(),
        30..90 => "1 minute".to_owned(),
        _ if minutes < 45 => format!("{minutes} minutes"),
        _ if minutes < 90 => "about 1 hour".to_owned(),
        _ if minutes < MINUTES_PER_DAY => {
            format!("about {} hours", rounded(minutes, MINUTES_PER_HOUR))
        }
        _ if minutes < 2_520 => "1 day".to_owned(),
        _ if minutes < MINUTES_PER_MONTH => {
            format!("{} days", rounded(minutes, MINUTES_PER_DAY))
        }
        _ if minutes < 64_800 => "about 1 month".to_owned(),
        _ if minutes < 86_400 => "about 2 months".to_owned(),
        _ if minutes < MINUTES_PER_YEAR => {
            format!("{} months", rounded(minutes, MINUTES_PER_MONTH))
        }
        _ => describe_years(rounded(minutes, MINUTES_PER_MONTH)),
    }
}

fn describe_years(months: u64) -> String {
    let years = months.div_euclid(12);
    let plural = |count: u64| if count == 1 { "year" } else { "years" };
    match months.rem_euclid(12) {
        0..3 => format!("about {years} {}", plural(years)),
        3..9 => format!("over {years} {}", plural(years)),
        _ => {
            let next = years.saturating_add(1);
            format!("almost {next} {}", plural(next))
        }
    }
}
