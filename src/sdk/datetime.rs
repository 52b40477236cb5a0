// Conversions between seconds-since-midnight, "HH:MM:SS" text and display durations,
// plus the weekday projection used when talking to schedule-based services.
use chrono::{Datelike, Local, NaiveDateTime, NaiveTime, TimeDelta, Weekday};

use super::error::{JourneyError, JourneyResult};

/// Comparison services run on a weekly schedule: requests are always projected
/// onto the next occurrence of this weekday.
pub const REFERENCE_WEEKDAY: Weekday = Weekday::Mon;

/// Last duration rendered without an hours field (59m59s).
const LAST_DURATION_WITHOUT_HOURS: u64 = 3599;

fn dispatch(duration: u64) -> (u64, u64, u64) {
    let nb_hours = duration / 3600;
    let nb_minutes = (duration % 3600) / 60;
    let nb_seconds = duration % 60;
    (nb_hours, nb_minutes, nb_seconds)
}

fn sign(value: i64) -> &'static str {
    if value < 0 {
        "-"
    } else {
        ""
    }
}

/// Parses "HH:MM:SS" (or "HH:MM") into a number of seconds.
///
/// Components are not range-checked: "25:61:00" is 93660.
pub fn parse_time_string(text: &str) -> JourneyResult<i64> {
    let components: Vec<&str> = text.trim().split(':').collect();
    if components.len() != 2 && components.len() != 3 {
        return Err(JourneyError::parse(
            text,
            format!("expected HH:MM:SS, got {} component(s)", components.len()),
        ));
    }

    let mut values = [0_i64; 3];
    for (slot, component) in values.iter_mut().zip(&components) {
        *slot = component
            .parse::<i64>()
            .map_err(|e| JourneyError::parse(text, format!("component '{}': {}", component, e)))?;
    }

    let [hours, minutes, seconds] = values;
    hours
        .checked_mul(3600)
        .zip(minutes.checked_mul(60))
        .and_then(|(hours, minutes)| hours.checked_add(minutes))
        .and_then(|total| total.checked_add(seconds))
        .ok_or_else(|| JourneyError::parse(text, "overflow"))
}

/// 49272 -> "13:41:12". Hours above 99 keep all their digits.
pub fn format_seconds_as_time(seconds: i64) -> String {
    let (hours, minutes, secs) = dispatch(seconds.unsigned_abs());
    format!("{}{:02}:{:02}:{:02}", sign(seconds), hours, minutes, secs)
}

/// 2472 -> "41m12s", 3600 -> "01h00m00s", 49272 -> "13h41m12s".
pub fn format_duration(seconds: i64) -> String {
    let magnitude = seconds.unsigned_abs();
    let (hours, minutes, secs) = dispatch(magnitude);
    if magnitude <= LAST_DURATION_WITHOUT_HOURS {
        format!("{}{:02}m{:02}s", sign(seconds), minutes, secs)
    } else {
        format!("{}{:02}h{:02}m{:02}s", sign(seconds), hours, minutes, secs)
    }
}

/// Next date strictly after `reference`'s day falling on `weekday`, at `time_of_day`.
///
/// A `time_of_day` of 86400 or more rolls over into the following days.
/// Returns `None` only at the end of the representable calendar.
pub fn next_occurrence_of_weekday(
    time_of_day: u32,
    weekday: Weekday,
    reference: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let date = reference
        .date()
        .iter_days()
        .skip(1)
        .find(|day| day.weekday() == weekday)?;

    date.and_time(NaiveTime::MIN)
        .checked_add_signed(TimeDelta::try_seconds(i64::from(time_of_day))?)
}

pub fn next_monday_with_this_time(time_of_day: u32) -> Option<NaiveDateTime> {
    next_occurrence_of_weekday(time_of_day, REFERENCE_WEEKDAY, Local::now().naive_local())
}

/// Same as [`next_occurrence_of_weekday`] on [`REFERENCE_WEEKDAY`], as an error when out of range.
pub fn project_on_reference_weekday(
    time_of_day: u32,
    reference: NaiveDateTime,
) -> JourneyResult<NaiveDateTime> {
    next_occurrence_of_weekday(time_of_day, REFERENCE_WEEKDAY, reference).ok_or_else(|| {
        JourneyError::DateOutOfRange(format!(
            "no {:?} after {} at {}s",
            REFERENCE_WEEKDAY, reference, time_of_day
        ))
    })
}

/// "YYYYMMDDTHHMM", as expected by the routemm viewer.
pub fn format_for_routemm(datetime: &NaiveDateTime) -> String {
    datetime.format("%Y%m%dT%H%M").to_string()
}

/// "YYYYMMDDTHHMMSS", as expected by the navitia API.
pub fn format_for_navitia(datetime: &NaiveDateTime) -> String {
    datetime.format("%Y%m%dT%H%M%S").to_string()
}
