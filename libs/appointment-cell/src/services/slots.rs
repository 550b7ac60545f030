// libs/appointment-cell/src/services/slots.rs
use chrono::{DateTime, Local, NaiveDate, NaiveTime};

// ==============================================================================
// CLINIC DAY
// ==============================================================================

pub const CLINIC_OPENS_AT_HOUR: u32 = 9;
pub const CLINIC_CLOSES_AT_HOUR: u32 = 17;
pub const SLOT_LENGTH_MINUTES: u32 = 30;

/// Start labels of every bookable slot in a clinic day, earliest first:
/// `9:00 AM`, `9:30 AM`, ..., `4:30 PM`. The last slot ends at closing time.
pub fn clinic_day_slots() -> Vec<String> {
    (CLINIC_OPENS_AT_HOUR * 60..CLINIC_CLOSES_AT_HOUR * 60)
        .step_by(SLOT_LENGTH_MINUTES as usize)
        .map(|minutes| format_slot_label(minutes / 60, minutes % 60))
        .collect()
}

/// 12-hour label with an unpadded hour: `format_slot_label(13, 0)` is `1:00 PM`.
pub fn format_slot_label(hour: u32, minute: u32) -> String {
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hour, minute, suffix)
}

/// Inverse of [`format_slot_label`]. Only the exact label shape is accepted.
pub fn parse_slot_label(label: &str) -> Option<NaiveTime> {
    let (clock, suffix) = label.split_once(' ')?;
    let (hour, minute) = clock.split_once(':')?;
    if minute.len() != 2 {
        return None;
    }

    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }

    let hour = match (suffix, hour) {
        ("AM", 12) => 0,
        ("AM", h) => h,
        ("PM", 12) => 12,
        ("PM", h) => h + 12,
        _ => return None,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

pub fn is_clinic_slot(label: &str) -> bool {
    clinic_day_slots().iter().any(|slot| slot == label)
}

/// Calendar day for a request date. Accepts `YYYY-MM-DD`, or a full RFC 3339
/// timestamp which is read in the server's local timezone.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|instant| instant.with_timezone(&Local).date_naive())
}
