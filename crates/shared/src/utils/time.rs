use chrono::{DateTime, Local, TimeZone};

/// Human-readable `HH:MM` stamp used on chat messages.
pub fn clock_time() -> String {
    format_clock_time(&Local::now())
}

pub fn format_clock_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%H:%M").to_string()
}
