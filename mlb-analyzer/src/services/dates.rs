//! Relative and absolute slate date parsing.

use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use service_core::error::AppError;

pub const DATE_HINT: &str = "today|yesterday|tomorrow|YYYY-MM-DD";

/// Today's calendar date in `tz`.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Resolve a `date` query value against `today`.
///
/// Accepts nothing/blank, `today`, `yesterday`/`yday`, `tomorrow`/`tmrw`/`tmmr`
/// or an ISO date, case-insensitively.
pub fn resolve_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, AppError> {
    let value = raw.map(str::trim).unwrap_or_default().to_lowercase();

    match value.as_str() {
        "" | "today" => Ok(today),
        "yesterday" | "yday" => Ok(today - Duration::days(1)),
        "tomorrow" | "tmrw" | "tmmr" => Ok(today + Duration::days(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").map_err(|_| {
            AppError::BadRequest(anyhow::anyhow!("Invalid date; use {}", DATE_HINT))
        }),
    }
}

/// [`resolve_date`] against today in `tz`.
pub fn parse_date(raw: Option<&str>, tz: Tz) -> Result<NaiveDate, AppError> {
    resolve_date(raw, today_in(tz))
}
