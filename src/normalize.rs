//! Turn raw prediction service entries into chart-ready points.

use chrono::{DateTime, Datelike, NaiveDate};

use crate::error::FetchError;
use crate::types::{ChartPoint, RawEntry};

/// Convert a raw series into display points, preserving input order.
///
/// Dates become unpadded `M/D/YYYY` labels and prices are rounded to the
/// nearest whole dollar, halves away from zero. The first entry with a
/// missing or unparseable date, or a non-numeric price, fails the whole
/// batch; no partial series is ever produced.
pub fn normalize(raw: &[RawEntry]) -> Result<Vec<ChartPoint>, FetchError> {
    let mut points = Vec::with_capacity(raw.len());
    for (index, entry) in raw.iter().enumerate() {
        let date_str = entry
            .date
            .as_deref()
            .ok_or_else(|| malformed(index, "missing date".into()))?;
        let date = parse_service_date(date_str)
            .ok_or_else(|| malformed(index, format!("unparseable date {date_str:?}")))?;
        let price = entry
            .price
            .as_ref()
            .and_then(|p| p.as_f64())
            .ok_or_else(|| malformed(index, "price is not a number".into()))?;
        points.push(ChartPoint {
            date: short_label(date),
            price: price.round() as i64,
        });
    }
    Ok(points)
}

fn malformed(index: usize, reason: String) -> FetchError {
    FetchError::MalformedEntry { index, reason }
}

/// The service emits plain `YYYY-MM-DD` dates; full RFC 3339 timestamps
/// are accepted too and reduced to their calendar date.
fn parse_service_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn short_label(d: NaiveDate) -> String {
    format!("{}/{}/{}", d.month(), d.day(), d.year())
}
