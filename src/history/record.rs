use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::constants::{MIDNIGHT, UPSTREAM_UTC_OFFSET_SECS};

/// A run record exactly as the upstream returned it.
///
/// Only the four fields the aggregation reads are typed; everything else is kept
/// in `extra` so the record can be handed back to the caller unchanged. None of
/// the typed fields is guaranteed to be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_id: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_time: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<Scalar>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Upstream fields arrive as either strings or numbers depending on the endpoint version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Scalar::Text(s) => Cow::Borrowed(s.as_str()),
            Scalar::Number(n) => Cow::Owned(n.to_string()),
        }
    }

    /// Empty strings and zero count as "not provided".
    pub fn is_blank(&self) -> bool {
        match self {
            Scalar::Text(s) => s.is_empty(),
            Scalar::Number(n) => n.as_f64().map(|v| v == 0.0).unwrap_or(false),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

/// A record's calendar day together with the instant it started, in UTC+8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInstant {
    pub day: String,
    pub instant: DateTime<FixedOffset>,
}

/// Everything the aggregator needs to know about a record, derived once.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRecord {
    pub identity_key: String,
    pub day: String,
    pub instant: DateTime<FixedOffset>,
}

impl RawRecord {
    pub fn score_id(&self) -> Option<Cow<'_, str>> {
        present(&self.score_id)
    }

    pub fn day(&self) -> Option<Cow<'_, str>> {
        present(&self.day)
    }

    pub fn run_time(&self) -> Option<Cow<'_, str>> {
        present(&self.run_time)
    }

    pub fn mileage(&self) -> Option<Cow<'_, str>> {
        present(&self.mileage)
    }

    pub fn resolve(&self) -> Option<ResolvedRecord> {
        let ResolvedInstant { day, instant } = resolve_instant(self)?;
        Some(ResolvedRecord {
            identity_key: build_identity_key(self),
            day,
            instant,
        })
    }
}

pub(crate) fn present(field: &Option<Scalar>) -> Option<Cow<'_, str>> {
    field.as_ref().filter(|v| !v.is_blank()).map(Scalar::as_text)
}

/// `scoreId` when the upstream provides one, else `"{day}-{runTime}-{mileage}"`.
///
/// The fallback deliberately collides for records that differ only in untracked fields.
pub fn build_identity_key(record: &RawRecord) -> String {
    if let Some(id) = record.score_id() {
        return id.into_owned();
    }
    format!(
        "{}-{}-{}",
        record.day().unwrap_or_default(),
        record.run_time().unwrap_or_default(),
        record.mileage().unwrap_or_default(),
    )
}

/// `day` verbatim if present, otherwise the date half of `runTime` when it is `YYYY-MM-DD`.
pub fn resolve_day(record: &RawRecord) -> Option<String> {
    if let Some(day) = record.day() {
        return Some(day.into_owned());
    }
    let run_time = record.run_time()?;
    let date_part = run_time.split(' ').next().unwrap_or_default();
    is_iso_date_shape(date_part).then(|| date_part.to_string())
}

pub fn resolve_instant(record: &RawRecord) -> Option<ResolvedInstant> {
    let day = resolve_day(record)?;
    let run_time = record.run_time();
    let time = match run_time.as_deref() {
        Some(rt) if rt.contains(' ') => rt.split(' ').nth(1),
        other => other,
    };
    // A time slot without a colon is noise, not an error: fall back to midnight.
    let time = time.filter(|t| t.contains(':')).unwrap_or(MIDNIGHT);
    let instant = local_instant(&day, time)?;
    Some(ResolvedInstant { day, instant })
}

/// Builds `{day}T{time}` at the upstream's fixed UTC+8 offset.
pub(crate) fn local_instant(day: &str, time: &str) -> Option<DateTime<FixedOffset>> {
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .ok()?;
    upstream_offset()?
        .from_local_datetime(&date.and_time(time))
        .single()
}

pub(crate) fn upstream_offset() -> Option<FixedOffset> {
    FixedOffset::east_opt(UPSTREAM_UTC_OFFSET_SECS)
}

pub(crate) fn is_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
