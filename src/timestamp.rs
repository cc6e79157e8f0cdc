//! Timestamp encoding for persisted boards.
//!
//! Every date-typed field is written as integer epoch milliseconds, so loading never
//! needs to know which fields hold dates. RFC 3339 strings are still accepted on
//! input because older exports stored ISO text.

use chrono::{DateTime, Local, NaiveDate, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Current time at the precision the board persists.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Drop anything finer than a millisecond.
pub fn truncate(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(3)
}

/// Local midnight of `date`, as stored in a due-date field.
pub fn from_local_date(date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

/// Calendar date of `dt` in the local time zone.
pub fn local_date(dt: DateTime<Utc>) -> NaiveDate {
    dt.with_timezone(&Local).date_naive()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Millis(i64),
    Text(String),
}

fn decode<E: serde::de::Error>(repr: Repr) -> Result<DateTime<Utc>, E> {
    match repr {
        Repr::Millis(ms) => DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| E::custom(format!("timestamp out of range: {ms}"))),
        Repr::Text(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|d| truncate(d.with_timezone(&Utc)))
            .map_err(|e| E::custom(format!("invalid timestamp {s:?}: {e}"))),
    }
}

/// `#[serde(with = "timestamp::millis")]`
pub mod millis {
    use super::*;

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(dt.timestamp_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        decode(Repr::deserialize(d)?)
    }
}

/// `#[serde(with = "timestamp::option_millis")]`
pub mod option_millis {
    use super::*;

    pub fn serialize<S: Serializer>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => s.serialize_some(&dt.timestamp_millis()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<Repr>::deserialize(d)? {
            Some(repr) => decode(repr).map(Some),
            None => Ok(None),
        }
    }
}

/// Deserialize helper for patch fields: absent stays `None`, `null` becomes `Some(None)`.
pub(crate) fn double_option<'de, T, D>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

/// Same as [`double_option`] for optional timestamps.
pub(crate) fn double_option_millis<'de, D>(d: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    option_millis::deserialize(d).map(Some)
}
