//! Calendar-day keys and the notion of "today".
//!
//! Every date in the system is a `YYYY-MM-DD` day interpreted in the
//! configured local offset; nothing is normalised to UTC.

use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime, UtcOffset};

const DAY_KEY: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn parse_day(s: &str) -> Result<Date, time::error::Parse> {
    Date::parse(s.trim(), DAY_KEY)
}

pub fn format_day(date: Date) -> String {
    date.format(DAY_KEY).unwrap_or_else(|_| date.to_string())
}

pub trait Clock: Send + Sync {
    fn today(&self) -> Date;
}

/// Wall clock shifted into a fixed local offset.
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_utc().to_offset(self.offset).date()
    }
}

pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

pub fn is_today(date: Date, today: Date) -> bool {
    date == today
}

pub fn is_future(date: Date, today: Date) -> bool {
    date > today
}

/// Serde adapter for `YYYY-MM-DD` strings.
pub mod day_key {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_day(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_day(&raw).map_err(|e| D::Error::custom(format!("invalid date {raw:?}: {e}")))
    }

    pub mod option {
        use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
        use time::Date;

        pub fn serialize<S: Serializer>(date: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => s.serialize_str(&super::super::format_day(*d)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) if !raw.trim().is_empty() => super::super::parse_day(&raw)
                    .map(Some)
                    .map_err(|e| D::Error::custom(format!("invalid date {raw:?}: {e}"))),
                _ => Ok(None),
            }
        }
    }
}
