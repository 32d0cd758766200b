use std::fmt;

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// A UTC point in time with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    pub fn now() -> Self {
        Self::truncated(OffsetDateTime::now_utc())
    }

    pub fn try_from_milliseconds(milliseconds: i64) -> Option<Self> {
        let nanos = i128::from(milliseconds) * 1_000_000;
        OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .ok()
            .map(Self)
    }

    pub fn into_milliseconds(self) -> i64 {
        (self.0.unix_timestamp_nanos() / 1_000_000) as i64
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    fn truncated(dt: OffsetDateTime) -> Self {
        let millis = dt.millisecond();
        Self(dt.replace_millisecond(millis).unwrap_or(dt))
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(from: OffsetDateTime) -> Self {
        Self::truncated(from)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self.0.format(&Rfc3339) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{}", self.into_milliseconds()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_from_into_milliseconds() {
        let t1 = Timestamp::now();
        let ms = t1.into_milliseconds();
        let t2 = Timestamp::try_from_milliseconds(ms).unwrap();
        assert_eq!(t1, t2);
    }

    #[test]
    fn reject_out_of_range_milliseconds() {
        assert!(Timestamp::try_from_milliseconds(i64::MAX).is_none());
    }
}
