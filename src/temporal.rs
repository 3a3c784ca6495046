// ⏰ Temporal Interval Resolver
// Period ends are never stored upstream, only start dates.
//
// A membership ends where the chronologically next record starts.
// The most recent membership is open-ended and ends "now".

use crate::config::FeedOrder;
use crate::error::MalformedTimestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Literal used for an open-ended bound
pub const NOW: &str = "now";

// ============================================================================
// PERIOD BOUND
// ============================================================================

/// Start or end of a membership period
///
/// Timestamps are kept verbatim as the remote source sent them; they are only
/// parsed when an overlap question is asked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PeriodBound {
    /// Still in effect at the instant of evaluation
    Now,

    /// ISO-8601 timestamp with offset, e.g. "2020-01-01T00:00:00Z"
    At(String),
}

impl PeriodBound {
    pub fn parse(raw: &str) -> Self {
        if raw == NOW {
            PeriodBound::Now
        } else {
            PeriodBound::At(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PeriodBound::Now => NOW,
            PeriodBound::At(raw) => raw,
        }
    }

    pub fn is_now(&self) -> bool {
        matches!(self, PeriodBound::Now)
    }

    /// Resolve to an instant, `Now` becoming `now`
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, MalformedTimestamp> {
        match self {
            PeriodBound::Now => Ok(now),
            PeriodBound::At(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| MalformedTimestamp {
                    value: raw.clone(),
                    reason: e.to_string(),
                }),
        }
    }
}

impl fmt::Display for PeriodBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for PeriodBound {
    fn from(raw: &str) -> Self {
        PeriodBound::parse(raw)
    }
}

impl Serialize for PeriodBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PeriodBound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(PeriodBound::parse(&raw))
    }
}

// ============================================================================
// END RESOLUTION
// ============================================================================

/// Anything carrying a raw start date
pub trait Dated {
    fn start_date(&self) -> &str;
}

/// End of a period, given the chronologically later record (if any)
pub fn resolve_end<R: Dated>(later: Option<&R>) -> PeriodBound {
    match later {
        Some(record) => PeriodBound::parse(record.start_date()),
        None => PeriodBound::Now,
    }
}

/// Pair each record with its resolved end, in feed order
///
/// Neighbours are taken from the raw feed, so a record that the caller later
/// skips still closes the period before it.
pub fn resolve_periods<R: Dated>(records: &[R], order: FeedOrder) -> Vec<(&R, PeriodBound)> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let later = match order {
                FeedOrder::OldestFirst => records.get(i + 1),
                FeedOrder::NewestFirst => i.checked_sub(1).and_then(|j| records.get(j)),
            };
            (record, resolve_end(later))
        })
        .collect()
}

// ============================================================================
// OVERLAP
// ============================================================================

/// Inclusive interval intersection, "now" evaluated at the current UTC instant
pub fn overlaps(
    start_a: &PeriodBound,
    end_a: &PeriodBound,
    start_b: &PeriodBound,
    end_b: &PeriodBound,
) -> Result<bool, MalformedTimestamp> {
    overlaps_at(start_a, end_a, start_b, end_b, Utc::now())
}

/// Same as [`overlaps`] with an explicit evaluation instant
pub fn overlaps_at(
    start_a: &PeriodBound,
    end_a: &PeriodBound,
    start_b: &PeriodBound,
    end_b: &PeriodBound,
    now: DateTime<Utc>,
) -> Result<bool, MalformedTimestamp> {
    let start_a = start_a.resolve(now)?;
    let end_a = end_a.resolve(now)?;
    let start_b = start_b.resolve(now)?;
    let end_b = end_b.resolve(now)?;

    Ok(start_a <= end_b && end_a >= start_b)
}

/// True when a period closes before it opens, the sign of a feed read in the
/// wrong order
pub fn ends_before_start(
    start: &PeriodBound,
    end: &PeriodBound,
    now: DateTime<Utc>,
) -> Result<bool, MalformedTimestamp> {
    Ok(end.resolve(now)? < start.resolve(now)?)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Rec(&'static str);

    impl Dated for Rec {
        fn start_date(&self) -> &str {
            self.0
        }
    }

    fn at(raw: &str) -> PeriodBound {
        PeriodBound::parse(raw)
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 24, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_resolve_end_most_recent_is_now() {
        assert_eq!(resolve_end::<Rec>(None), PeriodBound::Now);
    }

    #[test]
    fn test_resolve_end_uses_later_start() {
        let later = Rec("2022-06-01T00:00:00Z");
        assert_eq!(resolve_end(Some(&later)), at("2022-06-01T00:00:00Z"));
    }

    #[test]
    fn test_resolve_periods_oldest_first() {
        let feed = [
            Rec("2019-01-01T00:00:00Z"),
            Rec("2020-01-01T00:00:00Z"),
            Rec("2022-06-01T00:00:00Z"),
        ];
        let periods = resolve_periods(&feed, FeedOrder::OldestFirst);

        let ends: Vec<&str> = periods.iter().map(|(_, end)| end.as_str()).collect();
        assert_eq!(ends, ["2020-01-01T00:00:00Z", "2022-06-01T00:00:00Z", "now"]);
        assert_eq!(periods[0].0.start_date(), "2019-01-01T00:00:00Z");
    }

    #[test]
    fn test_resolve_periods_newest_first() {
        let feed = [Rec("2022-06-01T00:00:00Z"), Rec("2020-01-01T00:00:00Z")];
        let periods = resolve_periods(&feed, FeedOrder::NewestFirst);

        assert_eq!(periods[0].1, PeriodBound::Now);
        assert_eq!(periods[1].1, at("2022-06-01T00:00:00Z"));
    }

    #[test]
    fn test_newest_first_feed_read_oldest_first_is_inverted() {
        let feed = [Rec("2022-06-01T00:00:00Z"), Rec("2020-01-01T00:00:00Z")];

        let wrong = resolve_periods(&feed, FeedOrder::OldestFirst);
        let (record, end) = &wrong[0];
        assert!(ends_before_start(&at(record.start_date()), end, fixed_now()).unwrap());

        for (record, end) in resolve_periods(&feed, FeedOrder::NewestFirst) {
            assert!(!ends_before_start(&at(record.start_date()), &end, fixed_now()).unwrap());
        }
    }

    #[test]
    fn test_zero_length_period_is_not_inverted() {
        let instant = at("2020-01-01T00:00:00Z");
        assert!(!ends_before_start(&instant, &instant, fixed_now()).unwrap());
        assert!(ends_before_start(&at("garbage"), &PeriodBound::Now, fixed_now()).is_err());
    }

    #[test]
    fn test_resolve_periods_empty_feed() {
        let feed: [Rec; 0] = [];
        assert!(resolve_periods(&feed, FeedOrder::OldestFirst).is_empty());
    }

    #[test]
    fn test_bound_round_trips_through_json() {
        assert_eq!(serde_json::to_string(&PeriodBound::Now).unwrap(), "\"now\"");

        let bound: PeriodBound = serde_json::from_str("\"2020-01-01T00:00:00Z\"").unwrap();
        assert_eq!(bound, at("2020-01-01T00:00:00Z"));
    }

    #[test]
    fn test_overlap_is_inclusive() {
        let touching = overlaps_at(
            &at("2020-01-01T00:00:00Z"),
            &at("2021-01-01T00:00:00Z"),
            &at("2021-01-01T00:00:00Z"),
            &PeriodBound::Now,
            fixed_now(),
        )
        .unwrap();
        assert!(touching);

        let disjoint = overlaps_at(
            &at("2020-01-01T00:00:00Z"),
            &at("2021-01-01T00:00:00Z"),
            &at("2021-01-01T00:00:01Z"),
            &PeriodBound::Now,
            fixed_now(),
        )
        .unwrap();
        assert!(!disjoint);
    }

    #[test]
    fn test_overlap_reflexive_and_symmetric() {
        let intervals = [
            (at("2010-05-05T10:00:00Z"), at("2012-01-01T00:00:00Z")),
            (at("2011-12-31T00:00:00+02:00"), PeriodBound::Now),
            (at("2015-01-01T00:00:00Z"), at("2015-01-01T00:00:00Z")),
            (at("2023-01-01T00:00:00Z"), PeriodBound::Now),
        ];

        for (sa, ea) in &intervals {
            assert!(overlaps_at(sa, ea, sa, ea, fixed_now()).unwrap());

            for (sb, eb) in &intervals {
                assert_eq!(
                    overlaps_at(sa, ea, sb, eb, fixed_now()).unwrap(),
                    overlaps_at(sb, eb, sa, ea, fixed_now()).unwrap(),
                );
            }
        }
    }

    #[test]
    fn test_overlap_respects_offsets() {
        // 01:00+02:00 is 23:00Z the day before
        let result = overlaps_at(
            &at("2020-01-01T00:00:00Z"),
            &at("2020-01-02T00:00:00Z"),
            &at("2019-12-31T00:00:00Z"),
            &at("2020-01-01T01:00:00+02:00"),
            fixed_now(),
        )
        .unwrap();
        assert!(!result);
    }

    #[test]
    fn test_overlap_now_uses_evaluation_instant() {
        let future = at("2030-01-01T00:00:00Z");
        let result = overlaps_at(
            &at("2020-01-01T00:00:00Z"),
            &PeriodBound::Now,
            &future,
            &PeriodBound::Now,
            fixed_now(),
        )
        .unwrap();
        assert!(!result);
    }

    #[test]
    fn test_overlap_against_wall_clock() {
        let result = overlaps(
            &at("2000-01-01T00:00:00Z"),
            &PeriodBound::Now,
            &at("2001-01-01T00:00:00Z"),
            &at("2002-01-01T00:00:00Z"),
        )
        .unwrap();
        assert!(result);
    }

    #[test]
    fn test_malformed_timestamp() {
        let err = overlaps_at(
            &at("yesterday"),
            &PeriodBound::Now,
            &at("2020-01-01T00:00:00Z"),
            &PeriodBound::Now,
            fixed_now(),
        )
        .unwrap_err();

        assert_eq!(err.value, "yesterday");
    }

    #[test]
    fn test_timestamp_without_offset_is_malformed() {
        assert!(at("2020-01-01T00:00:00").resolve(fixed_now()).is_err());
    }
}
