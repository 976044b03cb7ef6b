//! Client-side filtering of an already loaded, date-scoped set of trips.

use std::{fmt, str::FromStr};

use crate::models::trip::{Trip, TripType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationBucket {
    OneDay,
    ThreeDays,
    SevenDays,
}

impl DurationBucket {
    pub const ALL: [DurationBucket; 3] = [
        DurationBucket::OneDay,
        DurationBucket::ThreeDays,
        DurationBucket::SevenDays,
    ];

    pub fn days(&self) -> u32 {
        match self {
            DurationBucket::OneDay => 1,
            DurationBucket::ThreeDays => 3,
            DurationBucket::SevenDays => 7,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DurationBucket::OneDay => "1 day",
            DurationBucket::ThreeDays => "3 days",
            DurationBucket::SevenDays => "7 days",
        }
    }
}

/// How a duration bucket is compared against a trip's duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationMatch {
    /// `duration == bucket`. A 10-day trip never shows up under "7 days".
    #[default]
    Exact,
    /// `duration >= bucket`.
    AtLeast,
}

impl DurationMatch {
    fn matches(&self, duration: u32, bucket: DurationBucket) -> bool {
        match self {
            DurationMatch::Exact => duration == bucket.days(),
            DurationMatch::AtLeast => duration >= bucket.days(),
        }
    }
}

impl FromStr for DurationMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(DurationMatch::Exact),
            "at-least" | "at_least" | "atleast" => Ok(DurationMatch::AtLeast),
            other => Err(format!("unknown duration match mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterOption {
    #[default]
    All,
    Type(TripType),
    Duration(DurationBucket),
}

impl fmt::Display for FilterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOption::All => write!(f, "All"),
            FilterOption::Type(kind) => write!(f, "{kind}"),
            FilterOption::Duration(bucket) => write!(f, "{}", bucket.label()),
        }
    }
}

impl FromStr for FilterOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        if label.eq_ignore_ascii_case("all") {
            return Ok(FilterOption::All);
        }
        if let Some(bucket) = DurationBucket::ALL
            .into_iter()
            .find(|bucket| bucket.label().eq_ignore_ascii_case(label))
        {
            return Ok(FilterOption::Duration(bucket));
        }
        label
            .parse::<TripType>()
            .map(FilterOption::Type)
            .map_err(|_| format!("unknown filter: {s}"))
    }
}

/// Filters with exact duration matching.
pub fn apply_filter(trips: &[Trip], filter: FilterOption) -> Vec<Trip> {
    apply_filter_with(trips, filter, DurationMatch::Exact)
}

pub fn apply_filter_with(trips: &[Trip], filter: FilterOption, mode: DurationMatch) -> Vec<Trip> {
    match filter {
        FilterOption::All => trips.to_vec(),
        FilterOption::Type(kind) => trips
            .iter()
            .filter(|trip| trip.record.trip_type == kind)
            .cloned()
            .collect(),
        FilterOption::Duration(bucket) => trips
            .iter()
            .filter(|trip| mode.matches(trip.record.duration, bucket))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::trip::TripRecord;

    fn trip(id: i64, trip_type: TripType, duration: u32) -> Trip {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        Trip::new(
            id,
            TripRecord {
                title: format!("trip {id}"),
                destination: "Somewhere".into(),
                start_date: start,
                end_date: start + chrono::Days::new(u64::from(duration) - 1),
                duration,
                trip_type,
                description: None,
                agency: None,
            },
        )
    }

    fn sample() -> Vec<Trip> {
        vec![
            trip(1, TripType::Adventure, 7),
            trip(2, TripType::Leisure, 8),
            trip(3, TripType::Business, 1),
            trip(4, TripType::Adventure, 3),
        ]
    }

    fn ids(trips: &[Trip]) -> Vec<i64> {
        trips.iter().map(|trip| trip.id).collect()
    }

    #[test]
    fn all_returns_input_unchanged() {
        let trips = sample();
        assert_eq!(apply_filter(&trips, FilterOption::All), trips);
    }

    #[test]
    fn type_filter_matches_exactly() {
        let trips = sample();
        let filtered = apply_filter(&trips, FilterOption::Type(TripType::Adventure));
        assert_eq!(ids(&filtered), vec![1, 4]);
        assert!(apply_filter(&trips, FilterOption::Type(TripType::Medical)).is_empty());
    }

    #[test]
    fn seven_days_excludes_eight_day_trip() {
        let trips = sample();
        let filtered = apply_filter(&trips, FilterOption::Duration(DurationBucket::SevenDays));
        assert_eq!(ids(&filtered), vec![1]);
    }

    #[test]
    fn at_least_mode_includes_longer_trips() {
        let trips = sample();
        let filtered = apply_filter_with(
            &trips,
            FilterOption::Duration(DurationBucket::SevenDays),
            DurationMatch::AtLeast,
        );
        assert_eq!(ids(&filtered), vec![1, 2]);

        let filtered = apply_filter_with(
            &trips,
            FilterOption::Duration(DurationBucket::ThreeDays),
            DurationMatch::AtLeast,
        );
        assert_eq!(ids(&filtered), vec![1, 2, 4]);
    }

    #[test]
    fn filtering_does_not_touch_the_input() {
        let trips = sample();
        let before = trips.clone();
        let _ = apply_filter(&trips, FilterOption::Duration(DurationBucket::OneDay));
        assert_eq!(trips, before);
    }

    #[test]
    fn labels_parse_and_display() {
        for label in ["All", "Adventure", "Leisure", "Business", "1 day", "3 days", "7 days"] {
            let filter: FilterOption = label.parse().unwrap();
            assert_eq!(filter.to_string(), label);
        }
        assert_eq!(
            "7 DAYS".parse::<FilterOption>(),
            Ok(FilterOption::Duration(DurationBucket::SevenDays))
        );
        assert!("5 days".parse::<FilterOption>().is_err());
    }

    #[test]
    fn duration_match_parses_config_values() {
        assert_eq!("exact".parse::<DurationMatch>(), Ok(DurationMatch::Exact));
        assert_eq!("at-least".parse::<DurationMatch>(), Ok(DurationMatch::AtLeast));
        assert!("fuzzy".parse::<DurationMatch>().is_err());
    }
}
