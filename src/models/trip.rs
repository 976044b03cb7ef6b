use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TripType {
    #[default]
    Adventure,
    Leisure,
    Business,
    Cultural,
    Medical,
    Educational,
}

impl TripType {
    pub const ALL: [TripType; 6] = [
        TripType::Adventure,
        TripType::Leisure,
        TripType::Business,
        TripType::Cultural,
        TripType::Medical,
        TripType::Educational,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::Adventure => "Adventure",
            TripType::Leisure => "Leisure",
            TripType::Business => "Business",
            TripType::Cultural => "Cultural",
            TripType::Medical => "Medical",
            TripType::Educational => "Educational",
        }
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TripType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TripType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown trip type: {s}"))
    }
}

/// A validated trip, ready to be handed to a store.
///
/// Built by [`crate::planner::TripForm::validate_and_build`], which guarantees
/// `end_date >= start_date` and an inclusive `duration`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripRecord {
    pub title: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: u32,
    #[serde(rename = "type")]
    pub trip_type: TripType,
    pub description: Option<String>,
    pub agency: Option<String>,
}

/// A trip as owned by the store, keyed by its row id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Trip {
    pub id: i64,
    #[serde(flatten)]
    pub record: TripRecord,
}

impl Trip {
    pub fn new(id: i64, record: TripRecord) -> Self {
        Self { id, record }
    }
}
