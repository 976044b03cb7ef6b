//! Trip form state: date selection, duration and validation.
//!
//! Dates are timezone-naive calendar days ([`NaiveDate`]). Callers that start
//! from a timestamp should convert it to a UTC calendar day first, so daylight
//! saving transitions never shift the day count.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    models::trip::{TripRecord, TripType},
};

/// Inclusive day count of a trip, so a trip ending on its start day lasts 1 day.
///
/// Ranges where `end` precedes `start` have no meaningful length and yield 0.
pub fn duration(start: NaiveDate, end: NaiveDate) -> u32 {
    u32::try_from((end - start).num_days() + 1).unwrap_or(0)
}

/// Accepts `candidate` as an end date unless it falls before `current_start`.
pub fn select_end_date(
    candidate: NaiveDate,
    current_start: Option<NaiveDate>,
) -> Result<NaiveDate, ValidationError> {
    match current_start {
        Some(start) if candidate < start => Err(ValidationError::InvalidDateRange),
        _ => Ok(candidate),
    }
}

/// The in-progress "add trip" form, owned by the UI until it is saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripForm {
    pub title: String,
    pub destination: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub trip_type: TripType,
    pub agency: String,
    pub description: String,
}

impl TripForm {
    /// A blank form whose start date is preselected, e.g. from the calendar.
    pub fn starting_on(day: NaiveDate) -> Self {
        let mut form = Self::default();
        form.select_start_date(day);
        form
    }

    /// Sets the start date and pairs the end date with it when there is none.
    ///
    /// An existing end date that would now precede the start is re-paired too.
    pub fn select_start_date(&mut self, date: NaiveDate) -> (NaiveDate, NaiveDate) {
        let end = match self.end_date {
            Some(end) if end >= date => end,
            _ => date,
        };
        self.start_date = Some(date);
        self.end_date = Some(end);
        (date, end)
    }

    /// Sets the end date, leaving the form untouched when the candidate is rejected.
    pub fn select_end_date(&mut self, candidate: NaiveDate) -> Result<NaiveDate, ValidationError> {
        let end = select_end_date(candidate, self.start_date)?;
        self.end_date = Some(end);
        Ok(end)
    }

    /// Checks fields in form order and stops at the first problem.
    pub fn validate_and_build(&self) -> Result<TripRecord, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }

        let destination = self.destination.trim();
        if destination.is_empty() {
            return Err(ValidationError::MissingDestination);
        }

        let start_date = self.start_date.ok_or(ValidationError::MissingStartDate)?;
        let end_date = self.end_date.ok_or(ValidationError::MissingEndDate)?;
        if end_date < start_date {
            return Err(ValidationError::InvalidDateRange);
        }

        Ok(TripRecord {
            title: title.to_string(),
            destination: destination.to_string(),
            start_date,
            end_date,
            duration: duration(start_date, end_date),
            trip_type: self.trip_type,
            description: normalize_optional(&self.description),
            agency: normalize_optional(&self.agency),
        })
    }
}

fn normalize_optional(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
