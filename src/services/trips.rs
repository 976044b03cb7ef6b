use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::{
    error::{AppError, ValidationError},
    filter::{apply_filter_with, DurationMatch, FilterOption},
    models::trip::Trip,
    planner::TripForm,
    services::{notify::Notifier, store::TripStore},
};

pub const SAVED_NOTICE: &str = "Trip saved successfully!";
pub const SAVE_FAILED_NOTICE: &str = "Error saving trip";
pub const ADDED_NOTICE: &str = "Trip added successfully!";

/// Result of pressing "save" on a trip form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created { id: i64 },
    Invalid(ValidationError),
    /// The store refused the record. The cause is logged, not surfaced.
    Failed,
}

impl SaveOutcome {
    pub fn created(&self) -> bool {
        matches!(self, SaveOutcome::Created { .. })
    }
}

/// Trips starting on one calendar day, loaded once and filtered locally.
#[derive(Debug, Clone)]
pub struct DayAgenda {
    pub day: NaiveDate,
    pub trips: Vec<Trip>,
    duration_match: DurationMatch,
}

impl DayAgenda {
    pub fn filtered(&self, filter: FilterOption) -> Vec<Trip> {
        apply_filter_with(&self.trips, filter, self.duration_match)
    }
}

/// Connects the trip form and calendar to a store and a notice sink.
#[derive(Clone)]
pub struct TripService {
    store: Arc<dyn TripStore>,
    notifier: Arc<dyn Notifier>,
    duration_match: DurationMatch,
}

impl TripService {
    pub fn new(
        store: Arc<dyn TripStore>,
        notifier: Arc<dyn Notifier>,
        duration_match: DurationMatch,
    ) -> Self {
        Self {
            store,
            notifier,
            duration_match,
        }
    }

    /// Same store and settings, different notice sink.
    pub fn with_notifier(&self, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier,
            duration_match: self.duration_match,
        }
    }

    pub fn store(&self) -> &dyn TripStore {
        self.store.as_ref()
    }

    /// Applies an end date pick, posting a notice instead of failing when it is rejected.
    pub fn select_end_date(
        &self,
        form: &mut TripForm,
        candidate: NaiveDate,
    ) -> Option<NaiveDate> {
        match form.select_end_date(candidate) {
            Ok(end) => Some(end),
            Err(err) => {
                debug!(%candidate, "rejected end date");
                self.notifier.notify(&err.to_string());
                None
            }
        }
    }

    /// Validates and stores the form. The form is borrowed, so a failed save
    /// leaves it exactly as the user left it.
    pub async fn save(&self, form: &TripForm) -> SaveOutcome {
        let record = match form.validate_and_build() {
            Ok(record) => record,
            Err(err) => {
                self.notifier.notify(&err.to_string());
                return SaveOutcome::Invalid(err);
            }
        };

        match self.store.insert(&record).await {
            Ok(id) => {
                info!(id, title = %record.title, duration = record.duration, "trip saved");
                self.notifier.notify(SAVED_NOTICE);
                SaveOutcome::Created { id }
            }
            Err(err) => {
                warn!("saving trip failed: {err}");
                self.notifier.notify(SAVE_FAILED_NOTICE);
                SaveOutcome::Failed
            }
        }
    }

    pub async fn load_day(&self, day: NaiveDate) -> Result<DayAgenda, AppError> {
        let trips = self.store.trips_starting_on(day).await?;
        debug!(%day, count = trips.len(), "loaded trips for day");
        Ok(DayAgenda {
            day,
            trips,
            duration_match: self.duration_match,
        })
    }

    /// Calendar side of a save: reloads the day only when a trip was created.
    pub async fn refresh_after_save(
        &self,
        day: NaiveDate,
        outcome: SaveOutcome,
    ) -> Result<Option<DayAgenda>, AppError> {
        if !outcome.created() {
            return Ok(None);
        }
        let agenda = self.load_day(day).await?;
        self.notifier.notify(ADDED_NOTICE);
        Ok(Some(agenda))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::{
        filter::DurationBucket,
        models::trip::{TripRecord, TripType},
        services::{notify::CollectingNotifier, store::MemoryTripStore},
    };

    struct BrokenStore;

    #[async_trait]
    impl TripStore for BrokenStore {
        async fn insert(&self, _record: &TripRecord) -> Result<i64, AppError> {
            Err(AppError::Other(anyhow::anyhow!("disk full")))
        }

        async fn trips_starting_on(&self, _day: NaiveDate) -> Result<Vec<Trip>, AppError> {
            Ok(Vec::new())
        }

        async fn all_trips(&self) -> Result<Vec<Trip>, AppError> {
            Ok(Vec::new())
        }

        async fn trips_by_type(&self, _trip_type: TripType) -> Result<Vec<Trip>, AppError> {
            Ok(Vec::new())
        }

        async fn trips_by_duration(&self, _days: u32) -> Result<Vec<Trip>, AppError> {
            Ok(Vec::new())
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service(store: Arc<dyn TripStore>) -> (TripService, CollectingNotifier) {
        let notifier = CollectingNotifier::new();
        let service = TripService::new(store, Arc::new(notifier.clone()), DurationMatch::Exact);
        (service, notifier)
    }

    fn form(title: &str, start: NaiveDate, end: NaiveDate) -> TripForm {
        let mut form = TripForm {
            title: title.into(),
            destination: "Serengeti".into(),
            ..TripForm::starting_on(start)
        };
        form.select_end_date(end).unwrap();
        form
    }

    #[tokio::test]
    async fn save_stores_trip_and_reports_created() {
        let store = Arc::new(MemoryTripStore::new());
        let (service, notifier) = service(store.clone());

        let outcome = service
            .save(&form("Safari", day(2024, 6, 1), day(2024, 6, 7)))
            .await;

        assert!(outcome.created());
        assert_eq!(notifier.take(), vec![SAVED_NOTICE]);
        let stored = store.all_trips().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].record.duration, 7);
    }

    #[tokio::test]
    async fn invalid_form_posts_notice_and_stores_nothing() {
        let store = Arc::new(MemoryTripStore::new());
        let (service, notifier) = service(store.clone());

        let outcome = service.save(&TripForm::default()).await;

        assert_eq!(outcome, SaveOutcome::Invalid(ValidationError::MissingTitle));
        assert_eq!(notifier.take(), vec!["Trip title is required"]);
        assert!(store.all_trips().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_keeps_form_and_posts_generic_notice() {
        let (service, notifier) = service(Arc::new(BrokenStore));
        let form = form("Safari", day(2024, 6, 1), day(2024, 6, 7));
        let before = form.clone();

        let outcome = service.save(&form).await;

        assert_eq!(outcome, SaveOutcome::Failed);
        assert!(!outcome.created());
        assert_eq!(notifier.take(), vec![SAVE_FAILED_NOTICE]);
        assert_eq!(form, before);
    }

    #[tokio::test]
    async fn rejected_end_date_posts_notice() {
        let (service, notifier) = service(Arc::new(MemoryTripStore::new()));
        let mut form = TripForm::starting_on(day(2024, 6, 10));

        assert_eq!(service.select_end_date(&mut form, day(2024, 6, 9)), None);
        assert_eq!(form.end_date, Some(day(2024, 6, 10)));
        assert_eq!(
            notifier.take(),
            vec!["End date cannot be before start date"]
        );

        assert_eq!(
            service.select_end_date(&mut form, day(2024, 6, 12)),
            Some(day(2024, 6, 12))
        );
        assert!(notifier.take().is_empty());
    }

    #[tokio::test]
    async fn day_agenda_filters_only_that_day() {
        let (service, _notifier) = service(Arc::new(MemoryTripStore::new()));
        service.save(&form("week", day(2024, 6, 1), day(2024, 6, 7))).await;
        service.save(&form("eight", day(2024, 6, 1), day(2024, 6, 8))).await;
        service.save(&form("other day", day(2024, 6, 2), day(2024, 6, 8))).await;

        let agenda = service.load_day(day(2024, 6, 1)).await.unwrap();
        assert_eq!(agenda.trips.len(), 2);

        let week = agenda.filtered(FilterOption::Duration(DurationBucket::SevenDays));
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].record.title, "week");
    }

    #[tokio::test]
    async fn refresh_after_save_only_reloads_on_created() {
        let (service, notifier) = service(Arc::new(MemoryTripStore::new()));

        let outcome = service.save(&TripForm::default()).await;
        assert!(service
            .refresh_after_save(day(2024, 6, 1), outcome)
            .await
            .unwrap()
            .is_none());
        notifier.take();

        let outcome = service
            .save(&form("Safari", day(2024, 6, 1), day(2024, 6, 1)))
            .await;
        let agenda = service
            .refresh_after_save(day(2024, 6, 1), outcome)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(agenda.trips.len(), 1);
        assert_eq!(notifier.take(), vec![SAVED_NOTICE, ADDED_NOTICE]);
    }
}
