use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use sqlx::FromRow;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    db::DbPool,
    error::AppError,
    models::trip::{Trip, TripRecord, TripType},
    planner::TripForm,
};

/// Durable home of saved trips. Every query orders by start date, then id.
#[async_trait]
pub trait TripStore: Send + Sync {
    /// Stores the record and returns its new id.
    async fn insert(&self, record: &TripRecord) -> Result<i64, AppError>;

    /// Trips whose start date is `day`.
    async fn trips_starting_on(&self, day: NaiveDate) -> Result<Vec<Trip>, AppError>;

    async fn all_trips(&self) -> Result<Vec<Trip>, AppError>;

    async fn trips_by_type(&self, trip_type: TripType) -> Result<Vec<Trip>, AppError>;

    async fn trips_by_duration(&self, days: u32) -> Result<Vec<Trip>, AppError>;
}

const SELECT_TRIPS: &str = "SELECT id, title, destination, start_date, end_date, duration, type, description, agency FROM trips";
const ORDER_TRIPS: &str = "ORDER BY start_date ASC, id ASC";

#[derive(Debug, FromRow)]
struct TripRow {
    id: i64,
    title: String,
    destination: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    duration: i64,
    #[sqlx(rename = "type")]
    trip_type: String,
    description: Option<String>,
    agency: Option<String>,
}

impl TripRow {
    fn into_trip(self) -> Result<Trip, AppError> {
        let trip_type = self
            .trip_type
            .parse::<TripType>()
            .map_err(|err| AppError::Other(anyhow::anyhow!("trip {}: {err}", self.id)))?;
        let duration = u32::try_from(self.duration).map_err(|err| {
            AppError::Other(anyhow::anyhow!("trip {}: bad duration: {err}", self.id))
        })?;
        Ok(Trip::new(
            self.id,
            TripRecord {
                title: self.title,
                destination: self.destination,
                start_date: self.start_date,
                end_date: self.end_date,
                duration,
                trip_type,
                description: self.description,
                agency: self.agency,
            },
        ))
    }
}

fn into_trips(rows: Vec<TripRow>) -> Result<Vec<Trip>, AppError> {
    rows.into_iter().map(TripRow::into_trip).collect()
}

/// SQLite-backed store. Writes are serialised through one async lock so the
/// calendar and the add-trip flow never race on the same connection pool.
#[derive(Clone)]
pub struct SqliteTripStore {
    pool: DbPool,
    write_lock: Arc<Mutex<()>>,
}

impl SqliteTripStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

#[async_trait]
impl TripStore for SqliteTripStore {
    async fn insert(&self, record: &TripRecord) -> Result<i64, AppError> {
        let _guard = self.write_lock.lock().await;
        let result = sqlx::query(
            "INSERT INTO trips (title, destination, start_date, end_date, duration, type, description, agency) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.title)
        .bind(&record.destination)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(i64::from(record.duration))
        .bind(record.trip_type.as_str())
        .bind(record.description.as_deref())
        .bind(record.agency.as_deref())
        .execute(&self.pool)
        .await?;
        let id = result.last_insert_rowid();
        debug!(id, title = %record.title, "inserted trip");
        Ok(id)
    }

    async fn trips_starting_on(&self, day: NaiveDate) -> Result<Vec<Trip>, AppError> {
        let sql = format!("{SELECT_TRIPS} WHERE start_date = ? {ORDER_TRIPS}");
        let rows = sqlx::query_as::<_, TripRow>(&sql)
            .bind(day)
            .fetch_all(&self.pool)
            .await?;
        into_trips(rows)
    }

    async fn all_trips(&self) -> Result<Vec<Trip>, AppError> {
        let sql = format!("{SELECT_TRIPS} {ORDER_TRIPS}");
        let rows = sqlx::query_as::<_, TripRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        into_trips(rows)
    }

    async fn trips_by_type(&self, trip_type: TripType) -> Result<Vec<Trip>, AppError> {
        let sql = format!("{SELECT_TRIPS} WHERE type = ? {ORDER_TRIPS}");
        let rows = sqlx::query_as::<_, TripRow>(&sql)
            .bind(trip_type.as_str())
            .fetch_all(&self.pool)
            .await?;
        into_trips(rows)
    }

    async fn trips_by_duration(&self, days: u32) -> Result<Vec<Trip>, AppError> {
        let sql = format!("{SELECT_TRIPS} WHERE duration = ? {ORDER_TRIPS}");
        let rows = sqlx::query_as::<_, TripRow>(&sql)
            .bind(i64::from(days))
            .fetch_all(&self.pool)
            .await?;
        into_trips(rows)
    }
}

#[derive(Debug, Default)]
struct MemoryTrips {
    trips: Vec<Trip>,
    next_id: i64,
}

/// In-memory store with the same ordering and id semantics as SQLite.
#[derive(Debug, Clone, Default)]
pub struct MemoryTripStore {
    inner: Arc<Mutex<MemoryTrips>>,
}

impl MemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select(&self, keep: impl Fn(&Trip) -> bool + Send) -> Vec<Trip> {
        let inner = self.inner.lock().await;
        let mut trips: Vec<Trip> = inner
            .trips
            .iter()
            .filter(|trip| keep(*trip))
            .cloned()
            .collect();
        trips.sort_by(|a, b| {
            a.record
                .start_date
                .cmp(&b.record.start_date)
                .then(a.id.cmp(&b.id))
        });
        trips
    }
}

#[async_trait]
impl TripStore for MemoryTripStore {
    async fn insert(&self, record: &TripRecord) -> Result<i64, AppError> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.trips.push(Trip::new(id, record.clone()));
        Ok(id)
    }

    async fn trips_starting_on(&self, day: NaiveDate) -> Result<Vec<Trip>, AppError> {
        Ok(self.select(|trip| trip.record.start_date == day).await)
    }

    async fn all_trips(&self) -> Result<Vec<Trip>, AppError> {
        Ok(self.select(|_| true).await)
    }

    async fn trips_by_type(&self, trip_type: TripType) -> Result<Vec<Trip>, AppError> {
        Ok(self.select(|trip| trip.record.trip_type == trip_type).await)
    }

    async fn trips_by_duration(&self, days: u32) -> Result<Vec<Trip>, AppError> {
        Ok(self.select(|trip| trip.record.duration == days).await)
    }
}

struct SampleTrip {
    title: &'static str,
    destination: &'static str,
    starts_in: u64,
    days: u64,
    trip_type: TripType,
    description: &'static str,
    agency: &'static str,
}

const SAMPLE_TRIPS: [SampleTrip; 3] = [
    SampleTrip {
        title: "Safari Adventure",
        destination: "Serengeti, Tanzania",
        starts_in: 0,
        days: 7,
        trip_type: TripType::Adventure,
        description: "Amazing wildlife safari experience",
        agency: "African Safari Tours",
    },
    SampleTrip {
        title: "Beach Relaxation",
        destination: "Zanzibar, Tanzania",
        starts_in: 1,
        days: 3,
        trip_type: TripType::Leisure,
        description: "Peaceful beach getaway",
        agency: "Island Paradise Tours",
    },
    SampleTrip {
        title: "Conference Trip",
        destination: "Lagos, Nigeria",
        starts_in: 7,
        days: 1,
        trip_type: TripType::Business,
        description: "Tech conference attendance",
        agency: "",
    },
];

/// Inserts a few demo trips relative to `today`, but only into an empty store.
///
/// Returns how many trips were inserted.
pub async fn seed_sample_trips(store: &dyn TripStore, today: NaiveDate) -> Result<usize, AppError> {
    if !store.all_trips().await?.is_empty() {
        debug!("store already has trips, skipping sample data");
        return Ok(0);
    }

    for sample in &SAMPLE_TRIPS {
        let start = today + Days::new(sample.starts_in);
        let mut form = TripForm {
            title: sample.title.into(),
            destination: sample.destination.into(),
            trip_type: sample.trip_type,
            description: sample.description.into(),
            agency: sample.agency.into(),
            ..TripForm::default()
        };
        form.select_start_date(start);
        form.select_end_date(start + Days::new(sample.days - 1))
            .map_err(|err| AppError::Other(err.into()))?;
        let record = form
            .validate_and_build()
            .map_err(|err| AppError::Other(err.into()))?;
        store.insert(&record).await?;
    }

    info!(count = SAMPLE_TRIPS.len(), "seeded sample trips");
    Ok(SAMPLE_TRIPS.len())
}
