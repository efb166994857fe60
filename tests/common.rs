use chrono::{NaiveDate, NaiveTime, Weekday};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use venue_booking_backend::{
    config::{Config, TieBreak},
    domain::models::{
        item::{BookableItem, ItemKind, NewItemParams, PricingMode},
        location::{Location, Room},
        schedule::{AvailabilityRule, Recurrence},
    },
    domain::ports::{CatalogRepository, CodeRepository, ReservationRepository},
    domain::services::booking_service::BookingService,
    infra::repositories::{
        sqlite_catalog_repo::SqliteCatalogRepo, sqlite_code_repo::SqliteCodeRepo,
        sqlite_reservation_repo::SqliteReservationRepo,
    },
};

#[allow(dead_code)]
pub struct TestApp {
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub catalog: Arc<dyn CatalogRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub codes: Arc<dyn CodeRepository>,
    pub service: Arc<BookingService>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_tie_break(TieBreak::Newest).await
    }

    pub async fn with_tie_break(tie_break: TieBreak) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            discount_tie_break: tie_break,
        };

        let catalog: Arc<dyn CatalogRepository> = Arc::new(SqliteCatalogRepo::new(pool.clone()));
        let reservations: Arc<dyn ReservationRepository> = Arc::new(SqliteReservationRepo::new(pool.clone()));
        let codes: Arc<dyn CodeRepository> = Arc::new(SqliteCodeRepo::new(pool.clone()));

        let service = Arc::new(BookingService::new(
            config,
            catalog.clone(),
            reservations.clone(),
            codes.clone(),
        ));

        Self {
            pool,
            db_filename,
            catalog,
            reservations,
            codes,
            service,
        }
    }

    pub async fn create_location(&self, timezone: &str) -> Location {
        self.catalog
            .create_location(&Location::new("Test Venue".to_string(), timezone.to_string()))
            .await
            .expect("Failed to create location")
    }

    pub async fn create_room(&self, location_id: &str, name: &str) -> Room {
        self.catalog
            .create_room(&Room::new(location_id.to_string(), name.to_string(), 0))
            .await
            .expect("Failed to create room")
    }

    /// A flat-priced 60-minute package at $100.00.
    pub async fn create_package(&self, location_id: &str) -> BookableItem {
        let item = BookableItem::new(NewItemParams {
            location_id: location_id.to_string(),
            name: "Party Package".to_string(),
            kind: ItemKind::Package,
            pricing_mode: PricingMode::Flat,
            base_price_cents: 10_000,
            duration_min: 60,
        });
        self.catalog.create_item(&item).await.expect("Failed to create item")
    }

    pub async fn create_weekly_rule(
        &self,
        item_id: &str,
        weekday: Weekday,
        start: &str,
        end: &str,
        interval_min: i32,
        priority: i32,
    ) -> AvailabilityRule {
        let rule = AvailabilityRule::new(
            item_id.to_string(),
            Recurrence::Weekly(weekday),
            time(start),
            time(end),
            interval_min,
            priority,
        )
        .expect("Invalid rule");
        self.catalog.create_rule(&rule).await.expect("Failed to create rule")
    }
}

#[allow(dead_code)]
pub fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").expect("Invalid time literal")
}

#[allow(dead_code)]
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("Invalid date literal")
}
