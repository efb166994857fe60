use crate::domain::models::{
    blackout::{BlackoutWindow, BlackoutWindowRow},
    discount::{DiscountRule, DiscountRuleRow, FeeRule, FeeRuleRow},
    item::{BookableItem, BookableItemRow},
    location::{Location, Room},
    schedule::{AvailabilityRule, AvailabilityRuleRow},
};
use crate::domain::ports::CatalogRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

pub struct PostgresCatalogRepo {
    pool: PgPool,
}

impl PostgresCatalogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn ids_json(ids: &[String]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string())
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepo {
    async fn create_location(&self, location: &Location) -> Result<Location, AppError> {
        sqlx::query_as::<_, Location>(
            "INSERT INTO locations (id, name, timezone, active, created_at) VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
            .bind(&location.id).bind(&location.name).bind(&location.timezone).bind(location.active).bind(location.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_location(&self, id: &str) -> Result<Option<Location>, AppError> {
        sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn create_room(&self, room: &Room) -> Result<Room, AppError> {
        sqlx::query_as::<_, Room>(
            "INSERT INTO rooms (id, location_id, name, capacity, active, created_at) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
            .bind(&room.id).bind(&room.location_id).bind(&room.name).bind(room.capacity).bind(room.active).bind(room.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_room(&self, id: &str) -> Result<Option<Room>, AppError> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_rooms(&self, location_id: &str) -> Result<Vec<Room>, AppError> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE location_id = $1 ORDER BY name ASC").bind(location_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn create_item(&self, item: &BookableItem) -> Result<BookableItem, AppError> {
        let row = sqlx::query_as::<_, BookableItemRow>(
            "INSERT INTO bookable_items (id, location_id, name, kind, pricing_mode, base_price_cents, included_participants, per_extra_cents, min_participants, max_participants, duration_min, min_booking_notice_hours, active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING *",
        )
            .bind(&item.id).bind(&item.location_id).bind(&item.name).bind(item.kind.as_str()).bind(item.pricing_mode.as_str())
            .bind(item.base_price_cents).bind(item.included_participants).bind(item.per_extra_cents)
            .bind(item.min_participants).bind(item.max_participants).bind(item.duration_min)
            .bind(item.min_booking_notice_hours).bind(item.active).bind(item.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        row.try_into()
    }
    async fn find_item(&self, id: &str) -> Result<Option<BookableItem>, AppError> {
        let row = sqlx::query_as::<_, BookableItemRow>("SELECT * FROM bookable_items WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)?;
        row.map(BookableItem::try_from).transpose()
    }
    async fn list_items(&self, location_id: &str) -> Result<Vec<BookableItem>, AppError> {
        let rows = sqlx::query_as::<_, BookableItemRow>("SELECT * FROM bookable_items WHERE location_id = $1 ORDER BY name ASC").bind(location_id).fetch_all(&self.pool).await.map_err(AppError::Database)?;
        rows.into_iter().map(BookableItem::try_from).collect()
    }

    async fn create_rule(&self, rule: &AvailabilityRule) -> Result<AvailabilityRule, AppError> {
        let row = sqlx::query_as::<_, AvailabilityRuleRow>(
            "INSERT INTO availability_rules (id, item_id, rule_type, day_selector, window_start, window_end, interval_min, priority, active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *",
        )
            .bind(&rule.id).bind(&rule.item_id).bind(rule.recurrence.rule_type()).bind(rule.recurrence.day_selector())
            .bind(rule.window_start).bind(rule.window_end).bind(rule.interval_min).bind(rule.priority)
            .bind(rule.active).bind(rule.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        row.try_into()
    }
    async fn list_rules(&self, item_id: &str) -> Result<Vec<AvailabilityRule>, AppError> {
        let rows = sqlx::query_as::<_, AvailabilityRuleRow>("SELECT * FROM availability_rules WHERE item_id = $1").bind(item_id).fetch_all(&self.pool).await.map_err(AppError::Database)?;
        rows.into_iter().map(AvailabilityRule::try_from).collect()
    }

    async fn create_blackout(&self, blackout: &BlackoutWindow) -> Result<BlackoutWindow, AppError> {
        let row = sqlx::query_as::<_, BlackoutWindowRow>(
            "INSERT INTO blackout_windows (id, location_id, date, package_ids, room_ids, time_start, time_end, reason, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
            .bind(&blackout.id).bind(&blackout.location_id).bind(blackout.date)
            .bind(ids_json(&blackout.package_ids)).bind(ids_json(&blackout.room_ids))
            .bind(blackout.time_start).bind(blackout.time_end).bind(&blackout.reason).bind(blackout.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        row.try_into()
    }
    async fn list_blackouts(&self, location_id: &str, date: NaiveDate) -> Result<Vec<BlackoutWindow>, AppError> {
        let rows = sqlx::query_as::<_, BlackoutWindowRow>("SELECT * FROM blackout_windows WHERE location_id = $1 AND date = $2").bind(location_id).bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)?;
        rows.into_iter().map(BlackoutWindow::try_from).collect()
    }

    async fn create_discount(&self, rule: &DiscountRule) -> Result<DiscountRule, AppError> {
        let row = sqlx::query_as::<_, DiscountRuleRow>(
            "INSERT INTO discount_rules (id, location_id, name, amount, kind, recurrence, recurrence_value, effective_start, effective_end, time_start, time_end, scope_kind, scope_ids, priority, stackable, active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             RETURNING *",
        )
            .bind(&rule.id).bind(&rule.location_id).bind(&rule.name).bind(rule.amount).bind(rule.kind.as_str())
            .bind(rule.recurrence.kind_str()).bind(rule.recurrence.value_string())
            .bind(rule.effective_start).bind(rule.effective_end).bind(rule.time_start).bind(rule.time_end)
            .bind(rule.scope.kind.as_str()).bind(ids_json(&rule.scope.ids))
            .bind(rule.priority).bind(rule.stackable).bind(rule.active).bind(rule.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        row.try_into()
    }
    async fn list_discounts(&self, location_id: &str) -> Result<Vec<DiscountRule>, AppError> {
        let rows = sqlx::query_as::<_, DiscountRuleRow>("SELECT * FROM discount_rules WHERE location_id = $1").bind(location_id).fetch_all(&self.pool).await.map_err(AppError::Database)?;
        rows.into_iter().map(DiscountRule::try_from).collect()
    }

    async fn create_fee(&self, rule: &FeeRule) -> Result<FeeRule, AppError> {
        let row = sqlx::query_as::<_, FeeRuleRow>(
            "INSERT INTO fee_rules (id, location_id, label, amount, kind, mode, scope_kind, scope_ids, active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *",
        )
            .bind(&rule.id).bind(&rule.location_id).bind(&rule.label).bind(rule.amount).bind(rule.kind.as_str())
            .bind(rule.mode.as_str()).bind(rule.scope.kind.as_str()).bind(ids_json(&rule.scope.ids))
            .bind(rule.active).bind(rule.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        row.try_into()
    }
    async fn list_fees(&self, location_id: &str) -> Result<Vec<FeeRule>, AppError> {
        let rows = sqlx::query_as::<_, FeeRuleRow>("SELECT * FROM fee_rules WHERE location_id = $1").bind(location_id).fetch_all(&self.pool).await.map_err(AppError::Database)?;
        rows.into_iter().map(FeeRule::try_from).collect()
    }
}
