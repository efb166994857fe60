use crate::config::Config;
use crate::domain::models::code::{CodeRedemption, RedeemableCode};
use crate::domain::models::location::Location;
use crate::domain::models::reservation::{
    NewReservationParams, ReservedSlot, STATUS_CANCELLED, STATUS_COMPLETED, STATUS_NO_SHOW,
};
use crate::domain::models::item::BookableItem;
use crate::domain::ports::{CatalogRepository, CodeRepository, ReservationRepository};
use crate::domain::services::availability::{free_rooms_at, resolve_slots, AvailabilitySnapshot};
use crate::domain::services::pricing::{price, PricingContext, Quote};
use crate::error::AppError;
use chrono::{NaiveDate, NaiveTime, Utc};
use std::sync::Arc;
use tracing::info;

pub struct QuoteRequest {
    pub item_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub participants: i32,
    pub code: Option<String>,
}

pub struct CommitRequest {
    pub item_id: String,
    pub room_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_min: Option<i32>,
    pub participants: i32,
    pub customer_name: String,
    pub customer_email: String,
    pub code: Option<String>,
}

/// Orchestrates resolve -> price -> commit over the storage ports.
pub struct BookingService {
    config: Config,
    catalog_repo: Arc<dyn CatalogRepository>,
    reservation_repo: Arc<dyn ReservationRepository>,
    code_repo: Arc<dyn CodeRepository>,
}

impl BookingService {
    pub fn new(
        config: Config,
        catalog_repo: Arc<dyn CatalogRepository>,
        reservation_repo: Arc<dyn ReservationRepository>,
        code_repo: Arc<dyn CodeRepository>,
    ) -> Self {
        Self {
            config,
            catalog_repo,
            reservation_repo,
            code_repo,
        }
    }

    pub async fn available_slots(
        &self,
        item_id: &str,
        date: NaiveDate,
        duration_min: Option<i32>,
    ) -> Result<Vec<NaiveTime>, AppError> {
        let item = self.load_item(item_id).await?;
        let duration = duration_min.unwrap_or(item.duration_min);

        let location = self.load_location(&item.location_id).await?;
        let rooms = self.catalog_repo.list_rooms(&item.location_id).await?;
        let rules = self.catalog_repo.list_rules(&item.id).await?;
        let blackouts = self.catalog_repo.list_blackouts(&item.location_id, date).await?;
        let reservations = self
            .reservation_repo
            .list_active_by_location_date(&item.location_id, date)
            .await?;

        let snapshot = AvailabilitySnapshot {
            location: &location,
            rooms: &rooms,
            rules: &rules,
            blackouts: &blackouts,
            reservations: &reservations,
        };
        resolve_slots(&item, date, duration, &snapshot, Utc::now())
    }

    /// Price preview. Validates any presented code but never spends it.
    pub async fn quote(&self, req: QuoteRequest) -> Result<Quote, AppError> {
        let item = self.load_item(&req.item_id).await?;

        let code = self.lookup_code(req.code.as_deref()).await?;
        let discounts = self.catalog_repo.list_discounts(&item.location_id).await?;
        let fees = self.catalog_repo.list_fees(&item.location_id).await?;

        let ctx = PricingContext {
            discounts: &discounts,
            fees: &fees,
            tie_break: self.config.discount_tie_break,
        };
        price(&item, req.date, req.time, req.participants, code.as_ref(), &ctx)
    }

    /// Atomic booking commit. Re-resolves availability for the target slot,
    /// prices it, and inserts the reservation together with any code spend in
    /// one transaction. A lost race surfaces as `SlotConflict`; the caller
    /// re-resolves and retries, the engine never retries on its own.
    pub async fn commit(&self, req: CommitRequest) -> Result<ReservedSlot, AppError> {
        let item = self.load_item(&req.item_id).await?;
        let room = self
            .catalog_repo
            .find_room(&req.room_id)
            .await?
            .ok_or(AppError::NotFound("Room not found".into()))?;
        if room.location_id != item.location_id {
            return Err(AppError::InvalidArgument("room belongs to a different location".into()));
        }
        if room.capacity > 0 && req.participants > room.capacity {
            return Err(AppError::InvalidArgument(format!(
                "room '{}' holds at most {} participants",
                room.name, room.capacity
            )));
        }

        let duration = req.duration_min.unwrap_or(item.duration_min);

        let location = self.load_location(&item.location_id).await?;
        let rooms = self.catalog_repo.list_rooms(&item.location_id).await?;
        let rules = self.catalog_repo.list_rules(&item.id).await?;
        let blackouts = self.catalog_repo.list_blackouts(&item.location_id, req.date).await?;
        let reservations = self
            .reservation_repo
            .list_active_by_location_date(&item.location_id, req.date)
            .await?;

        let snapshot = AvailabilitySnapshot {
            location: &location,
            rooms: &rooms,
            rules: &rules,
            blackouts: &blackouts,
            reservations: &reservations,
        };

        let valid_slots = resolve_slots(&item, req.date, duration, &snapshot, Utc::now())?;
        if !valid_slots.contains(&req.time) {
            return Err(AppError::SlotConflict("Selected time slot is not available".into()));
        }
        let free_rooms = free_rooms_at(&item, req.date, req.time, duration, &snapshot);
        if !free_rooms.iter().any(|r| r.id == room.id) {
            return Err(AppError::SlotConflict(format!("Room '{}' is not free at that time", room.name)));
        }

        let code = self.lookup_code(req.code.as_deref()).await?;
        let discounts = self.catalog_repo.list_discounts(&item.location_id).await?;
        let fees = self.catalog_repo.list_fees(&item.location_id).await?;
        let ctx = PricingContext {
            discounts: &discounts,
            fees: &fees,
            tie_break: self.config.discount_tie_break,
        };
        let quote = price(&item, req.date, req.time, req.participants, code.as_ref(), &ctx)?;

        let mut slot = ReservedSlot::new(NewReservationParams {
            location_id: item.location_id.clone(),
            item_id: item.id.clone(),
            room_id: room.id.clone(),
            date: req.date,
            start_time: req.time,
            duration_min: duration,
            participants: req.participants,
            customer_name: req.customer_name,
            customer_email: req.customer_email.clone(),
        });
        slot.base_cents = quote.base_cents;
        slot.discount_cents = quote.discount_cents();
        slot.fee_cents = quote.additive_fee_cents();
        slot.code_cents = quote.code_cents();
        slot.total_cents = quote.total_cents;

        let redemption = match (&code, &quote.code) {
            (Some(code), Some(applied)) if applied.amount_cents > 0 => Some(CodeRedemption {
                code: applied.code.clone(),
                kind: code.kind_str().to_string(),
                amount_cents: applied.amount_cents,
                customer_email: req.customer_email.clone(),
                per_user_limit: match code {
                    RedeemableCode::Promo(promo) => promo.per_user_limit,
                    RedeemableCode::GiftCard(_) => None,
                },
            }),
            _ => None,
        };

        let created = self
            .reservation_repo
            .create_with_redemption(&slot, redemption)
            .await?;

        info!(
            "Reservation {} committed: item {} room {} on {} at {}",
            created.id, created.item_id, created.room_id, created.date, created.start_time
        );
        Ok(created)
    }

    pub async fn cancel(&self, reservation_id: &str) -> Result<ReservedSlot, AppError> {
        self.transition(reservation_id, STATUS_CANCELLED).await
    }

    pub async fn complete(&self, reservation_id: &str) -> Result<ReservedSlot, AppError> {
        self.transition(reservation_id, STATUS_COMPLETED).await
    }

    pub async fn no_show(&self, reservation_id: &str) -> Result<ReservedSlot, AppError> {
        self.transition(reservation_id, STATUS_NO_SHOW).await
    }

    async fn transition(&self, reservation_id: &str, status: &str) -> Result<ReservedSlot, AppError> {
        self.reservation_repo
            .find_by_id(reservation_id)
            .await?
            .ok_or(AppError::NotFound("Reservation not found".into()))?;
        let updated = self.reservation_repo.set_status(reservation_id, status).await?;
        info!("Reservation {} -> {}", reservation_id, status);
        Ok(updated)
    }

    /// Inactive items are invisible to the engine, same as missing ones.
    async fn load_item(&self, item_id: &str) -> Result<BookableItem, AppError> {
        self.catalog_repo
            .find_item(item_id)
            .await?
            .filter(|item| item.active)
            .ok_or(AppError::NotFound("Item not found".into()))
    }

    async fn load_location(&self, location_id: &str) -> Result<Location, AppError> {
        self.catalog_repo
            .find_location(location_id)
            .await?
            .filter(|location| location.active)
            .ok_or(AppError::NotFound("Location not found".into()))
    }

    async fn lookup_code(&self, code: Option<&str>) -> Result<Option<RedeemableCode>, AppError> {
        match code {
            Some(code) => {
                let found = self
                    .code_repo
                    .find_by_code(code)
                    .await?
                    .ok_or(AppError::NotFound(format!("Code '{}' not found", code)))?;
                Ok(Some(found))
            }
            None => Ok(None),
        }
    }
}
