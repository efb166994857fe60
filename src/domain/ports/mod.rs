use crate::domain::models::{
    blackout::BlackoutWindow,
    code::{CodeRedemption, GiftCard, Promo, RedeemableCode},
    discount::{DiscountRule, FeeRule},
    item::BookableItem,
    location::{Location, Room},
    reservation::ReservedSlot,
    schedule::AvailabilityRule,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Operator-authored configuration. The engine only ever reads snapshots;
/// the administrative edit surface lives outside this crate.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_location(&self, location: &Location) -> Result<Location, AppError>;
    async fn find_location(&self, id: &str) -> Result<Option<Location>, AppError>;

    async fn create_room(&self, room: &Room) -> Result<Room, AppError>;
    async fn find_room(&self, id: &str) -> Result<Option<Room>, AppError>;
    async fn list_rooms(&self, location_id: &str) -> Result<Vec<Room>, AppError>;

    async fn create_item(&self, item: &BookableItem) -> Result<BookableItem, AppError>;
    async fn find_item(&self, id: &str) -> Result<Option<BookableItem>, AppError>;
    async fn list_items(&self, location_id: &str) -> Result<Vec<BookableItem>, AppError>;

    async fn create_rule(&self, rule: &AvailabilityRule) -> Result<AvailabilityRule, AppError>;
    async fn list_rules(&self, item_id: &str) -> Result<Vec<AvailabilityRule>, AppError>;

    async fn create_blackout(&self, blackout: &BlackoutWindow) -> Result<BlackoutWindow, AppError>;
    async fn list_blackouts(&self, location_id: &str, date: NaiveDate) -> Result<Vec<BlackoutWindow>, AppError>;

    async fn create_discount(&self, rule: &DiscountRule) -> Result<DiscountRule, AppError>;
    async fn list_discounts(&self, location_id: &str) -> Result<Vec<DiscountRule>, AppError>;

    async fn create_fee(&self, rule: &FeeRule) -> Result<FeeRule, AppError>;
    async fn list_fees(&self, location_id: &str) -> Result<Vec<FeeRule>, AppError>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Atomically inserts the reservation and, when present, spends the code.
    /// Losing the race for the slot must surface as `SlotConflict`; a code
    /// that can no longer cover the spend must surface as `CodeRejected`.
    async fn create_with_redemption(
        &self,
        slot: &ReservedSlot,
        redemption: Option<CodeRedemption>,
    ) -> Result<ReservedSlot, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<ReservedSlot>, AppError>;
    async fn list_active_by_location_date(
        &self,
        location_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ReservedSlot>, AppError>;
    async fn set_status(&self, id: &str, status: &str) -> Result<ReservedSlot, AppError>;
}

#[async_trait]
pub trait CodeRepository: Send + Sync {
    async fn create_promo(&self, promo: &Promo) -> Result<Promo, AppError>;
    async fn create_gift_card(&self, card: &GiftCard) -> Result<GiftCard, AppError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<RedeemableCode>, AppError>;
    async fn count_redemptions_for(&self, code: &str, customer_email: &str) -> Result<i64, AppError>;
    /// Administrative correction; the only path allowed to increase a balance.
    async fn adjust_gift_card_balance(&self, code: &str, delta_cents: i64) -> Result<GiftCard, AppError>;
}
