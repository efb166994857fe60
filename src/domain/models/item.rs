use crate::error::AppError;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// The two payable catalog entities sharing one availability/pricing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Package,
    Attraction,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Package => "package",
            ItemKind::Attraction => "attraction",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "package" => Ok(ItemKind::Package),
            "attraction" => Ok(ItemKind::Attraction),
            other => Err(AppError::InvalidArgument(format!("unknown item kind '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingMode {
    /// One charge for the whole party; participants beyond the included count
    /// are billed per head on top.
    Flat,
    PerPerson,
}

impl PricingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingMode::Flat => "flat",
            PricingMode::PerPerson => "per_person",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "flat" => Ok(PricingMode::Flat),
            "per_person" => Ok(PricingMode::PerPerson),
            other => Err(AppError::InvalidArgument(format!("unknown pricing mode '{}'", other))),
        }
    }
}

/// Raw database row; parsed into [`BookableItem`] at load time.
#[derive(Debug, FromRow, Clone)]
pub struct BookableItemRow {
    pub id: String,
    pub location_id: String,
    pub name: String,
    pub kind: String,
    pub pricing_mode: String,
    pub base_price_cents: i64,
    pub included_participants: i32,
    pub per_extra_cents: i64,
    pub min_participants: i32,
    pub max_participants: i32,
    pub duration_min: i32,
    pub min_booking_notice_hours: Option<i64>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BookableItem {
    pub id: String,
    pub location_id: String,
    pub name: String,
    pub kind: ItemKind,
    pub pricing_mode: PricingMode,
    pub base_price_cents: i64,
    pub included_participants: i32,
    pub per_extra_cents: i64,
    pub min_participants: i32,
    pub max_participants: i32,
    pub duration_min: i32,
    pub min_booking_notice_hours: Option<i64>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<BookableItemRow> for BookableItem {
    type Error = AppError;

    fn try_from(row: BookableItemRow) -> Result<Self, AppError> {
        Ok(Self {
            kind: ItemKind::parse(&row.kind)?,
            pricing_mode: PricingMode::parse(&row.pricing_mode)?,
            id: row.id,
            location_id: row.location_id,
            name: row.name,
            base_price_cents: row.base_price_cents,
            included_participants: row.included_participants,
            per_extra_cents: row.per_extra_cents,
            min_participants: row.min_participants,
            max_participants: row.max_participants,
            duration_min: row.duration_min,
            min_booking_notice_hours: row.min_booking_notice_hours,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

pub struct NewItemParams {
    pub location_id: String,
    pub name: String,
    pub kind: ItemKind,
    pub pricing_mode: PricingMode,
    pub base_price_cents: i64,
    pub duration_min: i32,
}

impl BookableItem {
    pub fn new(params: NewItemParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            location_id: params.location_id,
            name: params.name,
            kind: params.kind,
            pricing_mode: params.pricing_mode,
            base_price_cents: params.base_price_cents,
            included_participants: 0,
            per_extra_cents: 0,
            min_participants: 1,
            max_participants: 0,
            duration_min: params.duration_min,
            min_booking_notice_hours: None,
            active: true,
            created_at: Utc::now(),
        }
    }
}
