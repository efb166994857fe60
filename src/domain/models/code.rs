use crate::domain::models::discount::AdjustKind;
use crate::error::{AppError, CodeRejection};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const CODE_ACTIVE: &str = "ACTIVE";
pub const CODE_INACTIVE: &str = "INACTIVE";
pub const CODE_EXPIRED: &str = "EXPIRED";
pub const CODE_EXHAUSTED: &str = "EXHAUSTED";
pub const CODE_CANCELLED: &str = "CANCELLED";

/// Raw database row; parsed into [`Promo`] at load time.
#[derive(Debug, FromRow, Clone)]
pub struct PromoRow {
    pub code: String,
    pub name: String,
    pub kind: String,
    pub amount: i64,
    pub max_uses: i32,
    pub used_count: i32,
    pub per_user_limit: Option<i32>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Promo {
    pub code: String,
    pub name: String,
    /// Cents for fixed promos, whole percent for percentage promos.
    pub kind: AdjustKind,
    pub amount: i64,
    /// 0 = unlimited.
    pub max_uses: i32,
    pub used_count: i32,
    pub per_user_limit: Option<i32>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PromoRow> for Promo {
    type Error = AppError;

    fn try_from(row: PromoRow) -> Result<Self, AppError> {
        Ok(Self {
            kind: AdjustKind::parse(&row.kind)?,
            code: row.code,
            name: row.name,
            amount: row.amount,
            max_uses: row.max_uses,
            used_count: row.used_count,
            per_user_limit: row.per_user_limit,
            valid_from: row.valid_from,
            valid_until: row.valid_until,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct GiftCard {
    pub code: String,
    pub balance_cents: i64,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Promo {
    pub fn new(code: String, name: String, kind: AdjustKind, amount: i64) -> Self {
        Self {
            code,
            name,
            kind,
            amount,
            max_uses: 0,
            used_count: 0,
            per_user_limit: None,
            valid_from: None,
            valid_until: None,
            status: CODE_ACTIVE.to_string(),
            created_at: Utc::now(),
        }
    }
}

impl GiftCard {
    pub fn new(code: String, balance_cents: i64) -> Self {
        Self {
            code,
            balance_cents,
            valid_from: None,
            valid_until: None,
            status: CODE_ACTIVE.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// A code-addressed modifier presented by the caller at pricing time.
#[derive(Debug, Clone)]
pub enum RedeemableCode {
    Promo(Promo),
    GiftCard(GiftCard),
}

impl RedeemableCode {
    pub fn code(&self) -> &str {
        match self {
            RedeemableCode::Promo(p) => &p.code,
            RedeemableCode::GiftCard(g) => &g.code,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            RedeemableCode::Promo(_) => "PROMO",
            RedeemableCode::GiftCard(_) => "GIFT_CARD",
        }
    }

    /// A code in a terminal status is never accepted, even if its validity
    /// window still matches the date.
    pub fn validate(&self, on: NaiveDate) -> Result<(), CodeRejection> {
        let (status, valid_from, valid_until) = match self {
            RedeemableCode::Promo(p) => (p.status.as_str(), p.valid_from, p.valid_until),
            RedeemableCode::GiftCard(g) => (g.status.as_str(), g.valid_from, g.valid_until),
        };

        match status {
            CODE_ACTIVE => {}
            CODE_INACTIVE => return Err(CodeRejection::Inactive),
            CODE_EXPIRED => return Err(CodeRejection::Expired),
            CODE_EXHAUSTED => return Err(CodeRejection::Exhausted),
            CODE_CANCELLED => return Err(CodeRejection::Cancelled),
            _ => return Err(CodeRejection::Inactive),
        }

        if let Some(from) = valid_from
            && on < from
        {
            return Err(CodeRejection::OutOfWindow);
        }
        if let Some(until) = valid_until
            && on > until
        {
            return Err(CodeRejection::Expired);
        }

        match self {
            RedeemableCode::Promo(p) => {
                if p.max_uses > 0 && p.used_count >= p.max_uses {
                    return Err(CodeRejection::Exhausted);
                }
            }
            RedeemableCode::GiftCard(g) => {
                if g.balance_cents <= 0 {
                    return Err(CodeRejection::Exhausted);
                }
            }
        }

        Ok(())
    }

    /// How many cents this code takes off a running price. Never more than
    /// the running price itself.
    pub fn applied_amount(&self, running_cents: i64) -> i64 {
        let raw = match self {
            RedeemableCode::Promo(p) => match p.kind {
                AdjustKind::Percentage => running_cents * p.amount / 100,
                AdjustKind::Fixed => p.amount,
            },
            RedeemableCode::GiftCard(g) => g.balance_cents,
        };
        raw.clamp(0, running_cents)
    }
}

/// A code spend recorded in the same transaction as the reservation insert.
/// `per_user_limit` is enforced inside that transaction so racing commits by
/// the same customer cannot each slip under the cap.
#[derive(Debug, Clone)]
pub struct CodeRedemption {
    pub code: String,
    pub kind: String,
    pub amount_cents: i64,
    pub customer_email: String,
    pub per_user_limit: Option<i32>,
}
