use crate::domain::models::code::{GiftCard, Promo, PromoRow, RedeemableCode};
use crate::domain::ports::CodeRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

pub struct PostgresCodeRepo {
    pool: PgPool,
}

impl PostgresCodeRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CodeRepository for PostgresCodeRepo {
    async fn create_promo(&self, promo: &Promo) -> Result<Promo, AppError> {
        let row = sqlx::query_as::<_, PromoRow>(
            "INSERT INTO promo_codes (code, name, kind, amount, max_uses, used_count, per_user_limit, valid_from, valid_until, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING *",
        )
            .bind(&promo.code).bind(&promo.name).bind(promo.kind.as_str()).bind(promo.amount)
            .bind(promo.max_uses).bind(promo.used_count).bind(promo.per_user_limit)
            .bind(promo.valid_from).bind(promo.valid_until).bind(&promo.status).bind(promo.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        row.try_into()
    }

    async fn create_gift_card(&self, card: &GiftCard) -> Result<GiftCard, AppError> {
        sqlx::query_as::<_, GiftCard>(
            "INSERT INTO gift_cards (code, balance_cents, valid_from, valid_until, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
            .bind(&card.code).bind(card.balance_cents)
            .bind(card.valid_from).bind(card.valid_until).bind(&card.status).bind(card.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<RedeemableCode>, AppError> {
        let promo = sqlx::query_as::<_, PromoRow>("SELECT * FROM promo_codes WHERE code = $1").bind(code).fetch_optional(&self.pool).await.map_err(AppError::Database)?;
        if let Some(promo) = promo {
            return Ok(Some(RedeemableCode::Promo(promo.try_into()?)));
        }
        let card = sqlx::query_as::<_, GiftCard>("SELECT * FROM gift_cards WHERE code = $1").bind(code).fetch_optional(&self.pool).await.map_err(AppError::Database)?;
        Ok(card.map(RedeemableCode::GiftCard))
    }

    async fn count_redemptions_for(&self, code: &str, customer_email: &str) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM code_redemptions WHERE code = $1 AND customer_email = $2")
            .bind(code).bind(customer_email)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count"))
    }

    async fn adjust_gift_card_balance(&self, code: &str, delta_cents: i64) -> Result<GiftCard, AppError> {
        sqlx::query_as::<_, GiftCard>(
            "UPDATE gift_cards SET balance_cents = balance_cents + $1,
                    status = CASE WHEN balance_cents + $1 > 0 AND status = 'EXHAUSTED' THEN 'ACTIVE' ELSE status END
             WHERE code = $2
             RETURNING *",
        )
            .bind(delta_cents).bind(code)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Gift card not found".into()))
    }
}
