use crate::domain::models::code::CodeRedemption;
use crate::domain::models::reservation::ReservedSlot;
use crate::domain::ports::ReservationRepository;
use crate::error::{AppError, CodeRejection};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct PostgresReservationRepo {
    pool: PgPool,
}

impl PostgresReservationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for PostgresReservationRepo {
    async fn create_with_redemption(
        &self,
        slot: &ReservedSlot,
        redemption: Option<CodeRedemption>,
    ) -> Result<ReservedSlot, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Row lock on the room serializes racing commits for the same room;
        // the partial unique index still backstops identical slots.
        sqlx::query("SELECT id FROM rooms WHERE id = $1 FOR UPDATE")
            .bind(&slot.room_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let overlapping = sqlx::query(
            "SELECT COUNT(*) as count FROM reservations
             WHERE room_id = $1 AND date = $2 AND status != 'CANCELLED'
               AND start_time < $3 AND end_time > $4",
        )
            .bind(&slot.room_id).bind(slot.date).bind(slot.end_time).bind(slot.start_time)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?
            .get::<i64, _>("count");
        if overlapping > 0 {
            return Err(AppError::SlotConflict("Slot overlaps an existing reservation".into()));
        }

        let created = sqlx::query_as::<_, ReservedSlot>(
            "INSERT INTO reservations (id, location_id, item_id, room_id, date, start_time, end_time, duration_min, participants, customer_name, customer_email, status, confirmation_code, base_cents, discount_cents, fee_cents, code_cents, total_cents, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
             RETURNING *",
        )
            .bind(&slot.id).bind(&slot.location_id).bind(&slot.item_id).bind(&slot.room_id)
            .bind(slot.date).bind(slot.start_time).bind(slot.end_time).bind(slot.duration_min)
            .bind(slot.participants).bind(&slot.customer_name).bind(&slot.customer_email)
            .bind(&slot.status).bind(&slot.confirmation_code)
            .bind(slot.base_cents).bind(slot.discount_cents).bind(slot.fee_cents).bind(slot.code_cents).bind(slot.total_cents)
            .bind(slot.created_at)
            .fetch_one(&mut *tx).await
            .map_err(|e| {
                if AppError::is_unique_violation(&e) {
                    AppError::SlotConflict("Slot already reserved".into())
                } else {
                    AppError::Database(e)
                }
            })?;

        if let Some(redemption) = redemption {
            let affected = match redemption.kind.as_str() {
                "PROMO" => sqlx::query(
                    "UPDATE promo_codes SET used_count = used_count + 1,
                            status = CASE WHEN max_uses > 0 AND used_count + 1 >= max_uses THEN 'EXHAUSTED' ELSE status END
                     WHERE code = $1 AND status = 'ACTIVE' AND (max_uses = 0 OR used_count < max_uses)",
                )
                    .bind(&redemption.code)
                    .execute(&mut *tx).await.map_err(AppError::Database)?
                    .rows_affected(),
                _ => sqlx::query(
                    "UPDATE gift_cards SET balance_cents = balance_cents - $1,
                            status = CASE WHEN balance_cents - $1 <= 0 THEN 'EXHAUSTED' ELSE status END
                     WHERE code = $2 AND status = 'ACTIVE' AND balance_cents >= $1",
                )
                    .bind(redemption.amount_cents).bind(&redemption.code)
                    .execute(&mut *tx).await.map_err(AppError::Database)?
                    .rows_affected(),
            };
            if affected == 0 {
                return Err(AppError::CodeRejected {
                    code: redemption.code,
                    reason: CodeRejection::Exhausted,
                });
            }

            // The code-row lock taken by the UPDATE above serializes racing
            // commits for the same code, so this count cannot go stale before
            // the redemption insert below.
            if let Some(limit) = redemption.per_user_limit {
                let used = sqlx::query(
                    "SELECT COUNT(*) as count FROM code_redemptions WHERE code = $1 AND customer_email = $2",
                )
                    .bind(&redemption.code).bind(&redemption.customer_email)
                    .fetch_one(&mut *tx).await.map_err(AppError::Database)?
                    .get::<i64, _>("count");
                if used >= limit as i64 {
                    return Err(AppError::CodeRejected {
                        code: redemption.code,
                        reason: CodeRejection::Exhausted,
                    });
                }
            }

            sqlx::query(
                "INSERT INTO code_redemptions (id, code, kind, reservation_id, amount_cents, customer_email, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
                .bind(Uuid::new_v4().to_string()).bind(&redemption.code).bind(&redemption.kind)
                .bind(&created.id).bind(redemption.amount_cents).bind(&redemption.customer_email).bind(Utc::now())
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ReservedSlot>, AppError> {
        sqlx::query_as::<_, ReservedSlot>("SELECT * FROM reservations WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active_by_location_date(&self, location_id: &str, date: NaiveDate) -> Result<Vec<ReservedSlot>, AppError> {
        sqlx::query_as::<_, ReservedSlot>(
            "SELECT * FROM reservations WHERE location_id = $1 AND date = $2 AND status != 'CANCELLED' ORDER BY start_time ASC",
        )
            .bind(location_id).bind(date)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn set_status(&self, id: &str, status: &str) -> Result<ReservedSlot, AppError> {
        sqlx::query_as::<_, ReservedSlot>("UPDATE reservations SET status = $1 WHERE id = $2 RETURNING *")
            .bind(status).bind(id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
