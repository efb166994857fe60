use crate::domain::models::blackout::minute_of_day;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_CONFIRMED: &str = "CONFIRMED";
pub const STATUS_CANCELLED: &str = "CANCELLED";
pub const STATUS_COMPLETED: &str = "COMPLETED";
pub const STATUS_NO_SHOW: &str = "NO_SHOW";

/// A committed booking of one room for one time slot. Never physically
/// deleted; cancel/complete/no-show flip the status instead.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ReservedSlot {
    pub id: String,
    pub location_id: String,
    pub item_id: String,
    pub room_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_min: i32,
    pub participants: i32,
    pub customer_name: String,
    pub customer_email: String,
    pub status: String,
    pub confirmation_code: String,
    pub base_cents: i64,
    pub discount_cents: i64,
    pub fee_cents: i64,
    pub code_cents: i64,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

pub struct NewReservationParams {
    pub location_id: String,
    pub item_id: String,
    pub room_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_min: i32,
    pub participants: i32,
    pub customer_name: String,
    pub customer_email: String,
}

impl ReservedSlot {
    pub fn new(params: NewReservationParams) -> Self {
        let end_time = params.start_time + Duration::minutes(params.duration_min as i64);

        let confirmation_code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            location_id: params.location_id,
            item_id: params.item_id,
            room_id: params.room_id,
            date: params.date,
            start_time: params.start_time,
            end_time,
            duration_min: params.duration_min,
            participants: params.participants,
            customer_name: params.customer_name,
            customer_email: params.customer_email,
            status: STATUS_CONFIRMED.to_string(),
            confirmation_code,
            base_cents: 0,
            discount_cents: 0,
            fee_cents: 0,
            code_cents: 0,
            total_cents: 0,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status != STATUS_CANCELLED
    }

    /// Overlap test against a minute range, end-exclusive on both sides.
    pub fn overlaps_minutes(&self, start_min: u32, end_min: u32) -> bool {
        let own_start = minute_of_day(self.start_time);
        let own_end = own_start + self.duration_min as u32;
        own_start < end_min && start_min < own_end
    }
}
