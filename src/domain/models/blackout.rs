use crate::error::AppError;
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Raw database row; id scopes are stored as JSON arrays.
#[derive(Debug, FromRow, Clone)]
pub struct BlackoutWindowRow {
    pub id: String,
    pub location_id: String,
    pub date: NaiveDate,
    pub package_ids: String,
    pub room_ids: String,
    pub time_start: Option<NaiveTime>,
    pub time_end: Option<NaiveTime>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A "day off": blocks some or all resources at a location for one date.
///
/// Empty id scopes mean the blackout applies to everything at the location.
/// Absent start+end blocks the full day; only start blocks to end of day;
/// only end blocks from start of day.
#[derive(Debug, Clone)]
pub struct BlackoutWindow {
    pub id: String,
    pub location_id: String,
    pub date: NaiveDate,
    pub package_ids: Vec<String>,
    pub room_ids: Vec<String>,
    pub time_start: Option<NaiveTime>,
    pub time_end: Option<NaiveTime>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<BlackoutWindowRow> for BlackoutWindow {
    type Error = AppError;

    fn try_from(row: BlackoutWindowRow) -> Result<Self, AppError> {
        let package_ids: Vec<String> = serde_json::from_str(&row.package_ids)
            .map_err(|_| AppError::InvalidArgument("malformed blackout package scope".into()))?;
        let room_ids: Vec<String> = serde_json::from_str(&row.room_ids)
            .map_err(|_| AppError::InvalidArgument("malformed blackout room scope".into()))?;
        Ok(Self {
            id: row.id,
            location_id: row.location_id,
            date: row.date,
            package_ids,
            room_ids,
            time_start: row.time_start,
            time_end: row.time_end,
            reason: row.reason,
            created_at: row.created_at,
        })
    }
}

impl BlackoutWindow {
    pub fn new(location_id: String, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            location_id,
            date,
            package_ids: Vec::new(),
            room_ids: Vec::new(),
            time_start: None,
            time_end: None,
            reason: None,
            created_at: Utc::now(),
        }
    }

    pub fn applies_to_item(&self, item_id: &str) -> bool {
        self.package_ids.is_empty() || self.package_ids.iter().any(|id| id == item_id)
    }

    pub fn applies_to_room(&self, room_id: &str) -> bool {
        self.room_ids.is_empty() || self.room_ids.iter().any(|id| id == room_id)
    }

    /// Blocked range as minutes from midnight, end-exclusive.
    pub fn blocked_minutes(&self) -> (u32, u32) {
        let start = self.time_start.map(minute_of_day).unwrap_or(0);
        let end = self.time_end.map(minute_of_day).unwrap_or(1440);
        (start, end)
    }
}

pub fn minute_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}
