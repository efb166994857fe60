use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub timezone: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn new(name: String, timezone: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            timezone,
            active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Room {
    pub id: String,
    pub location_id: String,
    pub name: String,
    pub capacity: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(location_id: String, name: String, capacity: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            location_id,
            name,
            capacity,
            active: true,
            created_at: Utc::now(),
        }
    }
}
