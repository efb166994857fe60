use crate::error::AppError;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use sqlx::FromRow;
use uuid::Uuid;

pub const MIN_SLOT_INTERVAL: i32 = 15;
pub const MAX_SLOT_INTERVAL: i32 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordinal {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl Ordinal {
    fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "first" => Ok(Ordinal::First),
            "second" => Ok(Ordinal::Second),
            "third" => Ok(Ordinal::Third),
            "fourth" => Ok(Ordinal::Fourth),
            "last" => Ok(Ordinal::Last),
            other => Err(AppError::InvalidArgument(format!("unknown ordinal '{}'", other))),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Ordinal::First => "first",
            Ordinal::Second => "second",
            Ordinal::Third => "third",
            Ordinal::Fourth => "fourth",
            Ordinal::Last => "last",
        }
    }
}

/// When a recurring schedule applies. Day-selector strings such as
/// "last-sunday" are parsed once here, at row-load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Daily,
    Weekly(Weekday),
    Monthly { ordinal: Ordinal, weekday: Weekday },
}

impl Recurrence {
    pub fn parse(rule_type: &str, day_selector: Option<&str>) -> Result<Self, AppError> {
        match rule_type {
            "daily" => Ok(Recurrence::Daily),
            "weekly" => {
                let selector = day_selector.ok_or_else(|| {
                    AppError::InvalidArgument("weekly rule requires a weekday selector".into())
                })?;
                let weekday = parse_weekday(selector)?;
                Ok(Recurrence::Weekly(weekday))
            }
            "monthly" => {
                let selector = day_selector.ok_or_else(|| {
                    AppError::InvalidArgument("monthly rule requires an ordinal-weekday selector".into())
                })?;
                let (ordinal_str, weekday_str) = selector.split_once('-').ok_or_else(|| {
                    AppError::InvalidArgument(format!(
                        "malformed monthly selector '{}' (expected e.g. 'last-sunday')",
                        selector
                    ))
                })?;
                Ok(Recurrence::Monthly {
                    ordinal: Ordinal::parse(ordinal_str)?,
                    weekday: parse_weekday(weekday_str)?,
                })
            }
            other => Err(AppError::InvalidArgument(format!("unknown rule type '{}'", other))),
        }
    }

    pub fn rule_type(&self) -> &'static str {
        match self {
            Recurrence::Daily => "daily",
            Recurrence::Weekly(_) => "weekly",
            Recurrence::Monthly { .. } => "monthly",
        }
    }

    pub fn day_selector(&self) -> Option<String> {
        match self {
            Recurrence::Daily => None,
            Recurrence::Weekly(weekday) => Some(weekday_str(*weekday).to_string()),
            Recurrence::Monthly { ordinal, weekday } => {
                Some(format!("{}-{}", ordinal.as_str(), weekday_str(*weekday)))
            }
        }
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            Recurrence::Daily => true,
            Recurrence::Weekly(weekday) => date.weekday() == *weekday,
            Recurrence::Monthly { ordinal, weekday } => {
                if date.weekday() != *weekday {
                    return false;
                }
                // nth occurrence of this weekday within the month, 0-based
                let nth = (date.day() - 1) / 7;
                match ordinal {
                    Ordinal::First => nth == 0,
                    Ordinal::Second => nth == 1,
                    Ordinal::Third => nth == 2,
                    Ordinal::Fourth => nth == 3,
                    Ordinal::Last => date.day() + 7 > days_in_month(date),
                }
            }
        }
    }
}

pub fn parse_weekday(s: &str) -> Result<Weekday, AppError> {
    s.parse::<Weekday>()
        .map_err(|_| AppError::InvalidArgument(format!("unknown weekday '{}'", s)))
}

pub fn weekday_str(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// Raw database row; parsed into [`AvailabilityRule`] at load time.
#[derive(Debug, FromRow, Clone)]
pub struct AvailabilityRuleRow {
    pub id: String,
    pub item_id: String,
    pub rule_type: String,
    pub day_selector: Option<String>,
    pub window_start: NaiveTime,
    pub window_end: NaiveTime,
    pub interval_min: i32,
    pub priority: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AvailabilityRule {
    pub id: String,
    pub item_id: String,
    pub recurrence: Recurrence,
    pub window_start: NaiveTime,
    pub window_end: NaiveTime,
    pub interval_min: i32,
    pub priority: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AvailabilityRuleRow> for AvailabilityRule {
    type Error = AppError;

    fn try_from(row: AvailabilityRuleRow) -> Result<Self, AppError> {
        let recurrence = Recurrence::parse(&row.rule_type, row.day_selector.as_deref())?;
        validate_rule(row.window_start, row.window_end, row.interval_min)?;
        Ok(Self {
            id: row.id,
            item_id: row.item_id,
            recurrence,
            window_start: row.window_start,
            window_end: row.window_end,
            interval_min: row.interval_min,
            priority: row.priority,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

fn validate_rule(start: NaiveTime, end: NaiveTime, interval_min: i32) -> Result<(), AppError> {
    if end <= start {
        return Err(AppError::InvalidArgument(
            "rule window end must be after window start".into(),
        ));
    }
    if !(MIN_SLOT_INTERVAL..=MAX_SLOT_INTERVAL).contains(&interval_min) {
        return Err(AppError::InvalidArgument(format!(
            "slot interval must be between {} and {} minutes",
            MIN_SLOT_INTERVAL, MAX_SLOT_INTERVAL
        )));
    }
    Ok(())
}

impl AvailabilityRule {
    pub fn new(
        item_id: String,
        recurrence: Recurrence,
        window_start: NaiveTime,
        window_end: NaiveTime,
        interval_min: i32,
        priority: i32,
    ) -> Result<Self, AppError> {
        validate_rule(window_start, window_end, interval_min)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            item_id,
            recurrence,
            window_start,
            window_end,
            interval_min,
            priority,
            active: true,
            created_at: Utc::now(),
        })
    }
}
