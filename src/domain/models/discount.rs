use crate::domain::models::item::{BookableItem, ItemKind};
use crate::domain::models::schedule::{parse_weekday, weekday_str};
use crate::error::AppError;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustKind {
    Fixed,
    Percentage,
}

impl AdjustKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustKind::Fixed => "fixed",
            AdjustKind::Percentage => "percentage",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "fixed" => Ok(AdjustKind::Fixed),
            "percentage" => Ok(AdjustKind::Percentage),
            other => Err(AppError::InvalidArgument(format!("unknown adjustment kind '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeMode {
    /// Added on top of the price.
    Additive,
    /// Already embedded in the displayed price; reported for accounting only.
    Inclusive,
}

impl FeeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeMode::Additive => "additive",
            FeeMode::Inclusive => "inclusive",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "additive" => Ok(FeeMode::Additive),
            "inclusive" => Ok(FeeMode::Inclusive),
            other => Err(AppError::InvalidArgument(format!("unknown fee mode '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Package,
    Attraction,
    All,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Package => "package",
            ScopeKind::Attraction => "attraction",
            ScopeKind::All => "all",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "package" => Ok(ScopeKind::Package),
            "attraction" => Ok(ScopeKind::Attraction),
            "all" => Ok(ScopeKind::All),
            other => Err(AppError::InvalidArgument(format!("unknown scope kind '{}'", other))),
        }
    }
}

/// Which catalog entities a discount or fee rule applies to. An empty id list
/// means every item of the scoped kind.
#[derive(Debug, Clone)]
pub struct EntityScope {
    pub kind: ScopeKind,
    pub ids: Vec<String>,
}

impl EntityScope {
    pub fn all() -> Self {
        Self { kind: ScopeKind::All, ids: Vec::new() }
    }

    pub fn parse(kind: &str, ids_json: &str) -> Result<Self, AppError> {
        let ids: Vec<String> = serde_json::from_str(ids_json)
            .map_err(|_| AppError::InvalidArgument("malformed scope id list".into()))?;
        Ok(Self { kind: ScopeKind::parse(kind)?, ids })
    }

    pub fn includes(&self, item: &BookableItem) -> bool {
        let kind_ok = match self.kind {
            ScopeKind::All => true,
            ScopeKind::Package => item.kind == ItemKind::Package,
            ScopeKind::Attraction => item.kind == ItemKind::Attraction,
        };
        kind_ok && (self.ids.is_empty() || self.ids.iter().any(|id| id == &item.id))
    }

    /// How narrowly the scope pins the item: explicit id > kind > all.
    pub fn specificity(&self) -> u8 {
        if !self.ids.is_empty() {
            2
        } else if self.kind != ScopeKind::All {
            1
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountRecurrence {
    OneTime(NaiveDate),
    Weekly(Weekday),
    /// Day of month, 1-31.
    Monthly(u32),
}

impl DiscountRecurrence {
    pub fn parse(recurrence: &str, value: &str) -> Result<Self, AppError> {
        match recurrence {
            "one_time" => {
                let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                    AppError::InvalidArgument(format!("malformed one_time date '{}'", value))
                })?;
                Ok(DiscountRecurrence::OneTime(date))
            }
            "weekly" => Ok(DiscountRecurrence::Weekly(parse_weekday(value)?)),
            "monthly" => {
                let day: u32 = value.parse().map_err(|_| {
                    AppError::InvalidArgument(format!("malformed day of month '{}'", value))
                })?;
                if !(1..=31).contains(&day) {
                    return Err(AppError::InvalidArgument(format!("day of month {} out of range", day)));
                }
                Ok(DiscountRecurrence::Monthly(day))
            }
            other => Err(AppError::InvalidArgument(format!("unknown recurrence '{}'", other))),
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            DiscountRecurrence::OneTime(_) => "one_time",
            DiscountRecurrence::Weekly(_) => "weekly",
            DiscountRecurrence::Monthly(_) => "monthly",
        }
    }

    pub fn value_string(&self) -> String {
        match self {
            DiscountRecurrence::OneTime(date) => date.format("%Y-%m-%d").to_string(),
            DiscountRecurrence::Weekly(weekday) => weekday_str(*weekday).to_string(),
            DiscountRecurrence::Monthly(day) => day.to_string(),
        }
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            DiscountRecurrence::OneTime(d) => *d == date,
            DiscountRecurrence::Weekly(weekday) => date.weekday() == *weekday,
            DiscountRecurrence::Monthly(day) => date.day() == *day,
        }
    }
}

/// Raw database row; parsed into [`DiscountRule`] at load time.
#[derive(Debug, FromRow, Clone)]
pub struct DiscountRuleRow {
    pub id: String,
    pub location_id: String,
    pub name: String,
    pub amount: i64,
    pub kind: String,
    pub recurrence: String,
    pub recurrence_value: String,
    pub effective_start: Option<NaiveDate>,
    pub effective_end: Option<NaiveDate>,
    pub time_start: Option<NaiveTime>,
    pub time_end: Option<NaiveTime>,
    pub scope_kind: String,
    pub scope_ids: String,
    pub priority: i32,
    pub stackable: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Operator-authored special pricing. Read-only during resolution.
#[derive(Debug, Clone)]
pub struct DiscountRule {
    pub id: String,
    pub location_id: String,
    pub name: String,
    /// Cents for fixed rules, whole percent for percentage rules.
    pub amount: i64,
    pub kind: AdjustKind,
    pub recurrence: DiscountRecurrence,
    pub effective_start: Option<NaiveDate>,
    pub effective_end: Option<NaiveDate>,
    pub time_start: Option<NaiveTime>,
    pub time_end: Option<NaiveTime>,
    pub scope: EntityScope,
    pub priority: i32,
    pub stackable: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DiscountRuleRow> for DiscountRule {
    type Error = AppError;

    fn try_from(row: DiscountRuleRow) -> Result<Self, AppError> {
        Ok(Self {
            kind: AdjustKind::parse(&row.kind)?,
            recurrence: DiscountRecurrence::parse(&row.recurrence, &row.recurrence_value)?,
            scope: EntityScope::parse(&row.scope_kind, &row.scope_ids)?,
            id: row.id,
            location_id: row.location_id,
            name: row.name,
            amount: row.amount,
            effective_start: row.effective_start,
            effective_end: row.effective_end,
            time_start: row.time_start,
            time_end: row.time_end,
            priority: row.priority,
            stackable: row.stackable,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

impl DiscountRule {
    pub fn new(
        location_id: String,
        name: String,
        amount: i64,
        kind: AdjustKind,
        recurrence: DiscountRecurrence,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            location_id,
            name,
            amount,
            kind,
            recurrence,
            effective_start: None,
            effective_end: None,
            time_start: None,
            time_end: None,
            scope: EntityScope::all(),
            priority: 0,
            stackable: false,
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn matches(&self, item: &BookableItem, date: NaiveDate, time: NaiveTime) -> bool {
        if !self.active || !self.scope.includes(item) || !self.recurrence.matches(date) {
            return false;
        }
        if let Some(start) = self.effective_start
            && date < start
        {
            return false;
        }
        if let Some(end) = self.effective_end
            && date > end
        {
            return false;
        }
        if let Some(start) = self.time_start
            && time < start
        {
            return false;
        }
        if let Some(end) = self.time_end
            && time > end
        {
            return false;
        }
        true
    }
}

/// Raw database row; parsed into [`FeeRule`] at load time.
#[derive(Debug, FromRow, Clone)]
pub struct FeeRuleRow {
    pub id: String,
    pub location_id: String,
    pub label: String,
    pub amount: i64,
    pub kind: String,
    pub mode: String,
    pub scope_kind: String,
    pub scope_ids: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Operator-authored fee support. Computed independently of discounts.
#[derive(Debug, Clone)]
pub struct FeeRule {
    pub id: String,
    pub location_id: String,
    pub label: String,
    pub amount: i64,
    pub kind: AdjustKind,
    pub mode: FeeMode,
    pub scope: EntityScope,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<FeeRuleRow> for FeeRule {
    type Error = AppError;

    fn try_from(row: FeeRuleRow) -> Result<Self, AppError> {
        Ok(Self {
            kind: AdjustKind::parse(&row.kind)?,
            mode: FeeMode::parse(&row.mode)?,
            scope: EntityScope::parse(&row.scope_kind, &row.scope_ids)?,
            id: row.id,
            location_id: row.location_id,
            label: row.label,
            amount: row.amount,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

impl FeeRule {
    pub fn new(location_id: String, label: String, amount: i64, kind: AdjustKind, mode: FeeMode) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            location_id,
            label,
            amount,
            kind,
            mode,
            scope: EntityScope::all(),
            active: true,
            created_at: Utc::now(),
        }
    }
}
