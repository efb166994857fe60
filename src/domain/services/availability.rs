use crate::domain::models::blackout::{minute_of_day, BlackoutWindow};
use crate::domain::models::item::BookableItem;
use crate::domain::models::location::{Location, Room};
use crate::domain::models::reservation::ReservedSlot;
use crate::domain::models::schedule::AvailabilityRule;
use crate::error::AppError;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Read-only view of everything the resolver needs for one item/date.
pub struct AvailabilitySnapshot<'a> {
    pub location: &'a Location,
    pub rooms: &'a [Room],
    pub rules: &'a [AvailabilityRule],
    pub blackouts: &'a [BlackoutWindow],
    pub reservations: &'a [ReservedSlot],
}

/// Picks the schedule rule governing `date`: highest priority wins, a
/// priority tie goes to the most recently created rule. A tie is operator
/// misconfiguration worth surfacing, so it is logged, never fatal.
pub fn select_rule<'a>(rules: &'a [AvailabilityRule], date: NaiveDate) -> Option<&'a AvailabilityRule> {
    let mut matching: Vec<&AvailabilityRule> = rules
        .iter()
        .filter(|r| r.active && r.recurrence.matches(date))
        .collect();

    matching.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(b.created_at.cmp(&a.created_at))
    });

    if matching.len() > 1 && matching[0].priority == matching[1].priority {
        warn!(
            "Ambiguous availability config for {}: rules {} and {} share priority {}; using most recent",
            date, matching[0].id, matching[1].id, matching[0].priority
        );
    }

    matching.first().copied()
}

/// Produces the ordered candidate start-times for `item` on `date`.
///
/// No matching rule is a valid empty result, not an error. A non-positive
/// duration is a caller contract violation.
pub fn resolve_slots(
    item: &BookableItem,
    date: NaiveDate,
    duration_min: i32,
    snapshot: &AvailabilitySnapshot,
    now: DateTime<Utc>,
) -> Result<Vec<NaiveTime>, AppError> {
    if duration_min <= 0 {
        return Err(AppError::InvalidArgument("duration must be positive".into()));
    }

    let Some(rule) = select_rule(snapshot.rules, date) else {
        return Ok(Vec::new());
    };

    let rooms: Vec<&Room> = snapshot
        .rooms
        .iter()
        .filter(|r| r.active && r.location_id == item.location_id)
        .collect();
    if rooms.is_empty() {
        return Ok(Vec::new());
    }

    let tz: Tz = snapshot.location.timezone.parse().unwrap_or(chrono_tz::UTC);
    let notice_cutoff = item
        .min_booking_notice_hours
        .map(|hours| now + Duration::hours(hours));

    let win_start = minute_of_day(rule.window_start);
    let win_end = minute_of_day(rule.window_end);

    let duration = duration_min as u32;
    let interval = rule.interval_min as u32;

    let mut valid_slots = Vec::new();
    let mut cursor = win_start;
    while cursor + duration <= win_end {
        let hour = cursor / 60;
        let minute = cursor % 60;

        if let Some(start) = NaiveTime::from_hms_opt(hour, minute, 0) {
            let notice_ok = match notice_cutoff {
                Some(cutoff) => tz
                    .from_local_datetime(&date.and_time(start))
                    .single()
                    .is_some_and(|local| local.with_timezone(&Utc) >= cutoff),
                None => true,
            };

            if notice_ok
                && rooms
                    .iter()
                    .any(|room| room_is_free(item, room, date, cursor, cursor + duration, snapshot))
            {
                valid_slots.push(start);
            }
        }
        cursor += interval;
    }

    Ok(valid_slots)
}

/// The rooms still open for a specific start-time. Commit uses this to
/// validate its exact target room before inserting.
pub fn free_rooms_at<'a>(
    item: &BookableItem,
    date: NaiveDate,
    start: NaiveTime,
    duration_min: i32,
    snapshot: &AvailabilitySnapshot<'a>,
) -> Vec<&'a Room> {
    let start_min = minute_of_day(start);
    let end_min = start_min + duration_min.max(0) as u32;
    snapshot
        .rooms
        .iter()
        .filter(|room| {
            room.active
                && room.location_id == item.location_id
                && room_is_free(item, room, date, start_min, end_min, snapshot)
        })
        .collect()
}

fn room_is_free(
    item: &BookableItem,
    room: &Room,
    date: NaiveDate,
    start_min: u32,
    end_min: u32,
    snapshot: &AvailabilitySnapshot,
) -> bool {
    let blocked = snapshot.blackouts.iter().any(|b| {
        if b.location_id != item.location_id || b.date != date {
            return false;
        }
        if !b.applies_to_item(&item.id) || !b.applies_to_room(&room.id) {
            return false;
        }
        let (b_start, b_end) = b.blocked_minutes();
        b_start < end_min && start_min < b_end
    });
    if blocked {
        return false;
    }

    !snapshot.reservations.iter().any(|r| {
        r.is_active() && r.room_id == room.id && r.date == date && r.overlaps_minutes(start_min, end_min)
    })
}
