//! Appointment scheduler business logic.
//!
//! Computes the bookable slot catalog for a rolling 7-day window and manages
//! the persisted appointment map. The catalog itself is never stored; it is a
//! pure function of "now" plus the booked keys. Every write path holds the
//! appointments mutex across its full load-mutate-save cycle so two
//! interactions racing for the same slot cannot both win.

use crate::{
    errors::Result,
    models::{Appointment, format_slot_key, parse_slot_key},
    storage::JsonStore,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Days in the booking window, counting today.
pub const BOOKING_WINDOW_DAYS: i64 = 7;
/// Granularity of the slot grid in minutes.
pub const SLOT_INTERVAL_MINUTES: i64 = 30;
/// Slots offered per day (18:00 through 21:30).
pub const SLOTS_PER_DAY: i64 = 8;
/// Minimum lead time before a slot can still be booked, in minutes.
pub const MIN_LEAD_MINUTES: i64 = 30;
/// Hours a fresh ticket must wait before any slot becomes bookable.
pub const BOOKING_EMBARGO_HOURS: i64 = 24;

/// Result of a booking attempt. `SlotTaken` is an expected contention
/// signal that callers must branch on, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    /// The slot was free and is now held by the returned appointment.
    Booked(Appointment),
    /// Another appointment already holds this slot key.
    SlotTaken,
}

/// The candidate times offered on every day of the window.
fn day_slot_times() -> impl Iterator<Item = NaiveTime> {
    // 18:00 is always a valid time of day.
    #[allow(clippy::expect_used)]
    let first = NaiveTime::from_hms_opt(18, 0, 0).expect("18:00 is a valid time");
    (0..SLOTS_PER_DAY).map(move |i| first + Duration::minutes(i * SLOT_INTERVAL_MINUTES))
}

/// Computes the available slots for the next [`BOOKING_WINDOW_DAYS`] days.
///
/// If `ticket_created_at` is given and less than
/// [`BOOKING_EMBARGO_HOURS`] have passed since, the result is an empty map:
/// the embargo is all-or-nothing, not a per-slot filter. Otherwise a
/// candidate survives only if it starts strictly more than
/// [`MIN_LEAD_MINUTES`] after `now` and its slot key is not already booked.
/// Days with no surviving candidates are omitted entirely so the caller
/// never renders an empty day group.
pub async fn list_available_slots(
    store: &JsonStore,
    now: NaiveDateTime,
    ticket_created_at: Option<NaiveDateTime>,
) -> Result<BTreeMap<NaiveDate, Vec<NaiveTime>>> {
    if let Some(created_at) = ticket_created_at
        && now < created_at + Duration::hours(BOOKING_EMBARGO_HOURS)
    {
        return Ok(BTreeMap::new());
    }

    let appointments = store.load_appointments().await?;
    let earliest_start = now + Duration::minutes(MIN_LEAD_MINUTES);

    let mut available = BTreeMap::new();
    for day_offset in 0..BOOKING_WINDOW_DAYS {
        let date = now.date() + Duration::days(day_offset);
        let times: Vec<NaiveTime> = day_slot_times()
            .filter(|&time| {
                date.and_time(time) > earliest_start
                    && !appointments.contains_key(&format_slot_key(date, time))
            })
            .collect();
        if !times.is_empty() {
            available.insert(date, times);
        }
    }
    Ok(available)
}

/// Attempts to book `slot_key` for the given user and ticket.
///
/// Returns [`BookingOutcome::SlotTaken`] without mutating state when the
/// key is already held. On success the slot is unavailable to every
/// subsequent listing and booking call until explicitly freed.
///
/// # Errors
/// [`crate::errors::Error::InvalidSlotKey`] if the key is syntactically
/// malformed; storage errors propagate unchanged.
pub async fn book_slot(
    store: &JsonStore,
    slot_key: &str,
    user_id: &str,
    user_name: &str,
    ticket_name: &str,
) -> Result<BookingOutcome> {
    // Precondition: the key must parse before we touch storage.
    parse_slot_key(slot_key)?;

    let _guard = store.lock_appointments().await;
    let mut appointments = store.load_appointments().await?;

    if appointments.contains_key(slot_key) {
        warn!(slot_key, user_id, ticket_name, "booking conflict: slot already taken");
        return Ok(BookingOutcome::SlotTaken);
    }

    let appointment = Appointment {
        user_id: user_id.to_string(),
        user_name: user_name.to_string(),
        ticket_name: ticket_name.to_string(),
        booked_at: chrono::Local::now().naive_local(),
    };
    appointments.insert(slot_key.to_string(), appointment.clone());
    store.save_appointments(&appointments).await?;

    info!(slot_key, user_id, ticket_name, "slot booked");
    Ok(BookingOutcome::Booked(appointment))
}

/// Releases every appointment belonging to `ticket_name` and returns how
/// many were removed. Used when an order is cancelled, closed, or finishes
/// review.
pub async fn free_appointments_for_ticket(store: &JsonStore, ticket_name: &str) -> Result<usize> {
    let _guard = store.lock_appointments().await;
    let mut appointments = store.load_appointments().await?;

    let before = appointments.len();
    appointments.retain(|_, appointment| appointment.ticket_name != ticket_name);
    let removed = before - appointments.len();

    if removed > 0 {
        store.save_appointments(&appointments).await?;
        info!(ticket_name, removed, "released appointments for ticket");
    }
    Ok(removed)
}

/// Empties the entire appointment map and returns the prior count.
/// Administrative bulk operation.
pub async fn clear_all_appointments(store: &JsonStore) -> Result<usize> {
    let _guard = store.lock_appointments().await;
    let appointments = store.load_appointments().await?;

    let removed = appointments.len();
    if removed > 0 {
        store.save_appointments(&BTreeMap::new()).await?;
        info!(removed, "cleared all appointments");
    }
    Ok(removed)
}

/// Purges appointments whose slot date falls strictly before Monday 00:00
/// of the current week, regardless of booking status, and returns how many
/// were removed. Idempotent: a second run in the same week removes nothing.
///
/// Keys that fail to parse are kept and logged rather than destroyed.
pub async fn weekly_cleanup(store: &JsonStore, now: NaiveDateTime) -> Result<usize> {
    let week_start = start_of_week(now.date());

    let _guard = store.lock_appointments().await;
    let mut appointments = store.load_appointments().await?;

    let before = appointments.len();
    appointments.retain(|key, _| match parse_slot_key(key) {
        Ok((date, _)) => date >= week_start,
        Err(_) => {
            warn!(%key, "unparseable slot key during weekly cleanup, keeping entry");
            true
        }
    });
    let removed = before - appointments.len();

    if removed > 0 {
        store.save_appointments(&appointments).await?;
        info!(removed, %week_start, "weekly cleanup purged past appointments");
    }
    Ok(removed)
}

/// The Monday of the week containing `date`.
fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        errors::Error,
        test_utils::{dt, sample_appointment, setup_test_store},
    };

    // Monday morning, well clear of every boundary.
    fn monday_morning() -> NaiveDateTime {
        dt(2024, 3, 4, 10, 0, 0)
    }

    #[tokio::test]
    async fn test_full_window_when_unconstrained() -> Result<()> {
        let (store, _dir) = setup_test_store()?;

        let available = list_available_slots(&store, monday_morning(), None).await?;

        assert_eq!(available.len(), 7);
        for (date, times) in &available {
            assert_eq!(times.len(), 8, "day {date} should offer the full grid");
            assert_eq!(times[0], NaiveTime::from_hms_opt(18, 0, 0).unwrap());
            assert_eq!(*times.last().unwrap(), NaiveTime::from_hms_opt(21, 30, 0).unwrap());
        }
        assert_eq!(
            *available.keys().next().unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_booked_slot_disappears_from_listing() -> Result<()> {
        let (store, _dir) = setup_test_store()?;

        let outcome = book_slot(&store, "2024-03-05_18:00", "u1", "User One", "ticket-1").await?;
        assert!(matches!(outcome, BookingOutcome::Booked(_)));

        let available = list_available_slots(&store, monday_morning(), None).await?;
        let tuesday = available
            .get(&NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
            .unwrap();
        assert!(!tuesday.contains(&NaiveTime::from_hms_opt(18, 0, 0).unwrap()));
        assert!(tuesday.contains(&NaiveTime::from_hms_opt(18, 30, 0).unwrap()));
        Ok(())
    }

    #[tokio::test]
    async fn test_double_booking_keeps_first_appointment() -> Result<()> {
        let (store, _dir) = setup_test_store()?;
        let key = "2024-03-05_19:00";

        let first = book_slot(&store, key, "u1", "User One", "ticket-1").await?;
        assert!(matches!(first, BookingOutcome::Booked(_)));

        let second = book_slot(&store, key, "u2", "User Two", "ticket-2").await?;
        assert_eq!(second, BookingOutcome::SlotTaken);

        let appointments = store.load_appointments().await?;
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[key].user_id, "u1");
        assert_eq!(appointments[key].ticket_name, "ticket-1");
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_slot_key_is_a_precondition_failure() -> Result<()> {
        let (store, _dir) = setup_test_store()?;

        let result = book_slot(&store, "tuesday evening", "u1", "User One", "ticket-1").await;
        assert!(matches!(result, Err(Error::InvalidSlotKey { .. })));
        assert!(store.load_appointments().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_embargo_is_all_or_nothing_at_the_boundary() -> Result<()> {
        let (store, _dir) = setup_test_store()?;
        let now = monday_morning();

        // One second short of 24 hours: nothing at all.
        let created_at = now - Duration::hours(24) + Duration::seconds(1);
        let available = list_available_slots(&store, now, Some(created_at)).await?;
        assert!(available.is_empty());

        // One second past 24 hours: full window.
        let created_at = now - Duration::hours(24) - Duration::seconds(1);
        let available = list_available_slots(&store, now, Some(created_at)).await?;
        assert_eq!(available.len(), 7);
        Ok(())
    }

    #[tokio::test]
    async fn test_lead_time_filter_is_strict() -> Result<()> {
        let (store, _dir) = setup_test_store()?;

        // Exactly 30 minutes before 18:00: that slot is excluded.
        let now = dt(2024, 3, 4, 17, 30, 0);
        let available = list_available_slots(&store, now, None).await?;
        let today = available
            .get(&NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
            .unwrap();
        assert!(!today.contains(&NaiveTime::from_hms_opt(18, 0, 0).unwrap()));
        assert!(today.contains(&NaiveTime::from_hms_opt(18, 30, 0).unwrap()));

        // One second earlier and 18:00 is back.
        let now = dt(2024, 3, 4, 17, 29, 59);
        let available = list_available_slots(&store, now, None).await?;
        let today = available
            .get(&NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
            .unwrap();
        assert!(today.contains(&NaiveTime::from_hms_opt(18, 0, 0).unwrap()));
        Ok(())
    }

    #[tokio::test]
    async fn test_days_without_candidates_are_omitted() -> Result<()> {
        let (store, _dir) = setup_test_store()?;

        // Late Monday evening: every slot today is within the lead window.
        let now = dt(2024, 3, 4, 21, 30, 0);
        let available = list_available_slots(&store, now, None).await?;

        assert!(!available.contains_key(&NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()));
        assert_eq!(available.len(), 6);
        Ok(())
    }

    #[tokio::test]
    async fn test_free_appointments_removes_all_and_only_matching() -> Result<()> {
        let (store, _dir) = setup_test_store()?;

        book_slot(&store, "2024-03-05_18:00", "u1", "User One", "ticket-1").await?;
        book_slot(&store, "2024-03-06_19:00", "u1", "User One", "ticket-1").await?;
        book_slot(&store, "2024-03-07_20:00", "u2", "User Two", "ticket-2").await?;

        let removed = free_appointments_for_ticket(&store, "ticket-1").await?;
        assert_eq!(removed, 2);

        let appointments = store.load_appointments().await?;
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments["2024-03-07_20:00"].ticket_name, "ticket-2");

        // Second release is a no-op.
        let removed = free_appointments_for_ticket(&store, "ticket-1").await?;
        assert_eq!(removed, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_all_reports_prior_count() -> Result<()> {
        let (store, _dir) = setup_test_store()?;

        book_slot(&store, "2024-03-05_18:00", "u1", "User One", "ticket-1").await?;
        book_slot(&store, "2024-03-06_19:00", "u2", "User Two", "ticket-2").await?;

        assert_eq!(clear_all_appointments(&store).await?, 2);
        assert!(store.load_appointments().await?.is_empty());
        assert_eq!(clear_all_appointments(&store).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_weekly_cleanup_purges_before_monday_and_is_idempotent() -> Result<()> {
        let (store, _dir) = setup_test_store()?;

        let mut appointments = std::collections::BTreeMap::new();
        // Friday of the previous week.
        appointments.insert("2024-03-01_18:00".to_string(), sample_appointment("old-1"));
        // Sunday of the previous week.
        appointments.insert("2024-03-03_20:30".to_string(), sample_appointment("old-2"));
        // Monday of the current week and later stay.
        appointments.insert("2024-03-04_18:00".to_string(), sample_appointment("cur-1"));
        appointments.insert("2024-03-06_19:00".to_string(), sample_appointment("cur-2"));
        store.save_appointments(&appointments).await?;

        let now = dt(2024, 3, 6, 12, 0, 0); // Wednesday
        assert_eq!(weekly_cleanup(&store, now).await?, 2);

        let remaining = store.load_appointments().await?;
        assert_eq!(remaining.len(), 2);
        assert!(remaining.contains_key("2024-03-04_18:00"));
        assert!(remaining.contains_key("2024-03-06_19:00"));

        // Second pass in the same week is a no-op.
        assert_eq!(weekly_cleanup(&store, now).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_weekly_cleanup_keeps_unparseable_keys() -> Result<()> {
        let (store, _dir) = setup_test_store()?;

        let mut appointments = std::collections::BTreeMap::new();
        appointments.insert("corrupted-key".to_string(), sample_appointment("old"));
        store.save_appointments(&appointments).await?;

        assert_eq!(weekly_cleanup(&store, dt(2024, 3, 6, 12, 0, 0)).await?, 0);
        assert!(store.load_appointments().await?.contains_key("corrupted-key"));
        Ok(())
    }

    #[test]
    fn test_start_of_week_is_monday() {
        for day in 4..=10 {
            let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
            assert_eq!(start_of_week(date), NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        }
        assert_eq!(
            start_of_week(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
        );
    }
}
