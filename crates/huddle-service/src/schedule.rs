//! Personal schedule store: week-scoped read and atomic week write.

use std::collections::HashMap;

use chrono::NaiveDate;
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;

use huddle_core::constants::DAYS_PER_WEEK;
use huddle_core::slots::{DaySlots, PackedDay};
use huddle_core::week::WeekWindow;
use huddle_db::db::connection::DbConnection;
use huddle_db::db::query;
use huddle_db::model::schedule::NewSchedule;

use crate::error::{ServiceError, ServiceResult};

/// One day of a week view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub slots: DaySlots,
}

/// A full week of one user's availability, Sunday first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleWeek {
    pub window: WeekWindow,
    pub days: Vec<DayAvailability>,
}

/// One day of a week write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayInput {
    pub date: NaiveDate,
    pub slots: DaySlots,
}

/// ## Summary
/// Reads one user's availability for the week containing `reference`. Dates
/// without a stored row come back with every slot unset; missing means
/// "unset", never an error.
///
/// ## Errors
/// Returns a database error if the range read fails, or an invariant
/// violation if a stored blob is not 4 bytes wide.
#[tracing::instrument(skip(conn))]
pub async fn week_for_user(
    conn: &mut DbConnection<'_>,
    user_id: uuid::Uuid,
    reference: NaiveDate,
) -> ServiceResult<ScheduleWeek> {
    let window = WeekWindow::containing(reference);

    let rows = query::schedule::load_range(conn, user_id, window.start(), window.end()).await?;

    let mut by_date: HashMap<NaiveDate, DaySlots> = HashMap::with_capacity(rows.len());
    for row in rows {
        let packed = PackedDay::from_stored(&row.block_data)?;
        by_date.insert(row.date, packed.unpack());
    }

    let days = window
        .days()
        .iter()
        .map(|&date| DayAvailability {
            date,
            slots: by_date.get(&date).copied().unwrap_or_default(),
        })
        .collect();

    Ok(ScheduleWeek { window, days })
}

/// ## Summary
/// Replaces one user's availability for the week containing `reference`. The
/// payload must cover exactly the 7 dates of the window, matched by date
/// equality rather than position. All validation happens before any write;
/// the 7 upserts then run as one transaction, so the whole week lands or
/// nothing does.
///
/// ## Errors
/// Returns `ValidationError` if the payload does not cover the window's 7
/// dates exactly, or a database error if the transaction cannot commit.
#[tracing::instrument(skip(conn, days), fields(day_count = days.len()))]
pub async fn save_week(
    conn: &mut DbConnection<'_>,
    user_id: uuid::Uuid,
    reference: NaiveDate,
    days: &[DayInput],
) -> ServiceResult<WeekWindow> {
    let window = WeekWindow::containing(reference);
    let rows = validate_week_payload(user_id, window, days)?;

    conn.transaction::<_, ServiceError, _>(move |tx| {
        async move {
            query::schedule::upsert_days(tx, &rows).await?;
            Ok(())
        }
        .scope_boxed()
    })
    .await?;

    tracing::debug!(week_start = %window.start(), "Week saved");

    Ok(window)
}

/// Checks a week payload against its window and packs it into rows, in
/// window order. Pure, so the whole validation surface is testable without a
/// database.
fn validate_week_payload(
    user_id: uuid::Uuid,
    window: WeekWindow,
    days: &[DayInput],
) -> ServiceResult<Vec<NewSchedule>> {
    if days.len() != DAYS_PER_WEEK {
        return Err(ServiceError::ValidationError(format!(
            "a week write must supply exactly {DAYS_PER_WEEK} days, got {}",
            days.len()
        )));
    }

    let mut by_date: HashMap<NaiveDate, DaySlots> = HashMap::with_capacity(days.len());
    for day in days {
        if by_date.insert(day.date, day.slots).is_some() {
            return Err(ServiceError::ValidationError(format!(
                "duplicate date {} in week payload",
                day.date
            )));
        }
        if !window.contains(day.date) {
            return Err(ServiceError::ValidationError(format!(
                "date {} is outside the week starting {}",
                day.date,
                window.start()
            )));
        }
    }

    // 7 in-window entries with no duplicates must be the 7 window dates.
    window
        .days()
        .iter()
        .map(|&date| {
            let slots = by_date.remove(&date).ok_or_else(|| {
                ServiceError::ValidationError(format!("week payload is missing date {date}"))
            })?;
            Ok(NewSchedule {
                user_id,
                date,
                block_data: slots.pack().to_vec(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::constants::SLOTS_PER_DAY;

    fn window() -> WeekWindow {
        // Week of Sunday 2025-12-14.
        WeekWindow::containing(NaiveDate::from_ymd_opt(2025, 12, 17).unwrap())
    }

    fn user() -> uuid::Uuid {
        uuid::Uuid::nil()
    }

    fn full_week() -> Vec<DayInput> {
        window()
            .days()
            .iter()
            .map(|&date| DayInput {
                date,
                slots: DaySlots::EMPTY,
            })
            .collect()
    }

    #[test_log::test]
    fn test_valid_payload_packs_in_window_order() {
        let mut days = full_week();
        // Payload order must not matter.
        days.reverse();

        let rows = validate_week_payload(user(), window(), &days).unwrap();
        assert_eq!(rows.len(), 7);
        let expected = window().days();
        for (row, date) in rows.iter().zip(expected) {
            assert_eq!(row.date, date);
            assert_eq!(row.block_data, vec![0, 0, 0, 0]);
        }
    }

    #[test_log::test]
    fn test_slots_are_packed_per_day() {
        let mut days = full_week();
        let mut slots = [false; SLOTS_PER_DAY];
        slots[0] = true;
        days[3].slots = DaySlots::new(slots);

        let rows = validate_week_payload(user(), window(), &days).unwrap();
        assert_eq!(rows[3].block_data, vec![0b1000_0000, 0, 0, 0]);
    }

    #[test_log::test]
    fn test_wrong_day_count_is_rejected() {
        let mut days = full_week();
        days.pop();
        assert!(matches!(
            validate_week_payload(user(), window(), &days),
            Err(ServiceError::ValidationError(_))
        ));

        let mut days = full_week();
        let first = days[0];
        days.push(first);
        assert!(matches!(
            validate_week_payload(user(), window(), &days),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test_log::test]
    fn test_duplicate_date_is_rejected() {
        let mut days = full_week();
        days[6].date = days[0].date;
        assert!(matches!(
            validate_week_payload(user(), window(), &days),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test_log::test]
    fn test_out_of_window_date_is_rejected() {
        let mut days = full_week();
        days[6].date = window().start() + chrono::Duration::days(7);
        assert!(matches!(
            validate_week_payload(user(), window(), &days),
            Err(ServiceError::ValidationError(_))
        ));
    }
}
