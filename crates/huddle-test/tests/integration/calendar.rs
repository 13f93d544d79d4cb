//! Storage-backed tests for the personal week store.

use chrono::NaiveDate;

use huddle_test::component::constants::SLOTS_PER_DAY;
use huddle_test::component::schedule::{self, DayInput};
use huddle_test::component::slots::DaySlots;
use huddle_test::component::week::WeekWindow;

use super::helpers::TestDb;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn week_with_slot(window: WeekWindow, slot: usize) -> Vec<DayInput> {
    window
        .days()
        .iter()
        .map(|&day| {
            let mut slots = [false; SLOTS_PER_DAY];
            slots[slot] = true;
            DayInput {
                date: day,
                slots: DaySlots::new(slots),
            }
        })
        .collect()
}

/// ## Summary
/// A saved week reads back exactly as written, date for date and slot for
/// slot, and a week that was never saved reads back with every slot unset.
#[test_log::test(tokio::test)]
async fn saved_week_reads_back_identically() {
    let Some(db) = TestDb::provision().await else {
        return;
    };
    let user = db.seed_user("Avery").await;

    let reference = date(2025, 12, 16);
    let window = WeekWindow::containing(reference);

    // A distinct pattern per day so date mix-ups cannot cancel out.
    let days: Vec<DayInput> = window
        .days()
        .iter()
        .enumerate()
        .map(|(i, &day)| {
            let mut slots = [false; SLOTS_PER_DAY];
            slots[i] = true;
            slots[SLOTS_PER_DAY - 1 - i] = true;
            DayInput {
                date: day,
                slots: DaySlots::new(slots),
            }
        })
        .collect();

    {
        let mut conn = db.conn().await;
        schedule::save_week(&mut conn, user, reference, &days)
            .await
            .expect("Failed to save week");

        let week = schedule::week_for_user(&mut conn, user, reference)
            .await
            .expect("Failed to read week back");
        assert_eq!(week.window.start(), date(2025, 12, 14));
        assert_eq!(week.days.len(), 7);
        for (read, written) in week.days.iter().zip(&days) {
            assert_eq!(read.date, written.date);
            assert_eq!(read.slots, written.slots);
        }

        // The neighboring week was never written.
        let untouched = schedule::week_for_user(&mut conn, user, date(2025, 12, 23))
            .await
            .expect("Failed to read untouched week");
        for day in untouched.days {
            assert_eq!(day.slots, DaySlots::EMPTY);
        }
    }

    db.cleanup().await;
}

/// ## Summary
/// A second save of the same week fully supersedes the first: slots set by
/// the first write and cleared by the second stay cleared.
#[test_log::test(tokio::test)]
async fn second_save_supersedes_the_first() {
    let Some(db) = TestDb::provision().await else {
        return;
    };
    let user = db.seed_user("Avery").await;

    let reference = date(2025, 12, 16);
    let window = WeekWindow::containing(reference);

    let first: Vec<DayInput> = window
        .days()
        .iter()
        .map(|&day| DayInput {
            date: day,
            slots: DaySlots::new([true; SLOTS_PER_DAY]),
        })
        .collect();
    let second = week_with_slot(window, 5);

    {
        let mut conn = db.conn().await;
        schedule::save_week(&mut conn, user, reference, &first)
            .await
            .expect("Failed to save first week");
        schedule::save_week(&mut conn, user, reference, &second)
            .await
            .expect("Failed to save second week");

        let week = schedule::week_for_user(&mut conn, user, reference)
            .await
            .expect("Failed to read week back");
        for (read, written) in week.days.iter().zip(&second) {
            assert_eq!(read.slots, written.slots, "{} kept stale slots", read.date);
        }
    }

    db.cleanup().await;
}
