//! Storage-backed tests for roster operations and the aggregated week view.

use chrono::NaiveDate;
use salvo::http::StatusCode;

use huddle_test::component::constants::SLOTS_PER_DAY;
use huddle_service::error::ServiceError;
use huddle_test::component::db::query;
use huddle_test::component::roster;
use huddle_test::component::schedule::{self, DayInput};
use huddle_test::component::slots::DaySlots;
use huddle_test::component::week::WeekWindow;

use super::helpers::{TestDb, get_json, test_service};

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
/// Creating a meet makes it listable by its owner with a membership count of
/// exactly one (the owner's own row from the creation transaction).
#[test_log::test(tokio::test)]
async fn created_meet_lists_for_owner_with_one_member() {
    let Some(db) = TestDb::provision().await else {
        return;
    };
    let owner = db.seed_user("Avery").await;

    {
        let mut conn = db.conn().await;
        let meet = roster::create_meet(&mut conn, owner, "Game Night", Some(date(2025, 12, 14)))
            .await
            .expect("Failed to create meet");

        let meets = roster::meets_for_user(&mut conn, owner)
            .await
            .expect("Failed to list meets");
        assert_eq!(meets.len(), 1);
        assert_eq!(meets[0].meet.id, meet.id);
        assert_eq!(meets[0].meet.owner_id, owner);
        assert_eq!(meets[0].member_count, 1);
    }

    db.cleanup().await;
}

/// ## Summary
/// A duplicate join surfaces as a conflict and leaves exactly one membership
/// row for that user; the first join stays intact.
#[test_log::test(tokio::test)]
async fn duplicate_join_conflicts_and_keeps_one_membership_row() {
    let Some(db) = TestDb::provision().await else {
        return;
    };
    let owner = db.seed_user("Avery").await;
    let member = db.seed_user("Blake").await;

    {
        let mut conn = db.conn().await;
        let meet = roster::create_meet(&mut conn, owner, "Game Night", None)
            .await
            .expect("Failed to create meet");

        roster::join(&mut conn, meet.id, member)
            .await
            .expect("First join should succeed");

        let second = roster::join(&mut conn, meet.id, member).await;
        assert!(matches!(second, Err(ServiceError::Conflict(_))));

        let ids = query::membership::member_ids(&mut conn, meet.id)
            .await
            .expect("Failed to load member ids");
        assert_eq!(ids.len(), 2);
        assert_eq!(ids.iter().filter(|id| **id == member).count(), 1);
    }

    db.cleanup().await;
}

/// ## Summary
/// Deleting a meet removes its membership rows in the same transaction;
/// neither the meet nor any membership is queryable afterwards.
#[test_log::test(tokio::test)]
async fn deleted_meet_leaves_no_memberships_behind() {
    let Some(db) = TestDb::provision().await else {
        return;
    };
    let owner = db.seed_user("Avery").await;
    let member = db.seed_user("Blake").await;

    {
        let mut conn = db.conn().await;
        let meet = roster::create_meet(&mut conn, owner, "Game Night", None)
            .await
            .expect("Failed to create meet");
        roster::join(&mut conn, meet.id, member)
            .await
            .expect("Failed to join");

        roster::delete_meet(&mut conn, meet.id, owner)
            .await
            .expect("Failed to delete meet");

        assert!(
            query::meet::find(&mut conn, meet.id)
                .await
                .expect("Failed to look up meet")
                .is_none()
        );
        assert!(
            query::membership::member_ids(&mut conn, meet.id)
                .await
                .expect("Failed to load member ids")
                .is_empty()
        );
    }

    db.cleanup().await;
}

/// ## Summary
/// End-to-end aggregation over HTTP: two members save different weeks, and
/// the meet detail view returns both under one shared window, in ascending
/// user-id order, with each member's own slots. A non-member gets 403.
#[test_log::test(tokio::test)]
async fn meet_week_aggregates_two_members_over_http() {
    let Some(db) = TestDb::provision().await else {
        return;
    };
    // Seeded in order, so owner < member in id order.
    let owner = db.seed_user("Avery").await;
    let member = db.seed_user("Blake").await;
    let outsider = db.seed_user("Casey").await;

    let reference = date(2025, 12, 16);
    let window = WeekWindow::containing(reference);

    let meet_id = {
        let mut conn = db.conn().await;
        let meet = roster::create_meet(&mut conn, owner, "Game Night", Some(date(2025, 12, 14)))
            .await
            .expect("Failed to create meet");
        roster::join(&mut conn, meet.id, member)
            .await
            .expect("Failed to join");

        schedule::save_week(&mut conn, owner, reference, &week_with_slot(window, 0))
            .await
            .expect("Failed to save owner week");
        schedule::save_week(&mut conn, member, reference, &week_with_slot(window, 1))
            .await
            .expect("Failed to save member week");

        meet.id
    };

    let service = test_service(&db).await;
    let path = format!("/api/meets/{meet_id}?day=2025-12-16");

    let (status, body) = get_json(&service, &path, owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["groupName"], "Game Night");
    assert_eq!(body["weekStartDate"], "2025-12-14");
    assert_eq!(body["participates"], true);

    let members = body["members"].as_array().expect("members array");
    assert_eq!(members.len(), 2);
    assert_eq!(members[0]["userId"], owner.to_string());
    assert_eq!(members[0]["name"], "Avery");
    assert_eq!(members[1]["userId"], member.to_string());
    assert_eq!(members[1]["name"], "Blake");

    for (entry, slot) in members.iter().zip([0usize, 1]) {
        let days = entry["days"].as_array().expect("days array");
        assert_eq!(days.len(), 7);
        assert_eq!(days[0]["date"], "2025-12-14");
        for day in days {
            let slots = day["slots"].as_array().expect("slots array");
            assert_eq!(slots.len(), SLOTS_PER_DAY);
            assert_eq!(slots[slot], true, "slot {slot} should be set");
        }
    }

    let (status, _body) = get_json(&service, &path, outsider).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    db.cleanup().await;
}
