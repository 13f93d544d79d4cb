//! Cross-member aggregation: one shared week window, every member's decoded
//! availability.

use std::collections::HashMap;

use chrono::NaiveDate;

use huddle_core::week::WeekWindow;
use huddle_db::db::connection::DbConnection;
use huddle_db::db::query;
use huddle_db::model::meet::Meet;

use crate::error::ServiceResult;
use crate::roster;
use crate::schedule::{self, DayAvailability};

/// One member's week inside a meet view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberWeek {
    pub user_id: uuid::Uuid,
    pub name: String,
    pub days: Vec<DayAvailability>,
}

/// A meet's combined weekly availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetWeek {
    pub meet: Meet,
    pub participates: bool,
    pub window: WeekWindow,
    pub members: Vec<MemberWeek>,
}

/// ## Summary
/// Builds the per-member weekly view of a meet. All members share the exact
/// same window, computed once from `reference` (or from the meet's own start
/// date when the caller supplies none); members with no stored availability
/// appear with every slot unset. Members come back in ascending user-id
/// order, so unchanged data always produces identical output.
///
/// Gated behind the same membership check as the meet detail view.
///
/// ## Errors
/// Returns `NotFound` if the meet does not exist, `AuthorizationError` if the
/// requester is not a member, or a database error.
#[tracing::instrument(skip(conn))]
pub async fn meet_week(
    conn: &mut DbConnection<'_>,
    meet_id: uuid::Uuid,
    requester: uuid::Uuid,
    reference: Option<NaiveDate>,
) -> ServiceResult<MeetWeek> {
    let detail = roster::meet_detail(conn, meet_id, requester).await?;
    build_meet_week(conn, detail, reference).await
}

/// Same view, but starting from an already-authorized detail lookup. Lets
/// the detail endpoint serve metadata and the aggregated week with a single
/// authorization pass.
pub(crate) async fn build_meet_week(
    conn: &mut DbConnection<'_>,
    detail: roster::MeetDetail,
    reference: Option<NaiveDate>,
) -> ServiceResult<MeetWeek> {
    let reference = reference.unwrap_or(detail.meet.start_date);
    let window = WeekWindow::containing(reference);

    let users = query::app_user::load_by_ids(conn, &detail.member_ids).await?;
    let names: HashMap<uuid::Uuid, String> =
        users.into_iter().map(|u| (u.id, u.name)).collect();

    let mut members = Vec::with_capacity(detail.member_ids.len());
    for user_id in detail.member_ids {
        let week = schedule::week_for_user(conn, user_id, reference).await?;
        // The identity collaborator owns user rows; one can be missing if a
        // member was provisioned out of band.
        let name = names
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| format!("user-{user_id}"));
        members.push(MemberWeek {
            user_id,
            name,
            days: week.days,
        });
    }

    Ok(MeetWeek {
        meet: detail.meet,
        participates: detail.participates,
        window,
        members,
    })
}
