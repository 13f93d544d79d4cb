//! Query builder and execution functions for meet memberships.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::membership;
use crate::model::membership::{Membership, NewMembership};

/// ## Summary
/// Returns a query to select all memberships.
#[must_use]
pub fn all() -> membership::BoxedQuery<'static, diesel::pg::Pg> {
    membership::table.into_boxed()
}

/// ## Summary
/// Returns a query to find the memberships of a meet.
#[must_use]
pub fn for_meet(meet_id: uuid::Uuid) -> membership::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(membership::meet_id.eq(meet_id))
}

/// ## Summary
/// Returns a query to find one (meet, user) membership.
#[must_use]
pub fn by_meet_and_user(
    meet_id: uuid::Uuid,
    user_id: uuid::Uuid,
) -> membership::BoxedQuery<'static, diesel::pg::Pg> {
    for_meet(meet_id).filter(membership::user_id.eq(user_id))
}

/// ## Summary
/// Loads one membership, or `None` if the pair does not exist.
///
/// ## Errors
/// Returns a database error if the lookup fails.
pub async fn find(
    conn: &mut DbConnection<'_>,
    meet_id: uuid::Uuid,
    user_id: uuid::Uuid,
) -> QueryResult<Option<Membership>> {
    by_meet_and_user(meet_id, user_id)
        .select(Membership::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Loads the member ids of a meet, ascending, for deterministic output.
///
/// ## Errors
/// Returns a database error if the query fails.
#[tracing::instrument(skip(conn))]
pub async fn member_ids(
    conn: &mut DbConnection<'_>,
    meet_id: uuid::Uuid,
) -> QueryResult<Vec<uuid::Uuid>> {
    for_meet(meet_id)
        .select(membership::user_id)
        .order(membership::user_id.asc())
        .load(conn)
        .await
}

/// ## Summary
/// Inserts a membership row. The (`meet_id`, `user_id`) primary key is the
/// storage-level guarantee that concurrent duplicate joins resolve to exactly
/// one success; the losers surface a unique violation.
///
/// ## Errors
/// Returns a database error if the insert fails, including the unique
/// violation on duplicate joins.
#[tracing::instrument(skip(conn, new_membership), fields(meet_id = %new_membership.meet_id))]
pub async fn insert(
    conn: &mut DbConnection<'_>,
    new_membership: &NewMembership,
) -> QueryResult<Membership> {
    diesel::insert_into(membership::table)
        .values(new_membership)
        .returning(Membership::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes exactly the one membership row for (meet, user).
///
/// ## Errors
/// Returns a database error if the delete fails.
#[tracing::instrument(skip(conn))]
pub async fn delete(
    conn: &mut DbConnection<'_>,
    meet_id: uuid::Uuid,
    user_id: uuid::Uuid,
) -> QueryResult<usize> {
    diesel::delete(
        membership::table
            .filter(membership::meet_id.eq(meet_id))
            .filter(membership::user_id.eq(user_id)),
    )
    .execute(conn)
    .await
}

/// ## Summary
/// Deletes all membership rows of a meet. Runs inside the same transaction
/// as the meet row's own deletion.
///
/// ## Errors
/// Returns a database error if the delete fails.
#[tracing::instrument(skip(conn))]
pub async fn delete_for_meet(conn: &mut DbConnection<'_>, meet_id: uuid::Uuid) -> QueryResult<usize> {
    diesel::delete(membership::table.filter(membership::meet_id.eq(meet_id)))
        .execute(conn)
        .await
}

/// ## Summary
/// Counts memberships per meet for the given meet ids.
///
/// ## Errors
/// Returns a database error if the query fails.
#[tracing::instrument(skip(conn, meet_ids), fields(meet_count = meet_ids.len()))]
pub async fn count_by_meet(
    conn: &mut DbConnection<'_>,
    meet_ids: &[uuid::Uuid],
) -> QueryResult<Vec<(uuid::Uuid, i64)>> {
    membership::table
        .filter(membership::meet_id.eq_any(meet_ids))
        .group_by(membership::meet_id)
        .select((membership::meet_id, diesel::dsl::count_star()))
        .load(conn)
        .await
}
