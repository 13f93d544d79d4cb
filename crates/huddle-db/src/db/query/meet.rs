//! Query builder and execution functions for meets.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::{meet, membership};
use crate::model::meet::{Meet, MeetChanges, NewMeet};

/// ## Summary
/// Returns a query to select all meets.
#[must_use]
pub fn all() -> meet::BoxedQuery<'static, diesel::pg::Pg> {
    meet::table.into_boxed()
}

/// ## Summary
/// Returns a query to find a meet by ID.
#[must_use]
pub fn by_id(id: uuid::Uuid) -> meet::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(meet::id.eq(id))
}

/// ## Summary
/// Loads a meet by ID, or `None` if it does not exist.
///
/// ## Errors
/// Returns a database error if the lookup fails.
pub async fn find(conn: &mut DbConnection<'_>, id: uuid::Uuid) -> QueryResult<Option<Meet>> {
    by_id(id)
        .select(Meet::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Loads every meet a user belongs to, newest first. Meet IDs are UUIDv7, so
/// descending ID order is creation order.
///
/// ## Errors
/// Returns a database error if the query fails.
#[tracing::instrument(skip(conn))]
pub async fn load_for_member(
    conn: &mut DbConnection<'_>,
    user_id: uuid::Uuid,
) -> QueryResult<Vec<Meet>> {
    meet::table
        .inner_join(membership::table)
        .filter(membership::user_id.eq(user_id))
        .order(meet::id.desc())
        .select(Meet::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Inserts a new meet row and returns it.
///
/// ## Errors
/// Returns a database error if the insert fails.
#[tracing::instrument(skip(conn, new_meet), fields(meet_id = %new_meet.id))]
pub async fn create(conn: &mut DbConnection<'_>, new_meet: &NewMeet) -> QueryResult<Meet> {
    diesel::insert_into(meet::table)
        .values(new_meet)
        .returning(Meet::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Applies a partial update to a meet and returns the updated row.
///
/// ## Errors
/// Returns a database error if the update fails.
#[tracing::instrument(skip(conn, changes))]
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    changes: &MeetChanges,
) -> QueryResult<Meet> {
    diesel::update(meet::table.filter(meet::id.eq(id)))
        .set(changes)
        .returning(Meet::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes a meet row. Membership rows must be deleted first, in the same
/// transaction.
///
/// ## Errors
/// Returns a database error if the delete fails.
#[tracing::instrument(skip(conn))]
pub async fn delete(conn: &mut DbConnection<'_>, id: uuid::Uuid) -> QueryResult<usize> {
    diesel::delete(meet::table.filter(meet::id.eq(id)))
        .execute(conn)
        .await
}
