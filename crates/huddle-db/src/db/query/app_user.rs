//! Read-only lookups against the identity collaborator's user table.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::app_user;
use crate::model::app_user::{AppUser, NewAppUser};

/// ## Summary
/// Returns a query to find a user by ID.
#[must_use]
pub fn by_id(id: uuid::Uuid) -> app_user::BoxedQuery<'static, diesel::pg::Pg> {
    app_user::table.filter(app_user::id.eq(id)).into_boxed()
}

/// ## Summary
/// Loads a user by ID, or `None` if it does not exist.
///
/// ## Errors
/// Returns a database error if the lookup fails.
pub async fn find(conn: &mut DbConnection<'_>, id: uuid::Uuid) -> QueryResult<Option<AppUser>> {
    by_id(id)
        .select(AppUser::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts a user row and returns it.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn insert(conn: &mut DbConnection<'_>, new_user: &NewAppUser) -> QueryResult<AppUser> {
    diesel::insert_into(app_user::table)
        .values(new_user)
        .returning(AppUser::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Loads the users with the given ids. Ids without a row are absent from the
/// result.
///
/// ## Errors
/// Returns a database error if the query fails.
#[tracing::instrument(skip(conn, ids), fields(id_count = ids.len()))]
pub async fn load_by_ids(
    conn: &mut DbConnection<'_>,
    ids: &[uuid::Uuid],
) -> QueryResult<Vec<AppUser>> {
    app_user::table
        .filter(app_user::id.eq_any(ids))
        .select(AppUser::as_select())
        .load(conn)
        .await
}
