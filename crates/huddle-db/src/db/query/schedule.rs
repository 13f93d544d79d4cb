//! Query builder and execution functions for schedule rows.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::schedule;
use crate::model::schedule::{NewSchedule, Schedule};

/// ## Summary
/// Returns a query to select one user's schedule rows in a date range
/// (inclusive on both ends).
#[must_use]
pub fn for_user_in_range(
    user_id: uuid::Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> schedule::BoxedQuery<'static, diesel::pg::Pg> {
    schedule::table
        .filter(schedule::user_id.eq(user_id))
        .filter(schedule::date.ge(start))
        .filter(schedule::date.le(end))
        .into_boxed()
}

/// ## Summary
/// Loads one user's schedule rows for a date range. Dates without a row are
/// simply absent from the result; "missing" is not an error.
///
/// ## Errors
/// Returns a database error if the query fails.
#[tracing::instrument(skip(conn))]
pub async fn load_range(
    conn: &mut DbConnection<'_>,
    user_id: uuid::Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> QueryResult<Vec<Schedule>> {
    for_user_in_range(user_id, start, end)
        .select(Schedule::as_select())
        .order(schedule::date.asc())
        .load(conn)
        .await
}

/// ## Summary
/// Upserts a batch of schedule rows keyed on (`user_id`, `date`): update if
/// the row exists, insert otherwise. One statement, so a whole week lands or
/// nothing does. Callers wrap this in a transaction when combining it with
/// other writes.
///
/// ## Errors
/// Returns a database error if the upsert fails.
#[tracing::instrument(skip(conn, rows), fields(row_count = rows.len()))]
pub async fn upsert_days(conn: &mut DbConnection<'_>, rows: &[NewSchedule]) -> QueryResult<usize> {
    diesel::insert_into(schedule::table)
        .values(rows)
        .on_conflict((schedule::user_id, schedule::date))
        .do_update()
        .set(schedule::block_data.eq(diesel::upsert::excluded(schedule::block_data)))
        .execute(conn)
        .await
}
