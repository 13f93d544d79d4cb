//! Shared authorization checks for meet operations.
//!
//! Read views and the week aggregation gate on the same membership check, and
//! mutating operations gate on ownership. Existence is always checked before
//! authorization, so an absent meet surfaces as not-found rather than
//! revealing whether the requester would have had rights to it.

use huddle_db::db::connection::DbConnection;
use huddle_db::db::query;
use huddle_db::model::meet::Meet;

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Loads a meet and requires `user_id` to be one of its members.
///
/// ## Errors
/// Returns `NotFound` if the meet does not exist, `AuthorizationError` if the
/// user is not a member, or a database error.
#[tracing::instrument(skip(conn))]
pub async fn require_member(
    conn: &mut DbConnection<'_>,
    meet_id: uuid::Uuid,
    user_id: uuid::Uuid,
) -> ServiceResult<Meet> {
    let meet = query::meet::find(conn, meet_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("meet {meet_id}")))?;

    if query::membership::find(conn, meet_id, user_id)
        .await?
        .is_none()
    {
        return Err(ServiceError::AuthorizationError(
            "not a member of this meet".to_owned(),
        ));
    }

    Ok(meet)
}

/// ## Summary
/// Loads a meet and requires `user_id` to be its owner.
///
/// ## Errors
/// Returns `NotFound` if the meet does not exist, `AuthorizationError` if the
/// user is not the owner, or a database error.
#[tracing::instrument(skip(conn))]
pub async fn require_owner(
    conn: &mut DbConnection<'_>,
    meet_id: uuid::Uuid,
    user_id: uuid::Uuid,
) -> ServiceResult<Meet> {
    let meet = query::meet::find(conn, meet_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("meet {meet_id}")))?;

    if meet.owner_id != user_id {
        return Err(ServiceError::AuthorizationError(
            "only the meet owner may do this".to_owned(),
        ));
    }

    Ok(meet)
}
