//! Group roster: meet creation, listing, joining, updates, deletion, and
//! exit-or-kick.

use std::collections::HashMap;

use chrono::NaiveDate;
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;

use huddle_db::db::connection::DbConnection;
use huddle_db::db::query;
use huddle_db::error::{is_foreign_key_violation, is_unique_violation};
use huddle_db::model::meet::{Meet, MeetChanges, NewMeet};
use huddle_db::model::membership::NewMembership;

use crate::access;
use crate::error::{ServiceError, ServiceResult};

/// A meet annotated with its current membership count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetSummary {
    pub meet: Meet,
    pub member_count: i64,
}

/// Meet metadata plus the full member-id set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetDetail {
    pub meet: Meet,
    pub participates: bool,
    pub member_ids: Vec<uuid::Uuid>,
}

/// Partial update to a meet. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetPatch {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
}

/// ## Summary
/// Creates a meet and the owner's membership in one transaction; an
/// ownerless meet or a single-sided membership is never observable. The meet
/// id is a UUIDv7, so ids are unique and creation-ordered without any retry
/// loop.
///
/// ## Errors
/// Returns `ValidationError` if the name is empty after trimming, or a
/// database error if the transaction cannot commit.
#[tracing::instrument(skip(conn, name))]
pub async fn create_meet(
    conn: &mut DbConnection<'_>,
    owner_id: uuid::Uuid,
    name: &str,
    start_date: Option<NaiveDate>,
) -> ServiceResult<Meet> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::ValidationError(
            "meet name must not be empty".to_owned(),
        ));
    }

    let new_meet = NewMeet {
        id: uuid::Uuid::now_v7(),
        name: name.to_owned(),
        start_date: start_date.unwrap_or_else(|| chrono::Local::now().date_naive()),
        owner_id,
    };

    let meet = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let meet = query::meet::create(tx, &new_meet).await?;
                query::membership::insert(
                    tx,
                    &NewMembership {
                        meet_id: meet.id,
                        user_id: owner_id,
                    },
                )
                .await?;
                Ok(meet)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(meet_id = %meet.id, "Meet created");

    Ok(meet)
}

/// ## Summary
/// Lists every meet the user belongs to, newest first, each with its current
/// membership count.
///
/// ## Errors
/// Returns a database error if a query fails.
#[tracing::instrument(skip(conn))]
pub async fn meets_for_user(
    conn: &mut DbConnection<'_>,
    user_id: uuid::Uuid,
) -> ServiceResult<Vec<MeetSummary>> {
    let meets = query::meet::load_for_member(conn, user_id).await?;
    if meets.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<uuid::Uuid> = meets.iter().map(|m| m.id).collect();
    let counts: HashMap<uuid::Uuid, i64> = query::membership::count_by_meet(conn, &ids)
        .await?
        .into_iter()
        .collect();

    Ok(meets
        .into_iter()
        .map(|meet| {
            let member_count = counts.get(&meet.id).copied().unwrap_or(0);
            MeetSummary { meet, member_count }
        })
        .collect())
}

/// ## Summary
/// Adds a user to a meet. Duplicate joins are rejected, not silently
/// accepted. Both failure modes come from the insert itself, so there is no
/// window between an existence check and the write: the storage constraints
/// decide concurrent races.
///
/// ## Errors
/// Returns `NotFound` if the meet does not exist, `Conflict` if the
/// membership already exists, or a database error.
#[tracing::instrument(skip(conn))]
pub async fn join(
    conn: &mut DbConnection<'_>,
    meet_id: uuid::Uuid,
    user_id: uuid::Uuid,
) -> ServiceResult<()> {
    let new_membership = NewMembership { meet_id, user_id };
    match query::membership::insert(conn, &new_membership).await {
        Ok(_) => Ok(()),
        Err(err) => Err(map_join_insert_error(meet_id, err)),
    }
}

/// Maps a membership-insert failure to the caller's view: the primary key
/// means "already joined", the meet foreign key means "no such meet". The
/// actor's own user row is loaded during authentication, so its foreign key
/// cannot be the one that fired.
fn map_join_insert_error(meet_id: uuid::Uuid, err: diesel::result::Error) -> ServiceError {
    if is_unique_violation(&err) {
        ServiceError::Conflict("already a member of this meet".to_owned())
    } else if is_foreign_key_violation(&err) {
        ServiceError::NotFound(format!("meet {meet_id}"))
    } else {
        err.into()
    }
}

/// ## Summary
/// Returns meet metadata and the full member-id set. Gated behind the same
/// membership check as the week aggregation.
///
/// ## Errors
/// Returns `NotFound` if the meet does not exist, `AuthorizationError` if the
/// requester is not a member, or a database error.
#[tracing::instrument(skip(conn))]
pub async fn meet_detail(
    conn: &mut DbConnection<'_>,
    meet_id: uuid::Uuid,
    requester: uuid::Uuid,
) -> ServiceResult<MeetDetail> {
    let meet = access::require_member(conn, meet_id, requester).await?;
    let member_ids = query::membership::member_ids(conn, meet_id).await?;
    let participates = member_ids.contains(&requester);

    Ok(MeetDetail {
        meet,
        participates,
        member_ids,
    })
}

/// ## Summary
/// Applies a partial update to a meet. Owner only; only supplied fields
/// change.
///
/// ## Errors
/// Returns `NotFound` if the meet does not exist, `AuthorizationError` if the
/// requester is not the owner, `ValidationError` if a supplied name is empty
/// after trimming, or a database error.
#[tracing::instrument(skip(conn, patch))]
pub async fn update_meet(
    conn: &mut DbConnection<'_>,
    meet_id: uuid::Uuid,
    requester: uuid::Uuid,
    patch: MeetPatch,
) -> ServiceResult<Meet> {
    let meet = access::require_owner(conn, meet_id, requester).await?;

    let changes = validate_patch(patch)?;
    if changes == MeetChanges::default() {
        return Ok(meet);
    }

    let updated = query::meet::update(conn, meet_id, &changes).await?;

    tracing::info!(meet_id = %meet_id, "Meet updated");

    Ok(updated)
}

/// ## Summary
/// Deletes a meet. Owner only. Memberships and the meet row go in one
/// transaction; there is no transient state where one exists without the
/// other.
///
/// ## Errors
/// Returns `NotFound` if the meet does not exist, `AuthorizationError` if the
/// requester is not the owner, or a database error.
#[tracing::instrument(skip(conn))]
pub async fn delete_meet(
    conn: &mut DbConnection<'_>,
    meet_id: uuid::Uuid,
    requester: uuid::Uuid,
) -> ServiceResult<()> {
    access::require_owner(conn, meet_id, requester).await?;

    conn.transaction::<_, ServiceError, _>(move |tx| {
        async move {
            query::membership::delete_for_meet(tx, meet_id).await?;
            query::meet::delete(tx, meet_id).await?;
            Ok(())
        }
        .scope_boxed()
    })
    .await?;

    tracing::info!(meet_id = %meet_id, "Meet deleted");

    Ok(())
}

/// ## Summary
/// Removes `target` from a meet: self-exit when the actor is the target,
/// kick when the actor is the owner. The owner can never be removed by this
/// operation; ownership transfer or meet deletion is the only way out.
///
/// ## Errors
/// Returns `NotFound` if the meet or the target's membership does not exist,
/// `ValidationError` if the target is the owner, `AuthorizationError` if the
/// actor is neither the target nor the owner, or a database error.
#[tracing::instrument(skip(conn))]
pub async fn exit_or_kick(
    conn: &mut DbConnection<'_>,
    meet_id: uuid::Uuid,
    actor: uuid::Uuid,
    target: uuid::Uuid,
) -> ServiceResult<()> {
    let meet = query::meet::find(conn, meet_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("meet {meet_id}")))?;

    authorize_exit_or_kick(meet.owner_id, actor, target)?;

    if query::membership::find(conn, meet_id, target)
        .await?
        .is_none()
    {
        return Err(ServiceError::NotFound(
            "target user is not a member of this meet".to_owned(),
        ));
    }

    query::membership::delete(conn, meet_id, target).await?;

    tracing::info!(meet_id = %meet_id, kicked = actor != target, "Membership removed");

    Ok(())
}

/// The exit-or-kick decision. Targeting the owner is invalid no matter who
/// asks, so that check precedes the actor authorization.
fn authorize_exit_or_kick(
    owner_id: uuid::Uuid,
    actor: uuid::Uuid,
    target: uuid::Uuid,
) -> ServiceResult<()> {
    if target == owner_id {
        return Err(ServiceError::ValidationError(
            "the meet owner cannot be exited or kicked".to_owned(),
        ));
    }

    if actor != target && actor != owner_id {
        return Err(ServiceError::AuthorizationError(
            "only the member themselves or the meet owner may remove a member".to_owned(),
        ));
    }

    Ok(())
}

fn validate_patch(patch: MeetPatch) -> ServiceResult<MeetChanges> {
    let name = match patch.name {
        Some(name) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "meet name must not be empty".to_owned(),
                ));
            }
            Some(name.to_owned())
        }
        None => None,
    };

    Ok(MeetChanges {
        name,
        start_date: patch.start_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (uuid::Uuid, uuid::Uuid, uuid::Uuid) {
        (
            uuid::Uuid::now_v7(),
            uuid::Uuid::now_v7(),
            uuid::Uuid::now_v7(),
        )
    }

    #[test_log::test]
    fn test_self_exit_is_allowed() {
        let (owner, member, _) = ids();
        assert!(authorize_exit_or_kick(owner, member, member).is_ok());
    }

    #[test_log::test]
    fn test_owner_may_kick_another_member() {
        let (owner, member, _) = ids();
        assert!(authorize_exit_or_kick(owner, owner, member).is_ok());
    }

    #[test_log::test]
    fn test_non_owner_cannot_kick_someone_else() {
        let (owner, member_a, member_b) = ids();
        assert!(matches!(
            authorize_exit_or_kick(owner, member_b, member_a),
            Err(ServiceError::AuthorizationError(_))
        ));
    }

    #[test_log::test]
    fn test_targeting_the_owner_is_invalid_for_everyone() {
        let (owner, member, _) = ids();
        for actor in [owner, member] {
            assert!(matches!(
                authorize_exit_or_kick(owner, actor, owner),
                Err(ServiceError::ValidationError(_))
            ));
        }
    }

    #[test_log::test]
    fn test_patch_with_blank_name_is_rejected() {
        let patch = MeetPatch {
            name: Some("   ".to_owned()),
            start_date: None,
        };
        assert!(matches!(
            validate_patch(patch),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test_log::test]
    fn test_patch_trims_name_and_keeps_supplied_fields_only() {
        let patch = MeetPatch {
            name: Some("  Study Group  ".to_owned()),
            start_date: None,
        };
        let changes = validate_patch(patch).unwrap();
        assert_eq!(changes.name.as_deref(), Some("Study Group"));
        assert_eq!(changes.start_date, None);
    }

    #[test_log::test]
    fn test_empty_patch_produces_no_changes() {
        let changes = validate_patch(MeetPatch::default()).unwrap();
        assert_eq!(changes, MeetChanges::default());
    }

    struct Info(&'static str);

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: diesel::result::DatabaseErrorKind) -> diesel::result::Error {
        diesel::result::Error::DatabaseError(kind, Box::new(Info("constraint fired")))
    }

    #[test_log::test]
    fn test_duplicate_join_maps_to_conflict() {
        let meet_id = uuid::Uuid::now_v7();
        let err = map_join_insert_error(
            meet_id,
            db_error(diesel::result::DatabaseErrorKind::UniqueViolation),
        );
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test_log::test]
    fn test_join_against_vanished_meet_maps_to_not_found() {
        let meet_id = uuid::Uuid::now_v7();
        let err = map_join_insert_error(
            meet_id,
            db_error(diesel::result::DatabaseErrorKind::ForeignKeyViolation),
        );
        match err {
            ServiceError::NotFound(message) => assert!(message.contains(&meet_id.to_string())),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test_log::test]
    fn test_other_join_failures_stay_database_errors() {
        let err = map_join_insert_error(
            uuid::Uuid::now_v7(),
            db_error(diesel::result::DatabaseErrorKind::SerializationFailure),
        );
        assert!(matches!(err, ServiceError::DieselError(_)));
    }
}
