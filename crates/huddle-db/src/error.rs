use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),

    #[error(transparent)]
    CoreError(#[from] huddle_core::error::CoreError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;

/// ## Summary
/// Whether a diesel error is a unique-constraint violation. Callers use this
/// to turn the storage-level duplicate-key guarantee into a conflict, instead
/// of pattern-matching vendor error strings.
#[must_use]
pub fn is_unique_violation(err: &diesel::result::Error) -> bool {
    matches!(
        err,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )
    )
}

/// ## Summary
/// Whether a diesel error is a foreign-key violation. Lets callers map a
/// referenced row vanishing mid-write to not-found instead of surfacing a
/// raw storage fault.
#[must_use]
pub fn is_foreign_key_violation(err: &diesel::result::Error) -> bool {
    matches!(
        err,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::ForeignKeyViolation,
            _,
        )
    )
}
