use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// User rows are owned by the identity collaborator; this core only reads
/// them for name lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::app_user)]
#[diesel(check_for_backend(Pg))]
pub struct AppUser {
    pub id: uuid::Uuid,
    pub name: String,
}

/// Insert form, used by test fixtures; production user rows arrive through
/// the identity collaborator's own provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Insertable)]
#[diesel(table_name = schema::app_user)]
pub struct NewAppUser {
    pub id: uuid::Uuid,
    pub name: String,
}
