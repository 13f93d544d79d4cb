use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::meet)]
#[diesel(check_for_backend(Pg))]
pub struct Meet {
    pub id: uuid::Uuid,
    pub name: String,
    pub start_date: chrono::NaiveDate,
    pub owner_id: uuid::Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Insertable)]
#[diesel(table_name = schema::meet)]
pub struct NewMeet {
    pub id: uuid::Uuid,
    pub name: String,
    pub start_date: chrono::NaiveDate,
    pub owner_id: uuid::Uuid,
}

/// Partial update: only supplied fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = schema::meet)]
pub struct MeetChanges {
    pub name: Option<String>,
    pub start_date: Option<chrono::NaiveDate>,
}
