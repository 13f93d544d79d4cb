use diesel::{pg::Pg, prelude::*};

use crate::{db::schema, model};

/// One user's packed availability for one calendar date. Rows are written
/// only through the atomic week upsert and never deleted individually.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = schema::schedule)]
#[diesel(check_for_backend(Pg))]
#[diesel(primary_key(user_id, date))]
#[diesel(belongs_to(model::app_user::AppUser, foreign_key = user_id))]
pub struct Schedule {
    pub user_id: uuid::Uuid,
    pub date: chrono::NaiveDate,
    pub block_data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Insertable)]
#[diesel(table_name = schema::schedule)]
pub struct NewSchedule {
    pub user_id: uuid::Uuid,
    pub date: chrono::NaiveDate,
    pub block_data: Vec<u8>,
}
