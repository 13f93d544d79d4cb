use diesel::{pg::Pg, prelude::*};

use crate::{db::schema, model};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = schema::membership)]
#[diesel(check_for_backend(Pg))]
#[diesel(primary_key(meet_id, user_id))]
#[diesel(belongs_to(model::meet::Meet, foreign_key = meet_id))]
#[diesel(belongs_to(model::app_user::AppUser, foreign_key = user_id))]
pub struct Membership {
    pub meet_id: uuid::Uuid,
    pub user_id: uuid::Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Insertable)]
#[diesel(table_name = schema::membership)]
pub struct NewMembership {
    pub meet_id: uuid::Uuid,
    pub user_id: uuid::Uuid,
}
