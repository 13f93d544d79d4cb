pub mod app_user;
pub mod meet;
pub mod membership;
pub mod schedule;
