//! Personal calendar endpoints: week-scoped read and atomic week write.

use chrono::NaiveDate;
use salvo::{Depot, Request, Response, Router, handler, writing::Json};
use serde::{Deserialize, Serialize};

use huddle_core::constants::CALENDAR_ROUTE_COMPONENT;
use huddle_core::slots::DaySlots;
use huddle_service::error::ServiceError;
use huddle_service::schedule::{self, DayInput, ScheduleWeek};

use crate::app::api::{DayPayload, parse_date};
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;
use crate::middleware::auth::get_user_from_depot;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WeekResponse {
    week_start_date: NaiveDate,
    days: Vec<DayPayload>,
}

impl From<ScheduleWeek> for WeekResponse {
    fn from(week: ScheduleWeek) -> Self {
        Self {
            week_start_date: week.window.start(),
            days: week.days.into_iter().map(DayPayload::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveWeekRequest {
    /// Reference date anchoring the week window.
    day: String,
    days: Vec<DayUpload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DayUpload {
    date: String,
    slots: Vec<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveWeekResponse {
    week_start_date: NaiveDate,
}

/// ## Summary
/// GET /api/calendar/week?day= - the authenticated user's week containing
/// `day`. Dates never saved come back with all 30 slots unset.
#[handler]
async fn get_week_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match get_week(req, depot).await {
        Ok(week) => res.render(Json(week)),
        Err(err) => err.render(res),
    }
}

async fn get_week(req: &mut Request, depot: &Depot) -> AppResult<WeekResponse> {
    let user = get_user_from_depot(depot)?;
    let day = require_day(req)?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    let week = schedule::week_for_user(&mut conn, user.id, day).await?;
    Ok(WeekResponse::from(week))
}

/// ## Summary
/// PUT /api/calendar/week - replaces the authenticated user's week. The body
/// must cover exactly the 7 dates of the window named by `day`; the write is
/// atomic.
#[handler]
async fn save_week_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match save_week(req, depot).await {
        Ok(saved) => res.render(Json(saved)),
        Err(err) => err.render(res),
    }
}

async fn save_week(req: &mut Request, depot: &Depot) -> AppResult<SaveWeekResponse> {
    let user = get_user_from_depot(depot)?;

    let body: SaveWeekRequest = req
        .parse_json()
        .await
        .map_err(|e| ServiceError::ValidationError(format!("invalid request body: {e}")))?;

    let day = parse_date(&body.day)?;
    let mut days = Vec::with_capacity(body.days.len());
    for upload in &body.days {
        days.push(DayInput {
            date: parse_date(&upload.date)?,
            slots: DaySlots::try_from(upload.slots.as_slice())?,
        });
    }

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    let window = schedule::save_week(&mut conn, user.id, day, &days).await?;
    Ok(SaveWeekResponse {
        week_start_date: window.start(),
    })
}

fn require_day(req: &Request) -> AppResult<NaiveDate> {
    let Some(day) = req.query::<String>("day") else {
        return Err(ServiceError::ValidationError("the 'day' query parameter is required".to_owned()).into());
    };
    parse_date(&day)
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(CALENDAR_ROUTE_COMPONENT).push(
        Router::with_path("week")
            .get(get_week_handler)
            .put(save_week_handler),
    )
}
