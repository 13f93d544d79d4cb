//! Meet endpoints: roster management and the aggregated week view.

use chrono::NaiveDate;
use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::{Deserialize, Serialize};

use huddle_core::constants::MEETS_ROUTE_COMPONENT;
use huddle_db::model::meet::Meet;
use huddle_service::aggregate::{self, MeetWeek, MemberWeek};
use huddle_service::error::ServiceError;
use huddle_service::roster::{self, MeetPatch, MeetSummary};

use crate::app::api::{DayPayload, parse_date};
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;
use crate::middleware::auth::get_user_from_depot;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeetResponse {
    group_id: uuid::Uuid,
    group_name: String,
    start_date: NaiveDate,
    owner_id: uuid::Uuid,
}

impl From<Meet> for MeetResponse {
    fn from(meet: Meet) -> Self {
        Self {
            group_id: meet.id,
            group_name: meet.name,
            start_date: meet.start_date,
            owner_id: meet.owner_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeetSummaryResponse {
    #[serde(flatten)]
    meet: MeetResponse,
    member_count: i64,
}

#[derive(Debug, Serialize)]
struct MeetListResponse {
    meets: Vec<MeetSummaryResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberWeekResponse {
    user_id: uuid::Uuid,
    name: String,
    days: Vec<DayPayload>,
}

impl From<MemberWeek> for MemberWeekResponse {
    fn from(member: MemberWeek) -> Self {
        Self {
            user_id: member.user_id,
            name: member.name,
            days: member.days.into_iter().map(DayPayload::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeetWeekResponse {
    #[serde(flatten)]
    meet: MeetResponse,
    participates: bool,
    week_start_date: NaiveDate,
    members: Vec<MemberWeekResponse>,
}

impl From<MeetWeek> for MeetWeekResponse {
    fn from(week: MeetWeek) -> Self {
        Self {
            meet: MeetResponse::from(week.meet),
            participates: week.participates,
            week_start_date: week.window.start(),
            members: week.members.into_iter().map(MemberWeekResponse::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateMeetRequest {
    group_name: String,
    start_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateMeetRequest {
    group_name: Option<String>,
    start_date: Option<String>,
}

/// ## Summary
/// POST /api/meets - creates a meet owned by the authenticated user, who
/// becomes its first member in the same transaction.
#[handler]
async fn create_meet_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match create_meet(req, depot).await {
        Ok(meet) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(meet));
        }
        Err(err) => err.render(res),
    }
}

async fn create_meet(req: &mut Request, depot: &Depot) -> AppResult<MeetResponse> {
    let user = get_user_from_depot(depot)?;

    let body: CreateMeetRequest = req
        .parse_json()
        .await
        .map_err(|e| ServiceError::ValidationError(format!("invalid request body: {e}")))?;

    let start_date = body.start_date.as_deref().map(parse_date).transpose()?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    let meet = roster::create_meet(&mut conn, user.id, &body.group_name, start_date).await?;
    Ok(MeetResponse::from(meet))
}

/// ## Summary
/// GET /api/meets - every meet the authenticated user belongs to, newest
/// first, with membership counts.
#[handler]
async fn list_meets_handler(depot: &mut Depot, res: &mut Response) {
    match list_meets(depot).await {
        Ok(list) => res.render(Json(list)),
        Err(err) => err.render(res),
    }
}

async fn list_meets(depot: &Depot) -> AppResult<MeetListResponse> {
    let user = get_user_from_depot(depot)?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    let meets = roster::meets_for_user(&mut conn, user.id)
        .await?
        .into_iter()
        .map(|MeetSummary { meet, member_count }| MeetSummaryResponse {
            meet: MeetResponse::from(meet),
            member_count,
        })
        .collect();

    Ok(MeetListResponse { meets })
}

/// ## Summary
/// POST /api/meets/{`meet_id`}/join - joins the authenticated user to a meet.
/// A duplicate join is a conflict, not a silent success.
#[handler]
async fn join_meet_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match join_meet(req, depot).await {
        Ok(()) => {
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(err) => err.render(res),
    }
}

async fn join_meet(req: &Request, depot: &Depot) -> AppResult<()> {
    let user = get_user_from_depot(depot)?;
    let meet_id = require_meet_id(req)?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    roster::join(&mut conn, meet_id, user.id).await?;
    Ok(())
}

/// ## Summary
/// GET /api/meets/{`meet_id`}?day= - meet metadata plus every member's week,
/// all anchored to one shared window. Members only. With no `day`, the
/// meet's own start date anchors the window.
#[handler]
async fn meet_detail_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match meet_detail(req, depot).await {
        Ok(detail) => res.render(Json(detail)),
        Err(err) => err.render(res),
    }
}

async fn meet_detail(req: &Request, depot: &Depot) -> AppResult<MeetWeekResponse> {
    let user = get_user_from_depot(depot)?;
    let meet_id = require_meet_id(req)?;
    let day = match req.query::<String>("day") {
        Some(raw) => Some(parse_date(&raw)?),
        None => None,
    };

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    let week = aggregate::meet_week(&mut conn, meet_id, user.id, day).await?;
    Ok(MeetWeekResponse::from(week))
}

/// ## Summary
/// PATCH /api/meets/{`meet_id`} - owner-only partial update of name and
/// start date.
#[handler]
async fn update_meet_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match update_meet(req, depot).await {
        Ok(meet) => res.render(Json(meet)),
        Err(err) => err.render(res),
    }
}

async fn update_meet(req: &mut Request, depot: &Depot) -> AppResult<MeetResponse> {
    let user = get_user_from_depot(depot)?;
    let meet_id = require_meet_id(req)?;

    let body: UpdateMeetRequest = req
        .parse_json()
        .await
        .map_err(|e| ServiceError::ValidationError(format!("invalid request body: {e}")))?;

    let patch = MeetPatch {
        name: body.group_name,
        start_date: body.start_date.as_deref().map(parse_date).transpose()?,
    };

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    let meet = roster::update_meet(&mut conn, meet_id, user.id, patch).await?;
    Ok(MeetResponse::from(meet))
}

/// ## Summary
/// DELETE /api/meets/{`meet_id`} - owner-only deletion; memberships and the
/// meet row go in one transaction.
#[handler]
async fn delete_meet_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match delete_meet(req, depot).await {
        Ok(()) => {
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(err) => err.render(res),
    }
}

async fn delete_meet(req: &Request, depot: &Depot) -> AppResult<()> {
    let user = get_user_from_depot(depot)?;
    let meet_id = require_meet_id(req)?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    roster::delete_meet(&mut conn, meet_id, user.id).await?;
    Ok(())
}

/// ## Summary
/// DELETE /api/meets/{`meet_id`}/members/{`user_id`} - self-exit, or an
/// owner kicking a member. The owner can never be the target.
#[handler]
async fn exit_or_kick_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match exit_or_kick(req, depot).await {
        Ok(()) => {
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(err) => err.render(res),
    }
}

async fn exit_or_kick(req: &Request, depot: &Depot) -> AppResult<()> {
    let user = get_user_from_depot(depot)?;
    let meet_id = require_meet_id(req)?;
    let target = req.param::<uuid::Uuid>("user_id").ok_or_else(|| {
        ServiceError::ValidationError("'user_id' must be a valid user id".to_owned())
    })?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    roster::exit_or_kick(&mut conn, meet_id, user.id, target).await?;
    Ok(())
}

fn require_meet_id(req: &Request) -> AppResult<uuid::Uuid> {
    req.param::<uuid::Uuid>("meet_id").ok_or_else(|| {
        ServiceError::ValidationError("'meet_id' must be a valid meet id".to_owned()).into()
    })
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(MEETS_ROUTE_COMPONENT)
        .get(list_meets_handler)
        .post(create_meet_handler)
        .push(
            Router::with_path("{meet_id}")
                .get(meet_detail_handler)
                .patch(update_meet_handler)
                .delete(delete_meet_handler)
                .push(Router::with_path("join").post(join_meet_handler))
                .push(Router::with_path("members/{user_id}").delete(exit_or_kick_handler)),
        )
}
