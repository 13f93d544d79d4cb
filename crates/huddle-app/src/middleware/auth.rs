//! Identity resolution middleware.
//!
//! Credential verification belongs to the fronting identity collaborator;
//! requests arrive with an already-verified user id in a trusted header. This
//! middleware parses that id, loads the user row, and stores it in the depot
//! for downstream handlers. Anything less yields 401 before any handler runs.

use salvo::Depot;
use salvo::writing::Json;
use tracing::error;

use crate::config::get_config_from_depot;
use crate::db_handler::get_db_from_depot;
use crate::error::ErrorResponse;
use huddle_db::db::query;
use huddle_db::model::app_user::AppUser;

/// Depot key under which the authenticated user is stored.
pub const AUTHENTICATED_USER: &str = "authenticated_user";

/// ## Summary
/// Middleware handler for identity resolution.
/// Use this as a handler in routes to protect them with authentication.
pub struct AuthMiddleware;

#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        tracing::trace!("Resolving request identity");

        let config = match get_config_from_depot(depot) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!(error = ?e, "Failed to get config from depot");
                res.status_code(salvo::http::StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let provider = match get_db_from_depot(depot) {
            Ok(p) => p,
            Err(e) => {
                error!(error = ?e, "Failed to get database provider from depot");
                res.status_code(salvo::http::StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let user_id = req
            .header::<String>(config.auth.identity_header.as_str())
            .and_then(|raw| raw.parse::<uuid::Uuid>().ok());

        let Some(user_id) = user_id else {
            tracing::debug!("Request carries no resolvable identity");
            unauthenticated(res, ctrl);
            return;
        };

        let mut conn = match provider.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                error!(error = ?e, "Failed to get database connection");
                res.status_code(salvo::http::StatusCode::SERVICE_UNAVAILABLE);
                ctrl.skip_rest();
                return;
            }
        };

        match query::app_user::find(&mut conn, user_id).await {
            Ok(Some(user)) => {
                tracing::debug!(user_id = %user.id, "Identity resolved");
                depot.insert(AUTHENTICATED_USER, user);
            }
            Ok(None) => {
                tracing::debug!(%user_id, "Identity header names an unknown user");
                unauthenticated(res, ctrl);
            }
            Err(e) => {
                error!(error = ?e, "Identity lookup failed");
                res.status_code(salvo::http::StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
            }
        }
    }
}

fn unauthenticated(res: &mut salvo::Response, ctrl: &mut salvo::FlowCtrl) {
    res.status_code(salvo::http::StatusCode::UNAUTHORIZED);
    res.render(Json(ErrorResponse {
        error: "Authentication required".to_owned(),
    }));
    ctrl.skip_rest();
}

/// ## Summary
/// Retrieves the authenticated user stored by [`AuthMiddleware`].
///
/// ## Errors
/// Returns a not-authenticated error if the depot has no user, which maps to
/// HTTP 401.
pub fn get_user_from_depot(depot: &Depot) -> crate::error::AppResult<AppUser> {
    depot
        .get::<AppUser>(AUTHENTICATED_USER)
        .cloned()
        .map_err(|_err| huddle_service::error::ServiceError::NotAuthenticated.into())
}
