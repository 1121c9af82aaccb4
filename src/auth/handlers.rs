use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse},
        extractors::AuthUser,
        role::Role,
        services,
    },
    error::AppResult,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

// An absent or unparseable body counts as missing fields.
fn body_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!(error = %rejection, "unreadable request body");
            T::default()
        }
    }
}

#[instrument(skip(state, caller, payload))]
pub async fn register(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let body = body_or_default(payload);
    let (email, password) =
        services::credentials(body.email.as_deref(), body.password.as_deref())?;
    services::ensure_email_shape(&email)?;
    let role = Role::requested(body.role.as_deref());

    let caller = caller.map(|AuthUser(identity)| identity);
    services::check_signup_role(state.config.admin_signup, role, caller.as_ref())?;

    let user = services::register(state.users.as_ref(), email, password, role).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let body = body_or_default(payload);
    let (email, password) =
        services::credentials(body.email.as_deref(), body.password.as_deref())?;

    let token = services::login(state.users.as_ref(), &state.jwt, email, password).await?;
    Ok(Json(LoginResponse { token }))
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser(identity): AuthUser) -> Json<MeResponse> {
    Json(identity.into())
}
