use axum::{extract::State, Json};
use mongodb::bson::doc;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::AuthResponse;
use crate::{
    app::AppState,
    constants::*,
    jwt::JWT_KEYS,
    models::user::User,
    models::GenericResponse,
    utils::{AppError, ValidatedBody},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginReq {
    #[validate(length(min = 1))]
    username: String,

    #[validate(length(min = 1))]
    password: String,
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Authentication successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = GenericResponse)
    ),
    tag = "Auth API"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<LoginReq>,
) -> Result<Json<AuthResponse>, AppError> {
    let invalid = || AppError::Auth("Invalid username or password".into());
    let filter = Some(doc! {"username": body.username.as_str(), "isActive": true});
    let user = state
        .db
        .find_one::<User>(DB_NAME, COLL_USERS, filter, None)
        .await?
        .ok_or_else(invalid)?;
    if !bcrypt::verify(body.password.as_str(), user.password_hash.as_str())? {
        return Err(invalid());
    }
    tracing::info!("authentication successful: {}", user.username);
    let token = JWT_KEYS.generate_token(&user)?;
    let response = AuthResponse {
        success: true,
        token,
    };
    Ok(Json(response))
}
