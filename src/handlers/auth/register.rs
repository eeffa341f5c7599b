use axum::{extract::State, http::StatusCode, Json};
use mongodb::bson::doc;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::AuthResponse;
use crate::{
    app::AppState,
    constants::*,
    jwt::JWT_KEYS,
    models::user::{User, UserRole},
    models::GenericResponse,
    utils::{get_epoch_ts, next_seq_val, validate_phonenumber, AppError, ValidatedBody},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReq {
    #[validate(length(min = 3, max = 50))]
    username: String,

    #[validate(length(min = 8, max = 64))]
    password: String,

    role: Option<UserRole>,

    #[validate(custom(function = "validate_phonenumber"))]
    phone: Option<String>,

    #[validate(email)]
    email: Option<String>,

    telegram_id: Option<i64>,
}

/// Register a new user account
///
/// Creates a USER account and returns a token for it. The admin account is
/// provisioned outside the API, requesting the ADMIN role is rejected.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Username taken or invalid payload", body = GenericResponse)
    ),
    tag = "Auth API"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<RegisterReq>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    if body.role == Some(UserRole::ADMIN) {
        tracing::info!("attempt to register an admin account");
        return Err(AppError::AlreadyExists("Admin already exists".into()));
    }
    check_uniq_username(&state, body.username.as_str()).await?;
    let id = next_seq_val(USER_ID_SEQ, &state.db).await?;
    let password_hash = bcrypt::hash(body.password.as_str(), bcrypt::DEFAULT_COST)?;
    let user = User {
        id,
        username: body.username,
        password_hash,
        role: UserRole::USER,
        is_active: true,
        phone: body.phone,
        email: body.email,
        telegram_id: body.telegram_id,
        created_ts: Some(get_epoch_ts()),
        updated_ts: None,
    };
    state.db.insert_one(DB_NAME, COLL_USERS, &user).await?;
    tracing::info!("created user: {}", user.username);
    let token = JWT_KEYS.generate_token(&user)?;
    let response = AuthResponse {
        success: true,
        token,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

// check if the given username already exists in the users collection
async fn check_uniq_username(state: &AppState, username: &str) -> Result<(), AppError> {
    let filter = Some(doc! {"username": username});
    let existing = state
        .db
        .find_one::<User>(DB_NAME, COLL_USERS, filter, None)
        .await?;
    if existing.is_some() {
        tracing::info!("username already exists: {}", username);
        return Err(AppError::AlreadyExists("User already exists".into()));
    }
    Ok(())
}
