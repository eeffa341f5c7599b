use axum::{
    extract::{Path, State},
    Json,
};
use mongodb::bson::doc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    app::AppState,
    constants::*,
    jwt::AdminClaims,
    models::user::{User, UserDto, UserRole},
    models::GenericResponse,
    otp::store,
    utils::AppError,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersResponse {
    success: bool,
    data: Vec<UserDto>,
}

/// List all regular user accounts
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "All USER accounts", body = UsersResponse)
    ),
    tag = "Admin API",
    security(("token" = []))
)]
pub async fn get_users_handler(
    State(state): State<AppState>,
    _claims: AdminClaims,
) -> Result<Json<UsersResponse>, AppError> {
    let role = UserRole::USER.to_bson()?;
    let filter = Some(doc! {"role": role});
    let users = state
        .db
        .find::<User>(DB_NAME, COLL_USERS, filter, None)
        .await?;
    let data = users.into_iter().map(UserDto::from).collect();
    let response = UsersResponse {
        success: true,
        data,
    };
    Ok(Json(response))
}

/// Delete a user account
///
/// Removes the user's otp codes first, then the user itself. This cascade
/// is the only path that ever destroys code rows.
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    params(("id" = u32, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = GenericResponse),
        (status = 404, description = "User not found", body = GenericResponse)
    ),
    tag = "Admin API",
    security(("token" = []))
)]
pub async fn delete_user_handler(
    State(state): State<AppState>,
    _claims: AdminClaims,
    Path(user_id): Path<u32>,
) -> Result<Json<GenericResponse>, AppError> {
    let deleted_codes = store::delete_by_owner(&state.db, user_id).await?;
    let filter = doc! {"id": user_id};
    let deleted_users = state.db.delete_many(DB_NAME, COLL_USERS, filter).await?;
    if deleted_users == 0 {
        return Err(AppError::NotFound(format!(
            "User not found with id: {user_id}"
        )));
    }
    tracing::info!(
        "deleted user {} along with {} otp codes",
        user_id,
        deleted_codes
    );
    let response = GenericResponse {
        success: true,
        message: "User deleted".to_owned(),
    };
    Ok(Json(response))
}
