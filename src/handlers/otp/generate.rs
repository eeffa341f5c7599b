use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::fetch_active_user;
use crate::{
    app::AppState,
    jwt::JwtClaims,
    models::GenericResponse,
    otp::engine,
    utils::{AppError, ValidatedBody},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOtpReq {
    pub operation_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateOtpResponse {
    pub success: bool,
    /// The issued one time code, this response is the only place it ever
    /// appears in plain form
    pub code: String,
}

/// Issue a new otp code for the calling user
///
/// Persists an ACTIVE code bound to the caller and the given operation id,
/// then notifies the user over every configured channel.
#[utoipa::path(
    post,
    path = "/otp",
    request_body = GenerateOtpReq,
    responses(
        (status = 200, description = "Otp code issued", body = GenerateOtpResponse),
        (status = 404, description = "Otp config not created yet", body = GenericResponse)
    ),
    tag = "Otp API",
    security(("token" = []))
)]
pub async fn generate_otp_handler(
    State(state): State<AppState>,
    claims: JwtClaims,
    ValidatedBody(body): ValidatedBody<GenerateOtpReq>,
) -> Result<Json<GenerateOtpResponse>, AppError> {
    let user = fetch_active_user(&state.db, claims.id).await?;
    let code = engine::issue_code(&state.db, &user, body.operation_id, &state.senders).await?;
    let response = GenerateOtpResponse {
        success: true,
        code,
    };
    Ok(Json(response))
}
