use axum::{extract::State, Json};
use serde::Deserialize;
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
pub struct ValidateOtpReq {
    #[validate(length(min = 1))]
    pub code: String,
}

/// Validate an otp code for the calling user
///
/// Consumes the code on success. A code that does not exist for this user
/// and a wrong code are deliberately indistinguishable.
#[utoipa::path(
    post,
    path = "/otp/validate",
    request_body = ValidateOtpReq,
    responses(
        (status = 200, description = "Otp code validated", body = GenericResponse),
        (status = 404, description = "No such code for this user", body = GenericResponse),
        (status = 410, description = "Code already used or expired", body = GenericResponse)
    ),
    tag = "Otp API",
    security(("token" = []))
)]
pub async fn validate_otp_handler(
    State(state): State<AppState>,
    claims: JwtClaims,
    ValidatedBody(body): ValidatedBody<ValidateOtpReq>,
) -> Result<Json<GenericResponse>, AppError> {
    let user = fetch_active_user(&state.db, claims.id).await?;
    engine::validate_code(&state.db, &user, body.code.as_str()).await?;
    let response = GenericResponse {
        success: true,
        message: "Otp code validated".to_owned(),
    };
    Ok(Json(response))
}
