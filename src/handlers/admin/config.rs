use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    app::AppState,
    jwt::AdminClaims,
    models::otp::OtpConfig,
    models::GenericResponse,
    otp::config,
    utils::{AppError, ValidatedBody},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOtpConfigReq {
    #[validate(range(min = 1))]
    code_length: u32,

    #[validate(range(min = 1))]
    ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOtpConfigReq {
    #[validate(range(min = 1))]
    code_length: Option<u32>,

    #[validate(range(min = 1))]
    ttl_seconds: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OtpConfigResponse {
    success: bool,
    code_length: u32,
    ttl_seconds: u64,
}

impl From<OtpConfig> for OtpConfigResponse {
    fn from(config: OtpConfig) -> Self {
        Self {
            success: true,
            code_length: config.code_length,
            ttl_seconds: config.ttl_seconds,
        }
    }
}

/// Read the current otp config
#[utoipa::path(
    get,
    path = "/admin/config",
    responses(
        (status = 200, description = "Current otp config", body = OtpConfigResponse),
        (status = 404, description = "No config created yet", body = GenericResponse)
    ),
    tag = "Admin API",
    security(("token" = []))
)]
pub async fn get_otp_config_handler(
    State(state): State<AppState>,
    _claims: AdminClaims,
) -> Result<Json<OtpConfigResponse>, AppError> {
    let config = config::get_otp_config(&state.db).await?;
    Ok(Json(config.into()))
}

/// Create the otp config
///
/// Succeeds exactly once, there is at most one config at any time.
#[utoipa::path(
    post,
    path = "/admin/config",
    request_body = CreateOtpConfigReq,
    responses(
        (status = 201, description = "Otp config created", body = OtpConfigResponse),
        (status = 400, description = "Otp config already exists", body = GenericResponse)
    ),
    tag = "Admin API",
    security(("token" = []))
)]
pub async fn create_otp_config_handler(
    State(state): State<AppState>,
    _claims: AdminClaims,
    ValidatedBody(body): ValidatedBody<CreateOtpConfigReq>,
) -> Result<(StatusCode, Json<OtpConfigResponse>), AppError> {
    let config = config::create_otp_config(&state.db, body.code_length, body.ttl_seconds).await?;
    Ok((StatusCode::CREATED, Json(config.into())))
}

/// Update the otp config
///
/// Partial update: fields left out of the payload keep their prior values.
/// Codes issued before the change keep their original expiry.
#[utoipa::path(
    put,
    path = "/admin/config",
    request_body = UpdateOtpConfigReq,
    responses(
        (status = 200, description = "Otp config updated", body = OtpConfigResponse),
        (status = 404, description = "No config created yet", body = GenericResponse)
    ),
    tag = "Admin API",
    security(("token" = []))
)]
pub async fn update_otp_config_handler(
    State(state): State<AppState>,
    _claims: AdminClaims,
    ValidatedBody(body): ValidatedBody<UpdateOtpConfigReq>,
) -> Result<Json<OtpConfigResponse>, AppError> {
    let config = config::update_otp_config(&state.db, body.code_length, body.ttl_seconds).await?;
    Ok(Json(config.into()))
}
