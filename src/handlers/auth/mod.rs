use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod login;
pub mod register;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
}
