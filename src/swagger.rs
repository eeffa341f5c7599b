use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::ping::ping_handler,
        crate::handlers::auth::register::register_handler,
        crate::handlers::auth::login::login_handler,
        crate::handlers::otp::generate::generate_otp_handler,
        crate::handlers::otp::validate::validate_otp_handler,
        crate::handlers::admin::config::get_otp_config_handler,
        crate::handlers::admin::config::create_otp_config_handler,
        crate::handlers::admin::config::update_otp_config_handler,
        crate::handlers::admin::users::get_users_handler,
        crate::handlers::admin::users::delete_user_handler,
    ),
    components(
        schemas(
            crate::handlers::auth::register::RegisterReq,
            crate::handlers::auth::login::LoginReq,
            crate::handlers::otp::generate::GenerateOtpReq,
            crate::handlers::otp::validate::ValidateOtpReq,
            crate::handlers::admin::config::CreateOtpConfigReq,
            crate::handlers::admin::config::UpdateOtpConfigReq,

            crate::handlers::auth::AuthResponse,
            crate::handlers::otp::generate::GenerateOtpResponse,
            crate::handlers::admin::config::OtpConfigResponse,
            crate::handlers::admin::users::UsersResponse,
            crate::models::GenericResponse,

            crate::models::UserDto,
            crate::models::UserRole,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Debugging API", description = "API for debugging purposes"),
        (name = "Auth API", description = "User registration and login"),
        (name = "Otp API", description = "Otp issuance and validation"),
        (name = "Admin API", description = "API for admin functionalities")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("authorization"))),
            )
        }
    }
}
