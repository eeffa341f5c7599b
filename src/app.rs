use std::sync::Arc;

use axum::routing::{delete, get, post, IntoMakeService};
use axum::Router;
use mockall_double::double;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[double]
use crate::database::AppDatabase;
use crate::handlers::*;
use crate::notification::NotificationSender;
use crate::swagger::ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<AppDatabase>,
    pub senders: Arc<Vec<Arc<dyn NotificationSender>>>,
}

pub fn build_app(state: AppState) -> IntoMakeService<Router> {
    tracing::debug!("Initializing the app");
    let app = Router::new()
        .route("/", get(default_route_handler))
        .route("/ping", get(ping_handler))
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/otp", post(generate_otp_handler))
        .route("/otp/validate", post(validate_otp_handler))
        .route(
            "/admin/config",
            get(get_otp_config_handler)
                .post(create_otp_config_handler)
                .put(update_otp_config_handler),
        )
        .route("/admin/users", get(get_users_handler))
        .route("/admin/users/:id", delete(delete_user_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(global_404_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    app.into_make_service()
}
