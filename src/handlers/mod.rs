pub mod admin;
pub mod auth;
pub mod default;
pub mod global_404;
pub mod otp;
pub mod ping;

pub use admin::config::create_otp_config_handler;
pub use admin::config::get_otp_config_handler;
pub use admin::config::update_otp_config_handler;
pub use admin::users::delete_user_handler;
pub use admin::users::get_users_handler;

pub use auth::login::login_handler;
pub use auth::register::register_handler;

pub use default::default_route_handler;

pub use global_404::global_404_handler;

pub use otp::generate::generate_otp_handler;
pub use otp::validate::validate_otp_handler;

pub use ping::ping_handler;
