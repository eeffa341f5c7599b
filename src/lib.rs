use std::{net::SocketAddr, sync::Arc};

use dotenvy::dotenv;
use mockall_double::double;
use mongodb::bson::doc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::AppState;
use constants::*;
#[double]
use database::AppDatabase;
use jobs::spawn_all_jobs;
use notification::build_senders;

pub mod app;
pub mod constants;
pub mod database;
pub mod handlers;
pub mod jobs;
pub mod jwt;
pub mod models;
pub mod notification;
pub mod otp;
pub mod swagger;
pub mod utils;

pub async fn start_web_server() {
    // import .env file
    dotenv().ok();
    initialize_logging();
    // create database client
    let db_client = AppDatabase::new()
        .await
        .expect("Unable to accquire database client");
    let db_client = Arc::new(db_client);
    ensure_indexes(&db_client)
        .await
        .expect("Unable to create database indexes");
    let state = AppState {
        db: db_client.clone(),
        senders: Arc::new(build_senders()),
    };
    spawn_all_jobs(db_client);
    start_server(state).await;
}

fn initialize_logging() {
    // create default env filter
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or("otp_service_backend_rust=debug".into());

    // initialize tracing subscriber for logging
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

/// Creates the indexes the app relies on. The unique index on the code
/// column is what makes concurrent issuance of the same code impossible.
async fn ensure_indexes(db: &AppDatabase) -> anyhow::Result<()> {
    db.create_index(DB_NAME, COLL_OTP_CODES, doc! {"code": 1}, true)
        .await?;
    // the sweep job scans on status + expiresAt
    db.create_index(
        DB_NAME,
        COLL_OTP_CODES,
        doc! {"status": 1, "expiresAt": 1},
        false,
    )
    .await?;
    db.create_index(DB_NAME, COLL_USERS, doc! {"username": 1}, true)
        .await?;
    db.create_index(DB_NAME, COLL_USERS, doc! {"id": 1}, true)
        .await?;
    Ok(())
}

async fn start_server(state: AppState) {
    // read the port number from env variable
    let port = std::env::var("PORT").unwrap_or_default();
    let port = port.parse::<u16>().unwrap_or(3000);
    // build the socket address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    // create the app instance
    let app = app::build_app(state);
    tracing::debug!("Starting the app in: {addr}");
    // start serving the app in the socket address
    axum::Server::bind(&addr).serve(app).await.unwrap();
}
