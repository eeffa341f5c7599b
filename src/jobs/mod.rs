use mockall_double::double;
use std::sync::Arc;

use self::sweep::sweep_job;

#[double]
use crate::database::AppDatabase;

pub mod sweep;

pub fn spawn_all_jobs(db_client: Arc<AppDatabase>) {
    // spawn job to periodically expire otp codes
    tokio::spawn(async {
        sweep_job(db_client).await;
    });
}
