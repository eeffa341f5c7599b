use mockall_double::double;
use std::{sync::Arc, time::Duration};
use tokio::time::interval;

use crate::{constants::*, otp::engine};

#[double]
use crate::database::AppDatabase;

/// Periodically transitions expired ACTIVE otp codes to EXPIRED. The engine
/// holds no scheduling primitive itself, this job is the only timer.
pub async fn sweep_job(db: Arc<AppDatabase>) {
    tracing::debug!("initializing otp sweep scheduler job");
    // SWEEP_JOB_INTERVAL_SECS is mentioned in seconds
    let secs = std::env::var("SWEEP_JOB_INTERVAL_SECS").unwrap_or_default();
    let secs = secs.parse::<u64>().unwrap_or(SWEEP_JOB_INTERVAL);
    let mut interval = interval(Duration::from_secs(secs));
    loop {
        interval.tick().await;
        if let Err(err) = engine::sweep(&db).await {
            tracing::debug!("Error in otp sweep: {:?}", err);
        }
    }
}
