use std::sync::Arc;

use self::cleanup::cleanup_job;
use crate::store::Store;

pub mod cleanup;

pub fn spawn_all_jobs(store: Arc<dyn Store>) {
    // spawn job to cleanup old otp, rate limit windows & reset tokens
    tokio::spawn(async {
        cleanup_job(store).await;
    });
}
