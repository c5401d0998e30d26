use std::{sync::Arc, time::Duration};
use tokio::time::interval;

use crate::{
    constants::*,
    store::{OtpStore, RateLimitStore, ResetTokenStore, Store},
    utils::get_epoch_ts,
};

/// This function periodically deletes old otps, elapsed rate limit windows
/// and expired reset tokens. Punishment records are never touched.
pub async fn cleanup_job(store: Arc<dyn Store>) {
    tracing::debug!("initializing cleanup scheduler job");
    // CLEANUP_JOB_INTERVAL is mentioned in seconds
    let mut interval = interval(Duration::from_secs(CLEANUP_JOB_INTERVAL));
    loop {
        interval.tick().await;
        if let Err(err) = run_cleanup(store.as_ref(), get_epoch_ts()).await {
            tracing::error!("Error in cleanup job: {:?}", err);
        }
    }
}

/// One pass of the cleanup, returns the number of deleted entries
pub async fn run_cleanup(store: &dyn Store, now: u64) -> anyhow::Result<u64> {
    // retention values are mentioned in number of days
    let otp_cut_off = now.saturating_sub(OTP_RETENTION * 24 * 3600);
    let token_cut_off = now.saturating_sub(RESET_TOKEN_RETENTION * 24 * 3600);
    let (otps, windows, tokens) = tokio::join!(
        store.purge_otps(otp_cut_off),
        store.purge_elapsed(now),
        store.purge_reset_tokens(token_cut_off),
    );
    let deleted = otps? + windows? + tokens?;
    tracing::debug!("cleanup job deleted {deleted} entries");
    Ok(deleted)
}
