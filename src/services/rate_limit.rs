use crate::store::RateLimitStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStatus {
    Allowed { remaining: u32 },
    Limited { retry_after: u64 },
}

/// Which otp action a counter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpAction {
    Send,
    Verify,
}

impl OtpAction {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Verify => "verify",
        }
    }
}

pub fn otp_key(action: OtpAction, purpose: &str, email: &str) -> String {
    format!("otp:{}:{}:{}", action.as_str(), purpose, email)
}

/// Count one attempt on `key` and decide whether it is within `max` per window.
/// The hit is recorded even when limited, it does not extend the window.
pub async fn attempt<S>(
    store: &S,
    key: &str,
    max: u32,
    window_secs: u64,
    now: u64,
) -> anyhow::Result<RateLimitStatus>
where
    S: RateLimitStore + ?Sized,
{
    let hit = store.hit(key, window_secs, now).await?;
    if hit.hits > max {
        let retry_after = hit.reset_at.saturating_sub(now).max(1);
        return Ok(RateLimitStatus::Limited { retry_after });
    }
    Ok(RateLimitStatus::Allowed {
        remaining: max - hit.hits,
    })
}
