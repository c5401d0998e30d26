use chrono::{TimeZone, Utc};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use regex::Regex;
use std::{
    collections::HashMap,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

/// Get EPOCH timestamp in seconds
pub fn get_epoch_ts() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(n) => n.as_secs(),
        Err(_) => panic!("SystemTime before UNIX EPOCH!"),
    }
}

/// Format an EPOCH timestamp in seconds as RFC 3339 in UTC
pub fn format_epoch_ts(ts: u64) -> String {
    match Utc.timestamp_opt(ts as i64, 0).single() {
        Some(dt) => dt.to_rfc3339(),
        None => ts.to_string(),
    }
}

/// Generate OTP of a given length
pub fn generate_otp(len: u32) -> String {
    let mut rng = thread_rng();
    (0..len)
        .map(|_| {
            let n = rng.gen_range(0..10);
            char::from_digit(n, 10).unwrap_or('0')
        })
        .collect()
}

/// Generate an opaque random token of alphanumeric chars
pub fn generate_token(len: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Compare two strings without short circuiting on the first different byte
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Emails are stored and looked up trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Read an environment variable and parse it, falling back to the default
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<T>().ok())
        .unwrap_or(default)
}

/// replace placeholder variables from the template text
/// placeholders are of patters {{variable}}, unknown ones are left as they are
pub fn replace_placeholders(s: &str, options: &HashMap<&str, String>) -> anyhow::Result<String> {
    let re = Regex::new(r"\{\{(\w+)\}\}")?;
    let replaced = re.replace_all(s, |caps: &regex::Captures| {
        options
            .get(&caps[1])
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    });
    Ok(replaced.into_owned())
}
