//! Password hashing and verification.
//!
//! Argon2id is CPU and memory heavy, both helpers run on the blocking pool.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Argon2id with the RFC recommended cost (19 MB, 2 passes, 1 lane)
fn hasher() -> anyhow::Result<Argon2<'static>> {
    let params = Params::new(19456, 2, 1, None)
        .map_err(|err| anyhow::anyhow!("Not able to create argon2 params: {err}"))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn hash_blocking(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("Not able to hash password: {err}"))?;
    Ok(hash.to_string())
}

/// Verification uses the parameters embedded in the hash. A malformed hash never verifies.
fn verify_blocking(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        tracing::warn!("Stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub async fn hash_password(password: &str) -> anyhow::Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_blocking(&password)).await?
}

pub async fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let (password, hash) = (password.to_owned(), hash.to_owned());
    let is_valid = tokio::task::spawn_blocking(move || verify_blocking(&password, &hash)).await?;
    Ok(is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("correct horse").await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).await.unwrap());
        assert!(!verify_password("wrong horse", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let first = hash_password("same").await.unwrap();
        let second = hash_password("same").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-hash").await.unwrap());
        assert!(!verify_password("", "").await.unwrap());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_hashing_leaves_the_runtime_thread_free() {
        // on a single threaded runtime a ticker keeps running while argon2 works
        let ticker = tokio::spawn(async {
            let mut ticks = 0;
            for _ in 0..3 {
                tokio::task::yield_now().await;
                ticks += 1;
            }
            ticks
        });
        let hash = hash_password("busy").await.unwrap();
        assert!(ticker.is_finished());
        assert_eq!(ticker.await.unwrap(), 3);
        assert!(hash.starts_with("$argon2id$"));
    }
}
