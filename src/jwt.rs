use axum::{
    async_trait,
    extract::FromRequestParts,
    headers::{authorization::Bearer, Authorization},
    http::request::Parts,
    RequestPartsExt, TypedHeader,
};
use jsonwebtoken::{
    decode, encode, errors::Result as JwtResult, DecodingKey, EncodingKey, Header, Validation,
};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::{
    models::{Role, User},
    state::AppState,
    store::UserStore,
    utils::{env_or, get_epoch_ts, AppError},
};

lazy_static! {
    pub static ref JWT_KEYS: JwtKeys = JwtKeys::new();
}

pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
    /// seconds until the access token expires
    pub expires_in: u64,
}

pub fn access_token_expiry() -> u64 {
    env_or("JWT_EXPIRY", 3600)
}

pub fn refresh_token_expiry() -> u64 {
    env_or("REFRESH_TOKEN_EXPIRY", 24 * 3600)
}

impl JwtKeys {
    fn new() -> Self {
        let secret = std::env::var("JWT_SECRET_KEY").unwrap_or("my_secret".to_string());
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn generate_token(&self, user: &User) -> JwtResult<String> {
        let exp = get_epoch_ts() + access_token_expiry();
        self.sign(user, TokenKind::Access, exp as usize)
    }

    pub fn generate_refresh_token(&self, user: &User) -> JwtResult<String> {
        let exp = get_epoch_ts() + refresh_token_expiry();
        self.sign(user, TokenKind::Refresh, exp as usize)
    }

    pub fn generate_token_pair(&self, user: &User) -> JwtResult<TokenPair> {
        Ok(TokenPair {
            token: self.generate_token(user)?,
            refresh_token: self.generate_refresh_token(user)?,
            expires_in: access_token_expiry(),
        })
    }

    fn sign(&self, user: &User, kind: TokenKind, exp: usize) -> JwtResult<String> {
        let claims = JwtClaims {
            id: user.id,
            name: user.name.to_owned(),
            role: user.role,
            ver: user.token_version,
            kind,
            exp,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Decode and check signature, expiry and that the token is of the expected kind
    pub fn extract_claims(&self, token: &str, kind: TokenKind) -> Result<JwtClaims, AppError> {
        let token_data = decode::<JwtClaims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AppError::Auth("Invalid Token".into()))?;
        if token_data.claims.kind != kind {
            return Err(AppError::Auth("Invalid Token".into()));
        }
        Ok(token_data.claims)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub id: u32,
    pub name: String,
    pub role: Role,
    /// token version of the user at issue time
    pub ver: u32,
    pub kind: TokenKind,
    pub exp: usize,
}

#[async_trait]
impl<S> FromRequestParts<S> for JwtClaims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Auth("Missing token".into()))?;
        JWT_KEYS.extract_claims(bearer.token(), TokenKind::Access)
    }
}

/// Caller of the request, loaded fresh from the store.
/// Tokens of inactive users or of an older token version are rejected.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = JwtClaims::from_request_parts(parts, state).await?;
        let invalid = || AppError::Auth("Invalid Token".into());
        let user = state
            .store
            .find_user_by_id(claims.id)
            .await?
            .ok_or_else(invalid)?;
        if !user.is_active || user.token_version != claims.ver {
            return Err(invalid());
        }
        Ok(Self(user))
    }
}

/// Authenticated caller allowed to manage punishments. Everybody else gets a 404.
#[derive(Debug, Clone)]
pub struct Moderator(pub User);

#[async_trait]
impl FromRequestParts<AppState> for Moderator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.can_moderate() {
            tracing::debug!("User {} with role {} tried a moderator route", user.id, user.role);
            return Err(AppError::NotFound("Not found".into()));
        }
        Ok(Self(user))
    }
}
