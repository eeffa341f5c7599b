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

use crate::models::{User, UserRole};
use crate::utils::{get_epoch_ts, AppError};

lazy_static! {
    pub static ref JWT_KEYS: JwtKeys = JwtKeys::new();
}

pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
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
        let jwt_expiry = std::env::var("JWT_EXPIRY").unwrap_or_default();
        let jwt_expiry = jwt_expiry.parse::<usize>().unwrap_or(3600);
        let exp = get_epoch_ts() as usize + jwt_expiry;
        let claims = JwtClaims {
            id: user.id,
            username: user.username.to_owned(),
            role: user.role,
            exp,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub id: u32,
    pub username: String,
    pub role: UserRole,
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
        let token_data =
            decode::<JwtClaims>(bearer.token(), &JWT_KEYS.decoding, &Validation::default())
                .map_err(|_| AppError::Auth("Invalid Token".into()))?;
        Ok(token_data.claims)
    }
}

/// Claims extractor for admin only routes
pub struct AdminClaims(pub JwtClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AdminClaims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = JwtClaims::from_request_parts(parts, state).await?;
        if claims.role != UserRole::ADMIN {
            return Err(AppError::Auth("Admin access required".into()));
        }
        Ok(Self(claims))
    }
}
