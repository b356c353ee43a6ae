use crate::{abstract_trait::JwtServiceTrait, errors::ServiceError};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

/// Claims of the tokens issued by the marketplace account service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub exp: usize,
    pub iat: usize,
    pub token_type: String,
}

fn lifetime(token_type: &str) -> Option<Duration> {
    match token_type {
        "access" => Some(Duration::minutes(60)),
        "refresh" => Some(Duration::days(7)),
        _ => None,
    }
}

/// HS256 keys derived once from the shared secret.
#[derive(Clone)]
pub struct JwtConfig {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig").finish_non_exhaustive()
    }
}

impl JwtConfig {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt_secret.as_bytes()),
        }
    }
}

impl JwtServiceTrait for JwtConfig {
    fn generate_token(&self, user_id: i64, token_type: &str) -> Result<String, ServiceError> {
        let ttl = lifetime(token_type).ok_or(ServiceError::InvalidTokenType)?;
        let now = Utc::now();

        let claims = Claims {
            user_id,
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(ServiceError::Jwt)
    }

    fn verify_token(&self, token: &str, expected_type: &str) -> Result<i64, ServiceError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => ServiceError::TokenExpired,
                _ => ServiceError::Jwt(err),
            },
        )?;

        if data.claims.token_type != expected_type {
            return Err(ServiceError::InvalidTokenType);
        }

        Ok(data.claims.user_id)
    }
}
