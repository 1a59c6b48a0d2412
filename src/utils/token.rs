use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorMessage, HttpError};

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn create_token(
    user_id: &str,
    secret: &[u8],
    expires_in_seconds: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    if user_id.is_empty() {
        return Err(jsonwebtoken::errors::ErrorKind::InvalidSubject.into());
    }

    let now = Utc::now();
    let iat = now.timestamp() as usize;
    let exp = (now + Duration::seconds(expires_in_seconds)).timestamp() as usize;
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iat,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

pub fn decode_token<T: Into<String>>(token: T, secret: &[u8]) -> Result<String, HttpError> {
    let decoded = decode::<TokenClaims>(
        &token.into(),
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    );

    match decoded {
        Ok(token) => Ok(token.claims.sub),
        Err(_) => Err(HttpError::unauthorized(
            ErrorMessage::InvalidToken.to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_token_round_trip() {
        let user_id = Uuid::new_v4().to_string();
        let secret = b"top-secret";

        let token = create_token(&user_id, secret, 60).unwrap();
        let decoded = decode_token(token, secret).unwrap();

        assert_eq!(decoded, user_id);
    }

    #[test]
    fn test_empty_subject_rejected() {
        assert!(create_token("", b"top-secret", 60).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(&Uuid::new_v4().to_string(), b"secret-a", 60).unwrap();
        assert!(decode_token(token, b"secret-b").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = create_token(&Uuid::new_v4().to_string(), b"top-secret", -60).unwrap();
        assert!(decode_token(token, b"top-secret").is_err());
    }
}
