//! HS256 bearer-token decoding at the API edge.
//!
//! The wire token is a standard JWT; decoding/verification happens here, and
//! the resulting claims are re-validated by the pure, deterministic layer in
//! `wareflow-auth` so the policy rules stay transport-agnostic.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wareflow_auth::{JwtClaims, PrincipalId, Role, TokenValidationError, validate_claims};

/// Claims as they appear on the wire.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    roles: Vec<String>,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token decode failed: {0}")]
    Decode(String),

    #[error("invalid subject claim")]
    InvalidSubject,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// HS256 token decoder bound to a shared secret.
pub struct HsTokenDecoder {
    decoding: DecodingKey,
    validation: Validation,
}

impl HsTokenDecoder {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = jsonwebtoken::decode::<WireClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Decode(e.to_string()))?;

        let claims = JwtClaims {
            sub: data
                .claims
                .sub
                .parse::<PrincipalId>()
                .map_err(|_| TokenError::InvalidSubject)?,
            roles: data.claims.roles.into_iter().map(Role::new).collect(),
            issued_at: timestamp(data.claims.iat).ok_or(TokenError::InvalidSubject)?,
            expires_at: timestamp(data.claims.exp).ok_or(TokenError::InvalidSubject)?,
        };

        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

/// Mint a token for the given claims (dev tooling and tests).
pub fn issue_token(secret: &str, claims: &JwtClaims) -> Result<String, TokenError> {
    let wire = WireClaims {
        sub: claims.sub.to_string(),
        roles: claims.roles.iter().map(|r| r.as_str().to_string()).collect(),
        iat: claims.issued_at.timestamp(),
        exp: claims.expires_at.timestamp(),
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &wire,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Decode(e.to_string()))
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: PrincipalId::new(),
            roles: vec![Role::new("storekeeper")],
            issued_at: now - Duration::minutes(1),
            expires_at: now + Duration::hours(1),
        }
    }

    #[test]
    fn round_trips_valid_token() {
        let now = Utc::now();
        let claims = claims(now);
        let token = issue_token("secret", &claims).unwrap();

        let decoded = HsTokenDecoder::new("secret").decode(&token, now).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.roles, claims.roles);
    }

    #[test]
    fn rejects_wrong_secret() {
        let now = Utc::now();
        let token = issue_token("secret", &claims(now)).unwrap();
        assert!(HsTokenDecoder::new("other").decode(&token, now).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let now = Utc::now();
        let mut c = claims(now);
        c.issued_at = now - Duration::hours(3);
        c.expires_at = now - Duration::hours(2);
        let token = issue_token("secret", &c).unwrap();
        assert!(HsTokenDecoder::new("secret").decode(&token, now).is_err());
    }
}
