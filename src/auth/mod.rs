use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Role claim carried by tokens minted with the auth provider's service key
pub const SERVICE_ROLE: &str = "service_role";

/// Claims of an access token issued by the external auth provider.
///
/// User tokens carry `sub`. Service-role keys only carry `role`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<Uuid>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: Uuid, role: impl Into<String>, ttl: Duration) -> Self {
        Self::issued(Some(sub), role.into(), ttl)
    }

    /// Subject-less claims in the shape of a service-role key
    pub fn service(ttl: Duration) -> Self {
        Self::issued(None, SERVICE_ROLE.to_string(), ttl)
    }

    fn issued(sub: Option<Uuid>, role: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub,
            role: Some(role),
            aud: None,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn with_audience(mut self, aud: impl Into<String>) -> Self {
        self.aud = Some(aud.into());
        self
    }

    pub fn is_service(&self) -> bool {
        self.role.as_deref() == Some(SERVICE_ROLE)
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    Invalid(String),
}

/// HS256 verifier shared by the auth middleware
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").field("aud", &self.validation.aud).finish()
    }
}

impl TokenVerifier {
    pub fn new(secret: &str, audience: Option<&str>) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let mut validation = Validation::default();
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| JwtError::Invalid(e.to_string()))
    }
}

/// Signs claims with the shared secret. Tokens are normally minted by the
/// auth provider; this is for local tooling and tests.
pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn round_trips_claims() {
        let user = Uuid::new_v4();
        let claims = Claims::new(user, "authenticated", Duration::hours(1));
        let token = generate_jwt(&claims, SECRET).unwrap();

        let claims = TokenVerifier::new(SECRET, None).unwrap().verify(&token).unwrap();
        assert_eq!(claims.sub, Some(user));
        assert!(!claims.is_service());
    }

    #[test]
    fn rejects_expired_and_foreign_tokens() {
        let verifier = TokenVerifier::new(SECRET, None).unwrap();

        let stale = Claims::new(Uuid::new_v4(), "authenticated", Duration::hours(-2));
        let expired = generate_jwt(&stale, SECRET).unwrap();
        assert!(matches!(verifier.verify(&expired), Err(JwtError::Invalid(_))));

        let claims = Claims::new(Uuid::new_v4(), "authenticated", Duration::hours(1));
        let foreign = generate_jwt(&claims, "other").unwrap();
        assert!(verifier.verify(&foreign).is_err());
    }

    #[test]
    fn enforces_configured_audience() {
        let verifier = TokenVerifier::new(SECRET, Some("authenticated")).unwrap();
        let claims = Claims::new(Uuid::new_v4(), SERVICE_ROLE, Duration::hours(1));

        let without_aud = generate_jwt(&claims, SECRET).unwrap();
        assert!(verifier.verify(&without_aud).is_err());

        let with_aud = generate_jwt(&claims.with_audience("authenticated"), SECRET).unwrap();
        assert!(verifier.verify(&with_aud).unwrap().is_service());
    }

    #[test]
    fn accepts_service_keys_without_subject() {
        let verifier = TokenVerifier::new(SECRET, None).unwrap();
        let token = generate_jwt(&Claims::service(Duration::hours(1)), SECRET).unwrap();

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, None);
        assert!(claims.is_service());
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(TokenVerifier::new("", None), Err(JwtError::InvalidSecret)));
    }
}
