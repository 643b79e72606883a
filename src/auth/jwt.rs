use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::{AuthError, Claims, TrainerRole, TrainerSession};

/// JWT token service for creating and validating access tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .field("access_token_expires_in", &self.access_token_expires_in)
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given secret
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: Duration::hours(12),
        }
    }

    /// Create an access token for a trainer
    pub fn create_access_token(
        &self,
        trainer_id: Uuid,
        email: &str,
        role: TrainerRole,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + self.access_token_expires_in;
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: trainer_id.to_string(),
            email: email.to_string(),
            role,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
            jti,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }

    /// Extract trainer session from token
    pub fn extract_session(&self, token: &str) -> Result<TrainerSession, AuthError> {
        let claims = self.validate_token(token)?;
        TrainerSession::from_claims(&claims).map_err(|_| AuthError::InvalidToken)
    }

    /// Get access token expiration time in seconds
    pub fn access_token_expires_in_seconds(&self) -> usize {
        self.access_token_expires_in.num_seconds() as usize
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, AuthError> {
    if !auth_header.starts_with("Bearer ") {
        return Err(AuthError::InvalidAuthHeaderFormat);
    }

    let token = auth_header.strip_prefix("Bearer ").unwrap();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeaderFormat);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_creation_and_validation() {
        let jwt_service = JwtService::new("test_secret");
        let trainer_id = Uuid::new_v4();
        let email = "trainer@example.com";

        let token = jwt_service
            .create_access_token(trainer_id, email, TrainerRole::Trainer)
            .unwrap();

        let claims = jwt_service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, trainer_id.to_string());
        assert_eq!(claims.email, email);
        assert_eq!(claims.role, TrainerRole::Trainer);
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(
            extract_bearer_token("Bearer test_token").unwrap(),
            "test_token"
        );

        assert!(extract_bearer_token("Invalid header").is_err());
        assert!(extract_bearer_token("Bearer ").is_err());
    }

    #[test]
    fn test_session_extraction() {
        let jwt_service = JwtService::new("test_secret");
        let trainer_id = Uuid::new_v4();
        let email = "admin@example.com";

        let token = jwt_service
            .create_access_token(trainer_id, email, TrainerRole::Admin)
            .unwrap();

        let session = jwt_service.extract_session(&token).unwrap();

        assert_eq!(session.trainer_id, trainer_id);
        assert_eq!(session.email, email);
        assert!(session.role.is_admin());
    }

    #[test]
    fn test_invalid_signature_rejected() {
        let jwt_service = JwtService::new("test_secret");
        let other_service = JwtService::new("other_secret");

        let token = jwt_service
            .create_access_token(Uuid::new_v4(), "trainer@example.com", TrainerRole::Trainer)
            .unwrap();

        assert!(other_service.validate_token(&token).is_err());
    }
}
