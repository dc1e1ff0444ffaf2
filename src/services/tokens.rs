use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;

use crate::config::Config;
use crate::models::auth::{Claims, Principal, TokenPair};

#[derive(Debug, Error)]
pub enum TokenError {
    /// Issuance failure — internal, never exposed to clients verbatim.
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    Signature,
    #[error("token has expired")]
    Expired,
    #[error("token is not yet valid")]
    NotYetValid,
    #[error("token issuer or audience mismatch")]
    ClaimMismatch,
    #[error("token subject is not a numeric id")]
    MalformedSubject,
}

/// Issues and validates the HS256-signed access/refresh token pairs.
/// Signing and validation are pure in-memory computations over the shared
/// immutable config, so one instance is safely used from every request.
#[derive(Clone)]
pub struct TokenService {
    config: Arc<Config>,
}

impl TokenService {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Build and sign both tokens for an admin. Either both tokens are
    /// returned or the call fails — a pair is never half-issued.
    pub fn generate_token_pair(&self, principal: &Principal) -> Result<TokenPair, TokenError> {
        if self.config.jwt_secret.is_empty() {
            return Err(TokenError::Signing("signing secret is empty".into()));
        }

        let now = Utc::now().timestamp() as usize;
        let access = self.claims_for(principal, now, self.config.access_token_minutes);
        let refresh = self.claims_for(principal, now, self.config.refresh_token_minutes);

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
        })
    }

    fn claims_for(&self, principal: &Principal, now: usize, lifetime_minutes: u64) -> Claims {
        Claims {
            sub: principal.id.to_string(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
            iat: now,
            exp: now + (lifetime_minutes * 60) as usize,
            first_name: principal.first_name.clone(),
            last_name: principal.last_name.clone(),
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token against the configured secret, issuer and audience.
    /// Every check is fail-closed: one failing check rejects the token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.config.jwt_issuer]);
        validation.set_audience(&[&self.config.jwt_audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::Signature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::MissingRequiredClaim(_) => TokenError::ClaimMismatch,
            _ => TokenError::Malformed,
        })?;

        let claims = data.claims;

        // `iat` is informational per RFC 7519, so the library does not
        // check it; a token stamped in the future is rejected here.
        let now = Utc::now().timestamp() as usize;
        if claims.iat > now {
            return Err(TokenError::NotYetValid);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secret: &str, issuer: &str, audience: &str) -> Arc<Config> {
        Arc::new(Config {
            database_url: "postgres://localhost/galeria_test".into(),
            host: "127.0.0.1".into(),
            port: 4000,
            environment: "test".into(),
            jwt_secret: secret.into(),
            jwt_issuer: issuer.into(),
            jwt_audience: audience.into(),
            access_token_minutes: 15,
            refresh_token_minutes: 24,
            cookie_name: "_Host-refresh_token".into(),
            cookie_path: "/".into(),
            cookie_domain: "localhost".into(),
            storage_dir: "/tmp/galeria-test".into(),
            app_base_url: "http://localhost:4000".into(),
            cors_trusted_origins: vec![],
        })
    }

    fn service() -> TokenService {
        TokenService::new(test_config("test-secret", "ejemplo.com", "ejemplo.com"))
    }

    fn principal() -> Principal {
        Principal {
            id: 7,
            first_name: "Jesus".into(),
            last_name: "Marin".into(),
        }
    }

    fn sign_with(secret: &str, claims: &Claims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims_at(iat: i64, exp: i64) -> Claims {
        Claims {
            sub: "7".into(),
            iss: "ejemplo.com".into(),
            aud: "ejemplo.com".into(),
            iat: iat as usize,
            exp: exp as usize,
            first_name: "Jesus".into(),
            last_name: "Marin".into(),
        }
    }

    #[test]
    fn test_round_trip_preserves_claims() {
        let svc = service();
        let pair = svc.generate_token_pair(&principal()).unwrap();

        let access = svc.validate_token(&pair.access_token).unwrap();
        let refresh = svc.validate_token(&pair.refresh_token).unwrap();

        for claims in [&access, &refresh] {
            assert_eq!(claims.sub, "7");
            assert_eq!(claims.principal_id().unwrap(), 7);
            assert_eq!(claims.iss, "ejemplo.com");
            assert_eq!(claims.aud, "ejemplo.com");
            assert_eq!(claims.first_name, "Jesus");
            assert_eq!(claims.last_name, "Marin");
        }

        // access tokens are meant to expire first
        assert!(access.exp < refresh.exp);
        assert_eq!(access.iat, refresh.iat);
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let svc = service();
        let other = TokenService::new(test_config("another-secret", "ejemplo.com", "ejemplo.com"));
        let pair = other.generate_token_pair(&principal()).unwrap();

        assert!(matches!(
            svc.validate_token(&pair.access_token),
            Err(TokenError::Signature)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now().timestamp();
        let token = sign_with("test-secret", &claims_at(now - 600, now - 300));

        assert!(matches!(
            service().validate_token(&token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_token_issued_in_the_future_rejected() {
        let now = Utc::now().timestamp();
        let token = sign_with("test-secret", &claims_at(now + 300, now + 900));

        assert!(matches!(
            service().validate_token(&token),
            Err(TokenError::NotYetValid)
        ));
    }

    #[test]
    fn test_issuer_and_audience_must_match_exactly() {
        let svc = service();

        let wrong_issuer =
            TokenService::new(test_config("test-secret", "otro.com", "ejemplo.com"));
        let pair = wrong_issuer.generate_token_pair(&principal()).unwrap();
        assert!(matches!(
            svc.validate_token(&pair.access_token),
            Err(TokenError::ClaimMismatch)
        ));

        let wrong_audience =
            TokenService::new(test_config("test-secret", "ejemplo.com", "otro.com"));
        let pair = wrong_audience.generate_token_pair(&principal()).unwrap();
        assert!(matches!(
            svc.validate_token(&pair.access_token),
            Err(TokenError::ClaimMismatch)
        ));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        assert!(matches!(
            service().validate_token("not.a.token"),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn test_non_numeric_subject() {
        let now = Utc::now().timestamp();
        let mut claims = claims_at(now, now + 900);
        claims.sub = "not-a-number".into();
        let token = sign_with("test-secret", &claims);

        let validated = service().validate_token(&token).unwrap();
        assert!(matches!(
            validated.principal_id(),
            Err(TokenError::MalformedSubject)
        ));
    }

    #[test]
    fn test_empty_secret_fails_signing() {
        let svc = TokenService::new(test_config("", "ejemplo.com", "ejemplo.com"));
        assert!(matches!(
            svc.generate_token_pair(&principal()),
            Err(TokenError::Signing(_))
        ));
    }
}
