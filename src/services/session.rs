use std::future::Future;

use thiserror::Error;

use crate::models::admin_user::AdminUser;
use crate::models::auth::{Principal, TokenPair};
use crate::services::cookies::RefreshCookie;
use crate::services::tokens::{TokenError, TokenService};
use crate::services::StoreError;

/// Store holding admin credentials, consulted on login and refresh.
/// Implementations must bound each lookup to a deadline so a wedged store
/// cannot hold a session flow open indefinitely.
pub trait CredentialStore {
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<AdminUser>, StoreError>> + Send;

    fn find_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<AdminUser>, StoreError>> + Send;
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// Covers both unknown email and wrong password; callers must not be
    /// able to tell the two apart.
    #[error("invalid authentication credentials")]
    InvalidCredentials,
    #[error("no refresh cookie in the request")]
    MissingCredential,
    /// Claims reference an admin that no longer exists.
    #[error("unknown admin user")]
    UnknownPrincipal,
    #[error("password verification failed: {0}")]
    Hash(bcrypt::BcryptError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Login, refresh and logout over a stateless, cookie-carried session.
/// No session table exists: everything a flow needs arrives in the request
/// or lives in the immutable config.
#[derive(Clone)]
pub struct SessionService<S> {
    store: S,
    tokens: TokenService,
    cookie: RefreshCookie,
}

impl<S: CredentialStore> SessionService<S> {
    pub fn new(store: S, tokens: TokenService, cookie: RefreshCookie) -> Self {
        Self {
            store,
            tokens,
            cookie,
        }
    }

    /// Verify email/password and mint the first token pair of a session.
    /// Returns the pair together with the Set-Cookie value carrying the
    /// refresh token.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(TokenPair, String), SessionError> {
        let admin = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(SessionError::InvalidCredentials)?;

        let matches =
            bcrypt::verify(password, &admin.password_hash).map_err(SessionError::Hash)?;
        if !matches {
            return Err(SessionError::InvalidCredentials);
        }

        let pair = self.tokens.generate_token_pair(&Principal::from(&admin))?;
        let cookie = self.cookie.active(&pair.refresh_token);
        Ok((pair, cookie))
    }

    /// Exchange a still-valid refresh cookie for a fresh token pair,
    /// rotating the cookie. The admin is re-fetched from the store rather
    /// than trusted from the claims, so a deleted account is rejected even
    /// while its signature is still good.
    pub async fn refresh(
        &self,
        cookie_header: Option<&str>,
    ) -> Result<(TokenPair, String), SessionError> {
        let refresh_token = cookie_header
            .and_then(|header| find_cookie(header, self.cookie.name()))
            .ok_or(SessionError::MissingCredential)?;

        let claims = self.tokens.validate_token(&refresh_token)?;
        let admin_id = claims.principal_id()?;

        let admin = self
            .store
            .find_by_id(admin_id)
            .await?
            .ok_or(SessionError::UnknownPrincipal)?;

        let pair = self.tokens.generate_token_pair(&Principal::from(&admin))?;
        let cookie = self.cookie.active(&pair.refresh_token);
        Ok((pair, cookie))
    }

    /// Emit the expired cookie. Stateless by design: tokens already issued
    /// stay valid until their natural expiry, logout only stops future
    /// automatic refresh.
    pub fn logout(&self) -> String {
        self.cookie.expired()
    }
}

/// Extract a named cookie value from a Cookie request header.
fn find_cookie(header: &str, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    header.split(';').find_map(|part| {
        part.trim()
            .strip_prefix(prefix.as_str())
            .map(|value| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Arc;

    use chrono::Utc;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    use crate::config::Config;
    use crate::models::auth::Claims;

    struct InMemoryAdmins {
        by_id: HashMap<i64, AdminUser>,
    }

    impl InMemoryAdmins {
        fn with(admins: Vec<AdminUser>) -> Self {
            Self {
                by_id: admins.into_iter().map(|a| (a.id, a)).collect(),
            }
        }
    }

    impl CredentialStore for InMemoryAdmins {
        async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, StoreError> {
            Ok(self.by_id.values().find(|a| a.email == email).cloned())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<AdminUser>, StoreError> {
            Ok(self.by_id.get(&id).cloned())
        }
    }

    fn test_config(secret: &str) -> Arc<Config> {
        Arc::new(Config {
            database_url: "postgres://localhost/galeria_test".into(),
            host: "127.0.0.1".into(),
            port: 4000,
            environment: "test".into(),
            jwt_secret: secret.into(),
            jwt_issuer: "ejemplo.com".into(),
            jwt_audience: "ejemplo.com".into(),
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

    fn admin(id: i64, email: &str, password: &str) -> AdminUser {
        AdminUser {
            id,
            first_name: "Jesus".into(),
            last_name: "Marin".into(),
            email: email.into(),
            // low cost keeps the tests fast
            password_hash: bcrypt::hash(password, 4).unwrap(),
            activated: true,
            created_at: Utc::now(),
            version: 1,
        }
    }

    fn service_with(secret: &str, admins: Vec<AdminUser>) -> SessionService<InMemoryAdmins> {
        let config = test_config(secret);
        SessionService::new(
            InMemoryAdmins::with(admins),
            TokenService::new(config.clone()),
            RefreshCookie::new(config),
        )
    }

    fn cookie_header(sessions_cookie: &str) -> String {
        // value up to the first attribute, as a browser would send it back
        sessions_cookie
            .split(';')
            .next()
            .unwrap()
            .trim()
            .to_string()
    }

    #[tokio::test]
    async fn test_login_issues_pair_and_sets_cookie() {
        let svc = service_with("test-secret", vec![admin(7, "jesus@ejemplo.com", "pa55word!")]);

        let (pair, cookie) = svc.login("jesus@ejemplo.com", "pa55word!").await.unwrap();

        let tokens = TokenService::new(test_config("test-secret"));
        assert_eq!(tokens.validate_token(&pair.access_token).unwrap().sub, "7");
        assert_eq!(tokens.validate_token(&pair.refresh_token).unwrap().sub, "7");
        assert!(cookie.starts_with(&format!("_Host-refresh_token={}", pair.refresh_token)));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let svc = service_with("test-secret", vec![admin(7, "jesus@ejemplo.com", "pa55word!")]);

        let wrong_password = svc.login("jesus@ejemplo.com", "nope").await;
        let unknown_email = svc.login("nobody@ejemplo.com", "pa55word!").await;

        assert!(matches!(
            wrong_password,
            Err(SessionError::InvalidCredentials)
        ));
        assert!(matches!(unknown_email, Err(SessionError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_refresh_rotates_the_pair() {
        let svc = service_with("test-secret", vec![admin(7, "jesus@ejemplo.com", "pa55word!")]);
        let (first, cookie) = svc.login("jesus@ejemplo.com", "pa55word!").await.unwrap();

        // claims carry second-resolution timestamps, so cross a second
        // boundary to observe the rotation
        std::thread::sleep(std::time::Duration::from_millis(1100));

        let (second, new_cookie) = svc.refresh(Some(&cookie_header(&cookie))).await.unwrap();

        assert_ne!(first.refresh_token, second.refresh_token);
        assert_ne!(first.access_token, second.access_token);
        assert!(new_cookie.starts_with(&format!("_Host-refresh_token={}", second.refresh_token)));

        let tokens = TokenService::new(test_config("test-secret"));
        assert_eq!(tokens.validate_token(&second.access_token).unwrap().sub, "7");
    }

    #[tokio::test]
    async fn test_refresh_without_cookie() {
        let svc = service_with("test-secret", vec![admin(7, "jesus@ejemplo.com", "pa55word!")]);

        assert!(matches!(
            svc.refresh(None).await,
            Err(SessionError::MissingCredential)
        ));
        assert!(matches!(
            svc.refresh(Some("other_cookie=value")).await,
            Err(SessionError::MissingCredential)
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_foreign_signature() {
        let svc = service_with("test-secret", vec![admin(7, "jesus@ejemplo.com", "pa55word!")]);
        let other = service_with("another-secret", vec![admin(7, "jesus@ejemplo.com", "pa55word!")]);

        let (_, cookie) = other.login("jesus@ejemplo.com", "pa55word!").await.unwrap();

        assert!(matches!(
            svc.refresh(Some(&cookie_header(&cookie))).await,
            Err(SessionError::Token(TokenError::Signature))
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_expired_token() {
        let svc = service_with("test-secret", vec![admin(7, "jesus@ejemplo.com", "pa55word!")]);

        let now = Utc::now().timestamp();
        let stale = Claims {
            sub: "7".into(),
            iss: "ejemplo.com".into(),
            aud: "ejemplo.com".into(),
            iat: (now - 3600) as usize,
            exp: (now - 1800) as usize,
            first_name: "Jesus".into(),
            last_name: "Marin".into(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &stale,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(
            svc.refresh(Some(&format!("_Host-refresh_token={token}"))).await,
            Err(SessionError::Token(TokenError::Expired))
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_deleted_admin() {
        // token minted for id 9, but the store only knows id 7
        let svc = service_with("test-secret", vec![admin(7, "jesus@ejemplo.com", "pa55word!")]);
        let tokens = TokenService::new(test_config("test-secret"));
        let pair = tokens
            .generate_token_pair(&Principal {
                id: 9,
                first_name: "Gone".into(),
                last_name: "Admin".into(),
            })
            .unwrap();

        assert!(matches!(
            svc.refresh(Some(&format!("_Host-refresh_token={}", pair.refresh_token)))
                .await,
            Err(SessionError::UnknownPrincipal)
        ));
    }

    #[tokio::test]
    async fn test_logout_clears_cookie_but_does_not_revoke() {
        let svc = service_with("test-secret", vec![admin(7, "jesus@ejemplo.com", "pa55word!")]);
        let (_, cookie) = svc.login("jesus@ejemplo.com", "pa55word!").await.unwrap();

        let cleared = svc.logout();
        assert!(cleared.starts_with("_Host-refresh_token=;"));
        assert!(cleared.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));

        // stateless sessions: the pre-logout refresh token still works
        // until it expires on its own
        let replay = svc.refresh(Some(&cookie_header(&cookie))).await;
        assert!(replay.is_ok());
    }

    #[test]
    fn test_find_cookie_among_many() {
        let header = "theme=dark; _Host-refresh_token=tok-123; lang=es";
        assert_eq!(
            find_cookie(header, "_Host-refresh_token"),
            Some("tok-123".into())
        );
        assert_eq!(find_cookie(header, "session"), None);
    }
}
