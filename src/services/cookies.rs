use std::sync::Arc;

use crate::config::Config;

/// Builds the Set-Cookie values that carry the refresh token between
/// requests. The cookie never reaches page scripts (HttpOnly) and is only
/// sent same-site over TLS.
#[derive(Clone)]
pub struct RefreshCookie {
    config: Arc<Config>,
}

impl RefreshCookie {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Cookie carrying a live refresh token. It lives exactly as long as
    /// the token it transports.
    pub fn active(&self, refresh_token: &str) -> String {
        format!(
            "{}={}; Path={}; Domain={}; Max-Age={}; HttpOnly; Secure; SameSite=Strict",
            self.config.cookie_name,
            refresh_token,
            self.config.cookie_path,
            self.config.cookie_domain,
            self.config.refresh_token_minutes * 60,
        )
    }

    /// Replacement cookie with an expiry pinned to the epoch, so clients
    /// discard it immediately. Emitting it is unconditional — it does not
    /// depend on whether a session cookie was present.
    pub fn expired(&self) -> String {
        format!(
            "{}=; Path={}; Domain={}; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; HttpOnly; Secure; SameSite=Strict",
            self.config.cookie_name, self.config.cookie_path, self.config.cookie_domain,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie() -> RefreshCookie {
        RefreshCookie::new(Arc::new(Config {
            database_url: "postgres://localhost/galeria_test".into(),
            host: "127.0.0.1".into(),
            port: 4000,
            environment: "test".into(),
            jwt_secret: "test-secret".into(),
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
        }))
    }

    #[test]
    fn test_active_cookie_attributes() {
        let value = cookie().active("some.refresh.token");

        assert!(value.starts_with("_Host-refresh_token=some.refresh.token;"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("Domain=localhost"));
        assert!(value.contains("Max-Age=1440"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("SameSite=Strict"));
    }

    #[test]
    fn test_expired_cookie_is_empty_and_in_the_past() {
        let value = cookie().expired();

        assert!(value.starts_with("_Host-refresh_token=;"));
        assert!(value.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("SameSite=Strict"));
    }

    #[test]
    fn test_expired_cookie_is_idempotent() {
        let c = cookie();
        assert_eq!(c.expired(), c.expired());
    }
}
