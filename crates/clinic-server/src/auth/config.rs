// Authentication configuration loaded from environment variables.
// Decision: AUTH_ prefix for all auth config
// Decision: Sessions last one working day unless configured otherwise

use std::time::Duration;

/// Longest accepted session lifetime (one year)
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Administrator created at startup when missing
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

/// Complete authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime of a login session (cookie max-age and database expiry)
    pub session_ttl: Duration,
    /// Mark the session cookie `Secure` (HTTPS deployments)
    pub cookie_secure: bool,
    /// Bootstrap administrator
    pub admin: Option<AdminConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(8 * 60 * 60), // 8 hours
            cookie_secure: false,
            admin: None,
        }
    }
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let session_ttl = match std::env::var("AUTH_SESSION_TTL") {
            Ok(raw) => parse_session_ttl(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    "Ignoring AUTH_SESSION_TTL={}: expected 1..={} seconds",
                    raw,
                    MAX_SESSION_TTL.as_secs()
                );
                defaults.session_ttl
            }),
            Err(_) => defaults.session_ttl,
        };

        let cookie_secure = std::env::var("AUTH_COOKIE_SECURE")
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.cookie_secure);

        let admin = match (
            std::env::var("AUTH_ADMIN_USERNAME"),
            std::env::var("AUTH_ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) if !username.is_empty() && !password.is_empty() => {
                Some(AdminConfig { username, password })
            }
            _ => None,
        };

        Self {
            session_ttl,
            cookie_secure,
            admin,
        }
    }

    /// Session lifetime in whole seconds, as used for the cookie max-age
    pub fn session_ttl_secs(&self) -> i64 {
        i64::try_from(self.session_ttl.as_secs()).unwrap_or(i64::MAX)
    }
}

/// Session lifetime in seconds; zero or more than `MAX_SESSION_TTL` is rejected
pub fn parse_session_ttl(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
        .filter(|ttl| !ttl.is_zero() && *ttl <= MAX_SESSION_TTL)
}

/// Accepts 1/0, true/false, yes/no, on/off (case-insensitive)
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.session_ttl, Duration::from_secs(28_800));
        assert!(!config.cookie_secure);
        assert!(config.admin.is_none());
        assert_eq!(config.session_ttl_secs(), 28_800);
    }

    #[test]
    fn test_parse_session_ttl() {
        assert_eq!(parse_session_ttl("3600"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_session_ttl(" 60 "), Some(Duration::from_secs(60)));
        assert_eq!(parse_session_ttl("31536000"), Some(MAX_SESSION_TTL));
        assert_eq!(parse_session_ttl("31536001"), None);
        assert_eq!(parse_session_ttl("9000000000000"), None);
        assert_eq!(parse_session_ttl("0"), None);
        assert_eq!(parse_session_ttl("-5"), None);
        assert_eq!(parse_session_ttl("soon"), None);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" YES "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
