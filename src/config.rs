use std::{env, str::FromStr, time::Duration};

use actix_web::cookie::{time, Key};

use crate::errors::AppError;

const MIN_SESSION_KEY_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub session_key: Vec<u8>,
    pub session_ttl: Duration,
    pub remember_ttl: Duration,
    pub request_timeout: Duration,
    pub admin_emails: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://crewdesk.db".to_owned(),
            bind_addr: "0.0.0.0:8080".to_owned(),
            session_key: Vec::new(),
            session_ttl: Duration::from_secs(720 * 60),
            remember_ttl: Duration::from_secs(365 * 24 * 60 * 60),
            request_timeout: Duration::from_secs(30),
            admin_emails: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let session_key = env::var("SESSION_KEY")?.into_bytes();
        if session_key.len() < MIN_SESSION_KEY_LEN {
            return Err(AppError::ConfigError(format!(
                "SESSION_KEY must be at least {} bytes long",
                MIN_SESSION_KEY_LEN
            )));
        }

        let session_minutes: u64 = parse_var("SESSION_TTL_MINUTES", 720)?;
        let remember_days: u64 = parse_var("REMEMBER_TTL_DAYS", 365)?;
        let timeout_secs: u64 = parse_var("REQUEST_TIMEOUT_SECS", 30)?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            session_key,
            session_ttl: scaled_secs("SESSION_TTL_MINUTES", session_minutes, 60)?,
            remember_ttl: scaled_secs("REMEMBER_TTL_DAYS", remember_days, 24 * 60 * 60)?,
            request_timeout: Duration::from_secs(timeout_secs),
            admin_emails: parse_admin_emails(&env::var("ADMIN_EMAILS").unwrap_or_default()),
        })
    }

    /// Cookie signing key. Falls back to a random key when none is configured.
    pub fn cookie_key(&self) -> Key {
        if self.session_key.len() >= MIN_SESSION_KEY_LEN {
            Key::from(self.session_key.as_slice())
        } else {
            Key::generate()
        }
    }

    /// Lifetime of the persistent session cookie.
    pub fn cookie_ttl(&self) -> Result<time::Duration, AppError> {
        time::Duration::try_from(self.remember_ttl)
            .map_err(|_| AppError::ConfigError("REMEMBER_TTL_DAYS is too large".to_owned()))
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|admin| *admin == email)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::ConfigError(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

/// `amount` units of `unit_secs` seconds, rejecting values a cookie max-age cannot hold.
fn scaled_secs(name: &str, amount: u64, unit_secs: u64) -> Result<Duration, AppError> {
    amount
        .checked_mul(unit_secs)
        .filter(|secs| i64::try_from(*secs).is_ok())
        .map(Duration::from_secs)
        .ok_or_else(|| AppError::ConfigError(format!("{} is too large: {}", name, amount)))
}

fn parse_admin_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_emails_are_normalized() {
        let emails = parse_admin_emails(" Boss@Example.com, ,ops@example.com ");
        assert_eq!(emails, vec!["boss@example.com", "ops@example.com"]);
    }

    #[test]
    fn admin_lookup_ignores_case() {
        let config = AppConfig {
            admin_emails: vec!["boss@example.com".to_owned()],
            ..AppConfig::default()
        };
        assert!(config.is_admin_email("BOSS@example.com "));
        assert!(!config.is_admin_email("worker@example.com"));
    }

    #[test]
    fn huge_ttls_are_rejected() {
        assert_eq!(scaled_secs("REMEMBER_TTL_DAYS", 365, 86_400).unwrap(), Duration::from_secs(31_536_000));
        assert!(matches!(
            scaled_secs("REMEMBER_TTL_DAYS", u64::MAX / 1000, 86_400),
            Err(AppError::ConfigError(_))
        ));
        // Fits in u64 but not in a cookie max-age.
        assert!(matches!(
            scaled_secs("SESSION_TTL_MINUTES", u64::MAX / 60, 60),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn cookie_ttl_matches_remember_ttl() {
        let config = AppConfig::default();
        assert_eq!(config.cookie_ttl().unwrap(), time::Duration::days(365));
    }

    #[test]
    fn short_key_falls_back_to_generated() {
        let config = AppConfig::default();
        // Must not panic on an empty key.
        let _ = config.cookie_key();
    }
}
