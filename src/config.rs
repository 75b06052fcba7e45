use std::net::SocketAddr;

use crate::error::ConfigError;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/vrishti";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SENDER_NAME: &str = "Vrishti Bandhan";
const DEFAULT_BCRYPT_COST: u32 = 10;
// Range accepted by bcrypt::hash
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

#[derive(Debug, Clone)]
pub struct MailCredentials {
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub smtp_host: String,
    pub sender_name: String,
    /// `None` when either `EMAIL_USER` or `EMAIL_PASS` is unset.
    pub mail: Option<MailCredentials>,
    pub bcrypt_cost: u32,
}

impl Config {
    // Read after dotenv so .env values are visible
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let bcrypt_cost = match get("BCRYPT_COST") {
            Some(raw) => raw.parse::<u32>().map_err(|e| ConfigError::Invalid {
                name: "BCRYPT_COST",
                reason: e.to_string(),
            })?,
            None => DEFAULT_BCRYPT_COST,
        };
        if !BCRYPT_COST_RANGE.contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                reason: format!(
                    "must be between {} and {}",
                    BCRYPT_COST_RANGE.start(),
                    BCRYPT_COST_RANGE.end()
                ),
            });
        }

        let mail = match (get("EMAIL_USER"), get("EMAIL_PASS")) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Some(MailCredentials { user, pass })
            }
            _ => None,
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr,
            smtp_host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            sender_name: get("MAIL_SENDER_NAME").unwrap_or_else(|| DEFAULT_SENDER_NAME.to_string()),
            mail,
            bcrypt_cost,
        })
    }
}
