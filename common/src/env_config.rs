use std::{env, path::PathBuf, str::FromStr, sync::Arc};

use crate::error::{AppError, Res};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// Holds the server parameters, authentication and payment secrets,
/// and the tunables of the premium policy (free friend limit, daily bonus,
/// payment fallback).
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Minimum log level (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
    /// File the logger appends to.
    pub log_file: String,
    /// Configuration for JWT (JSON Web Token) authentication.
    pub jwt_config: JwtConfig,
    /// Stripe secret key. Empty means no payment provider is available.
    pub stripe_secret_key: String,
    /// Stripe webhook secret
    pub stripe_webhook_secret: String,
    /// Number of friends a free user may keep.
    pub free_friend_limit: usize,
    /// Coins credited by the daily bonus.
    pub daily_bonus_coins: u64,
    /// What to do when a payment cannot be verified.
    pub payment_fallback: PaymentFallback,
    /// Directory holding one entitlement file per user. In-memory when unset.
    pub entitlement_data_dir: Option<PathBuf>,
}

#[derive(Clone, Debug)]
/// Configuration for JSON Web Token (JWT) authentication.
pub struct JwtConfig {
    /// The secret key used to sign and verify JWTs.
    pub secret: String,
    /// The expiration time for JWTs in hours.
    pub expiration_hours: i64,
}

/// Behaviour when the payment provider cannot confirm a purchase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaymentFallback {
    /// Refuse the grant until a verified confirmation arrives.
    #[default]
    Deny,
    /// Grant premium anyway. Unpaid grants become possible, so this is opt-in only.
    OptimisticGrant,
}

impl FromStr for PaymentFallback {
    type Err = AppError;

    fn from_str(s: &str) -> Res<Self> {
        match s.trim().to_lowercase().as_str() {
            "deny" => Ok(PaymentFallback::Deny),
            "optimistic-grant" => Ok(PaymentFallback::OptimisticGrant),
            other => Err(AppError::BadRequest(format!(
                "PAYMENT_FALLBACK must be 'deny' or 'optimistic-grant', got '{}'",
                other
            ))),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// A `.env` file is loaded first when present.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `JWT_SECRET`: Secret key for JWT signing
    ///
    /// Optional (with defaults):
    /// - `ENVIRONMENT`: "development"
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING`: default true
    /// - `LOG_LEVEL`: default "debug"; `LOG_FILE`: default "premium.log"
    /// - `JWT_EXPIRATION_HOURS`: default 24
    /// - `STRIPE_SECRET_KEY`, `STRIPE_WEBHOOK_SECRET`: default empty
    /// - `FREE_FRIEND_LIMIT`: default 5
    /// - `DAILY_BONUS_COINS`: default 5
    /// - `PAYMENT_FALLBACK`: "deny" (default) or "optimistic-grant"
    /// - `ENTITLEMENT_DATA_DIR`: unset keeps entitlements in memory
    pub fn from_env() -> Res<Arc<Self>> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok()).map(Arc::new)
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Res<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_config = JwtConfig {
            secret: lookup("JWT_SECRET")
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AppError::BadRequest("JWT_SECRET must be set".to_string()))?,
            expiration_hours: parse_var("JWT_EXPIRATION_HOURS", &var_or("JWT_EXPIRATION_HOURS", "24"))?,
        };

        Ok(Config {
            environment: var_or("ENVIRONMENT", "development"),
            server_host: var_or("IP", "127.0.0.1"),
            server_port: var_or("PORT", "8080").parse().unwrap_or(8080),
            num_workers: var_or("WORKERS", "4").parse().unwrap_or(4),
            cors_allowed_origin: var_or("CORS_ALLOWED_ORIGIN", "http://localhost:3000"),
            console_logging_enabled: var_or("ENABLE_CONSOLE_LOGGING", "true").to_lowercase()
                == "true",
            log_level: var_or("LOG_LEVEL", "debug"),
            log_file: var_or("LOG_FILE", "premium.log"),
            jwt_config,
            stripe_secret_key: var_or("STRIPE_SECRET_KEY", ""),
            stripe_webhook_secret: var_or("STRIPE_WEBHOOK_SECRET", ""),
            free_friend_limit: parse_var("FREE_FRIEND_LIMIT", &var_or("FREE_FRIEND_LIMIT", "5"))?,
            daily_bonus_coins: parse_var("DAILY_BONUS_COINS", &var_or("DAILY_BONUS_COINS", "5"))?,
            payment_fallback: var_or("PAYMENT_FALLBACK", "deny").parse()?,
            entitlement_data_dir: lookup("ENTITLEMENT_DATA_DIR")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Res<T> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{} must be a valid number, got '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = Config::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.server_port, 8080);
        assert_eq!(config.free_friend_limit, 5);
        assert_eq!(config.daily_bonus_coins, 5);
        assert_eq!(config.payment_fallback, PaymentFallback::Deny);
        assert_eq!(config.jwt_config.expiration_hours, 24);
        assert!(config.entitlement_data_dir.is_none());
        assert!(!config.is_production());
    }

    #[test]
    fn missing_jwt_secret_is_rejected() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn policy_tunables_are_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("FREE_FRIEND_LIMIT", "10"),
            ("PAYMENT_FALLBACK", "optimistic-grant"),
            ("ENTITLEMENT_DATA_DIR", "/var/lib/premium"),
        ]))
        .unwrap();

        assert_eq!(config.free_friend_limit, 10);
        assert_eq!(config.payment_fallback, PaymentFallback::OptimisticGrant);
        assert_eq!(
            config.entitlement_data_dir,
            Some(PathBuf::from("/var/lib/premium"))
        );
    }

    #[test]
    fn bad_numbers_and_fallbacks_fail() {
        assert!(
            Config::from_lookup(lookup_from(&[("JWT_SECRET", "x"), ("FREE_FRIEND_LIMIT", "five")]))
                .is_err()
        );
        assert!(
            Config::from_lookup(lookup_from(&[("JWT_SECRET", "x"), ("PAYMENT_FALLBACK", "maybe")]))
                .is_err()
        );
    }
}
