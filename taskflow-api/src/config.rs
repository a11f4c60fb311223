/// Configuration management for the API server
///
/// Loads configuration from environment variables (a `.env` file is honoured
/// in development) into a type-safe struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `PORT`: Port to bind to (default: 5000)
/// - `PUBLIC_URL`: Base URL for password reset links when a request has no `Host` header
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `PRODUCTION`: Enables HSTS when `true`
/// - `JWT_SECRET`: Secret key for JWT signing (required, at least 32 characters)
/// - `JWT_EXPIRE`: Session lifetime, `<n>s|m|h|d` or bare seconds (default: `1d`)
/// - `OTP_EXPIRE`: OTP validity window in milliseconds (default: 600000)
/// - `EMAIL_API_URL`, `EMAIL_API_KEY`, `EMAIL_FROM`: HTTP email transport
///
/// # Example
///
/// ```no_run
/// use taskflow_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use taskflow_shared::services::IdentitySettings;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_JWT_EXPIRE: &str = "1d";
const DEFAULT_OTP_EXPIRE_MS: i64 = 600_000;
const DEFAULT_EMAIL_FROM: &str = "Task Management System <noreply@taskflow.local>";
const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub otp: OtpConfig,
    pub email: EmailConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Fallback base URL for links sent by email
    pub public_url: String,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,

    /// Production mode (HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be kept secret and be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Session token lifetime in seconds
    pub expire_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    /// Validity window in milliseconds
    pub expire_ms: i64,
}

/// Email transport configuration
///
/// Without `api_url` the server logs outgoing mail instead of sending it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value cannot
    /// be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match var("PORT") {
            Some(v) => v.parse::<u16>()?,
            None => DEFAULT_PORT,
        };
        let public_url = var("PUBLIC_URL").unwrap_or_else(|| format!("http://localhost:{}", port));
        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        let production = var("PRODUCTION")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v.parse::<u32>()?,
            None => 10,
        };

        let jwt_secret = var("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }
        let expire_seconds =
            parse_duration_seconds(&var("JWT_EXPIRE").unwrap_or_else(|| DEFAULT_JWT_EXPIRE.to_string()))?;

        let otp_expire_ms = match var("OTP_EXPIRE") {
            Some(v) => v.parse::<i64>()?,
            None => DEFAULT_OTP_EXPIRE_MS,
        };
        if otp_expire_ms <= 0 {
            anyhow::bail!("OTP_EXPIRE must be a positive number of milliseconds");
        }

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                public_url,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expire_seconds,
            },
            otp: OtpConfig {
                expire_ms: otp_expire_ms,
            },
            email: EmailConfig {
                api_url: var("EMAIL_API_URL"),
                api_key: var("EMAIL_API_KEY"),
                from: var("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Token settings for the identity engine
    pub fn identity_settings(&self) -> IdentitySettings {
        IdentitySettings {
            jwt_secret: self.jwt.secret.clone(),
            session_ttl: chrono::Duration::seconds(self.jwt.expire_seconds),
            otp_ttl: chrono::Duration::milliseconds(self.otp.expire_ms),
        }
    }
}

/// Parses `30s`, `15m`, `12h`, `1d`, or bare seconds
pub fn parse_duration_seconds(raw: &str) -> anyhow::Result<i64> {
    let raw = raw.trim();
    let (digits, multiplier) = match raw.chars().last() {
        Some('s') => (&raw[..raw.len() - 1], 1),
        Some('m') => (&raw[..raw.len() - 1], 60),
        Some('h') => (&raw[..raw.len() - 1], 3_600),
        Some('d') => (&raw[..raw.len() - 1], 86_400),
        Some(_) => (raw, 1),
        None => anyhow::bail!("duration is empty"),
    };

    let value: i64 = digits
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid duration: {}", raw))?;
    if value <= 0 {
        anyhow::bail!("duration must be positive: {}", raw);
    }

    Ok(value * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://localhost/taskflow"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.api.public_url, "http://localhost:5000");
        assert_eq!(config.api.cors_origins, vec!["*".to_string()]);
        assert!(!config.api.production);
        assert_eq!(config.jwt.expire_seconds, 86_400);
        assert_eq!(config.otp.expire_ms, 600_000);
        assert!(config.email.api_url.is_none());

        let settings = config.identity_settings();
        assert_eq!(settings.otp_ttl.num_minutes(), 10);
        assert_eq!(settings.session_ttl.num_hours(), 24);
    }

    #[test]
    fn test_required_variables() {
        assert!(Config::from_lookup(lookup(&[("JWT_SECRET", SECRET)])).is_err());
        assert!(Config::from_lookup(lookup(&[("DATABASE_URL", "postgresql://x")])).is_err());
        assert!(Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://x"),
            ("JWT_SECRET", "short"),
        ]))
        .is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://x"),
            ("JWT_SECRET", SECRET),
            ("PORT", "8080"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("PRODUCTION", "true"),
            ("JWT_EXPIRE", "12h"),
            ("OTP_EXPIRE", "60000"),
            ("EMAIL_API_URL", "https://mail.example/send"),
        ]))
        .unwrap();

        assert_eq!(config.api.port, 8080);
        assert_eq!(config.api.cors_origins.len(), 2);
        assert!(config.api.production);
        assert_eq!(config.jwt.expire_seconds, 43_200);
        assert_eq!(config.identity_settings().otp_ttl.num_minutes(), 1);
        assert_eq!(config.email.api_url.as_deref(), Some("https://mail.example/send"));
    }

    #[test]
    fn test_parse_duration_seconds() {
        assert_eq!(parse_duration_seconds("30s").unwrap(), 30);
        assert_eq!(parse_duration_seconds("15m").unwrap(), 900);
        assert_eq!(parse_duration_seconds("1d").unwrap(), 86_400);
        assert_eq!(parse_duration_seconds("3600").unwrap(), 3_600);
        assert!(parse_duration_seconds("").is_err());
        assert!(parse_duration_seconds("abc").is_err());
        assert!(parse_duration_seconds("0h").is_err());
    }
}
