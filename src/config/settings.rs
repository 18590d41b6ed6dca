use std::env;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Missing required environment variable: {0}")]
    MissingVariable(&'static str),
}

/// SMTP settings for the outbound mail sender
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

/// Application settings loaded from the environment once at startup
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub database_url: String,
    pub bind_addr: String,

    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub otp_ttl_minutes: i64,

    /// Password assigned to bulk-imported accounts
    pub default_import_password: String,

    pub smtp: SmtpSettings,

    /// Directory the filesystem blob store writes into
    pub blob_root: String,

    /// Base URL joined onto blob keys to form public URLs
    pub blob_public_base_url: String,
}

impl AppSettings {
    /// Load settings from environment variables.
    ///
    /// `JWT_SECRET` is required; everything else falls back to a development
    /// default.
    pub fn from_env() -> Result<Self, SettingsError> {
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| SettingsError::MissingVariable("JWT_SECRET"))?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://courseledger.db?mode=rwc".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let token_ttl_minutes = env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let otp_ttl_minutes = env::var("OTP_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let default_import_password =
            env::var("DEFAULT_IMPORT_PASSWORD").unwrap_or_else(|_| "111111".to_string());

        let smtp = SmtpSettings {
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            username: env::var("SMTP_USERNAME").unwrap_or_default(),
            password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_address: env::var("SMTP_FROM")
                .unwrap_or_else(|_| "no-reply@courseledger.local".to_string()),
        };

        let blob_root = env::var("BLOB_ROOT").unwrap_or_else(|_| "uploads".to_string());

        let blob_public_base_url = env::var("BLOB_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/uploads".to_string());

        Ok(Self {
            database_url,
            bind_addr,
            jwt_secret,
            token_ttl_minutes,
            otp_ttl_minutes,
            default_import_password,
            smtp,
            blob_root,
            blob_public_base_url,
        })
    }
}

impl std::fmt::Display for AppSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AppSettings {{ database_url: {}, bind_addr: {}, jwt_secret: <redacted>, smtp: {} }}",
            self.database_url, self.bind_addr, self.smtp.host
        )
    }
}
