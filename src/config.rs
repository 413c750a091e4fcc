use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Base URL under which uploaded objects are publicly readable.
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database_url: String,
    pub jwt: JwtConfig,
    pub reset_token_ttl_minutes: i64,
    pub frontend_url: String,
    pub storage: StorageConfig,
    pub email: EmailConfig,
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: var_or("JWT_ISSUER", "folio"),
            audience: var_or("JWT_AUDIENCE", "folio-users"),
            ttl_days: parsed_or("SESSION_TTL_DAYS", 15),
        };
        let storage = StorageConfig {
            endpoint: std::env::var("S3_ENDPOINT")?,
            bucket: std::env::var("S3_BUCKET")?,
            access_key: std::env::var("S3_ACCESS_KEY")?,
            secret_key: std::env::var("S3_SECRET_KEY")?,
            region: var_or("S3_REGION", "us-east-1"),
            public_url: std::env::var("S3_PUBLIC_URL")?,
        };
        let email = EmailConfig {
            api_url: std::env::var("EMAIL_API_URL")?,
            api_key: std::env::var("EMAIL_API_KEY")?,
            sender: std::env::var("EMAIL_SENDER")?,
            timeout_ms: parsed_or("EMAIL_TIMEOUT_MS", 10_000),
        };
        Ok(Self {
            server: ServerConfig {
                host: var_or("APP_HOST", "0.0.0.0"),
                port: parsed_or("APP_PORT", 8080),
            },
            database_url,
            jwt,
            // 15 hours, not minutes; the value the reset flow has always used.
            reset_token_ttl_minutes: parsed_or("RESET_TOKEN_TTL_MINUTES", 15 * 60),
            frontend_url: var_or("FRONTEND_URL", "http://localhost:5173"),
            storage,
            email,
        })
    }
}
