use anyhow::{Context, Result, anyhow};
use std::{str::FromStr, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub run_migrations: bool,
    pub port: u16,
    pub db_min_conn: u32,
    pub db_max_conn: u32,
    pub media_root: String,
    pub public_base_url: String,
    pub exchange_rate_api_url: String,
    pub exchange_rate_api_key: String,
    pub exchange_rate_timeout: Duration,
    pub otel_endpoint: String,
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Missing environment variable: {key}"))
}

fn optional_parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{value}'")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn init() -> Result<Self> {
        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let run_migrations_str = required("RUN_MIGRATIONS")?;
        let port_str = required("PORT")?;

        let run_migrations = match run_migrations_str.as_str() {
            "true" => true,
            "false" => false,
            other => {
                return Err(anyhow!(
                    "RUN_MIGRATIONS must be 'true' or 'false', got '{}'",
                    other
                ));
            }
        };

        let port = port_str
            .parse::<u16>()
            .context("PORT must be a valid u16 integer")?;

        let db_min_conn = optional_parsed("DB_MIN_CONN", 2)?;
        let db_max_conn = optional_parsed("DB_MAX_CONN", 10)?;
        if db_min_conn > db_max_conn {
            return Err(anyhow!(
                "DB_MIN_CONN ({db_min_conn}) cannot exceed DB_MAX_CONN ({db_max_conn})"
            ));
        }

        let media_root = std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".to_string());
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));

        let exchange_rate_api_url = std::env::var("EXCHANGE_RATE_API_URL")
            .unwrap_or_else(|_| "http://api.exchangeratesapi.io/v1/latest".to_string());
        let exchange_rate_api_key = required("EXCHANGE_RATE_API_KEY")?;
        let exchange_rate_timeout =
            Duration::from_secs(optional_parsed("EXCHANGE_RATE_TIMEOUT_SECS", 10)?);

        let otel_endpoint = std::env::var("OTEL_ENDPOINT")
            .unwrap_or_else(|_| "http://otel-collector:4317".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            run_migrations,
            port,
            db_min_conn,
            db_max_conn,
            media_root,
            public_base_url,
            exchange_rate_api_url,
            exchange_rate_api_key,
            exchange_rate_timeout,
            otel_endpoint,
        })
    }
}
