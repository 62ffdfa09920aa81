//! Configuration module
//!
//! Settings are read from the environment (a `.env` file is loaded first when
//! present). Upload limits are fixed constants and not configurable here.

use std::env;
use std::str::FromStr;

use crate::constants::DEFAULT_UPLOADS_DIR;
use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;

/// What to do with a record when deleting its stored file fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Log the storage failure and remove the record anyway.
    #[default]
    BestEffort,
    /// Fail the request and keep the record so the delete can be retried.
    Strict,
}

impl FromStr for DeletePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "best_effort" | "best-effort" => Ok(DeletePolicy::BestEffort),
            "strict" => Ok(DeletePolicy::Strict),
            _ => Err(anyhow::anyhow!("Invalid delete policy: {}", s)),
        }
    }
}

/// Server, database and environment settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub database_url: String,
    /// Base public address used to derive URLs for locally stored files
    pub app_url: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub delete_policy: DeletePolicy,
    pub uploads_dir: String,
    pub bucket_name: Option<String>,
    pub aws_region: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub s3_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: match var("PORT") {
                Some(port) => port
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
                None => DEFAULT_PORT,
            },
            cors_origins,
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: var("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let storage_backend = match var("STORAGE_TYPE") {
            Some(s) => s.parse()?,
            None => StorageBackend::Local,
        };

        let delete_policy = match var("STORAGE_DELETE_POLICY") {
            Some(s) => s.parse()?,
            None => DeletePolicy::default(),
        };

        let config = Config {
            base,
            database_url: var("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            app_url: var("APP_URL").unwrap_or_else(|| format!("http://localhost:{}", DEFAULT_PORT)),
            storage_backend,
            delete_policy,
            uploads_dir: var("UPLOADS_DIR").unwrap_or_else(|| DEFAULT_UPLOADS_DIR.to_string()),
            bucket_name: var("BUCKET_NAME"),
            aws_region: var("AWS_DEFAULT_REGION").or_else(|| var("AWS_REGION")),
            aws_access_key_id: var("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: var("AWS_SECRET_ACCESS_KEY"),
            s3_endpoint: var("S3_ENDPOINT"),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if !(self.database_url.starts_with("postgres://")
            || self.database_url.starts_with("postgresql://")
            || self.database_url.starts_with("memory://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a PostgreSQL connection string or memory://"
            ));
        }

        if self.base.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS cannot be 0"));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.bucket_name.is_none() {
                    return Err(anyhow::anyhow!(
                        "BUCKET_NAME must be set when using S3 storage backend"
                    ));
                }
                if self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "AWS_DEFAULT_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
                if self.aws_access_key_id.is_some() != self.aws_secret_access_key.is_some() {
                    return Err(anyhow::anyhow!(
                        "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together"
                    ));
                }
            }
            StorageBackend::Local => {}
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.base.host, self.base.server_port)
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory://")
    }
}
