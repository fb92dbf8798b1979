use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Secret used when nothing else is configured. Fine for local development only.
pub const DEVELOPMENT_SECRET: &str = "kinship-development-secret-change-me";

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub bcrypt_cost: u32,
}

impl Auth {
    pub fn uses_development_secret(&self) -> bool {
        self.secret_key == DEVELOPMENT_SECRET
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub auth: Auth,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // 1. Try to load from settings.toml (optional for deployment)
        let config_file_name = "settings.toml";

        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        // Check in kinship-server directory (for development)
        let dev_path = PathBuf::from("kinship-server").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        builder = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.path", "kinship.db")?
            .set_default("auth.secret_key", DEVELOPMENT_SECRET)?
            .set_default("auth.access_token_expire_minutes", 30)?
            .set_default("auth.bcrypt_cost", i64::from(bcrypt::DEFAULT_COST))?;

        // 2. Override with environment variables (highest priority)
        let overrides = [
            ("DATABASE_PATH", "database.path"),
            ("PORT", "server.port"),
            ("HOST", "server.host"),
            ("SECRET_KEY", "auth.secret_key"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "auth.access_token_expire_minutes"),
            ("BCRYPT_COST", "auth.bcrypt_cost"),
        ];
        for (var, key) in overrides {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        let s = builder.build()?;
        s.try_deserialize()
    }
}
