//! # Settings
//!
//! Layered configuration: built-in defaults, then an optional
//! `config/settings.{toml,yaml,json}` file, then `APP__`-prefixed
//! environment variables (`APP__SERVER__PORT=8080`). A `.env` file is read
//! first when present.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub uploads: UploadConfig,
    pub whatsapp: WhatsAppConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin allowed to call the API from a browser
    pub cors_origin: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_file_bytes: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WhatsAppConfig {
    /// Base URL of the WhatsApp bridge process
    pub gateway_url: String,
    /// Prefixed to the 10-digit contact number when addressing a chat
    pub country_code: String,
    pub request_timeout_secs: u64,
    pub currency_symbol: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5001,
                cors_origin: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite:rent_manager.db".to_string(),
            },
            uploads: UploadConfig {
                dir: PathBuf::from("uploads"),
                max_file_bytes: 5 * 1024 * 1024,
            },
            whatsapp: WhatsAppConfig::default(),
        }
    }
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://127.0.0.1:3001".to_string(),
            country_code: "91".to_string(),
            request_timeout_secs: 30,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Settings::default();
        let config = Config::builder()
            .add_source(Config::try_from(&defaults)?)
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    pub fn bind_address(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port).parse()?;
        Ok(addr)
    }
}
