use anyhow::{anyhow, Result};
use config::{Config, Environment, File, FileFormat};
use log::trace;
use serde_derive::{Deserialize, Serialize};
use std::env;

const DEFAULT_CONFIG_PATH: &str = "./config/keystore-config.json";

/// Runtime settings shared by the keystore binaries.
///
/// Values come from an optional JSON file, then `KEYSTORE_*` environment variables
/// (for example `KEYSTORE_API_PORT=8080`, `KEYSTORE_TRUSTED_BLOCK_ROOTS=0xab..,0xcd..`).
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(default)]
pub struct KeystoreConfig {
    pub record_db_path: String,
    pub temporary_db: bool,
    pub flush_every_ms: u64,
    pub trusted_block_roots: Vec<String>,
    pub max_swap_attempts: u32,
    pub api_port: u16,
    pub api_url: String,
}

impl Default for KeystoreConfig {
    fn default() -> Self {
        KeystoreConfig {
            record_db_path: "./data/records".to_string(),
            temporary_db: false,
            flush_every_ms: 500,
            trusted_block_roots: vec![],
            max_swap_attempts: 8,
            api_port: 27182,
            api_url: "http://localhost:27182".to_string(),
        }
    }
}

impl KeystoreConfig {
    pub fn load() -> Result<KeystoreConfig> {
        let config_path = env::var("KEYSTORE_CONFIG_PATH").unwrap_or(DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &str) -> Result<KeystoreConfig> {
        Self::from_sources(config_path, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix("KEYSTORE")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("trusted_block_roots")
    }

    fn from_sources(config_path: &str, environment: Environment) -> Result<KeystoreConfig> {
        trace!("keystore config path: {}", config_path);
        let config = Config::builder()
            .add_source(File::new(config_path, FileFormat::Json).required(false))
            .add_source(environment)
            .build()?;

        let keystore_config: KeystoreConfig = config.try_deserialize()?;
        trace!("KeystoreConfig: {:?}", keystore_config);
        Ok(keystore_config)
    }

    /// A throwaway configuration backed by a temporary database.
    pub fn temporary() -> KeystoreConfig {
        KeystoreConfig {
            temporary_db: true,
            ..KeystoreConfig::default()
        }
    }

    pub fn trusted_roots(&self) -> Result<Vec<[u8; 32]>> {
        self.trusted_block_roots
            .iter()
            .map(|root| {
                let bytes = hex::decode(root.trim().trim_start_matches("0x"))?;
                <[u8; 32]>::try_from(bytes.as_slice())
                    .map_err(|_| anyhow!("trusted block root {} is not 32 bytes", root))
            })
            .collect()
    }
}
