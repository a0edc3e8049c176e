/*
[INPUT]:  EDGEX_* environment variables, optionally seeded from a .env file
[OUTPUT]: Validated application configuration and client credentials
[POS]:    Configuration layer - demo/runtime setup
[UPDATE]: When adding new configuration options
*/

use std::collections::HashMap;
use std::fmt;

use anyhow::{bail, Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

use edgex_sdk::Credentials;

pub const DEFAULT_BASE_URL: &str = "https://testnet.edgex.exchange";
pub const DEFAULT_WS_URL: &str = "wss://quote-testnet.edgex.exchange";
pub const DEFAULT_ACCOUNT_ID: u64 = 12345;
pub const DEFAULT_STARK_PRIVATE_KEY: &str = "your-stark-private-key";

const ENV_PREFIX: &str = "EDGEX";

/// Connection and account settings for the demos
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    /// REST base URL
    pub base_url: String,
    /// WebSocket base URL
    pub ws_url: String,
    pub account_id: u64,
    /// Key material handed to the signing adapter
    pub stark_private_key: String,
    /// Skip private endpoints and the private stream
    #[serde(default)]
    pub public_only: bool,
}

impl AppConfig {
    /// Load from the process environment after reading `.env` if present
    pub fn load() -> Result<Self> {
        // a missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_environment(Self::environment())
    }

    /// Load from an explicit variable map instead of the process environment
    pub fn from_env_map(vars: HashMap<String, String>) -> Result<Self> {
        Self::from_environment(Self::environment().source(Some(vars)))
    }

    /// Values stay strings; typed fields are converted on deserialize so
    /// numeric-looking keys keep their leading zeros
    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(false)
            .ignore_empty(true)
    }

    fn from_environment(environment: Environment) -> Result<Self> {
        let settings = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("ws_url", DEFAULT_WS_URL)?
            .set_default("account_id", DEFAULT_ACCOUNT_ID as i64)?
            .set_default("stark_private_key", DEFAULT_STARK_PRIVATE_KEY)?
            .set_default("public_only", false)?
            .add_source(environment)
            .build()
            .context("build configuration")?;

        let config: Self = settings
            .try_deserialize()
            .context("deserialize EDGEX_* configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_url("EDGEX_BASE_URL", &self.base_url, &["http://", "https://"])?;
        check_url("EDGEX_WS_URL", &self.ws_url, &["ws://", "wss://"])?;
        if self.public_only {
            return Ok(());
        }
        if self.account_id == 0 {
            bail!("EDGEX_ACCOUNT_ID must be non-zero unless EDGEX_PUBLIC_ONLY is set");
        }
        if self.stark_private_key.trim().is_empty() {
            bail!("EDGEX_STARK_PRIVATE_KEY must not be empty unless EDGEX_PUBLIC_ONLY is set");
        }
        Ok(())
    }

    /// Credentials backed by the mock signing adapter; `None` in public-only mode
    pub fn credentials(&self) -> Result<Option<Credentials>> {
        if self.public_only {
            return Ok(None);
        }
        let credentials = Credentials::mock(self.account_id, &self.stark_private_key)
            .context("build signing adapter from EDGEX_STARK_PRIVATE_KEY")?;
        Ok(Some(credentials))
    }
}

fn check_url(name: &str, value: &str, schemes: &[&str]) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{name} must not be empty");
    }
    if !schemes.iter().any(|scheme| value.starts_with(scheme)) {
        bail!("{name} must start with one of {schemes:?}, got {value}");
    }
    Ok(())
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("base_url", &self.base_url)
            .field("ws_url", &self.ws_url)
            .field("account_id", &self.account_id)
            .field("stark_private_key", &"<redacted>")
            .field("public_only", &self.public_only)
            .finish()
    }
}
