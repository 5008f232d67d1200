use std::env;
use std::path::PathBuf;

use anyhow::{ bail, Context };

use crate::amount;

#[derive(Debug, Clone)]
pub struct Config {
    pub solver_api_url: String,
    pub data_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub server_host: String,
    pub server_port: u16,
    pub default_slippage: f64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let solver_api_url = lookup("SOLVER_API_URL").context("SOLVER_API_URL must be set")?;
        if !solver_api_url.starts_with("http://") && !solver_api_url.starts_with("https://") {
            bail!("SOLVER_API_URL must be an http(s) URL");
        }

        let data_dir = PathBuf::from(lookup("DATA_DIR").unwrap_or_else(|| "./data".to_string()));
        let catalog_path = PathBuf::from(
            lookup("CATALOG_PATH").unwrap_or_else(|| "./catalog.json".to_string())
        );

        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = lookup("SERVER_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .context("SERVER_PORT must be a port number")?;

        let default_slippage: f64 = lookup("DEFAULT_SLIPPAGE")
            .unwrap_or_else(|| "0.5".to_string())
            .parse()
            .context("DEFAULT_SLIPPAGE must be a number")?;
        amount::validate_slippage(default_slippage).context("DEFAULT_SLIPPAGE out of range")?;

        Ok(Config {
            solver_api_url,
            data_dir,
            catalog_path,
            server_host,
            server_port,
            default_slippage,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
