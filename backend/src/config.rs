use std::{env, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{anyhow, Context, Result};
use space_traveling_shared::prismic::{PrismicConfig, DEFAULT_TIMEOUT};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_IMAGES_DIR: &str = "public/images";
const DEFAULT_LISTING_VIEW_CAPACITY: usize = 1024;
const DEFAULT_REVALIDATE_SECS: u64 = 5 * 60;

/// Server settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub images_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub listing_view_capacity: usize,
    pub revalidate_interval: Duration,
    pub prismic: PrismicConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let endpoint = get("PRISMIC_API_ENDPOINT")
            .ok_or_else(|| anyhow!("PRISMIC_API_ENDPOINT must be set"))?;
        let timeout = parse_or(get("PROVIDER_TIMEOUT_SECS"), "PROVIDER_TIMEOUT_SECS", 0u64)?;
        let listing_view_capacity = parse_or(
            get("LISTING_VIEW_CAPACITY"),
            "LISTING_VIEW_CAPACITY",
            DEFAULT_LISTING_VIEW_CAPACITY,
        )?;
        if listing_view_capacity == 0 {
            anyhow::bail!("LISTING_VIEW_CAPACITY must be greater than zero");
        }
        let revalidate_secs =
            parse_or(get("REVALIDATE_SECS"), "REVALIDATE_SECS", DEFAULT_REVALIDATE_SECS)?;
        if revalidate_secs == 0 {
            anyhow::bail!("REVALIDATE_SECS must be greater than zero");
        }

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port: parse_or(get("PORT"), "PORT", DEFAULT_PORT)?,
            images_dir: get("IMAGES_DIR")
                .unwrap_or_else(|| DEFAULT_IMAGES_DIR.to_string())
                .into(),
            log_dir: get("LOG_DIR").map(PathBuf::from),
            listing_view_capacity,
            revalidate_interval: Duration::from_secs(revalidate_secs),
            prismic: PrismicConfig {
                endpoint,
                access_token: get("PRISMIC_ACCESS_TOKEN"),
                timeout: if timeout == 0 { DEFAULT_TIMEOUT } else { Duration::from_secs(timeout) },
            },
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .parse()
            .with_context(|| format!("invalid value for {key}: `{value}`")),
        None => Ok(default),
    }
}
