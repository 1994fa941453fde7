use std::{env, path::PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::commands::EmptyPolicy;

const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub log_format: LogFormat,
    pub empty_policy: EmptyPolicy,
    /// JSON file with the transactions to load into the in-memory store
    pub seed_file: Option<PathBuf>,
}

impl Config {
    /// Load the configuration from the process environment
    pub fn init() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("PORT") {
            Some(port) => port
                .parse::<u16>()
                .context("PORT must be a valid u16 integer")?,
            None => DEFAULT_PORT,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(anyhow!(
                    "LOG_FORMAT must be 'pretty' or 'json', got '{other}'",
                ));
            }
        };

        let empty_policy = match lookup("REWARDS_EMPTY_POLICY") {
            Some(policy) => policy
                .parse::<EmptyPolicy>()
                .context("Invalid REWARDS_EMPTY_POLICY")?,
            None => EmptyPolicy::default(),
        };

        let seed_file = lookup("SEED_FILE")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            port,
            log_format,
            empty_policy,
            seed_file,
        })
    }
}
