//! Environment-driven service configuration.
//!
//! | Variable               | Default        |
//! |------------------------|----------------|
//! | `FABUVERSE_ADDR`       | `0.0.0.0:3345` |
//! | `FABUVERSE_LOG_FORMAT` | `json`         |
//! | `RUST_LOG`             | `info`         |
//! | `HOSTNAME`             | `unknown`      |

use std::str::FromStr;

use crate::Error;

pub const DEFAULT_ADDR: &str = "0.0.0.0:3345";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// How log lines are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, for log shippers.
    #[default]
    Json,
    /// Human-readable, for local development.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(Error::Config(format!("unknown log format `{other}`"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub addr: String,
    pub log_format: LogFormat,
    pub log_filter: String,
    pub host: String,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup. Empty
    /// values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let log_format = match get("FABUVERSE_LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            addr: get("FABUVERSE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_owned()),
            log_format,
            log_filter: get("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
            host: get("HOSTNAME").unwrap_or_else(|| "unknown".to_owned()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars: HashMap<String, String> = vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.addr, DEFAULT_ADDR);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.host, "unknown");
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("FABUVERSE_ADDR", "127.0.0.1:8080"),
            ("FABUVERSE_LOG_FORMAT", "Pretty"),
            ("RUST_LOG", "fabuverse=debug"),
            ("HOSTNAME", "box-1"),
        ])
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.log_filter, "fabuverse=debug");
        assert_eq!(config.host, "box-1");
    }

    #[test]
    fn empty_values_fall_back() {
        let config = config(&[("FABUVERSE_ADDR", ""), ("RUST_LOG", " ")]).unwrap();
        assert_eq!(config.addr, DEFAULT_ADDR);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = config(&[("FABUVERSE_LOG_FORMAT", "xml")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
