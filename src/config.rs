//! 网关配置：默认值、YAML 文件与环境变量覆盖。
//!
//! Gateway configuration.
//!
//! Load order is defaults, then an optional YAML file, then environment overrides:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `MCP_GATEWAY_CONFIG` | path of the YAML file when none is given explicitly |
//! | `MCP_GATEWAY_BIND` | `server.bind` |
//! | `MCP_GATEWAY_HANDLER_TIMEOUT_MS` | `dispatch.handler_timeout_ms` |
//! | `MCP_GATEWAY_COMPARE_TIMEOUT_MS` | `compare.timeout_ms` |
//!
//! Every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::error::ErrorContext;
use crate::validation::UnknownParameters;
use crate::{Error, Result};

pub const CONFIG_PATH_ENV: &str = "MCP_GATEWAY_CONFIG";
pub const BIND_ENV: &str = "MCP_GATEWAY_BIND";
pub const HANDLER_TIMEOUT_ENV: &str = "MCP_GATEWAY_HANDLER_TIMEOUT_MS";
pub const COMPARE_TIMEOUT_ENV: &str = "MCP_GATEWAY_COMPARE_TIMEOUT_MS";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub dispatch: DispatchConfig,
    pub compare: CompareConfig,
}

/// HTTP binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Dispatcher policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub unknown_parameters: UnknownParameters,
    /// Handler deadline; unset means handlers may run indefinitely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler_timeout_ms: Option<u64>,
}

impl DispatchConfig {
    pub fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout_ms.map(Duration::from_millis)
    }
}

/// Comparison run defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    pub requests: usize,
    pub concurrency: usize,
    pub timeout_ms: u64,
    pub delay_ms: u64,
    pub parallel_endpoints: bool,
    pub labels: [String; 2],
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            requests: 100,
            concurrency: 1,
            timeout_ms: 30_000,
            delay_ms: 0,
            parallel_endpoints: false,
            labels: ["a".to_string(), "b".to_string()],
        }
    }
}

impl GatewayConfig {
    /// Parse YAML text without applying environment overrides.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML file without applying environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read config file: {}", e),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("config_loader"),
            )
        })?;
        Self::from_yaml(&text)
    }

    /// Defaults, then `path` (or `MCP_GATEWAY_CONFIG`), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match env::var(CONFIG_PATH_ENV) {
                Ok(p) if !p.trim().is_empty() => Self::from_file(p.trim())?,
                _ => Self::default(),
            },
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MCP_GATEWAY_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(bind) = lookup(BIND_ENV).filter(|v| !v.trim().is_empty()) {
            self.server.bind = bind.trim().to_string();
        }
        if let Some(raw) = lookup(HANDLER_TIMEOUT_ENV) {
            self.dispatch.handler_timeout_ms = Some(parse_ms(HANDLER_TIMEOUT_ENV, &raw)?);
        }
        if let Some(raw) = lookup(COMPARE_TIMEOUT_ENV) {
            self.compare.timeout_ms = parse_ms(COMPARE_TIMEOUT_ENV, &raw)?;
        }
        Ok(())
    }

    /// Apply command-line overrides to the `compare` section and re-validate.
    pub fn with_compare_overrides(
        mut self,
        requests: Option<usize>,
        concurrency: Option<usize>,
        timeout_ms: Option<u64>,
    ) -> Result<Self> {
        if let Some(n) = requests {
            self.compare.requests = n;
        }
        if let Some(c) = concurrency {
            self.compare.concurrency = c;
        }
        if let Some(t) = timeout_ms {
            self.compare.timeout_ms = t;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.compare.requests == 0 {
            return Err(invalid("compare.requests", "must be at least 1"));
        }
        if self.compare.concurrency == 0 {
            return Err(invalid("compare.concurrency", "must be at least 1"));
        }
        if self.compare.timeout_ms == 0 {
            return Err(invalid("compare.timeout_ms", "must be greater than 0"));
        }
        if self.dispatch.handler_timeout_ms == Some(0) {
            return Err(invalid("dispatch.handler_timeout_ms", "must be greater than 0"));
        }
        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(invalid("server.bind", "must be a socket address such as 127.0.0.1:8080"));
        }
        Ok(())
    }
}

fn parse_ms(key: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|_| {
        Error::configuration_with_context(
            format!("{} must be a whole number of milliseconds", key),
            ErrorContext::new()
                .with_field_path(key)
                .with_details(format!("got '{}'", raw))
                .with_source("env"),
        )
    })
}

fn invalid(field: &str, reason: &str) -> Error {
    Error::configuration_with_context(
        format!("{} {}", field, reason),
        ErrorContext::new()
            .with_field_path(field)
            .with_source("config_validator"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.dispatch.unknown_parameters, UnknownParameters::Ignore);
        assert_eq!(config.dispatch.handler_timeout(), None);
        assert_eq!(config.compare.requests, 100);
        assert_eq!(config.compare.concurrency, 1);
        assert_eq!(config.compare.timeout_ms, 30_000);
        assert!(config.validate().is_ok());
        assert_eq!(GatewayConfig::from_yaml("").unwrap(), config);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
dispatch:
  unknown_parameters: reject
  handler_timeout_ms: 250
compare:
  concurrency: 8
  labels: [lambda, ec2]
"#;
        let config = GatewayConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.dispatch.unknown_parameters, UnknownParameters::Reject);
        assert_eq!(
            config.dispatch.handler_timeout(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(config.compare.concurrency, 8);
        assert_eq!(config.compare.requests, 100);
        assert_eq!(config.compare.labels, ["lambda".to_string(), "ec2".to_string()]);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = GatewayConfig::from_yaml("compare:\n  concurrency: 0\n").unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("compare.concurrency")
        );
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (BIND_ENV, "0.0.0.0:9000"),
            (HANDLER_TIMEOUT_ENV, "1500"),
            (COMPARE_TIMEOUT_ENV, " 200 "),
        ]
        .into_iter()
        .collect();
        let mut config = GatewayConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.dispatch.handler_timeout_ms, Some(1500));
        assert_eq!(config.compare.timeout_ms, 200);
    }

    #[test]
    fn test_compare_overrides_are_validated() {
        let config = GatewayConfig::default()
            .with_compare_overrides(Some(10), Some(4), None)
            .unwrap();
        assert_eq!(config.compare.requests, 10);
        assert_eq!(config.compare.concurrency, 4);
        assert_eq!(config.compare.timeout_ms, 30_000);

        let err = GatewayConfig::default()
            .with_compare_overrides(None, None, Some(0))
            .unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("compare.timeout_ms")
        );
        assert!(GatewayConfig::default()
            .with_compare_overrides(None, Some(0), None)
            .is_err());
    }

    #[test]
    fn test_bad_override_is_configuration_error() {
        let mut config = GatewayConfig::default();
        let err = config
            .apply_overrides(|k| (k == HANDLER_TIMEOUT_ENV).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
