// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::errors::ConfigError;
use std::env;

/// The conventional StatsD port.
pub const DEFAULT_PORT: u16 = 8125;

/// Configuration for a [`crate::client::MetricsClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Destination host for metric datagrams (e.g., "127.0.0.1")
    pub host: String,
    /// Destination UDP port (e.g., 8125)
    pub port: u16,
    /// Optional namespace to prepend to all metric keys (e.g., "myapp")
    pub namespace: Option<String>,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            namespace: None,
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("STATSD_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("STATSD_PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let namespace = env::var("STATSD_NAMESPACE")
            .ok()
            .and_then(|val| parse_namespace(&val));
        let log_level = env::var("STATSD_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| "info".to_string());

        let config = Self {
            host,
            port,
            namespace,
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "STATSD_HOST cannot be empty".to_string(),
            ));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidConfig(
                "StatsD port must be greater than 0".to_string(),
            ));
        }

        if let Some(namespace) = &self.namespace {
            if parse_namespace(namespace).is_none() {
                return Err(ConfigError::InvalidConfig(format!(
                    "invalid metric namespace '{namespace}'"
                )));
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}

/// Parses and validates a metric namespace.
///
/// A valid namespace starts with an ASCII letter and contains only ASCII
/// alphanumerics, underscores, or periods. Whitespace is trimmed from the
/// input. Invalid input is rejected with a warning and yields `None`.
pub fn parse_namespace(namespace: &str) -> Option<String> {
    let trimmed = namespace.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut chars = trimmed.chars();
    if let Some(first_char) = chars.next() {
        if !first_char.is_ascii_alphabetic() {
            tracing::warn!(
                "metric namespace must start with a letter, got: '{}'. Ignoring namespace.",
                trimmed
            );
            return None;
        }
    } else {
        return None;
    }

    if let Some(invalid_char) =
        chars.find(|&ch| !ch.is_ascii_alphanumeric() && ch != '_' && ch != '.')
    {
        tracing::warn!(
            "metric namespace '{}' contains invalid character '{}'. Ignoring namespace.",
            trimmed,
            invalid_char
        );
        return None;
    }

    Some(trimmed.to_string())
}
