// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors surfaced by a single metric send. They reach only the caller that
/// issued the send; the client stays usable regardless.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("failed to create UDP socket: {0}")]
    Socket(std::io::Error),

    #[error("failed to send metric datagram: {0}")]
    Transport(std::io::Error),

    #[error("send task ended before reporting a result")]
    Aborted,
}

/// Errors from configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors from parsing a metric in wire syntax.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("metric is missing a key")]
    MissingKey,

    #[error("metric is missing a value")]
    MissingValue,

    #[error("metric value is not numeric: '{0}'")]
    BadValue(String),

    #[error("unknown metric type: '{0}'")]
    UnknownType(String),
}
