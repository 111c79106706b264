// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Wire representation of a single StatsD metric.

use std::fmt;
use std::str::FromStr;

use crate::errors::ParseError;

/// The three metric types the wire format distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Timer,
}

impl MetricKind {
    /// Wire token for this kind: `c`, `g`, or `ms`.
    #[must_use]
    pub fn wire_type(self) -> &'static str {
        match self {
            MetricKind::Counter => "c",
            MetricKind::Gauge => "g",
            MetricKind::Timer => "ms",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_type())
    }
}

/// A single metric sample as it travels on the wire: `<key>:<value>|<type>`,
/// one metric per datagram.
///
/// Keys and values are not validated. A key containing `:` or `|` produces a
/// malformed packet; avoiding that is the caller's responsibility.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub key: String,
    pub value: f64,
    pub kind: MetricKind,
}

impl Metric {
    #[must_use]
    pub fn new(key: impl Into<String>, value: f64, kind: MetricKind) -> Self {
        Metric {
            key: key.into(),
            value,
            kind,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}|{}", self.key, self.value, self.kind)
    }
}

impl FromStr for Metric {
    type Err = ParseError;

    /// Accepts the same syntax the client emits: `<key>:<value>|<type>`.
    fn from_str(line: &str) -> Result<Self, ParseError> {
        let (key, rest) = line.split_once(':').ok_or(ParseError::MissingValue)?;
        if key.is_empty() {
            return Err(ParseError::MissingKey);
        }

        let (value, kind) = rest.split_once('|').ok_or(ParseError::MissingValue)?;
        let value = value
            .parse::<f64>()
            .map_err(|_| ParseError::BadValue(value.to_string()))?;

        let kind = match kind {
            "c" => MetricKind::Counter,
            "g" => MetricKind::Gauge,
            "ms" => MetricKind::Timer,
            other => return Err(ParseError::UnknownType(other.to_string())),
        };

        Ok(Metric {
            key: key.to_string(),
            value,
            kind,
        })
    }
}
