// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Command-line StatsD emitter.
//!
//! Reads its destination from `STATSD_HOST`/`STATSD_PORT`, parses each
//! argument as a metric in wire syntax (`key:value|type`), emits them all,
//! and closes the client gracefully. With `STATSD_NAMESPACE` set, every key
//! is emitted under that namespace.

use std::env;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use statsd_client::client::{MetricEmitter, MetricsClient, SendHandle};
use statsd_client::config::ClientConfig;
use statsd_client::metric::{Metric, MetricKind};

#[tokio::main]
pub async fn main() -> ExitCode {
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("statsd-emit: {e}");
            return ExitCode::FAILURE;
        }
    };

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level)
                .expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("usage: statsd-emit <key:value|type>...");
        return ExitCode::FAILURE;
    }

    let mut metrics = Vec::with_capacity(args.len());
    for arg in &args {
        match arg.parse::<Metric>() {
            Ok(metric) => metrics.push(metric),
            Err(e) => {
                error!("cannot parse metric '{arg}': {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let client = MetricsClient::new(&config);

    let handles: Vec<SendHandle> = match &config.namespace {
        Some(namespace) => {
            let scope = client.space(namespace);
            metrics.iter().map(|m| emit_one(&scope, m)).collect()
        }
        None => metrics.iter().map(|m| emit_one(&client, m)).collect(),
    };

    let mut failed = 0usize;
    for handle in handles {
        if handle.await.is_err() {
            failed += 1;
        }
    }

    client.close(false);

    if failed > 0 {
        error!("{failed} of {} metrics failed to send", metrics.len());
        ExitCode::FAILURE
    } else {
        info!(
            "emitted {} metrics to {}:{}",
            metrics.len(),
            config.host,
            config.port
        );
        ExitCode::SUCCESS
    }
}

fn emit_one(emitter: &impl MetricEmitter, metric: &Metric) -> SendHandle {
    match metric.kind {
        MetricKind::Counter => emitter.count(&metric.key, metric.value),
        MetricKind::Gauge => emitter.gauge(&metric.key, metric.value),
        MetricKind::Timer => emitter.timer(&metric.key, metric.value),
    }
}
