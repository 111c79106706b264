// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Key-prefixing decorator over a client or another proxy.

use std::sync::Arc;

use crate::client::{MetricEmitter, SendHandle};

/// A namespaced view of a parent emitter.
///
/// Holds a shared reference to its parent (a
/// [`crate::client::MetricsClient`] or another proxy) and a prefix
/// normalized at construction to end in exactly one `.`. Every operation
/// delegates to the parent with the prefixed key; proxies nest arbitrarily
/// deep.
#[derive(Clone)]
pub struct NamespaceProxy {
    parent: Arc<dyn MetricEmitter>,
    prefix: String,
}

impl NamespaceProxy {
    pub(crate) fn new(parent: Arc<dyn MetricEmitter>, prefix: &str) -> Self {
        NamespaceProxy {
            parent,
            prefix: normalize_prefix(prefix),
        }
    }

    /// The effective prefix, trailing separator included.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl MetricEmitter for NamespaceProxy {
    fn count(&self, key: &str, value: f64) -> SendHandle {
        self.parent.count(&format!("{}{key}", self.prefix), value)
    }

    fn gauge(&self, key: &str, value: f64) -> SendHandle {
        self.parent.gauge(&format!("{}{key}", self.prefix), value)
    }

    fn timer(&self, key: &str, value: f64) -> SendHandle {
        self.parent.timer(&format!("{}{key}", self.prefix), value)
    }

    fn space(&self, prefix: &str) -> NamespaceProxy {
        NamespaceProxy::new(Arc::new(self.clone()), prefix)
    }

    fn close(&self, force: bool) {
        self.parent.close(force);
    }
}

/// Appends the trailing separator unless the caller already supplied one.
fn normalize_prefix(prefix: &str) -> String {
    if prefix.ends_with('.') {
        prefix.to_string()
    } else {
        format!("{prefix}.")
    }
}
