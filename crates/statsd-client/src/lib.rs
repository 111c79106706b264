// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Minimal StatsD client over UDP.
//!
//! Emits counters, gauges, and timers as single-metric datagrams in the
//! classic `<key>:<value>|<type>` wire format. Sends are fire-and-forget:
//! no batching, no retry, no acknowledgement. The client binds its socket
//! lazily, tracks how many sends are in flight on it, and tears it down
//! either immediately or after a grace period that lets outstanding sends
//! drain. Keys can be namespaced through composable [`namespace::NamespaceProxy`]
//! scopes.

pub mod client;
pub mod config;
pub mod errors;
pub mod metric;
pub mod namespace;
