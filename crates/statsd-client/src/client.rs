// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! StatsD client for emitting metrics over UDP.
//!
//! The client binds its socket lazily on the first send, dispatches each
//! metric as a single fire-and-forget datagram from a spawned task, and
//! counts sends in flight so that shutdown can wait for them to drain.

use std::future::Future;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::errors::SendError;
use crate::metric::{Metric, MetricKind};
use crate::namespace::NamespaceProxy;

/// How long a non-forced close waits before tearing the socket down anyway.
const CLOSE_GRACE: Duration = Duration::from_secs(10);

/// Operations shared by [`MetricsClient`] and every [`NamespaceProxy`]
/// derived from it.
pub trait MetricEmitter: Send + Sync {
    /// Sends a counter sample; `value` is the delta to apply.
    fn count(&self, key: &str, value: f64) -> SendHandle;

    /// Increments `key` by one.
    fn incr(&self, key: &str) -> SendHandle {
        self.count(key, 1.0)
    }

    /// Decrements `key` by one.
    fn decr(&self, key: &str) -> SendHandle {
        self.count(key, -1.0)
    }

    /// Sends a point-in-time measurement.
    fn gauge(&self, key: &str, value: f64) -> SendHandle;

    /// Sends a duration measurement in milliseconds.
    fn timer(&self, key: &str, value: f64) -> SendHandle;

    /// Returns a view of this emitter that prepends `prefix` to every key.
    /// Pure; nothing is sent.
    fn space(&self, prefix: &str) -> NamespaceProxy;

    /// Initiates shutdown of the underlying socket.
    ///
    /// With `force`, or with no sends in flight, the socket is torn down
    /// immediately; the next send binds a fresh one. Otherwise teardown is
    /// re-attempted as a forced close after a fixed grace period, whatever
    /// is still outstanding by then. Without a socket this is a no-op.
    /// Idempotent: repeated calls re-evaluate the same condition.
    fn close(&self, force: bool);
}

/// Resolves once the corresponding send has completed, yielding the
/// transport outcome. The send itself is already running when the handle is
/// returned; dropping the handle does not cancel it.
pub struct SendHandle {
    rx: oneshot::Receiver<Result<(), SendError>>,
}

impl SendHandle {
    fn pending() -> (oneshot::Sender<Result<(), SendError>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, SendHandle { rx })
    }

    #[cfg(test)]
    pub(crate) fn ready(result: Result<(), SendError>) -> Self {
        let (tx, handle) = Self::pending();
        let _ = tx.send(result);
        handle
    }
}

impl Future for SendHandle {
    type Output = Result<(), SendError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(SendError::Aborted)))
    }
}

// One lazily bound socket together with the in-flight counter scoped to its
// lifetime. Recreating the socket starts a fresh epoch whose counter begins
// at 0; sends still draining from a previous epoch decrement the previous
// counter and never show up in the new one.
struct SocketEpoch {
    socket: UdpSocket,
    peer: SocketAddr,
    in_flight: AtomicUsize,
}

struct ClientInner {
    host: String,
    port: u16,
    epoch: Mutex<Option<Arc<SocketEpoch>>>,
}

/// StatsD client over UDP. Cheap to clone; all clones share one socket.
///
/// Every operation must be invoked from within a Tokio runtime. A send
/// failure is logged as a warning, surfaced through that send's
/// [`SendHandle`], and affects nothing else; the client stays usable.
#[derive(Clone)]
pub struct MetricsClient {
    inner: Arc<ClientInner>,
}

impl MetricsClient {
    /// Creates a client for the destination in `config`. No socket is bound
    /// until the first send.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        MetricsClient {
            inner: Arc::new(ClientInner {
                host: config.host.clone(),
                port: config.port,
                epoch: Mutex::new(None),
            }),
        }
    }

    /// Number of sends issued on the current socket and not yet completed.
    /// Zero when no socket exists.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        #[allow(clippy::expect_used)]
        let slot = self.inner.epoch.lock().expect("lock poisoned");
        slot.as_ref()
            .map_or(0, |epoch| epoch.in_flight.load(Ordering::SeqCst))
    }

    /// Whether the client currently holds a socket.
    #[must_use]
    pub fn is_open(&self) -> bool {
        #[allow(clippy::expect_used)]
        let slot = self.inner.epoch.lock().expect("lock poisoned");
        slot.is_some()
    }

    /// Returns the current socket epoch, binding a fresh socket if none
    /// exists.
    fn epoch(&self) -> Result<Arc<SocketEpoch>, SendError> {
        #[allow(clippy::expect_used)]
        let mut slot = self.inner.epoch.lock().expect("lock poisoned");
        if let Some(epoch) = slot.as_ref() {
            return Ok(Arc::clone(epoch));
        }

        let peer = (self.inner.host.as_str(), self.inner.port)
            .to_socket_addrs()
            .map_err(SendError::Socket)?
            .next()
            .ok_or_else(|| {
                SendError::Socket(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "no socket addresses yielded",
                ))
            })?;

        // We only ever write on this socket; bind to an ephemeral port of
        // the peer's address family.
        let bind_addr: SocketAddr = if peer.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let std_socket = std::net::UdpSocket::bind(bind_addr).map_err(SendError::Socket)?;
        std_socket.set_nonblocking(true).map_err(SendError::Socket)?;
        let socket = UdpSocket::from_std(std_socket).map_err(SendError::Socket)?;

        debug!(
            "bound UDP socket for {}:{}",
            self.inner.host, self.inner.port
        );
        let epoch = Arc::new(SocketEpoch {
            socket,
            peer,
            in_flight: AtomicUsize::new(0),
        });
        *slot = Some(Arc::clone(&epoch));
        Ok(epoch)
    }

    /// Issues one datagram. The in-flight increment happens here, at issue
    /// time; the matching decrement happens in the spawned task once the
    /// send completes, whether it succeeded or failed.
    fn emit(&self, key: &str, value: f64, kind: MetricKind) -> SendHandle {
        let (tx, handle) = SendHandle::pending();

        let epoch = match self.epoch() {
            Ok(epoch) => epoch,
            Err(e) => {
                warn!("dropping metric '{key}': {e}");
                let _ = tx.send(Err(e));
                return handle;
            }
        };

        epoch.in_flight.fetch_add(1, Ordering::SeqCst);
        let datagram = Metric::new(key, value, kind).to_string();
        tokio::spawn(async move {
            let sent = epoch.socket.send_to(datagram.as_bytes(), epoch.peer).await;
            epoch.in_flight.fetch_sub(1, Ordering::SeqCst);

            let result = match sent {
                Ok(_) => Ok(()),
                Err(e) => {
                    warn!("failed to send metric datagram: {e}");
                    Err(SendError::Transport(e))
                }
            };
            let _ = tx.send(result);
        });

        handle
    }
}

impl MetricEmitter for MetricsClient {
    fn count(&self, key: &str, value: f64) -> SendHandle {
        self.emit(key, value, MetricKind::Counter)
    }

    fn gauge(&self, key: &str, value: f64) -> SendHandle {
        self.emit(key, value, MetricKind::Gauge)
    }

    fn timer(&self, key: &str, value: f64) -> SendHandle {
        self.emit(key, value, MetricKind::Timer)
    }

    fn space(&self, prefix: &str) -> NamespaceProxy {
        NamespaceProxy::new(Arc::new(self.clone()), prefix)
    }

    fn close(&self, force: bool) {
        #[allow(clippy::expect_used)]
        let mut slot = self.inner.epoch.lock().expect("lock poisoned");
        let Some(epoch) = slot.as_ref() else {
            return;
        };

        if force || epoch.in_flight.load(Ordering::SeqCst) == 0 {
            debug!(
                "closing UDP socket for {}:{}",
                self.inner.host, self.inner.port
            );
            // Outstanding sends keep the epoch alive through their own Arc
            // and run to completion on the old socket.
            *slot = None;
            return;
        }

        drop(slot);
        let client = self.clone();
        tokio::spawn(async move {
            sleep(CLOSE_GRACE).await;
            client.close(true);
        });
    }
}
