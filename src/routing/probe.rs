//! Backend reachability probing.
//!
//! # Responsibilities
//! - Open a TCP connection to a target's host and port
//! - Bound the attempt (resolution + connect) by a timeout
//!
//! # Design Decisions
//! - Resolution failure, refusal and timeout all collapse to `false`
//! - A target without an explicit port is never probed and counts as down
//! - Targets are probed as `Uri`, which keeps a written default port (`:80`)
//! - The result is a point-in-time signal; forwarding may still fail

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time;
use axum::http::Uri;

/// Default probe timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Liveness check for a backend target.
pub trait Probe: Send + Sync {
    /// Returns true if the target accepts connections right now.
    fn reachable(&self, target: &Uri) -> impl Future<Output = bool> + Send;
}

/// Probe that attempts a plain TCP connect.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl Probe for TcpProbe {
    async fn reachable(&self, target: &Uri) -> bool {
        self.check(target, |host, port| async move { TcpStream::connect((host, port)).await })
            .await
    }
}

impl TcpProbe {
    /// Runs `connect` against the target's host and port under the timeout.
    async fn check<F, Fut, S>(&self, target: &Uri, connect: F) -> bool
    where
        F: FnOnce(String, u16) -> Fut,
        Fut: Future<Output = io::Result<S>>,
    {
        let Some(host) = target.host() else {
            tracing::debug!(target = %target, "Probe skipped: target has no host");
            return false;
        };
        let Some(port) = target.port_u16() else {
            tracing::debug!(target = %target, "Probe skipped: target has no explicit port");
            return false;
        };
        // IPv6 literals come back bracketed from `host`
        let host = host.trim_start_matches('[').trim_end_matches(']');

        tracing::debug!(host = %host, port = port, "Checking backend reachability");

        match time::timeout(self.timeout, connect(host.to_string(), port)).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                tracing::debug!(host = %host, port = port, error = %e, "Backend unreachable");
                false
            }
            Err(_) => {
                tracing::debug!(host = %host, port = port, timeout = ?self.timeout, "Backend probe timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_open_port_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let target = format!("http://{}", addr).parse::<Uri>().unwrap();

        assert!(TcpProbe::default().reachable(&target).await);
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let target = format!("http://{}", addr).parse::<Uri>().unwrap();

        assert!(!TcpProbe::default().reachable(&target).await);
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_unreachable() {
        let target = "http://no-such-host.invalid:8080".parse::<Uri>().unwrap();
        assert!(!TcpProbe::default().reachable(&target).await);
    }

    #[tokio::test]
    async fn test_target_without_host_is_unreachable() {
        let target = "/var/run/backend.sock".parse::<Uri>().unwrap();
        assert!(!TcpProbe::default().reachable(&target).await);
    }

    #[tokio::test]
    async fn test_target_without_port_is_unreachable() {
        let probe = TcpProbe::default();

        for target in ["http://127.0.0.1", "https://127.0.0.1/base"] {
            let target: Uri = target.parse().unwrap();
            let mut connected = false;
            let reachable = probe
                .check(&target, |_, _| {
                    connected = true;
                    async { Ok::<_, io::Error>(()) }
                })
                .await;
            assert!(!reachable);
            assert!(!connected);
        }

        // A default port spelled out is still explicit
        let target: Uri = "http://127.0.0.1:80".parse().unwrap();
        let mut dialled = None;
        let reachable = probe
            .check(&target, |host, port| {
                dialled = Some((host, port));
                async { Ok::<_, io::Error>(()) }
            })
            .await;
        assert!(reachable);
        assert_eq!(dialled, Some(("127.0.0.1".to_string(), 80)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_connect_is_bounded_by_timeout() {
        let target = "http://backend.local:8080".parse::<Uri>().unwrap();
        let probe = TcpProbe::default();

        let start = time::Instant::now();
        let reachable = probe
            .check(&target, |_, _| std::future::pending::<io::Result<()>>())
            .await;

        assert!(!reachable);
        assert!(start.elapsed() >= DEFAULT_PROBE_TIMEOUT);
        assert!(start.elapsed() < DEFAULT_PROBE_TIMEOUT + Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_within_timeout_is_reachable() {
        let target = "http://backend.local:8080".parse::<Uri>().unwrap();
        let probe = TcpProbe::new(Duration::from_millis(500));

        let reachable = probe
            .check(&target, |host, port| async move {
                assert_eq!((host.as_str(), port), ("backend.local", 8080));
                time::sleep(Duration::from_millis(100)).await;
                Ok::<_, io::Error>(())
            })
            .await;

        assert!(reachable);
    }
}
