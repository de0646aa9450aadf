//! Controller side of the reverse connection.
//!
//! The controller owns the listening socket and waits for the agent to dial
//! in. Listener creation, accept and session swap all happen under one mutex,
//! so concurrent callers never see two listeners or a half-built session.

use std::io;
use std::net::Ipv4Addr;
use std::net::SocketAddr;
use std::net::TcpListener;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use tracing::info;
use tracing::warn;
use ui_spy_common::mutex_lock_or_recover;

use crate::codec::JsonCodec;
use crate::config::SessionConfig;
use crate::connection::RpcConnection;
use crate::error::ClientError;

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Lifetime counters for a controller session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub listeners_bound: u64,
    pub pairings: u64,
    pub retries: u64,
}

#[derive(Default)]
struct Counters {
    listeners_bound: AtomicU64,
    pairings: AtomicU64,
    retries: AtomicU64,
}

#[derive(Default)]
struct SessionState {
    listener: Option<TcpListener>,
    connection: Option<Arc<RpcConnection>>,
}

pub struct ControllerSession {
    config: SessionConfig,
    codec: JsonCodec,
    state: Mutex<SessionState>,
    counters: Counters,
}

impl Default for ControllerSession {
    fn default() -> Self {
        Self::new(SessionConfig::from_env())
    }
}

impl ControllerSession {
    pub fn new(config: SessionConfig) -> Self {
        let codec = JsonCodec::new(config.max_depth);
        Self {
            config,
            codec,
            state: Mutex::new(SessionState::default()),
            counters: Counters::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Binds the listener now instead of on first use. Returns the bound
    /// address, which differs from the configured port when that is 0.
    pub fn listen(&self) -> Result<SocketAddr, ClientError> {
        let mut state = mutex_lock_or_recover(&self.state);
        self.bind_if_needed(&mut state)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        let state = mutex_lock_or_recover(&self.state);
        state
            .listener
            .as_ref()
            .and_then(|listener| listener.local_addr().ok())
    }

    pub fn is_paired(&self) -> bool {
        let state = mutex_lock_or_recover(&self.state);
        state
            .connection
            .as_ref()
            .is_some_and(|conn| !conn.is_closed())
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            listeners_bound: self.counters.listeners_bound.load(Ordering::SeqCst),
            pairings: self.counters.pairings.load(Ordering::SeqCst),
            retries: self.counters.retries.load(Ordering::SeqCst),
        }
    }

    /// Returns the live session, pairing with the next agent if there is none
    /// or the current one has already been closed by its reader.
    ///
    /// Waits up to the configured connect timeout. A timeout leaves the
    /// listener bound so a later call can still pair.
    pub fn ensure_session(&self) -> Result<Arc<RpcConnection>, ClientError> {
        let mut state = mutex_lock_or_recover(&self.state);

        match state.connection.take() {
            Some(conn) if !conn.is_closed() => {
                state.connection = Some(Arc::clone(&conn));
                return Ok(conn);
            }
            Some(stale) => {
                debug!(peer = ?stale.peer_addr(), "Discarding closed Spy session");
                stale.close();
            }
            None => {}
        }

        let addr = self.bind_if_needed(&mut state)?;
        let listener = match state.listener.as_ref() {
            Some(listener) => listener,
            None => return Err(ClientError::Disposed),
        };

        let timeout = self.config.connect_timeout;
        let deadline = Instant::now() + timeout;
        let stream = loop {
            match listener.accept() {
                Ok((stream, peer)) => {
                    debug!(peer = %peer, "Accepted inbound connection");
                    break stream;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        let timeout_ms = timeout.as_millis() as u64;
                        warn!(port = addr.port(), timeout_ms, "No Spy connected");
                        return Err(ClientError::PairingTimeout {
                            timeout_ms,
                            port: addr.port(),
                        });
                    }
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ClientError::Io(e)),
            }
        };

        stream.set_nonblocking(false)?;
        stream.set_nodelay(true)?;
        let conn = Arc::new(RpcConnection::new(
            stream,
            self.codec,
            self.config.max_frame_bytes,
        )?);
        self.counters.pairings.fetch_add(1, Ordering::SeqCst);
        info!(port = addr.port(), peer = ?conn.peer_addr(), "Spy paired");
        state.connection = Some(Arc::clone(&conn));
        Ok(conn)
    }

    /// Remote call with one retry after re-pairing on a transport fault.
    pub fn invoke_value(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let conn = self.ensure_session()?;
        match conn.call(method, params.clone()) {
            Err(e) if e.is_transport_fault() => {
                warn!(method, error = %e, "Spy transport fault, re-pairing and retrying once");
                self.counters.retries.fetch_add(1, Ordering::SeqCst);
                self.drop_session(&conn);
                let conn = self.ensure_session()?;
                conn.call(method, params)
            }
            other => other,
        }
    }

    pub fn invoke<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ClientError> {
        let value = self.invoke_value(method, params)?;
        serde_json::from_value(value)
            .map_err(|e| ClientError::InvalidResponse(format!("{}: {}", method, e)))
    }

    /// Tears down the session and releases the listener, freeing the agent
    /// for another exclusive consumer. The next call binds again.
    pub fn disconnect(&self) {
        let (connection, listener) = {
            let mut state = mutex_lock_or_recover(&self.state);
            (state.connection.take(), state.listener.take())
        };
        if let Some(conn) = connection {
            conn.close();
        }
        if listener.is_some() {
            info!("Spy listener released");
        }
    }

    /// Drops `stale` only if it is still the current session, so a newer
    /// pairing made by another caller survives.
    fn drop_session(&self, stale: &Arc<RpcConnection>) {
        let removed = {
            let mut state = mutex_lock_or_recover(&self.state);
            let is_current = state
                .connection
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, stale));
            if is_current {
                state.connection.take()
            } else {
                None
            }
        };
        stale.close();
        drop(removed);
    }

    fn bind_if_needed(&self, state: &mut SessionState) -> Result<SocketAddr, ClientError> {
        if let Some(listener) = &state.listener {
            return Ok(listener.local_addr()?);
        }

        let port = self.config.port;
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port))
            .map_err(|source| ClientError::Listen { port, source })?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        self.counters.listeners_bound.fetch_add(1, Ordering::SeqCst);
        info!(port = addr.port(), "Listening for Spy");
        state.listener = Some(listener);
        Ok(addr)
    }
}

impl Drop for ControllerSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpStream;

    fn quick_config() -> SessionConfig {
        SessionConfig::default()
            .with_port(0)
            .with_connect_timeout(Duration::from_millis(200))
    }

    #[test]
    fn test_listen_is_lazy_and_idempotent() {
        let session = ControllerSession::new(quick_config());
        assert!(session.local_addr().is_none());
        assert_eq!(session.stats().listeners_bound, 0);

        let first = session.listen().unwrap();
        let second = session.listen().unwrap();
        assert_eq!(first, second);
        assert_eq!(session.stats().listeners_bound, 1);
    }

    #[test]
    fn test_timeout_keeps_listener() {
        let session = ControllerSession::new(quick_config());
        let addr = session.listen().unwrap();

        let err = session.ensure_session().err().unwrap();
        assert!(err.is_pairing_timeout());
        assert_eq!(session.local_addr(), Some(addr));
        assert_eq!(session.stats().listeners_bound, 1);
        assert!(!session.is_paired());
    }

    #[test]
    fn test_ensure_session_reuses_live_connection() {
        let session = ControllerSession::new(quick_config());
        let addr = session.listen().unwrap();
        let _agent = TcpStream::connect(addr).unwrap();

        let first = session.ensure_session().unwrap();
        let second = session.ensure_session().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(session.stats().pairings, 1);
        assert!(session.is_paired());
    }

    #[test]
    fn test_disconnect_releases_listener() {
        let session = ControllerSession::new(quick_config());
        let addr = session.listen().unwrap();
        let _agent = TcpStream::connect(addr).unwrap();
        session.ensure_session().unwrap();

        session.disconnect();
        assert!(!session.is_paired());
        assert!(session.local_addr().is_none());

        session.listen().unwrap();
        assert_eq!(session.stats().listeners_bound, 2);
    }
}
