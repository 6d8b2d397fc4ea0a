//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TrySendError};
use parking_lot::Mutex;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{PromoError, Result};
use crate::protocol::{write_response, Response};

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP server for PromoKV
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: Option<TcpListener>,
    shutdown: Arc<AtomicBool>,
    live: Arc<LiveConnections>,
}

/// Sockets currently being served, so shutdown can close them
#[derive(Default)]
struct LiveConnections {
    next_id: AtomicU64,
    streams: Mutex<HashMap<u64, TcpStream>>,
}

impl LiveConnections {
    fn register(&self, stream: &TcpStream) -> Result<u64> {
        let handle = stream.try_clone()?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.streams.lock().insert(id, handle);
        Ok(id)
    }

    fn unregister(&self, id: u64) {
        self.streams.lock().remove(&id);
    }

    /// Unblock every worker reading from a client
    fn close_all(&self) {
        for (_, stream) in self.streams.lock().drain() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// Stops a running server from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl Server {
    /// Create a new server with the given config and engine
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        Self {
            config,
            engine,
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            live: Arc::new(LiveConnections::default()),
        }
    }

    /// Bind the listen address, returning the bound address
    ///
    /// Called by `run` if needed; call it first to learn an ephemeral port.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Ok(listener.local_addr()?);
        }

        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            PromoError::Network(format!("Failed to bind {}: {}", self.config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        let addr = listener.local_addr()?;
        tracing::info!("Listening on {}", addr);
        self.listener = Some(listener);
        Ok(addr)
    }

    /// Address the server is bound to, once bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        self.bind()?;
        let listener = self
            .listener
            .take()
            .ok_or_else(|| PromoError::Network("listener not bound".to_string()))?;

        let (sender, receiver) = channel::bounded::<TcpStream>(self.config.max_connections);
        let workers = (0..self.config.worker_threads)
            .map(|i| self.spawn_worker(i, receiver.clone()))
            .collect::<Result<Vec<_>>>()?;
        drop(receiver);

        tracing::info!(workers = workers.len(), "Server started");

        while !self.shutdown.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    tracing::trace!("Accepted connection from {}", peer);
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Failed to configure connection from {}: {}", peer, e);
                        continue;
                    }

                    match sender.try_send(stream) {
                        Ok(()) => {}
                        Err(TrySendError::Full(stream)) => {
                            tracing::warn!("Connection queue full, rejecting {}", peer);
                            reject(stream, "server busy");
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            tracing::error!("All workers exited, stopping acceptor");
                            break;
                        }
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        // Queued sockets are dropped by workers on sight of the flag; open
        // ones are closed under them so blocked reads return
        drop(sender);
        self.live.close_all();
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        tracing::info!("Server shut down");
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Handle for stopping the server once `run` has taken over the thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    fn spawn_worker(
        &self,
        id: usize,
        receiver: Receiver<TcpStream>,
    ) -> Result<thread::JoinHandle<()>> {
        let engine = Arc::clone(&self.engine);
        let shutdown = Arc::clone(&self.shutdown);
        let live = Arc::clone(&self.live);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        let handle = thread::Builder::new()
            .name(format!("promokv-worker-{}", id))
            .spawn(move || {
                for stream in receiver.iter() {
                    let conn_id = match live.register(&stream) {
                        Ok(conn_id) => conn_id,
                        Err(e) => {
                            tracing::warn!("Failed to track connection: {}", e);
                            continue;
                        }
                    };

                    let result = Connection::new(stream, Arc::clone(&engine))
                        .map(|conn| conn.with_shutdown(Arc::clone(&shutdown)))
                        .and_then(|mut conn| {
                            conn.set_timeouts(read_ms, write_ms)?;
                            conn.handle()
                        });
                    live.unregister(conn_id);

                    if let Err(e) = result {
                        tracing::debug!("Connection ended with error: {}", e);
                    }
                }
            })?;

        Ok(handle)
    }
}

/// Tell a client we cannot serve it, then drop the socket
fn reject(mut stream: TcpStream, reason: &str) {
    let _ = write_response(&mut stream, &Response::error(reason));
}
