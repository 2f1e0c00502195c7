//! Connection acceptance and dispatch.
//!
//! [`serve`] binds a listener and runs an accept loop on its own task. Each
//! accepted connection gets a fresh task that drives the request parser to
//! completion and then hands a [`ResponseWriter`] plus the parsed request to
//! the external [`Handler`]. Nothing is shared across connections except the
//! server's closed flag.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::http::error::ParseError;
use crate::http::request::Request;
use crate::http::response::{StatusCode, default_headers};
use crate::http::writer::{ResponseWriter, WriteError};

/// The response writer handed to handlers, bound to the connection's write
/// half.
pub type ConnectionWriter = ResponseWriter<OwnedWriteHalf>;

/// External callback that produces a response for a parsed request.
///
/// A handler is expected to fully drive the writer's state machine (status
/// line, headers, body or chunks) before returning; the server does not
/// validate that it did. The connection is closed when the handler returns.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, writer: &mut ConnectionWriter, request: &Request);
}

/// Handle to a running server. Dropping it does not stop the accept loop;
/// call [`Server::close`].
pub struct Server {
    closed: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    local_addr: SocketAddr,
    accept_task: JoinHandle<()>,
}

/// Binds `addr` and starts accepting connections. A bind failure is reported
/// here, synchronously; accept failures after startup are logged and the loop
/// keeps accepting.
pub async fn serve(addr: &str, handler: Arc<dyn Handler>) -> anyhow::Result<Server> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    info!("listening on {local_addr}");

    let closed = Arc::new(AtomicBool::new(false));
    let shutdown = Arc::new(Notify::new());
    let accept_task = tokio::spawn(accept_loop(
        listener,
        handler,
        Arc::clone(&closed),
        Arc::clone(&shutdown),
    ));

    Ok(Server {
        closed,
        shutdown,
        local_addr,
        accept_task,
    })
}

impl Server {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting new connections and closes the listening endpoint.
    /// In-flight connections run to completion on their own tasks.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.shutdown.notify_one();
    }

    /// Waits for the accept loop to exit.
    pub async fn wait(self) {
        let _ = self.accept_task.await;
    }
}

async fn accept_loop(
    listener: TcpListener,
    handler: Arc<dyn Handler>,
    closed: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                debug!("accept loop stopped");
                return;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!("accepted connection from {peer}");
                    let handler = Arc::clone(&handler);
                    tokio::spawn(handle_connection(stream, handler));
                }
                Err(e) => {
                    if closed.load(Ordering::SeqCst) {
                        return;
                    }
                    // One failed accept does not take down the listener.
                    error!("accept error: {e}");
                }
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, handler: Arc<dyn Handler>) {
    let peer = stream.peer_addr().ok();
    let (mut read_half, write_half) = stream.into_split();

    match Request::from_reader(&mut read_half).await {
        Ok(request) => {
            let mut writer = ResponseWriter::new(write_half);
            handler.handle(&mut writer, &request).await;
        }
        Err(err) => {
            debug!(?peer, "request parse failed: {err}");
            if let Err(write_err) = write_error_response(write_half, &err).await {
                debug!(?peer, "failed to write error response: {write_err}");
            }
        }
    }
}

/// Sends a complete, well-formed error response for a parse failure, so the
/// peer sees valid HTTP rather than an abrupt close.
async fn write_error_response(
    write_half: OwnedWriteHalf,
    err: &ParseError,
) -> Result<(), WriteError> {
    let status = match err {
        ParseError::Io(_) => StatusCode::InternalServerError,
        _ => StatusCode::BadRequest,
    };
    let message = err.to_string();

    let mut writer = ResponseWriter::new(write_half);
    writer.write_status_line(status).await?;
    writer.write_headers(&default_headers(message.len())).await?;
    writer.write_body(message.as_bytes()).await?;
    Ok(())
}
