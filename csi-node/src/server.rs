//! gRPC server wiring
//!
//! The CO talks to the plugin over a unix domain socket. Both CSI services
//! are registered on one tonic server which drains in-flight RPCs when the
//! shutdown future resolves.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::net::UnixListener;
use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio_stream::wrappers::UnixListenerStream;
use tonic::transport::Server;
use tracing::{error, info};

use crate::csi::identity_server::IdentityServer;
use crate::csi::node_server::NodeServer;
use crate::identity::IdentityService;
use crate::node::NodeService;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("invalid endpoint {0:?}: only unix:// endpoints are supported")]
    InvalidEndpoint(String),

    #[error("failed to prepare socket {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

/// Socket path of a `unix://` endpoint.
///
/// Accepts `unix:///abs/path` as well as the `unix:/abs/path` form some
/// sidecars pass.
pub fn parse_endpoint(endpoint: &str) -> Result<PathBuf, ServerError> {
    let path = endpoint
        .strip_prefix("unix://")
        .or_else(|| endpoint.strip_prefix("unix:"))
        .ok_or_else(|| ServerError::InvalidEndpoint(endpoint.to_string()))?;

    if !path.starts_with('/') {
        return Err(ServerError::InvalidEndpoint(endpoint.to_string()));
    }

    Ok(PathBuf::from(path))
}

/// Bind the socket, replacing a stale one left by a previous run.
fn bind(socket: &Path) -> Result<UnixListener, ServerError> {
    let io_err = |source| ServerError::Io {
        path: socket.to_path_buf(),
        source,
    };

    match std::fs::remove_file(socket) {
        Ok(()) => info!(socket = %socket.display(), "Removed stale socket"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(io_err(e)),
    }

    if let Some(parent) = socket.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    UnixListener::bind(socket).map_err(io_err)
}

/// Serve Identity and Node on `socket` until `shutdown` resolves.
pub async fn serve<F>(
    socket: &Path,
    identity: IdentityService,
    node: NodeService,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()>,
{
    let listener = bind(socket)?;
    let incoming = UnixListenerStream::new(listener);

    info!(socket = %socket.display(), "gRPC server listening");

    Server::builder()
        .add_service(IdentityServer::new(identity))
        .add_service(NodeServer::new(node))
        .serve_with_incoming_shutdown(incoming, async {
            shutdown.await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    if let Err(e) = std::fs::remove_file(socket)
        && e.kind() != io::ErrorKind::NotFound
    {
        error!(socket = %socket.display(), error = %e, "Failed to remove socket");
    }

    Ok(())
}

fn install(kind: SignalKind, name: &str) -> Option<Signal> {
    match signal(kind) {
        Ok(s) => Some(s),
        Err(e) => {
            error!("Failed to install {} handler: {}", name, e);
            None
        }
    }
}

/// Wait on a signal; never resolves if its handler could not be installed.
async fn recv(sig: &mut Option<Signal>) {
    match sig {
        Some(s) => {
            s.recv().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Wait for shutdown signal (SIGTERM, SIGINT, or SIGHUP)
pub async fn shutdown_signal() {
    let mut sigterm = install(SignalKind::terminate(), "SIGTERM");
    let mut sigint = install(SignalKind::interrupt(), "SIGINT");
    let mut sighup = install(SignalKind::hangup(), "SIGHUP");

    tokio::select! {
        _ = recv(&mut sigterm) => {
            info!("Received SIGTERM");
        }
        _ = recv(&mut sigint) => {
            info!("Received SIGINT");
        }
        _ = recv(&mut sighup) => {
            info!("Received SIGHUP, shutting down");
        }
    }
}
