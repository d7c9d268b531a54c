//! Block Volume CSI Node Plugin
//!
//! Runs the CSI Identity and Node services on a unix domain socket for the
//! kubelet to call.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use csi_node::node::DEFAULT_MAX_VOLUMES_PER_NODE;
use csi_node::{
    DRIVER_NAME, DRIVER_VERSION, IdentityService, KubeNodeInfoProvider, LinuxMounter, NodeService,
    metrics, server,
};

/// CLI arguments for the CSI node plugin
#[derive(Parser, Debug)]
#[command(name = "csi-node")]
#[command(about = "CSI node plugin for attached block volumes")]
struct Args {
    /// CSI endpoint (unix socket path)
    #[arg(long, env = "CSI_ENDPOINT", default_value = "unix:///var/run/csi/csi.sock")]
    endpoint: String,

    /// Node ID for this CSI node (defaults to the hostname)
    #[arg(long, env = "CSI_NODE_ID")]
    node_id: Option<String>,

    /// Driver name
    #[arg(long, env = "CSI_DRIVER_NAME", default_value = DRIVER_NAME)]
    driver_name: String,

    /// Maximum number of volumes reported in NodeGetInfo
    #[arg(long, env = "MAX_VOLUMES_PER_NODE", default_value_t = DEFAULT_MAX_VOLUMES_PER_NODE)]
    max_volumes_per_node: i64,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Address for the Prometheus metrics listener (disabled if unset)
    #[arg(long, env = "METRICS_ADDR")]
    metrics_addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(addr) = args.metrics_addr {
        metrics::init_metrics(addr).map_err(|e| e as Box<dyn std::error::Error>)?;
    }

    // Determine node_id
    let node_id = match args.node_id {
        Some(id) => id,
        None => hostname::get()?.to_string_lossy().to_string(),
    };

    let socket = server::parse_endpoint(&args.endpoint)?;

    info!(
        driver_name = %args.driver_name,
        version = %DRIVER_VERSION,
        endpoint = %args.endpoint,
        node_id = %node_id,
        max_volumes_per_node = args.max_volumes_per_node,
        "Starting CSI node plugin"
    );

    let node_info = KubeNodeInfoProvider::try_default().await?;
    let node = NodeService::new(node_id, Arc::new(LinuxMounter::new()), Arc::new(node_info))
        .with_max_volumes_per_node(args.max_volumes_per_node);
    let identity = IdentityService::new(args.driver_name);

    server::serve(&socket, identity, node, server::shutdown_signal()).await?;

    info!("CSI node plugin shutdown complete");
    Ok(())
}
