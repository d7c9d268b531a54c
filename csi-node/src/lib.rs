//! Block Volume CSI Node Plugin Library
//!
//! Implements the node half of the Container Storage Interface for block
//! volumes that have already been attached to the host: formatting and
//! mounting them at a staging path, bind mounting them into workloads,
//! reporting usage, and growing them online.
//!
//! This library provides:
//! - CSI Identity and Node service implementations
//! - The `Mounter` abstraction with a Linux implementation, plus an
//!   in-memory one behind the `fake` feature
//! - Node topology lookup from Kubernetes
//! - The unix socket gRPC server

/// CSI proto generated types
pub mod csi {
    tonic::include_proto!("csi.v1");
}

pub mod capabilities;
pub mod error;
pub mod identity;
pub mod metrics;
pub mod mount;
pub mod node;
pub mod server;
pub mod topology;

pub use capabilities::CapabilitySet;
pub use error::{NodeError, NodeResult};
pub use identity::{DRIVER_NAME, DRIVER_VERSION, IdentityService};
pub use mount::{LinuxMounter, Mounter};
pub use node::NodeService;
pub use topology::{KubeNodeInfoProvider, NodeInfoProvider, NodeTopology};
