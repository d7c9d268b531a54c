//! Node service error type and its mapping to gRPC status codes.

use thiserror::Error;
use tonic::{Code, Status};

use crate::mount::MountError;
use crate::topology::TopologyError;

/// Errors produced by the node service.
///
/// Operations return these as values; they are turned into a
/// [`tonic::Status`] only at the gRPC boundary.
#[derive(Error, Debug)]
pub enum NodeError {
    /// The request is malformed or asks for something unsupported.
    #[error("{0}")]
    InvalidArgument(String),

    /// A path that must exist does not.
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),

    /// A mount primitive failed.
    #[error("{context}: {source}")]
    Mount {
        context: String,
        #[source]
        source: MountError,
    },

    /// A mount failed and removing the target created for it failed too.
    #[error("{context}: {mount_error}; could not remove mount target {target:?}: {cleanup_error}")]
    CleanupFailed {
        context: String,
        target: String,
        mount_error: MountError,
        cleanup_error: MountError,
    },

    /// The node itself is misconfigured (e.g. missing topology labels).
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

pub type NodeResult<T> = std::result::Result<T, NodeError>;

impl NodeError {
    /// Error for a required request field that is empty or absent.
    pub fn missing(field: &str) -> Self {
        NodeError::InvalidArgument(format!("{} must be provided", field))
    }

    pub fn mount(context: impl Into<String>, source: MountError) -> Self {
        NodeError::Mount {
            context: context.into(),
            source,
        }
    }

    /// gRPC status code this error is reported with.
    pub fn code(&self) -> Code {
        match self {
            NodeError::InvalidArgument(_) => Code::InvalidArgument,
            NodeError::NotFound(_) => Code::NotFound,
            NodeError::Internal(_) | NodeError::Mount { .. } | NodeError::CleanupFailed { .. } => {
                Code::Internal
            }
            // Not a per-call condition; reported without a specific code
            NodeError::Topology(_) => Code::Unknown,
        }
    }
}

impl From<NodeError> for Status {
    fn from(err: NodeError) -> Self {
        Status::new(err.code(), err.to_string())
    }
}
