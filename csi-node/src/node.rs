//! CSI Node Service Implementation
//!
//! Handles the mount lifecycle of block volumes that are already attached
//! to this node: staging (format + mount at the staging path), publishing
//! (bind mount into the workload), and the inverse operations, plus volume
//! statistics and online expansion.
//!
//! Every operation validates the request before touching the OS, then
//! performs one idempotent transition through the [`Mounter`]. The CO
//! retries on ambiguous failures, so repeating any call with the same
//! arguments must converge on the same end state.
//!
//! OS operations are delegated to the `mount` module; node topology comes
//! from a [`NodeInfoProvider`].

use std::collections::HashMap;
use std::path::{Component, Path};
use std::sync::Arc;

use tonic::{Code, Request, Response, Status};
use tracing::{debug, error, info, warn};

use crate::capabilities::CapabilitySet;
use crate::csi;
use crate::csi::volume_capability::AccessType;
use crate::error::{NodeError, NodeResult};
use crate::metrics::OperationTimer;
use crate::mount::Mounter;
use crate::topology::NodeInfoProvider;

/// Filesystem used when the volume capability does not name one
pub const DEFAULT_FS_TYPE: &str = "ext4";

/// Publish context key carrying the attached device path
pub const DEVICE_PATH_KEY: &str = "DevicePath";

/// Volumes a node can host unless configured otherwise
pub const DEFAULT_MAX_VOLUMES_PER_NODE: i64 = 24;

/// CSI Node Service
///
/// Implements the CSI Node service which handles:
/// - Volume staging (format if needed, mount to staging path)
/// - Volume unstaging (unmount from staging path)
/// - Volume publishing (bind mount from staging or device to target path)
/// - Volume unpublishing (unmount from target path)
/// - Volume statistics and expansion
/// - Node capability and topology reporting
pub struct NodeService {
    /// The node identifier for this CSI node
    node_id: String,
    max_volumes_per_node: i64,
    capabilities: CapabilitySet,
    mounter: Arc<dyn Mounter>,
    node_info: Arc<dyn NodeInfoProvider>,
}

impl NodeService {
    /// Create a new NodeService with the specified node ID.
    pub fn new(
        node_id: String,
        mounter: Arc<dyn Mounter>,
        node_info: Arc<dyn NodeInfoProvider>,
    ) -> Self {
        Self {
            node_id,
            max_volumes_per_node: DEFAULT_MAX_VOLUMES_PER_NODE,
            capabilities: CapabilitySet::default(),
            mounter,
            node_info,
        }
    }

    pub fn with_max_volumes_per_node(mut self, max_volumes_per_node: i64) -> Self {
        self.max_volumes_per_node = max_volumes_per_node;
        self
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Fail with `InvalidArgument` if a required field is empty.
    fn require(value: &str, field: &str) -> NodeResult<()> {
        if value.is_empty() {
            return Err(NodeError::missing(field));
        }
        Ok(())
    }

    /// Require a path field and check that it is absolute and free of `..`.
    fn require_path(path: &str, field: &str) -> NodeResult<()> {
        Self::require(path, field)?;

        let path = Path::new(path);
        if !path.is_absolute() {
            return Err(NodeError::InvalidArgument(format!(
                "{} must be an absolute path",
                field
            )));
        }

        if path.components().any(|c| c == Component::ParentDir) {
            return Err(NodeError::InvalidArgument(format!(
                "{} cannot contain '..' (path traversal)",
                field
            )));
        }

        Ok(())
    }

    /// The attached device path from the publish context.
    fn device_path(publish_context: &HashMap<String, String>) -> NodeResult<&str> {
        match publish_context.get(DEVICE_PATH_KEY) {
            Some(device) if !device.is_empty() => Ok(device),
            _ => {
                error!("DevicePath not provided in publish context");
                Err(NodeError::missing(DEVICE_PATH_KEY))
            }
        }
    }

    fn is_mount_point(&self, path: &str) -> NodeResult<bool> {
        self.mounter.is_mount_point(path).map_err(|e| {
            NodeError::mount(format!("failed to check whether {} is mounted", path), e)
        })
    }

    /// Create `dir` unless it already exists.
    fn ensure_dir(&self, dir: &str) -> NodeResult<()> {
        let exists = self.mounter.path_exists(dir).map_err(|e| {
            NodeError::mount(format!("failed to check whether {} exists", dir), e)
        })?;

        if !exists {
            debug!(path = %dir, "Creating directory");
            self.mounter
                .make_dir(dir)
                .map_err(|e| NodeError::mount(format!("Could not create dir {:?}", dir), e))?;
        }

        Ok(())
    }

    /// Format (if needed) and mount the device at the staging path.
    pub fn stage_volume(&self, req: &csi::NodeStageVolumeRequest) -> NodeResult<()> {
        let volume_id = &req.volume_id;
        let staging_target_path = &req.staging_target_path;

        Self::require(volume_id, "VolumeID")?;
        Self::require_path(staging_target_path, "StagingTargetPath")?;
        let capability = req
            .volume_capability
            .as_ref()
            .ok_or_else(|| NodeError::missing("VolumeCapability"))?;
        let device = Self::device_path(&req.publish_context)?;

        // Block volumes are published straight from the device
        if let Some(AccessType::Block(_)) = capability.access_type {
            debug!(volume_id = %volume_id, "Block volume, nothing to stage");
            return Ok(());
        }

        if self.is_mount_point(staging_target_path)? {
            info!(staging_target_path = %staging_target_path, "Volume already staged");
            return Ok(());
        }

        let (fs_type, mount_flags) = match &capability.access_type {
            Some(AccessType::Mount(mnt)) => (fs_type_or_default(&mnt.fs_type), mnt.mount_flags.as_slice()),
            _ => (DEFAULT_FS_TYPE, &[][..]),
        };
        let options = collect_mount_options(fs_type, mount_flags);

        self.mounter
            .format_and_mount(device, staging_target_path, fs_type, &options)
            .map_err(|e| {
                NodeError::mount(
                    format!(
                        "failed to stage volume {}: could not mount device {} at {} (fstype: {})",
                        volume_id, device, staging_target_path, fs_type
                    ),
                    e,
                )
            })?;

        info!(
            volume_id = %volume_id,
            device = %device,
            fs_type = %fs_type,
            options = ?options,
            "Device mounted at staging path"
        );

        Ok(())
    }

    /// Unmount the staging path.
    pub fn unstage_volume(&self, req: &csi::NodeUnstageVolumeRequest) -> NodeResult<()> {
        let volume_id = &req.volume_id;
        let staging_target_path = &req.staging_target_path;

        Self::require(volume_id, "VolumeID")?;
        Self::require_path(staging_target_path, "StagingTargetPath")?;

        self.mounter.unmount(staging_target_path).map_err(|e| {
            NodeError::mount(
                format!(
                    "Unmount of staging target path {} for volume {} failed",
                    staging_target_path, volume_id
                ),
                e,
            )
        })
    }

    /// Bind mount the volume into the target path.
    pub fn publish_volume(&self, req: &csi::NodePublishVolumeRequest) -> NodeResult<()> {
        let volume_id = &req.volume_id;

        Self::require(volume_id, "VolumeID")?;
        Self::require_path(&req.staging_target_path, "StagingTargetPath")?;
        Self::require_path(&req.target_path, "TargetPath")?;
        let capability = req
            .volume_capability
            .as_ref()
            .ok_or_else(|| NodeError::missing("VolumeCapability"))?;

        if !self
            .capabilities
            .is_valid_volume_capabilities(std::slice::from_ref(capability))
        {
            error!(volume_id = %volume_id, "VolumeCapability not supported");
            return Err(NodeError::InvalidArgument(
                "VolumeCapability not supported".to_string(),
            ));
        }

        let device = Self::device_path(&req.publish_context)?;
        let options = publish_mount_options(req.readonly);

        match &capability.access_type {
            Some(AccessType::Block(_)) => self.publish_block_volume(req, device, &options),
            Some(AccessType::Mount(mnt)) => {
                self.publish_mount_volume(req, fs_type_or_default(&mnt.fs_type), &options)
            }
            None => self.publish_mount_volume(req, DEFAULT_FS_TYPE, &options),
        }
    }

    /// Block publish: the target is a file the raw device is bind-mounted onto.
    fn publish_block_volume(
        &self,
        req: &csi::NodePublishVolumeRequest,
        device: &str,
        options: &[String],
    ) -> NodeResult<()> {
        let volume_id = &req.volume_id;
        let target_path = &req.target_path;

        if self.is_mount_point(target_path)? {
            info!(target_path = %target_path, "Block volume already published");
            return Ok(());
        }

        let pod_volume_dir = Path::new(target_path)
            .parent()
            .and_then(Path::to_str)
            .unwrap_or("/");
        self.ensure_dir(pod_volume_dir)?;

        self.mounter.make_file(target_path).map_err(|e| {
            NodeError::mount(format!("Error in making file {:?}", target_path), e)
        })?;

        if let Err(mount_error) = self.mounter.mount(device, target_path, "", options) {
            let context = format!(
                "Could not mount {:?} at {:?} for volume {}",
                device, target_path, volume_id
            );

            // Single cleanup attempt; the mount error stays the primary failure
            if let Err(cleanup_error) = self.mounter.remove_file(target_path) {
                return Err(NodeError::CleanupFailed {
                    context,
                    target: target_path.clone(),
                    mount_error,
                    cleanup_error,
                });
            }

            return Err(NodeError::mount(context, mount_error));
        }

        info!(volume_id = %volume_id, device = %device, "Block device bind mounted");
        Ok(())
    }

    /// Filesystem publish: bind mount the staging path onto the target directory.
    fn publish_mount_volume(
        &self,
        req: &csi::NodePublishVolumeRequest,
        fs_type: &str,
        options: &[String],
    ) -> NodeResult<()> {
        let volume_id = &req.volume_id;
        let staging_target_path = &req.staging_target_path;
        let target_path = &req.target_path;

        if self.is_mount_point(target_path)? {
            info!(target_path = %target_path, "Volume already published");
            return Ok(());
        }

        self.ensure_dir(target_path)?;

        self.mounter
            .mount(staging_target_path, target_path, fs_type, options)
            .map_err(|e| {
                NodeError::mount(
                    format!(
                        "error mounting volume {} from {} to {}",
                        volume_id, staging_target_path, target_path
                    ),
                    e,
                )
            })
    }

    /// Unmount the target path.
    ///
    /// No bookkeeping from a previous publish is needed; the target path is
    /// validated first since it is the only input the operation acts on.
    pub fn unpublish_volume(&self, req: &csi::NodeUnpublishVolumeRequest) -> NodeResult<()> {
        let volume_id = &req.volume_id;
        let target_path = &req.target_path;

        Self::require_path(target_path, "TargetPath")?;
        Self::require(volume_id, "VolumeID")?;

        self.mounter.unmount(target_path).map_err(|e| {
            NodeError::mount(
                format!(
                    "Unmount of targetpath {} for volume {} failed",
                    target_path, volume_id
                ),
                e,
            )
        })
    }

    /// Usage of the volume at `volume_path`.
    ///
    /// Raw block devices only report their size; filesystems report bytes
    /// and inodes.
    pub fn volume_stats(
        &self,
        req: &csi::NodeGetVolumeStatsRequest,
    ) -> NodeResult<Vec<csi::VolumeUsage>> {
        let volume_id = &req.volume_id;
        let volume_path = &req.volume_path;

        Self::require(volume_id, "VolumeID")?;
        Self::require_path(volume_path, "VolumePath")?;

        let exists = self.mounter.path_exists(volume_path).map_err(|e| {
            NodeError::Internal(format!(
                "failed to check whether volumePath {} exists: {}",
                volume_path, e
            ))
        })?;
        if !exists {
            return Err(NodeError::NotFound(format!(
                "volume {} target: {} not found",
                volume_id, volume_path
            )));
        }

        let stats = self.mounter.device_stats(volume_path).map_err(|e| {
            NodeError::mount(
                format!(
                    "failed to get stats for volume {} by path {}",
                    volume_id, volume_path
                ),
                e,
            )
        })?;

        if stats.block {
            return Ok(vec![csi::VolumeUsage {
                total: stats.total_bytes,
                unit: csi::volume_usage::Unit::Bytes as i32,
                ..Default::default()
            }]);
        }

        debug!(volume_id = %volume_id, stats = ?stats, "Volume stats");

        Ok(vec![
            csi::VolumeUsage {
                total: stats.total_bytes,
                available: stats.available_bytes,
                used: stats.used_bytes,
                unit: csi::volume_usage::Unit::Bytes as i32,
            },
            csi::VolumeUsage {
                total: stats.total_inodes,
                available: stats.available_inodes,
                used: stats.used_inodes,
                unit: csi::volume_usage::Unit::Inodes as i32,
            },
        ])
    }

    /// Grow the device and the filesystem on it to the requested size.
    pub fn expand_volume(&self, req: &csi::NodeExpandVolumeRequest) -> NodeResult<()> {
        let volume_id = &req.volume_id;
        let volume_path = &req.volume_path;

        Self::require(volume_id, "VolumeID")?;
        Self::require_path(volume_path, "VolumePath")?;

        let block = matches!(
            req.volume_capability
                .as_ref()
                .and_then(|c| c.access_type.as_ref()),
            Some(AccessType::Block(_))
        );

        // A published block volume is the device node itself
        let device = if block {
            volume_path.clone()
        } else {
            self.mounter.underlying_device(volume_path).map_err(|e| {
                NodeError::mount(
                    format!("Failed to find mount file system {}", volume_path),
                    e,
                )
            })?
        };

        let device = device.trim();
        if device.is_empty() {
            return Err(NodeError::Internal(format!(
                "Unable to find device path for volume {} at {}",
                volume_id, volume_path
            )));
        }

        let new_size = req
            .capacity_range
            .as_ref()
            .map_or(0, |range| range.required_bytes);

        self.mounter
            .rescan_device(device, volume_path, new_size)
            .map_err(|e| NodeError::mount(format!("Could not verify {:?} volume size", volume_id), e))?;

        if block {
            return Ok(());
        }

        self.mounter
            .resize_fs(device, volume_path)
            .map_err(|e| NodeError::mount(format!("Could not resize volume {:?}", volume_id), e))?;

        info!(
            volume_id = %volume_id,
            device = %device,
            new_size = new_size,
            "Filesystem resized"
        );

        Ok(())
    }

    /// Node identity and topology.
    pub async fn node_info(&self) -> NodeResult<csi::NodeGetInfoResponse> {
        let topology = self.node_info.lookup(&self.node_id).await?;

        Ok(csi::NodeGetInfoResponse {
            node_id: self.node_id.clone(),
            max_volumes_per_node: self.max_volumes_per_node,
            accessible_topology: Some(csi::Topology {
                segments: topology.segments(),
            }),
        })
    }
}

/// The declared filesystem type, or the default when none is given.
fn fs_type_or_default(fs_type: &str) -> &str {
    if fs_type.is_empty() {
        DEFAULT_FS_TYPE
    } else {
        fs_type
    }
}

/// Mount options for staging: the requested flags plus filesystem defaults.
fn collect_mount_options(fs_type: &str, mount_flags: &[String]) -> Vec<String> {
    let mut options = mount_flags.to_vec();

    // XFS refuses to mount two filesystems with the same UUID, which a
    // volume and its clone or restored snapshot share.
    if fs_type == "xfs" {
        options.push("nouuid".to_string());
    }

    options
}

/// Mount options for publishing.
fn publish_mount_options(readonly: bool) -> Vec<String> {
    let access = if readonly { "ro" } else { "rw" };
    vec!["bind".to_string(), access.to_string()]
}

/// Record the outcome of an RPC and convert errors to a gRPC status.
fn finish<T>(timer: OperationTimer, result: NodeResult<T>) -> Result<T, Status> {
    match result {
        Ok(value) => {
            timer.success();
            Ok(value)
        }
        Err(err) => {
            let code = err.code();
            if code == Code::InvalidArgument {
                warn!(operation = timer.operation(), error = %err, "Rejected request");
            } else {
                error!(operation = timer.operation(), code = ?code, error = %err, "Operation failed");
            }
            timer.failure(&format!("{:?}", code));
            Err(err.into())
        }
    }
}

#[tonic::async_trait]
impl csi::node_server::Node for NodeService {
    /// Stage a volume to a staging path.
    /// This formats the attached device if needed and mounts it.
    async fn node_stage_volume(
        &self,
        request: Request<csi::NodeStageVolumeRequest>,
    ) -> Result<Response<csi::NodeStageVolumeResponse>, Status> {
        let req = request.into_inner();
        let timer = OperationTimer::new("NodeStageVolume");

        info!(
            volume_id = %req.volume_id,
            staging_target_path = %req.staging_target_path,
            "NodeStageVolume request"
        );

        finish(timer, self.stage_volume(&req))?;

        info!(
            volume_id = %req.volume_id,
            staging_target_path = %req.staging_target_path,
            "Volume staged successfully"
        );

        Ok(Response::new(csi::NodeStageVolumeResponse {}))
    }

    /// Unstage a volume from the staging path.
    async fn node_unstage_volume(
        &self,
        request: Request<csi::NodeUnstageVolumeRequest>,
    ) -> Result<Response<csi::NodeUnstageVolumeResponse>, Status> {
        let req = request.into_inner();
        let timer = OperationTimer::new("NodeUnstageVolume");

        info!(
            volume_id = %req.volume_id,
            staging_target_path = %req.staging_target_path,
            "NodeUnstageVolume request"
        );

        finish(timer, self.unstage_volume(&req))?;

        info!(
            volume_id = %req.volume_id,
            staging_target_path = %req.staging_target_path,
            "Volume unstaged successfully"
        );

        Ok(Response::new(csi::NodeUnstageVolumeResponse {}))
    }

    /// Publish a volume to a target path.
    async fn node_publish_volume(
        &self,
        request: Request<csi::NodePublishVolumeRequest>,
    ) -> Result<Response<csi::NodePublishVolumeResponse>, Status> {
        let req = request.into_inner();
        let timer = OperationTimer::new("NodePublishVolume");

        info!(
            volume_id = %req.volume_id,
            staging_target_path = %req.staging_target_path,
            target_path = %req.target_path,
            readonly = %req.readonly,
            "NodePublishVolume request"
        );

        finish(timer, self.publish_volume(&req))?;

        info!(
            volume_id = %req.volume_id,
            target_path = %req.target_path,
            "Volume published successfully"
        );

        Ok(Response::new(csi::NodePublishVolumeResponse {}))
    }

    /// Unpublish a volume from the target path.
    async fn node_unpublish_volume(
        &self,
        request: Request<csi::NodeUnpublishVolumeRequest>,
    ) -> Result<Response<csi::NodeUnpublishVolumeResponse>, Status> {
        let req = request.into_inner();
        let timer = OperationTimer::new("NodeUnpublishVolume");

        info!(
            volume_id = %req.volume_id,
            target_path = %req.target_path,
            "NodeUnpublishVolume request"
        );

        finish(timer, self.unpublish_volume(&req))?;

        info!(
            volume_id = %req.volume_id,
            target_path = %req.target_path,
            "Volume unpublished successfully"
        );

        Ok(Response::new(csi::NodeUnpublishVolumeResponse {}))
    }

    /// Get volume usage statistics.
    async fn node_get_volume_stats(
        &self,
        request: Request<csi::NodeGetVolumeStatsRequest>,
    ) -> Result<Response<csi::NodeGetVolumeStatsResponse>, Status> {
        let req = request.into_inner();
        let timer = OperationTimer::new("NodeGetVolumeStats");

        debug!(
            volume_id = %req.volume_id,
            volume_path = %req.volume_path,
            "NodeGetVolumeStats request"
        );

        let usage = finish(timer, self.volume_stats(&req))?;

        Ok(Response::new(csi::NodeGetVolumeStatsResponse {
            usage,
            volume_condition: None,
        }))
    }

    /// Expand a volume on this node.
    async fn node_expand_volume(
        &self,
        request: Request<csi::NodeExpandVolumeRequest>,
    ) -> Result<Response<csi::NodeExpandVolumeResponse>, Status> {
        let req = request.into_inner();
        let timer = OperationTimer::new("NodeExpandVolume");

        info!(
            volume_id = %req.volume_id,
            volume_path = %req.volume_path,
            required_bytes = req.capacity_range.as_ref().map_or(0, |r| r.required_bytes),
            "NodeExpandVolume request"
        );

        finish(timer, self.expand_volume(&req))?;

        info!(volume_id = %req.volume_id, "Volume expansion completed");

        Ok(Response::new(csi::NodeExpandVolumeResponse::default()))
    }

    /// Report node capabilities.
    async fn node_get_capabilities(
        &self,
        _request: Request<csi::NodeGetCapabilitiesRequest>,
    ) -> Result<Response<csi::NodeGetCapabilitiesResponse>, Status> {
        Ok(Response::new(csi::NodeGetCapabilitiesResponse {
            capabilities: self.capabilities.node_service_capabilities(),
        }))
    }

    /// Get information about this node.
    async fn node_get_info(
        &self,
        _request: Request<csi::NodeGetInfoRequest>,
    ) -> Result<Response<csi::NodeGetInfoResponse>, Status> {
        info!(node_id = %self.node_id, "NodeGetInfo request");

        let timer = OperationTimer::new("NodeGetInfo");
        let info = finish(timer, self.node_info().await)?;

        Ok(Response::new(info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mount::FakeMounter;
    use crate::topology::{NodeTopology, TopologyError};

    struct NoTopology;

    #[tonic::async_trait]
    impl NodeInfoProvider for NoTopology {
        async fn lookup(&self, node_id: &str) -> Result<NodeTopology, TopologyError> {
            Err(TopologyError::MissingLabel {
                node_id: node_id.to_string(),
                what: "region",
            })
        }
    }

    fn service() -> NodeService {
        NodeService::new(
            "test-node-1".to_string(),
            Arc::new(FakeMounter::new()),
            Arc::new(NoTopology),
        )
    }

    #[test]
    fn test_require_path_valid() {
        assert!(NodeService::require_path("/var/lib/kubelet/staging", "StagingTargetPath").is_ok());
        assert!(NodeService::require_path("/mnt/volume", "TargetPath").is_ok());
        assert!(NodeService::require_path("/a/b/c/d/e", "TargetPath").is_ok());
    }

    #[test]
    fn test_require_path_invalid() {
        let err = NodeService::require_path("", "TargetPath").unwrap_err();
        assert_eq!(err.to_string(), "TargetPath must be provided");

        let err = NodeService::require_path("var/lib", "TargetPath").unwrap_err();
        assert_eq!(err.to_string(), "TargetPath must be an absolute path");

        let err = NodeService::require_path("/var/../etc", "VolumePath").unwrap_err();
        assert!(err.to_string().starts_with("VolumePath cannot contain '..'"));
    }

    #[test]
    fn test_device_path() {
        let mut context = HashMap::new();
        assert_eq!(
            NodeService::device_path(&context).unwrap_err().to_string(),
            "DevicePath must be provided"
        );

        context.insert(DEVICE_PATH_KEY.to_string(), String::new());
        assert!(NodeService::device_path(&context).is_err());

        context.insert(DEVICE_PATH_KEY.to_string(), "/dev/sdb".to_string());
        assert_eq!(NodeService::device_path(&context).unwrap(), "/dev/sdb");
    }

    #[test]
    fn test_collect_mount_options() {
        assert!(collect_mount_options("ext4", &[]).is_empty());
        assert_eq!(collect_mount_options("xfs", &[]), vec!["nouuid"]);
        assert_eq!(
            collect_mount_options("xfs", &["noatime".to_string()]),
            vec!["noatime", "nouuid"]
        );
        assert_eq!(
            collect_mount_options("ext4", &["noatime".to_string(), "discard".to_string()]),
            vec!["noatime", "discard"]
        );
    }

    #[test]
    fn test_publish_mount_options() {
        assert_eq!(publish_mount_options(true), vec!["bind", "ro"]);
        assert_eq!(publish_mount_options(false), vec!["bind", "rw"]);
    }

    #[test]
    fn test_fs_type_default() {
        assert_eq!(fs_type_or_default(""), "ext4");
        assert_eq!(fs_type_or_default("xfs"), "xfs");
    }

    #[test]
    fn test_node_service_creation() {
        let service = service().with_max_volumes_per_node(16);
        assert_eq!(service.node_id(), "test-node-1");
        assert_eq!(service.max_volumes_per_node, 16);
        assert_eq!(service.capabilities(), &CapabilitySet::default());
    }

    #[tokio::test]
    async fn test_node_info_without_topology_is_uncoded() {
        let err = service().node_info().await.unwrap_err();
        assert_eq!(err.code(), Code::Unknown);
        assert!(err.to_string().contains("test-node-1"));
    }
}
