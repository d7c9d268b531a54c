//! Mount operations for the CSI Node service
//!
//! The node service never touches the OS mount table directly. Everything
//! goes through the [`Mounter`] trait so the lifecycle logic can be driven
//! against the real system ([`LinuxMounter`]) or, with the `fake` feature,
//! an in-memory mount table (`FakeMounter`).
//!
//! # Usage
//!
//! ```ignore
//! use crate::mount::{LinuxMounter, Mounter};
//!
//! let mounter = LinuxMounter::new();
//! if !mounter.is_mount_point("/var/lib/kubelet/staging/pvc-1")? {
//!     mounter.format_and_mount("/dev/sdb", "/var/lib/kubelet/staging/pvc-1", "ext4", &[])?;
//! }
//! ```

#[cfg(any(test, feature = "fake"))]
pub mod fake;
mod linux;

use thiserror::Error;

#[cfg(any(test, feature = "fake"))]
pub use fake::FakeMounter;
pub use linux::LinuxMounter;

/// Errors returned by mount operations.
#[derive(Error, Debug)]
pub enum MountError {
    #[error("failed to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("device '{0}' not found")]
    DeviceNotFound(String),

    #[error("no mount found for '{0}'")]
    NoMount(String),

    #[error(
        "device '{device}' already contains a {existing} filesystem, refusing to use it as {requested}"
    )]
    FilesystemMismatch {
        device: String,
        existing: String,
        requested: String,
    },

    #[error("device '{0}' has no filesystem")]
    Unformatted(String),

    #[error("unsupported filesystem type: {0}")]
    UnsupportedFilesystem(String),

    #[error("current '{device}' block device size is {actual} bytes, expected at least {expected}")]
    SizeMismatch {
        device: String,
        actual: i64,
        expected: i64,
    },

    #[error("failed to parse {what}: {reason}")]
    Parse { what: &'static str, reason: String },

    #[error("statvfs failed for '{path}': {source}")]
    Statvfs {
        path: String,
        #[source]
        source: nix::errno::Errno,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for mount operations
pub type MountResult<T> = Result<T, MountError>;

/// Usage snapshot of a mounted volume or a raw block device.
///
/// For block devices only `total_bytes` is meaningful; the remaining fields
/// are left at zero and must not be reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub block: bool,
    pub total_bytes: i64,
    pub available_bytes: i64,
    pub used_bytes: i64,
    pub total_inodes: i64,
    pub available_inodes: i64,
    pub used_inodes: i64,
}

impl DeviceStats {
    /// Stats for a raw block device of the given size.
    pub fn block(total_bytes: i64) -> Self {
        Self {
            block: true,
            total_bytes,
            ..Self::default()
        }
    }
}

/// OS mount, format and resize primitives used by the node service.
///
/// All operations are blocking. Implementations must make `unmount`
/// idempotent: unmounting a path that is not mounted, or does not exist at
/// all, succeeds.
pub trait Mounter: Send + Sync {
    /// Whether `path` is currently the target of a mount. A missing path is
    /// not a mount point.
    fn is_mount_point(&self, path: &str) -> MountResult<bool>;

    /// Mount `source` onto `target`. When `options` contains `bind` the
    /// source is bind-mounted and the remaining options are applied with a
    /// remount. An empty `fs_type` lets the kernel decide.
    fn mount(
        &self,
        source: &str,
        target: &str,
        fs_type: &str,
        options: &[String],
    ) -> MountResult<()>;

    /// Format `device` with `fs_type` if it carries no filesystem yet, then
    /// mount it onto `target`, creating `target` if needed.
    fn format_and_mount(
        &self,
        device: &str,
        target: &str,
        fs_type: &str,
        options: &[String],
    ) -> MountResult<()>;

    /// Unmount `path` if mounted and remove the mount point. Fails if the
    /// path is still mounted afterwards or the mount point cannot be removed.
    fn unmount(&self, path: &str) -> MountResult<()>;

    /// Create a directory and any missing parents.
    fn make_dir(&self, path: &str) -> MountResult<()>;

    /// Create an empty file if it does not exist yet.
    fn make_file(&self, path: &str) -> MountResult<()>;

    /// Remove a file. Removing a file that is already gone succeeds.
    fn remove_file(&self, path: &str) -> MountResult<()>;

    /// Whether `path` exists, following symlinks.
    fn path_exists(&self, path: &str) -> MountResult<bool>;

    /// Usage statistics for the volume mounted at `path`.
    fn device_stats(&self, path: &str) -> MountResult<DeviceStats>;

    /// Source device of the mount backing `path`. May be empty when the
    /// mount table has no usable source.
    fn underlying_device(&self, path: &str) -> MountResult<String>;

    /// Ask the kernel to re-read the geometry of `device` and verify that it
    /// now holds at least `new_size` bytes.
    fn rescan_device(&self, device: &str, volume_path: &str, new_size: i64) -> MountResult<()>;

    /// Grow the filesystem on `device`, mounted at `volume_path`, to fill
    /// the device.
    fn resize_fs(&self, device: &str, volume_path: &str) -> MountResult<()>;
}

/// Split mount options into the `bind` flag and the remaining options.
pub(crate) fn split_bind_options(options: &[String]) -> (bool, Vec<&str>) {
    let bind = options.iter().any(|o| o == "bind" || o == "rbind");
    let rest = options
        .iter()
        .map(String::as_str)
        .filter(|o| *o != "bind" && *o != "rbind")
        .collect();
    (bind, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_bind_options() {
        let o = opts(&["bind", "ro"]);
        let (bind, rest) = split_bind_options(&o);
        assert!(bind);
        assert_eq!(rest, vec!["ro"]);

        let o = opts(&["noatime", "nouuid"]);
        let (bind, rest) = split_bind_options(&o);
        assert!(!bind);
        assert_eq!(rest, vec!["noatime", "nouuid"]);

        let (bind, rest) = split_bind_options(&[]);
        assert!(!bind);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_block_stats_only_total() {
        let stats = DeviceStats::block(1 << 30);
        assert!(stats.block);
        assert_eq!(stats.total_bytes, 1 << 30);
        assert_eq!(stats.available_bytes, 0);
        assert_eq!(stats.total_inodes, 0);
    }

    #[test]
    fn test_error_messages() {
        let err = MountError::CommandFailed {
            command: "umount".to_string(),
            stderr: "target is busy".to_string(),
        };
        assert_eq!(err.to_string(), "umount failed: target is busy");

        let err = MountError::SizeMismatch {
            device: "/dev/sdb".to_string(),
            actual: 10,
            expected: 20,
        };
        assert!(err.to_string().contains("/dev/sdb"));
    }
}
