//! In-memory [`Mounter`] for tests
//!
//! Keeps a virtual mount table plus the sets of directories, files and block
//! devices that "exist", records every call, and can be told to fail any
//! operation. Semantics follow [`LinuxMounter`](super::LinuxMounter): mount
//! targets must exist, `format_and_mount` creates its target directory and
//! refuses a device formatted with another filesystem, `unmount` removes the
//! mount point and succeeds when nothing is mounted.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{DeviceStats, MountError, MountResult, Mounter};

/// Mounter operations, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    IsMountPoint,
    Mount,
    FormatAndMount,
    Unmount,
    MakeDir,
    MakeFile,
    RemoveFile,
    PathExists,
    DeviceStats,
    UnderlyingDevice,
    RescanDevice,
    ResizeFs,
}

impl Operation {
    /// Name of the system tool the real mounter would run for this operation.
    fn command(self) -> &'static str {
        match self {
            Operation::IsMountPoint => "findmnt",
            Operation::Mount | Operation::FormatAndMount => "mount",
            Operation::Unmount => "umount",
            Operation::MakeDir => "mkdir",
            Operation::MakeFile => "touch",
            Operation::RemoveFile => "rm",
            Operation::PathExists => "stat",
            Operation::DeviceStats => "statvfs",
            Operation::UnderlyingDevice => "findmnt",
            Operation::RescanDevice => "blockdev",
            Operation::ResizeFs => "resize2fs",
        }
    }
}

/// A recorded call to the fake mounter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountCall {
    IsMountPoint(String),
    Mount {
        source: String,
        target: String,
        fs_type: String,
        options: Vec<String>,
    },
    FormatAndMount {
        device: String,
        target: String,
        fs_type: String,
        options: Vec<String>,
    },
    Unmount(String),
    MakeDir(String),
    MakeFile(String),
    RemoveFile(String),
    PathExists(String),
    DeviceStats(String),
    UnderlyingDevice(String),
    RescanDevice {
        device: String,
        volume_path: String,
        new_size: i64,
    },
    ResizeFs {
        device: String,
        volume_path: String,
    },
}

/// An entry of the virtual mount table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub source: String,
    pub fs_type: String,
    pub options: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    mounts: HashMap<String, MountEntry>,
    dirs: HashSet<String>,
    files: HashSet<String>,
    /// Block device path -> size in bytes
    devices: HashMap<String, i64>,
    /// Block device path -> filesystem written by format_and_mount
    filesystems: HashMap<String, String>,
    stats: HashMap<String, DeviceStats>,
    failures: HashMap<Operation, String>,
    calls: Vec<MountCall>,
}

impl State {
    fn exists(&self, path: &str) -> bool {
        path == "/"
            || self.dirs.contains(path)
            || self.files.contains(path)
            || self.devices.contains_key(path)
            || self.mounts.contains_key(path)
    }

    fn check(&self, op: Operation) -> MountResult<()> {
        match self.failures.get(&op) {
            Some(message) => Err(MountError::CommandFailed {
                command: op.command().to_string(),
                stderr: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn add_dir(&mut self, path: &str) {
        for ancestor in Path::new(path).ancestors() {
            if let Some(p) = ancestor.to_str()
                && !p.is_empty()
            {
                self.dirs.insert(p.to_string());
            }
        }
    }

    /// Resolve a path to the block device behind it, following bind mounts.
    fn resolve_device(&self, path: &str) -> Option<String> {
        let mut current = path.to_string();
        for _ in 0..8 {
            match self.mounts.get(&current) {
                Some(entry) if self.devices.contains_key(&entry.source) => {
                    return Some(entry.source.clone());
                }
                Some(entry) => current = entry.source.clone(),
                None => return None,
            }
        }
        None
    }
}

/// In-memory mounter tracking a virtual mount table.
#[derive(Debug, Default)]
pub struct FakeMounter {
    state: Mutex<State>,
}

impl FakeMounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a block device of `size` bytes.
    pub fn with_device(self, path: &str, size: i64) -> Self {
        self.state().devices.insert(path.to_string(), size);
        self
    }

    /// Register a device that already carries a filesystem.
    pub fn with_formatted_device(self, path: &str, size: i64, fs_type: &str) -> Self {
        {
            let mut state = self.state();
            state.devices.insert(path.to_string(), size);
            state
                .filesystems
                .insert(path.to_string(), fs_type.to_string());
        }
        self
    }

    /// Register an existing directory (and its parents).
    pub fn with_dir(self, path: &str) -> Self {
        self.state().add_dir(path);
        self
    }

    /// Register an existing mount.
    pub fn with_mount(self, source: &str, target: &str, fs_type: &str) -> Self {
        {
            let mut state = self.state();
            state.add_dir(target);
            state.mounts.insert(
                target.to_string(),
                MountEntry {
                    source: source.to_string(),
                    fs_type: fs_type.to_string(),
                    options: Vec::new(),
                },
            );
        }
        self
    }

    /// Stats returned by `device_stats` for `path`.
    pub fn with_stats(self, path: &str, stats: DeviceStats) -> Self {
        self.state().stats.insert(path.to_string(), stats);
        self
    }

    /// Make every subsequent call of `op` fail with `message`.
    pub fn fail(&self, op: Operation, message: &str) {
        self.state().failures.insert(op, message.to_string());
    }

    /// Stop failing `op`.
    pub fn clear_failure(&self, op: Operation) {
        self.state().failures.remove(&op);
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<MountCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// The mount table entry for `target`, if mounted.
    pub fn mount_entry(&self, target: &str) -> Option<MountEntry> {
        self.state().mounts.get(target).cloned()
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.state().files.contains(path)
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.state().dirs.contains(path)
    }

    /// Current size of a registered device.
    pub fn device_size(&self, path: &str) -> Option<i64> {
        self.state().devices.get(path).copied()
    }

    /// Filesystem written to a registered device, if any.
    pub fn filesystem(&self, device: &str) -> Option<String> {
        self.state().filesystems.get(device).cloned()
    }
}

impl Mounter for FakeMounter {
    fn is_mount_point(&self, path: &str) -> MountResult<bool> {
        let mut state = self.state();
        state.calls.push(MountCall::IsMountPoint(path.to_string()));
        state.check(Operation::IsMountPoint)?;
        Ok(state.mounts.contains_key(path))
    }

    fn mount(
        &self,
        source: &str,
        target: &str,
        fs_type: &str,
        options: &[String],
    ) -> MountResult<()> {
        let mut state = self.state();
        state.calls.push(MountCall::Mount {
            source: source.to_string(),
            target: target.to_string(),
            fs_type: fs_type.to_string(),
            options: options.to_vec(),
        });
        state.check(Operation::Mount)?;

        if !state.exists(source) {
            return Err(MountError::CommandFailed {
                command: "mount".to_string(),
                stderr: format!("special device {} does not exist", source),
            });
        }
        if !state.exists(target) {
            return Err(MountError::CommandFailed {
                command: "mount".to_string(),
                stderr: format!("mount point {} does not exist", target),
            });
        }

        state.mounts.insert(
            target.to_string(),
            MountEntry {
                source: source.to_string(),
                fs_type: fs_type.to_string(),
                options: options.to_vec(),
            },
        );
        Ok(())
    }

    fn format_and_mount(
        &self,
        device: &str,
        target: &str,
        fs_type: &str,
        options: &[String],
    ) -> MountResult<()> {
        let mut state = self.state();
        state.calls.push(MountCall::FormatAndMount {
            device: device.to_string(),
            target: target.to_string(),
            fs_type: fs_type.to_string(),
            options: options.to_vec(),
        });
        state.check(Operation::FormatAndMount)?;

        if !state.devices.contains_key(device) {
            return Err(MountError::DeviceNotFound(device.to_string()));
        }

        match state.filesystems.get(device) {
            Some(existing) if existing != fs_type => {
                return Err(MountError::FilesystemMismatch {
                    device: device.to_string(),
                    existing: existing.clone(),
                    requested: fs_type.to_string(),
                });
            }
            Some(_) => {}
            None => {
                state
                    .filesystems
                    .insert(device.to_string(), fs_type.to_string());
            }
        }

        state.add_dir(target);
        state.mounts.insert(
            target.to_string(),
            MountEntry {
                source: device.to_string(),
                fs_type: fs_type.to_string(),
                options: options.to_vec(),
            },
        );
        Ok(())
    }

    fn unmount(&self, path: &str) -> MountResult<()> {
        let mut state = self.state();
        state.calls.push(MountCall::Unmount(path.to_string()));
        state.check(Operation::Unmount)?;

        state.mounts.remove(path);
        state.dirs.remove(path);
        state.files.remove(path);
        Ok(())
    }

    fn make_dir(&self, path: &str) -> MountResult<()> {
        let mut state = self.state();
        state.calls.push(MountCall::MakeDir(path.to_string()));
        state.check(Operation::MakeDir)?;

        state.add_dir(path);
        Ok(())
    }

    fn make_file(&self, path: &str) -> MountResult<()> {
        let mut state = self.state();
        state.calls.push(MountCall::MakeFile(path.to_string()));
        state.check(Operation::MakeFile)?;

        let parent = Path::new(path)
            .parent()
            .and_then(Path::to_str)
            .unwrap_or("/");
        if !state.exists(parent) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("parent directory {} does not exist", parent),
            )
            .into());
        }

        state.files.insert(path.to_string());
        Ok(())
    }

    fn remove_file(&self, path: &str) -> MountResult<()> {
        let mut state = self.state();
        state.calls.push(MountCall::RemoveFile(path.to_string()));
        state.check(Operation::RemoveFile)?;

        state.files.remove(path);
        Ok(())
    }

    fn path_exists(&self, path: &str) -> MountResult<bool> {
        let mut state = self.state();
        state.calls.push(MountCall::PathExists(path.to_string()));
        state.check(Operation::PathExists)?;
        Ok(state.exists(path))
    }

    fn device_stats(&self, path: &str) -> MountResult<DeviceStats> {
        let mut state = self.state();
        state.calls.push(MountCall::DeviceStats(path.to_string()));
        state.check(Operation::DeviceStats)?;

        if let Some(stats) = state.stats.get(path) {
            return Ok(*stats);
        }
        if let Some(size) = state.devices.get(path) {
            return Ok(DeviceStats::block(*size));
        }
        Err(MountError::NoMount(path.to_string()))
    }

    fn underlying_device(&self, path: &str) -> MountResult<String> {
        let mut state = self.state();
        state.calls.push(MountCall::UnderlyingDevice(path.to_string()));
        state.check(Operation::UnderlyingDevice)?;

        state
            .resolve_device(path)
            .ok_or_else(|| MountError::NoMount(path.to_string()))
    }

    fn rescan_device(&self, device: &str, volume_path: &str, new_size: i64) -> MountResult<()> {
        let mut state = self.state();
        state.calls.push(MountCall::RescanDevice {
            device: device.to_string(),
            volume_path: volume_path.to_string(),
            new_size,
        });
        state.check(Operation::RescanDevice)?;

        // A rescan picks up whatever size the backing storage now reports,
        // which the fake models as the requested size.
        let size = state
            .devices
            .get_mut(device)
            .ok_or_else(|| MountError::DeviceNotFound(device.to_string()))?;
        *size = (*size).max(new_size);
        Ok(())
    }

    fn resize_fs(&self, device: &str, volume_path: &str) -> MountResult<()> {
        let mut state = self.state();
        state.calls.push(MountCall::ResizeFs {
            device: device.to_string(),
            volume_path: volume_path.to_string(),
        });
        state.check(Operation::ResizeFs)?;

        if !state.filesystems.contains_key(device) {
            return Err(MountError::Unformatted(device.to_string()));
        }
        Ok(())
    }
}
