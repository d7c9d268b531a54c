//! Linux implementation of the [`Mounter`] trait
//!
//! Uses the standard Linux tools:
//! - mount/umount for regular and bind mounts
//! - blkid for filesystem detection
//! - mkfs.ext4/mkfs.xfs/mkfs.btrfs for filesystem formatting
//! - findmnt for resolving the device behind a mount
//! - blockdev and sysfs rescan for online device growth
//! - resize2fs/xfs_growfs/btrfs for filesystem growth
//!
//! Commands are executed directly, never through a shell.

use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::{DirBuilderExt, FileTypeExt, MetadataExt, OpenOptionsExt};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use nix::sys::stat;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::{DeviceStats, MountError, MountResult, Mounter, split_bind_options};

/// blkid exit status when no filesystem signature was found
const BLKID_NOTHING_FOUND: i32 = 2;

/// Mounter backed by the host's mount table and system tools.
#[derive(Debug, Clone)]
pub struct LinuxMounter {
    /// Root of the sysfs tree, used to trigger block device rescans
    sysfs_root: PathBuf,
}

impl LinuxMounter {
    pub fn new() -> Self {
        Self {
            sysfs_root: PathBuf::from("/sys"),
        }
    }

    /// Use a different sysfs root (containers sometimes mount the host's
    /// sysfs elsewhere).
    pub fn with_sysfs_root(sysfs_root: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_root: sysfs_root.into(),
        }
    }

    /// Path of the sysfs attribute that triggers a geometry rescan for `device`.
    ///
    /// Device nodes are looked up by number, so a published block volume
    /// (a bind mount of the node under another name) resolves correctly.
    fn rescan_path(&self, device: &str) -> MountResult<PathBuf> {
        let resolved = fs::canonicalize(device).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                MountError::DeviceNotFound(device.to_string())
            } else {
                MountError::Io(e)
            }
        })?;

        let metadata = fs::metadata(&resolved)?;
        if metadata.file_type().is_block_device() {
            let rdev = metadata.rdev();
            return Ok(self
                .sysfs_root
                .join("dev/block")
                .join(format!("{}:{}", stat::major(rdev), stat::minor(rdev)))
                .join("device/rescan"));
        }

        let name = resolved
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| MountError::DeviceNotFound(device.to_string()))?;

        Ok(self
            .sysfs_root
            .join("class/block")
            .join(name)
            .join("device/rescan"))
    }
}

impl Default for LinuxMounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a command and return its output, failing on a non-zero exit status.
fn run(command: &str, args: &[&str]) -> MountResult<Output> {
    let output = spawn(command, args)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        error!(command = %command, args = ?args, stderr = %stderr, "Command failed");
        return Err(MountError::CommandFailed {
            command: command.to_string(),
            stderr,
        });
    }

    Ok(output)
}

/// Run a command and return its output regardless of the exit status.
fn spawn(command: &str, args: &[&str]) -> MountResult<Output> {
    debug!(command = %command, args = ?args, "Executing");
    Command::new(command).args(args).output().map_err(|e| {
        error!(error = %e, command = %command, "Failed to execute command");
        MountError::Spawn {
            command: command.to_string(),
            source: e,
        }
    })
}

/// Decode the octal escapes (`\040` for space etc.) used in /proc/mounts.
fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && i + 3 < bytes.len()
            && bytes[i + 1..i + 4].iter().all(|b| (b'0'..=b'7').contains(b))
        {
            let value = bytes[i + 1..i + 4]
                .iter()
                .fold(0u16, |acc, b| acc * 8 + u16::from(b - b'0'));
            if let Ok(byte) = u8::try_from(value) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).to_string()
}

/// Whether the mount table in `contents` (/proc/mounts format) lists `target`
/// as a mount point.
fn mount_table_contains(contents: &str, target: &str) -> bool {
    let target = target.trim_end_matches('/');
    let target = if target.is_empty() { "/" } else { target };
    contents.lines().any(|line| {
        line.split_whitespace()
            .nth(1)
            .is_some_and(|mount_point| unescape_mount_field(mount_point) == target)
    })
}

/// Detect the filesystem on `device`. Returns `None` for a blank device.
fn detect_filesystem(device: &str) -> MountResult<Option<String>> {
    let output = spawn("blkid", &["-p", "-s", "TYPE", "-o", "value", device])?;

    if output.status.code() == Some(BLKID_NOTHING_FOUND) {
        return Ok(None);
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        error!(device = %device, stderr = %stderr, "blkid failed");
        return Err(MountError::CommandFailed {
            command: "blkid".to_string(),
            stderr,
        });
    }

    let fs_type = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok((!fs_type.is_empty()).then_some(fs_type))
}

/// The mkfs program and arguments that format `device` with `fs_type`.
fn mkfs_command<'a>(fs_type: &str, device: &'a str) -> MountResult<(String, Vec<&'a str>)> {
    match fs_type {
        // -F to force (don't prompt), -m0 to skip the root reservation
        "ext2" | "ext3" | "ext4" => Ok((format!("mkfs.{}", fs_type), vec!["-F", "-m0", device])),
        "xfs" | "btrfs" => Ok((format!("mkfs.{}", fs_type), vec!["-f", device])),
        other => Err(MountError::UnsupportedFilesystem(other.to_string())),
    }
}

/// Format a device with the specified filesystem type.
fn format_device(device: &str, fs_type: &str) -> MountResult<()> {
    let (mkfs, args) = mkfs_command(fs_type, device)?;

    info!(device = %device, fs_type = %fs_type, "Formatting device");
    run(&mkfs, &args)?;

    Ok(())
}

/// Size of a block device in bytes.
fn block_device_size(device: &str) -> MountResult<i64> {
    let output = run("blockdev", &["--getsize64", device])?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_block_size(&stdout)
}

fn parse_block_size(stdout: &str) -> MountResult<i64> {
    stdout
        .trim()
        .parse::<i64>()
        .map_err(|e| MountError::Parse {
            what: "blockdev size",
            reason: format!("{:?}: {}", stdout.trim(), e),
        })
}

#[derive(Debug, Deserialize)]
struct FindmntOutput {
    #[serde(default)]
    filesystems: Vec<FindmntEntry>,
}

#[derive(Debug, Deserialize)]
struct FindmntEntry {
    #[serde(default)]
    source: Option<String>,
}

/// Extract the mount source from `findmnt --json` output.
fn parse_findmnt_source(stdout: &str) -> MountResult<String> {
    let parsed: FindmntOutput = serde_json::from_str(stdout).map_err(|e| MountError::Parse {
        what: "findmnt output",
        reason: e.to_string(),
    })?;

    Ok(parsed
        .filesystems
        .into_iter()
        .find_map(|fs| fs.source)
        .map(|source| source.trim().to_string())
        .unwrap_or_default())
}

/// Resolve `path` to the form the kernel records in the mount table
/// (symlinks followed, `.` components dropped). A missing path is `None`.
fn resolve_mount_path(path: &str) -> MountResult<Option<String>> {
    match fs::canonicalize(path) {
        Ok(resolved) => Ok(Some(resolved.to_string_lossy().to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Remove a mount point left behind after unmount.
fn remove_mount_point(path: &str) -> MountResult<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl Mounter for LinuxMounter {
    fn is_mount_point(&self, path: &str) -> MountResult<bool> {
        let Some(resolved) = resolve_mount_path(path)? else {
            return Ok(false);
        };

        // On Linux, check /proc/mounts for efficiency
        if let Ok(mounts) = fs::read_to_string("/proc/mounts") {
            return Ok(mount_table_contains(&mounts, &resolved));
        }

        // Fallback to findmnt
        let output = spawn("findmnt", &["--mountpoint", &resolved, "--noheadings"])?;
        Ok(output.status.success() && !output.stdout.is_empty())
    }

    fn mount(
        &self,
        source: &str,
        target: &str,
        fs_type: &str,
        options: &[String],
    ) -> MountResult<()> {
        let (bind, rest) = split_bind_options(options);

        if bind {
            info!(source = %source, target = %target, options = ?rest, "Creating bind mount");
            run("mount", &["--bind", source, target])?;

            // Options such as "ro" only take effect on a bind mount after a remount
            if !rest.is_empty() {
                let remount = format!("bind,remount,{}", rest.join(","));
                run("mount", &["-o", &remount, target])?;
            }
            return Ok(());
        }

        info!(source = %source, target = %target, fs_type = %fs_type, options = ?rest, "Mounting");

        let joined = rest.join(",");
        let mut args: Vec<&str> = Vec::new();
        if !fs_type.is_empty() {
            args.extend(["-t", fs_type]);
        }
        if !joined.is_empty() {
            args.extend(["-o", joined.as_str()]);
        }
        args.extend([source, target]);

        run("mount", &args)?;
        Ok(())
    }

    fn format_and_mount(
        &self,
        device: &str,
        target: &str,
        fs_type: &str,
        options: &[String],
    ) -> MountResult<()> {
        if !Path::new(device).exists() {
            return Err(MountError::DeviceNotFound(device.to_string()));
        }

        match detect_filesystem(device)? {
            None => format_device(device, fs_type)?,
            Some(existing) if existing != fs_type => {
                return Err(MountError::FilesystemMismatch {
                    device: device.to_string(),
                    existing,
                    requested: fs_type.to_string(),
                });
            }
            Some(existing) => {
                debug!(device = %device, fs_type = %existing, "Device already formatted");
            }
        }

        self.make_dir(target)?;
        self.mount(device, target, fs_type, options)
    }

    fn unmount(&self, path: &str) -> MountResult<()> {
        info!(target = %path, "Unmounting");

        if self.is_mount_point(path)? {
            let output = spawn("umount", &[path])?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                // Treat "not mounted" as success
                if stderr.contains("not mounted") || stderr.contains("no mount point") {
                    warn!(target = %path, "Path was not mounted");
                } else {
                    error!(stderr = %stderr, "umount failed");
                    return Err(MountError::CommandFailed {
                        command: "umount".to_string(),
                        stderr,
                    });
                }
            }

            // A single umount only removes the topmost of stacked mounts
            if self.is_mount_point(path)? {
                error!(target = %path, "Path still mounted after umount");
                return Err(MountError::CommandFailed {
                    command: "umount".to_string(),
                    stderr: format!("{} is still mounted", path),
                });
            }
        } else {
            debug!(target = %path, "Path is not mounted, skipping unmount");
        }

        remove_mount_point(path).inspect_err(|e| {
            error!(error = %e, target = %path, "Could not remove mount point");
        })
    }

    fn make_dir(&self, path: &str) -> MountResult<()> {
        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o750)
            .create(path)?;
        Ok(())
    }

    fn make_file(&self, path: &str) -> MountResult<()> {
        fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .mode(0o644)
            .open(path)?;
        Ok(())
    }

    fn remove_file(&self, path: &str) -> MountResult<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn path_exists(&self, path: &str) -> MountResult<bool> {
        Ok(Path::new(path).try_exists()?)
    }

    fn device_stats(&self, path: &str) -> MountResult<DeviceStats> {
        let metadata = fs::metadata(path)?;

        if metadata.file_type().is_block_device() {
            return Ok(DeviceStats::block(block_device_size(path)?));
        }

        let stat = nix::sys::statvfs::statvfs(path).map_err(|e| MountError::Statvfs {
            path: path.to_string(),
            source: e,
        })?;

        let fragment = stat.fragment_size() as i64;
        let blocks = stat.blocks() as i64;
        let blocks_free = stat.blocks_free() as i64;
        let files = stat.files() as i64;
        let files_free = stat.files_free() as i64;

        Ok(DeviceStats {
            block: false,
            total_bytes: blocks * fragment,
            available_bytes: stat.blocks_available() as i64 * fragment,
            used_bytes: (blocks - blocks_free) * fragment,
            total_inodes: files,
            available_inodes: stat.files_available() as i64,
            used_inodes: files - files_free,
        })
    }

    fn underlying_device(&self, path: &str) -> MountResult<String> {
        let output = run(
            "findmnt",
            &["--json", "--nofsroot", "--output", "SOURCE", "--target", path],
        )?;
        parse_findmnt_source(&String::from_utf8_lossy(&output.stdout))
    }

    fn rescan_device(&self, device: &str, volume_path: &str, new_size: i64) -> MountResult<()> {
        if new_size <= 0 {
            warn!(device = %device, "No size requested, skipping block device rescan");
            return Ok(());
        }

        let current = block_device_size(device)?;
        if current >= new_size {
            debug!(device = %device, size = current, "Block device already has the requested size");
            return Ok(());
        }

        info!(
            device = %device,
            volume_path = %volume_path,
            current_size = current,
            new_size = new_size,
            "Rescanning block device geometry"
        );

        let rescan = self.rescan_path(device)?;
        fs::write(&rescan, "1")?;

        let current = block_device_size(device)?;
        if current < new_size {
            return Err(MountError::SizeMismatch {
                device: device.to_string(),
                actual: current,
                expected: new_size,
            });
        }

        Ok(())
    }

    fn resize_fs(&self, device: &str, volume_path: &str) -> MountResult<()> {
        let fs_type =
            detect_filesystem(device)?.ok_or_else(|| MountError::Unformatted(device.to_string()))?;

        info!(device = %device, volume_path = %volume_path, fs_type = %fs_type, "Resizing filesystem");

        match fs_type.as_str() {
            "ext2" | "ext3" | "ext4" => {
                run("resize2fs", &[device])?;
            }
            "xfs" => {
                run("xfs_growfs", &["-d", volume_path])?;
            }
            "btrfs" => {
                run("btrfs", &["filesystem", "resize", "max", volume_path])?;
            }
            other => return Err(MountError::UnsupportedFilesystem(other.to_string())),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOUNTS: &str = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
/dev/sdb /var/lib/kubelet/plugins/staging/pvc-1 ext4 rw,relatime 0 0
/dev/sdc /var/lib/kubelet/pods/with\\040space xfs rw,nouuid 0 0
";

    #[test]
    fn test_mount_table_contains() {
        assert!(mount_table_contains(MOUNTS, "/sys"));
        assert!(mount_table_contains(
            MOUNTS,
            "/var/lib/kubelet/plugins/staging/pvc-1"
        ));
        assert!(mount_table_contains(
            MOUNTS,
            "/var/lib/kubelet/plugins/staging/pvc-1/"
        ));
        assert!(mount_table_contains(MOUNTS, "/var/lib/kubelet/pods/with space"));

        assert!(!mount_table_contains(MOUNTS, "/var/lib/kubelet/plugins/staging"));
        assert!(!mount_table_contains(MOUNTS, "/var/lib/kubelet/pods/with"));
    }

    #[test]
    fn test_resolved_path_matches_mount_table() {
        let tmp = tempfile::tempdir().unwrap();
        let real = tmp.path().join("kubelet");
        std::fs::create_dir(&real).unwrap();
        let link = tmp.path().join("kubelet-link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let canonical = std::fs::canonicalize(&real).unwrap();
        let table = format!("/dev/sdb {} ext4 rw,relatime 0 0\n", canonical.display());

        // The request path goes through a symlink; the table lists the target
        let via_link = resolve_mount_path(link.to_str().unwrap()).unwrap().unwrap();
        assert!(mount_table_contains(&table, &via_link));
        assert!(!mount_table_contains(&table, link.to_str().unwrap()));

        let dotted = format!("{}/./", real.display());
        let resolved = resolve_mount_path(&dotted).unwrap().unwrap();
        assert!(mount_table_contains(&table, &resolved));
    }

    #[test]
    fn test_missing_path_is_not_mount_point() {
        assert_eq!(resolve_mount_path("/nonexistent-csi/target").unwrap(), None);

        let mounter = LinuxMounter::new();
        assert!(!mounter.is_mount_point("/nonexistent-csi/target").unwrap());
    }

    #[test]
    fn test_mkfs_command() {
        let (mkfs, args) = mkfs_command("ext4", "/dev/sdb").unwrap();
        assert_eq!(mkfs, "mkfs.ext4");
        assert_eq!(args, vec!["-F", "-m0", "/dev/sdb"]);

        let (mkfs, args) = mkfs_command("xfs", "/dev/sdb").unwrap();
        assert_eq!(mkfs, "mkfs.xfs");
        assert_eq!(args, vec!["-f", "/dev/sdb"]);

        // Every filesystem that can be grown can also be created
        let (mkfs, args) = mkfs_command("btrfs", "/dev/sdb").unwrap();
        assert_eq!(mkfs, "mkfs.btrfs");
        assert_eq!(args, vec!["-f", "/dev/sdb"]);

        assert!(matches!(
            mkfs_command("ntfs", "/dev/sdb"),
            Err(MountError::UnsupportedFilesystem(_))
        ));
    }

    #[test]
    fn test_unescape_mount_field() {
        assert_eq!(unescape_mount_field("/plain/path"), "/plain/path");
        assert_eq!(unescape_mount_field("/a\\040b"), "/a b");
        assert_eq!(unescape_mount_field("/tab\\011x"), "/tab\tx");
        // Incomplete escapes are kept verbatim
        assert_eq!(unescape_mount_field("/x\\04"), "/x\\04");
    }

    #[test]
    fn test_parse_findmnt_source() {
        let json = r#"{"filesystems": [{"source": "/dev/sdb"}]}"#;
        assert_eq!(parse_findmnt_source(json).unwrap(), "/dev/sdb");

        let json = r#"{"filesystems": [{"source": null}]}"#;
        assert_eq!(parse_findmnt_source(json).unwrap(), "");

        let json = r#"{"filesystems": []}"#;
        assert_eq!(parse_findmnt_source(json).unwrap(), "");

        assert!(parse_findmnt_source("not json").is_err());
    }

    #[test]
    fn test_parse_block_size() {
        assert_eq!(parse_block_size("10737418240\n").unwrap(), 10737418240);
        assert!(parse_block_size("").is_err());
        assert!(parse_block_size("ten").is_err());
    }

    #[test]
    fn test_make_file_and_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let mounter = LinuxMounter::new();

        let dir = tmp.path().join("pods/pvc-1");
        let dir_str = dir.to_str().unwrap();
        mounter.make_dir(dir_str).unwrap();
        assert!(dir.is_dir());
        // Creating an existing directory is fine
        mounter.make_dir(dir_str).unwrap();

        let file = dir.join("dev");
        let file_str = file.to_str().unwrap();
        mounter.make_file(file_str).unwrap();
        assert!(file.is_file());
        mounter.make_file(file_str).unwrap();

        assert!(mounter.path_exists(file_str).unwrap());
        mounter.remove_file(file_str).unwrap();
        assert!(!mounter.path_exists(file_str).unwrap());
        // Removing again is a no-op
        mounter.remove_file(file_str).unwrap();
    }

    #[test]
    fn test_make_file_without_parent_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let mounter = LinuxMounter::new();

        let file = tmp.path().join("missing/dev");
        assert!(mounter.make_file(file.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_unmount_not_mounted_removes_mount_point() {
        let tmp = tempfile::tempdir().unwrap();
        let mounter = LinuxMounter::new();

        let target = tmp.path().join("target");
        std::fs::create_dir(&target).unwrap();
        let target_str = target.to_str().unwrap();

        mounter.unmount(target_str).unwrap();
        assert!(!target.exists());

        // Second unmount of a vanished path still succeeds
        mounter.unmount(target_str).unwrap();
    }

    #[test]
    fn test_unmount_fails_when_mount_point_cannot_be_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let mounter = LinuxMounter::new();

        let target = tmp.path().join("target");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("leftover"), b"data").unwrap();

        let err = mounter.unmount(target.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, MountError::Io(_)));
        assert!(target.join("leftover").exists());
    }

    #[test]
    fn test_device_stats_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let mounter = LinuxMounter::new();

        let stats = mounter.device_stats(tmp.path().to_str().unwrap()).unwrap();
        assert!(!stats.block);
        assert!(stats.total_bytes > 0);
        assert!(stats.used_bytes <= stats.total_bytes);
        assert!(stats.available_bytes <= stats.total_bytes);
    }

    #[test]
    fn test_rescan_path_missing_device() {
        let mounter = LinuxMounter::with_sysfs_root("/nonexistent-sysfs");
        let err = mounter.rescan_path("/dev/does-not-exist-csi").unwrap_err();
        assert!(matches!(err, MountError::DeviceNotFound(_)));
    }

    #[test]
    fn test_rescan_path_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let device = tmp.path().join("sdb");
        std::fs::write(&device, b"").unwrap();

        let mounter = LinuxMounter::with_sysfs_root("/host/sys");
        let path = mounter.rescan_path(device.to_str().unwrap()).unwrap();
        assert_eq!(path, PathBuf::from("/host/sys/class/block/sdb/device/rescan"));
    }

    #[test]
    fn test_format_unsupported_filesystem() {
        let err = format_device("/dev/null", "ntfs").unwrap_err();
        assert!(matches!(err, MountError::UnsupportedFilesystem(ref fs) if fs == "ntfs"));
    }
}
