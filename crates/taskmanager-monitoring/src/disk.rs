use std::path::{Path, PathBuf};
use sysinfo::Disks;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DiskUsage {
    pub mount_point: PathBuf,
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl DiskUsage {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.free_bytes)
    }

    pub fn total_gb(&self) -> f64 {
        round2(self.total_bytes as f64 / GIB)
    }

    pub fn used_gb(&self) -> f64 {
        round2(self.used_bytes() as f64 / GIB)
    }

    pub fn free_gb(&self) -> f64 {
        round2(self.free_bytes as f64 / GIB)
    }

    pub fn percent_used(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        round2(self.used_bytes() as f64 / self.total_bytes as f64 * 100.0)
    }
}

/// Usage of the filesystem holding `path`: the mounted disk with the longest
/// mount point that is a prefix of it.
pub fn disk_usage(path: &Path) -> Option<DiskUsage> {
    let disks = Disks::new_with_refreshed_list();
    let candidates = disks
        .list()
        .iter()
        .map(|d| (d.mount_point().to_path_buf(), d.total_space(), d.available_space()));
    best_match(path, candidates)
}

fn best_match(path: &Path, disks: impl Iterator<Item = (PathBuf, u64, u64)>) -> Option<DiskUsage> {
    disks
        .filter(|(mount, _, _)| path.starts_with(mount))
        .max_by_key(|(mount, _, _)| mount.components().count())
        .map(|(mount_point, total_bytes, free_bytes)| DiskUsage { mount_point, total_bytes, free_bytes })
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
