use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// External collaborator consuming extracted `(logical_path, bytes)`
/// pairs. Grounded on `original_source/pbo_read.c`'s `main()`, which
/// performs the same normalization and directory creation inline.
pub trait ArchiveWriter {
    fn write_entry(&mut self, logical_path: &str, bytes: &[u8]) -> Result<()>;
}

/// Writes extracted entries beneath a root directory, normalizing
/// backslashes to forward slashes and creating parent directories as
/// needed, the way the reference `pboread` tool lays out its output.
pub struct FsWriter {
    root: PathBuf,
}

impl FsWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsWriter { root: root.into() }
    }

    fn resolve(&self, logical_path: &str) -> PathBuf {
        let normalized = logical_path.replace('\\', "/");
        self.root.join(Path::new(&normalized))
    }
}

impl ArchiveWriter for FsWriter {
    fn write_entry(&mut self, logical_path: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(logical_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        log::debug!("wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}
