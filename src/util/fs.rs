//! Filesystem utilities for the staging directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Create a directory (and parents) suitable for holding binary artifacts:
/// owner-writable, world-readable and executable. Existing directories are
/// left untouched.
pub fn ensure_binary_dir(path: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder
        .create(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

/// Copy a file and mark the destination executable (mode 0755 on Unix).
pub fn copy_executable(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).with_context(|| {
        format!(
            "failed to copy {} to {}",
            src.display(),
            dst.display()
        )
    })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dst, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("failed to set permissions on {}", dst.display()))?;
    }
    Ok(())
}
