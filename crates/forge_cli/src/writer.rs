//! Writes generated artifacts to disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use forge_core::Artifact;

/// Files written by [`write_artifacts`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    /// Subset of `written` marked executable
    pub executables: Vec<PathBuf>,
}

/// Write every artifact at its path, creating parent directories.
///
/// Existing files are overwritten. Scripts get mode `0o755` on Unix.
pub fn write_artifacts(artifacts: &[Artifact]) -> Result<WriteSummary> {
    let mut summary = WriteSummary::default();

    for artifact in artifacts {
        if let Some(parent) = artifact.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
        }

        fs::write(&artifact.path, &artifact.content)
            .with_context(|| format!("Failed to write {}", artifact.path.display()))?;
        debug!("Wrote {} ({})", artifact.path.display(), artifact.kind);

        if artifact.is_executable() {
            make_executable(&artifact.path)?;
            summary.executables.push(artifact.path.clone());
        }
        summary.written.push(artifact.path.clone());
    }

    Ok(summary)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("Failed to mark {} executable", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
