use crate::domain::errors::RenderError;
use crate::domain::ports::ArtifactSink;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Scoped staging area for one run's artifacts.
///
/// Files are written into a hidden temporary directory inside the output
/// directory and only moved to their final names by [`RenderContext::commit`].
/// Dropping an uncommitted context deletes everything staged so far.
pub struct RenderContext {
    output_dir: PathBuf,
    staging: TempDir,
    staged: Vec<String>,
}

impl RenderContext {
    pub fn new(output_dir: &Path) -> Result<Self, RenderError> {
        let staging_error = |source| RenderError::Staging {
            path: output_dir.to_path_buf(),
            source,
        };
        fs::create_dir_all(output_dir).map_err(staging_error)?;
        // Same filesystem as the targets, so commit is a plain rename
        let staging = tempfile::Builder::new()
            .prefix(".loadscope-staging-")
            .tempdir_in(output_dir)
            .map_err(staging_error)?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            staging,
            staged: Vec::new(),
        })
    }

    pub fn staged(&self) -> &[String] {
        &self.staged
    }

    /// Publishes every staged artifact and returns the final paths.
    ///
    /// Existing files at the target names are moved aside first. If any
    /// rename fails, the artifacts already published are removed and the
    /// previous files are put back before the error is returned.
    pub fn commit(self) -> Result<Vec<PathBuf>, RenderError> {
        let backups = tempfile::Builder::new()
            .prefix(".loadscope-previous-")
            .tempdir_in(&self.output_dir)
            .map_err(|source| RenderError::Staging {
                path: self.output_dir.clone(),
                source,
            })?;

        let mut published = Vec::with_capacity(self.staged.len());
        let mut moved_aside = Vec::new();
        for name in &self.staged {
            let to = self.output_dir.join(name);
            if let Err(source) = self.publish(name, &to, backups.path(), &mut moved_aside) {
                Self::roll_back(&published, &moved_aside);
                return Err(RenderError::Commit { path: to, source });
            }
            debug!("Published {:?}", to);
            published.push(to);
        }
        info!(
            "Wrote {} artifacts to {:?}",
            published.len(),
            self.output_dir
        );
        Ok(published)
    }

    fn publish(
        &self,
        name: &str,
        to: &Path,
        backup_dir: &Path,
        moved_aside: &mut Vec<(PathBuf, PathBuf)>,
    ) -> io::Result<()> {
        match fs::symlink_metadata(to) {
            Ok(meta) if meta.is_dir() => {
                return Err(io::Error::other("a directory is in the way"));
            }
            Ok(_) => {
                let backup = backup_dir.join(name);
                fs::rename(to, &backup)?;
                moved_aside.push((backup, to.to_path_buf()));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        fs::rename(self.staging.path().join(name), to)
    }

    fn roll_back(published: &[PathBuf], moved_aside: &[(PathBuf, PathBuf)]) {
        for path in published {
            if let Err(e) = fs::remove_file(path) {
                warn!("Could not remove {:?} during rollback: {}", path, e);
            }
        }
        for (backup, target) in moved_aside {
            if let Err(e) = fs::rename(backup, target) {
                warn!("Could not restore {:?} during rollback: {}", target, e);
            }
        }
    }
}

impl ArtifactSink for RenderContext {
    fn write_artifact(&mut self, name: &str, bytes: &[u8]) -> Result<(), RenderError> {
        let mut components = Path::new(name).components();
        let plain = matches!(components.next(), Some(Component::Normal(_)))
            && components.next().is_none();
        if !plain {
            return Err(RenderError::Write {
                name: name.to_string(),
                reason: "artifact names must be plain file names".to_string(),
            });
        }
        fs::write(self.staging.path().join(name), bytes).map_err(|e| RenderError::Write {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        if !self.staged.iter().any(|s| s == name) {
            self.staged.push(name.to_string());
        }
        Ok(())
    }
}
