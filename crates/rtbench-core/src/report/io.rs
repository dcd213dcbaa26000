use std::path::{Path, PathBuf};

use crate::error::ReportError;

/// Output content written to a temporary sibling of its final path.
///
/// Nothing at the final path changes until [`StagedFile::commit`], so a run
/// that fails while staging leaves previous outputs untouched.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    tmp: PathBuf,
}

/// Write `content` next to `path` without touching `path` itself.
pub async fn stage(path: impl AsRef<Path>, content: &str) -> Result<StagedFile, ReportError> {
    let path = path.as_ref();
    let output_err = |source: std::io::Error| ReportError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    // A rename onto a directory would only fail at commit time.
    if let Ok(meta) = tokio::fs::metadata(path).await {
        if meta.is_dir() {
            return Err(output_err(std::io::Error::other("is a directory")));
        }
    }

    let tmp = temp_path(path);
    if let Err(e) = tokio::fs::write(&tmp, content).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(output_err(e));
    }
    Ok(StagedFile {
        path: path.to_path_buf(),
        tmp,
    })
}

impl StagedFile {
    /// Rename the staged content into place, replacing any previous file.
    pub async fn commit(self) -> Result<PathBuf, ReportError> {
        if let Err(source) = tokio::fs::rename(&self.tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&self.tmp).await;
            return Err(ReportError::OutputWrite {
                path: self.path,
                source,
            });
        }
        Ok(self.path)
    }

    /// Drop the staged content, leaving the final path as it was.
    pub async fn discard(self) {
        if let Err(e) = tokio::fs::remove_file(&self.tmp).await {
            tracing::debug!(path = %self.tmp.display(), "Cannot remove staged file: {e}");
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
