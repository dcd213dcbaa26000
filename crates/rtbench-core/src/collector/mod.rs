//! Result collection: pick the newest result file per runtime and parse it.
//!
//! Discovery and file reads go through `tokio::fs`; the selection and parse
//! steps are plain functions over in-memory candidates.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::ReportError;
use crate::results::{parse_metrics, ComparisonSet, ResultArtifact, RuntimeLabel};

/// Extension of the k6 summary files.
pub const RESULT_EXTENSION: &str = "json";

/// One file that may hold the results of a runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub label: RuntimeLabel,
    /// File name without directory.
    pub source: String,
    pub path: PathBuf,
    pub captured_at: DateTime<Utc>,
}

/// A selected candidate together with its raw contents.
#[derive(Debug, Clone)]
pub struct LoadedCandidate {
    pub candidate: CandidateFile,
    pub content: String,
}

/// Whether `file_name` follows the `{label}_*.json` naming convention.
pub fn matches_label(file_name: &str, label: &str) -> bool {
    let Some(rest) = file_name.strip_prefix(label) else {
        return false;
    };
    rest.starts_with('_')
        && Path::new(file_name)
            .extension()
            .is_some_and(|ext| ext == RESULT_EXTENSION)
}

/// Pick the newest candidate for every label, in label order.
///
/// Newest means the latest `captured_at`; equal times fall back to the
/// greater file name. Labels without candidates are left out. The result does
/// not depend on the order of `candidates`.
pub fn select_latest<'a>(
    labels: &[RuntimeLabel],
    candidates: &'a [CandidateFile],
) -> Vec<&'a CandidateFile> {
    labels
        .iter()
        .filter_map(|label| {
            candidates
                .iter()
                .filter(|c| &c.label == label)
                .max_by(|a, b| (a.captured_at, &a.source).cmp(&(b.captured_at, &b.source)))
        })
        .collect()
}

/// Parse the loaded candidates into a [`ComparisonSet`].
///
/// A candidate that fails to parse is dropped with a warning. Fails with
/// [`ReportError::NoData`] when nothing usable is left.
pub fn build_comparison_set(
    dir: &Path,
    loaded: Vec<LoadedCandidate>,
) -> Result<ComparisonSet, ReportError> {
    let artifacts = loaded.into_iter().filter_map(|LoadedCandidate { candidate, content }| {
        match parse_metrics(&candidate.source, &content) {
            Ok(metrics) => Some(ResultArtifact {
                label: candidate.label,
                source: candidate.source,
                captured_at: candidate.captured_at,
                metrics,
            }),
            Err(e) => {
                tracing::warn!(runtime = %candidate.label, "Skipping result file: {e}");
                None
            }
        }
    });

    let set = ComparisonSet::from_artifacts(artifacts);
    if set.is_empty() {
        return Err(ReportError::NoData {
            dir: dir.to_path_buf(),
        });
    }
    Ok(set)
}

/// List every `{label}_*.json` file directly inside `dir`.
pub async fn discover(
    dir: &Path,
    labels: &[RuntimeLabel],
) -> Result<Vec<CandidateFile>, ReportError> {
    let mut candidates = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        // Follow symlinks the way a shell glob would.
        let metadata = match tokio::fs::metadata(entry.path()).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(path = %entry.path().display(), "Skipping entry: {e}");
                continue;
            }
        };
        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        // `fpm_jit_1.json` belongs to `fpm_jit`, not `fpm`.
        let Some(label) = labels
            .iter()
            .filter(|label| matches_label(&file_name, label))
            .max_by_key(|label| label.len())
        else {
            continue;
        };

        let captured_at: DateTime<Utc> = metadata.modified()?.into();
        tracing::debug!(runtime = %label, file = %file_name, "Found result candidate");
        candidates.push(CandidateFile {
            label: label.clone(),
            source: file_name,
            path: entry.path(),
            captured_at,
        });
    }

    Ok(candidates)
}

/// Collect the newest parsed result per label from `dir`.
///
/// A missing or unreadable directory counts as "no data". Unreadable
/// individual files are skipped like malformed ones.
pub async fn collect(dir: &Path, labels: &[RuntimeLabel]) -> Result<ComparisonSet, ReportError> {
    let candidates = match discover(dir, labels).await {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), "Cannot scan result directory: {e}");
            return Err(ReportError::NoData {
                dir: dir.to_path_buf(),
            });
        }
    };

    let mut loaded = Vec::new();
    for candidate in select_latest(labels, &candidates) {
        match tokio::fs::read_to_string(&candidate.path).await {
            Ok(content) => {
                tracing::info!(runtime = %candidate.label, file = %candidate.source, "Using result file");
                loaded.push(LoadedCandidate {
                    candidate: candidate.clone(),
                    content,
                });
            }
            Err(e) => {
                tracing::warn!(runtime = %candidate.label, file = %candidate.source, "Cannot read result file: {e}");
            }
        }
    }

    build_comparison_set(dir, loaded)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::{Duration, SystemTime};

    fn labels(names: &[&str]) -> Vec<RuntimeLabel> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn candidate(label: &str, source: &str, secs: i64) -> CandidateFile {
        CandidateFile {
            label: label.to_string(),
            source: source.to_string(),
            path: PathBuf::from(source),
            captured_at: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    fn loaded(label: &str, source: &str, content: &str) -> LoadedCandidate {
        LoadedCandidate {
            candidate: candidate(label, source, 0),
            content: content.to_string(),
        }
    }

    const VALID: &str = r#"{"http_reqs": {"values": {"rate": 10}}}"#;

    // -----------------------------------------------------------------------
    // matches_label
    // -----------------------------------------------------------------------

    #[test]
    fn matches_label_requires_underscore_and_json() {
        assert!(matches_label("fpm_2024-01-01.json", "fpm"));
        assert!(!matches_label("fpm.json", "fpm"));
        assert!(!matches_label("fpm2_2024.json", "fpm"));
        assert!(!matches_label("fpm_2024.txt", "fpm"));
        assert!(!matches_label("xfpm_2024.json", "fpm"));
        assert!(!matches_label("swoole_1.json", "fpm"));
    }

    // -----------------------------------------------------------------------
    // select_latest
    // -----------------------------------------------------------------------

    #[test]
    fn select_latest_picks_newest_regardless_of_order() {
        let a = vec![
            candidate("fpm", "fpm_b.json", 200),
            candidate("fpm", "fpm_a.json", 100),
        ];
        let b: Vec<_> = a.iter().rev().cloned().collect();
        let l = labels(&["fpm"]);
        assert_eq!(select_latest(&l, &a)[0].source, "fpm_b.json");
        assert_eq!(select_latest(&l, &b)[0].source, "fpm_b.json");
    }

    #[test]
    fn select_latest_prefers_older_name_when_newer_mtime() {
        // The file name sorts lower but was modified later.
        let c = vec![
            candidate("fpm", "fpm_2024-12-31.json", 100),
            candidate("fpm", "fpm_2024-01-01.json", 300),
        ];
        let picked = select_latest(&labels(&["fpm"]), &c);
        assert_eq!(picked[0].source, "fpm_2024-01-01.json");
    }

    #[test]
    fn select_latest_breaks_ties_by_file_name() {
        let c = vec![
            candidate("fpm", "fpm_2024-01-02.json", 100),
            candidate("fpm", "fpm_2024-01-01.json", 100),
        ];
        let rev: Vec<_> = c.iter().rev().cloned().collect();
        let l = labels(&["fpm"]);
        assert_eq!(select_latest(&l, &c)[0].source, "fpm_2024-01-02.json");
        assert_eq!(select_latest(&l, &rev)[0].source, "fpm_2024-01-02.json");
    }

    #[test]
    fn select_latest_follows_label_order_and_skips_missing() {
        let c = vec![
            candidate("swoole", "swoole_1.json", 1),
            candidate("fpm", "fpm_1.json", 1),
        ];
        let picked = select_latest(&labels(&["fpm", "franken", "swoole"]), &c);
        let names: Vec<_> = picked.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(names, vec!["fpm", "swoole"]);
    }

    // -----------------------------------------------------------------------
    // build_comparison_set
    // -----------------------------------------------------------------------

    #[test]
    fn build_skips_malformed_and_keeps_others() {
        let set = build_comparison_set(
            Path::new("results"),
            vec![
                loaded("fpm", "fpm_1.json", "{ truncated"),
                loaded("swoole", "swoole_1.json", VALID),
            ],
        )
        .expect("one label is usable");
        assert_eq!(set.len(), 1);
        assert!(set.get("fpm").is_none());
        assert_eq!(set.get("swoole").unwrap().throughput(), Some(10.0));
    }

    #[test]
    fn build_with_nothing_usable_is_no_data() {
        let err = build_comparison_set(
            Path::new("results"),
            vec![loaded("fpm", "fpm_1.json", "null")],
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::NoData { .. }));

        let err = build_comparison_set(Path::new("results"), Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "No benchmark data found in results");
    }

    // -----------------------------------------------------------------------
    // Filesystem
    // -----------------------------------------------------------------------

    fn write_with_mtime(dir: &Path, name: &str, content: &str, secs: u64) {
        let path = dir.join(name);
        std::fs::write(&path, content).expect("write should succeed");
        let file = std::fs::File::options()
            .write(true)
            .open(&path)
            .expect("open should succeed");
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .expect("set_modified should succeed");
    }

    #[tokio::test]
    async fn collect_uses_newest_file_per_runtime() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        write_with_mtime(
            dir.path(),
            "fpm_b.json",
            r#"{"http_reqs": {"values": {"rate": 1}}}"#,
            1_000,
        );
        write_with_mtime(
            dir.path(),
            "fpm_a.json",
            r#"{"http_reqs": {"values": {"rate": 2}}}"#,
            2_000,
        );
        write_with_mtime(dir.path(), "swoole_x.json", VALID, 1_500);
        write_with_mtime(dir.path(), "README.md", "ignored", 3_000);

        let set = collect(dir.path(), &labels(&["fpm", "swoole", "franken"]))
            .await
            .expect("collect should succeed");

        assert_eq!(set.labels().collect::<Vec<_>>(), vec!["fpm", "swoole"]);
        let fpm = set.get("fpm").unwrap();
        assert_eq!(fpm.source, "fpm_a.json");
        assert_eq!(fpm.throughput(), Some(2.0));
        assert_eq!(fpm.captured_at.timestamp(), 2_000);
    }

    #[tokio::test]
    async fn overlapping_labels_take_the_longest_match() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        write_with_mtime(
            dir.path(),
            "fpm_2024.json",
            r#"{"http_reqs": {"values": {"rate": 1}}}"#,
            10,
        );
        write_with_mtime(
            dir.path(),
            "fpm_jit_2024.json",
            r#"{"http_reqs": {"values": {"rate": 999}}}"#,
            20,
        );

        let set = collect(dir.path(), &labels(&["fpm", "fpm_jit"]))
            .await
            .expect("collect should succeed");

        let fpm = set.get("fpm").unwrap();
        assert_eq!(fpm.source, "fpm_2024.json");
        assert_eq!(fpm.throughput(), Some(1.0));
        let jit = set.get("fpm_jit").unwrap();
        assert_eq!(jit.source, "fpm_jit_2024.json");
        assert_eq!(jit.throughput(), Some(999.0));
    }

    #[tokio::test]
    async fn collect_ignores_subdirectories() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        std::fs::create_dir(dir.path().join("fpm_run.json")).expect("mkdir should succeed");
        write_with_mtime(dir.path(), "fpm_1.json", VALID, 10);

        let set = collect(dir.path(), &labels(&["fpm"])).await.expect("collect");
        assert_eq!(set.get("fpm").unwrap().source, "fpm_1.json");
    }

    #[tokio::test]
    async fn collect_empty_directory_is_no_data() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let err = collect(dir.path(), &labels(&["fpm"])).await.unwrap_err();
        match err {
            ReportError::NoData { dir: searched } => assert_eq!(searched, dir.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn collect_missing_directory_is_no_data() {
        let err = collect(Path::new("/nonexistent/rtbench/results"), &labels(&["fpm"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::NoData { .. }));
        assert!(err.to_string().contains("/nonexistent/rtbench/results"));
    }

    #[tokio::test]
    async fn collect_does_not_fall_back_to_older_file_when_newest_is_malformed() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        write_with_mtime(dir.path(), "fpm_old.json", VALID, 10);
        write_with_mtime(dir.path(), "fpm_new.json", "garbage", 20);
        write_with_mtime(dir.path(), "swoole_1.json", VALID, 10);

        let set = collect(dir.path(), &labels(&["fpm", "swoole"]))
            .await
            .expect("swoole is usable");
        assert!(set.get("fpm").is_none());
        assert_eq!(set.len(), 1);
    }
}
