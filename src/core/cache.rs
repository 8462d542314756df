/// Target cache — stable identifiers of every candidate target document.
///
/// Built once per run from a directory scan that reads only each file's
/// header line. Read-only afterwards.

use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::document::SectionTag;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cannot open target directory '{path}': {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Mapping from target path (`res://...`) to stable identifier.
/// An empty identifier means the target's header declares none.
#[derive(Debug, Clone, Default)]
pub struct TargetCache {
    entries: FxHashMap<String, String>,
}

impl TargetCache {
    /// Scan `dir` for files ending in `.{extension}` (a leading dot on
    /// `extension` is ignored) and record each one
    /// under `{res_dir}/{file_name}`.
    ///
    /// Sub-directories are not descended into. A file that cannot be read is
    /// recorded with an empty identifier.
    pub fn build(dir: &Path, res_dir: &str, extension: &str) -> Result<TargetCache, CacheError> {
        let entries = std::fs::read_dir(dir).map_err(|source| CacheError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;

        let extension = extension.trim_start_matches('.');
        let base = res_dir.trim_end_matches('/');
        let mut cache = TargetCache::default();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let uid = match read_header(&path) {
                Ok(header) => extract_uid(&header).unwrap_or_default(),
                Err(e) => {
                    tracing::warn!("cannot read target header {}: {}", path.display(), e);
                    String::new()
                }
            };
            tracing::debug!(target_path = %path.display(), uid = %uid, "cached target");
            cache.entries.insert(format!("{}/{}", base, file_name), uid);
        }

        tracing::info!("target cache: {} documents from {}", cache.len(), dir.display());
        Ok(cache)
    }

    /// Build a cache from explicit `(path, uid)` pairs.
    pub fn from_entries<I, K, V>(entries: I) -> TargetCache
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        TargetCache {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Stable identifier for `path`; `Some("")` when the target exists but
    /// declares none, `None` when the target is unknown.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by path.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        out.sort_unstable();
        out
    }
}

fn read_header(path: &Path) -> std::io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line)
}

/// The `uid` attribute of a header line, if present and non-empty.
pub fn extract_uid(header: &str) -> Option<String> {
    SectionTag::parse(header)?
        .attr("uid")
        .filter(|uid| !uid.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_uid_from_header() {
        assert_eq!(
            extract_uid(r#"[gd_resource type="Resource" load_steps=2 format=3 uid="uid://d6f"]"#),
            Some("uid://d6f".to_string())
        );
        assert_eq!(extract_uid(r#"[gd_resource type="Resource" format=3]"#), None);
        assert_eq!(extract_uid("not a header"), None);
    }

    #[test]
    fn build_scans_headers_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("d6_fire.tres"),
            "[gd_resource type=\"Resource\" format=3 uid=\"uid://fire6\"]\n\n[resource]\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("d8_none.tres"),
            "[gd_resource type=\"Resource\" format=3]\n\n[resource]\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "uid=\"uid://ignored\"").unwrap();
        std::fs::create_dir(dir.path().join("nested.tres")).unwrap();

        let cache = TargetCache::build(dir.path(), "res://dice/", "tres").unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("res://dice/d6_fire.tres"), Some("uid://fire6"));
        assert_eq!(cache.get("res://dice/d8_none.tres"), Some(""));
        assert_eq!(cache.get("res://dice/notes.txt"), None);
        assert_eq!(
            cache.sorted().first().map(|(p, _)| *p),
            Some("res://dice/d6_fire.tres")
        );
    }

    #[test]
    fn build_accepts_dotted_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("d4_ice.tres"),
            "[gd_resource type=\"Resource\" format=3 uid=\"uid://ice4\"]\n",
        )
        .unwrap();

        let cache = TargetCache::build(dir.path(), "res://dice", ".tres").unwrap();
        assert_eq!(cache.get("res://dice/d4_ice.tres"), Some("uid://ice4"));
    }

    #[test]
    fn build_fails_on_missing_directory() {
        let err = TargetCache::build(Path::new("/nonexistent/targets"), "res://x", "tres")
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/targets"));
    }

    #[test]
    fn from_entries_lookup() {
        let cache = TargetCache::from_entries([("res://a.tres", "uid://a")]);
        assert!(!cache.is_empty());
        assert_eq!(cache.get("res://a.tres"), Some("uid://a"));
        assert_eq!(cache.get("res://b.tres"), None);
    }
}
