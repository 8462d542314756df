/// The linker: scans documents, resolves anchors against the target cache,
/// and writes back every document that gained at least one reference.

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::cache::{CacheError, TargetCache};
use crate::core::config::{ConfigError, LinkerConfig};
use crate::core::document::{Document, DocumentError};
use crate::core::header;
use crate::core::inject::{ReferenceInjector, TargetRef};
use crate::core::resolve::NameResolver;
use crate::core::scanner::{BlockScanner, FieldNames};
use crate::schema::{AnchorOutcome, Block, DocumentReport, LinkSummary};

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("target cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A configured linker with its target cache snapshot. Built via
/// `Linker::builder()`.
pub struct Linker {
    config: LinkerConfig,
    fields: FieldNames,
    cache: TargetCache,
    resolver: NameResolver,
    dry_run: bool,
}

/// Builder for constructing a `Linker`.
pub struct LinkerBuilder {
    config: Option<LinkerConfig>,
    config_path: Option<PathBuf>,
    targets_dir: Option<PathBuf>,
    cache: Option<TargetCache>,
    dry_run: bool,
}

impl Linker {
    pub fn builder() -> LinkerBuilder {
        LinkerBuilder {
            config: None,
            config_path: None,
            targets_dir: None,
            cache: None,
            dry_run: false,
        }
    }

    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    pub fn cache(&self) -> &TargetCache {
        &self.cache
    }

    /// Link every document under `paths`. Directories are expanded to their
    /// documents (recursively when asked); plain files are taken as given.
    ///
    /// Only a top-level directory that cannot be listed aborts the run;
    /// per-document failures land in the summary.
    pub fn link(&self, paths: &[PathBuf], recursive: bool) -> Result<LinkSummary, LinkError> {
        let mut documents = Vec::new();
        for path in paths {
            if path.is_dir() {
                documents.extend(collect_documents(path, &self.config.extension, recursive)?);
            } else {
                documents.push(path.clone());
            }
        }
        Ok(self.link_paths(&documents))
    }

    /// Link an explicit list of documents.
    pub fn link_paths(&self, paths: &[PathBuf]) -> LinkSummary {
        let mut summary = LinkSummary::default();
        for path in paths {
            match self.link_document(path) {
                Ok(report) => summary.add_report(&report),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                    summary.add_failure(path, e);
                }
            }
        }
        summary
    }

    /// Link one document in place.
    pub fn link_document(&self, path: &Path) -> Result<DocumentReport, DocumentError> {
        let mut doc = Document::load(path)?;
        let report = self.link_in_memory(&mut doc)?;
        if report.written {
            doc.save()?;
            tracing::info!(
                "patched {} ({} wired, {} new declarations)",
                path.display(),
                report.wired(),
                report.declarations_added
            );
        }
        Ok(report)
    }

    /// Patch `doc` in memory. `written` on the report says whether the
    /// caller should persist it; in dry-run mode it is always false.
    ///
    /// On error `doc` is left untouched.
    pub fn link_in_memory(&self, doc: &mut Document) -> Result<DocumentReport, DocumentError> {
        let scan = BlockScanner::new(&self.fields).scan(&doc.lines);
        let header_index = scan.header.ok_or(DocumentError::MissingHeader)?;
        // Reject a malformed counter before any work is planned.
        header::read_counter(&doc.lines[header_index])?;

        let seed = document_seed(self.config.seed, &doc.path);
        let mut injector =
            ReferenceInjector::new(&scan, self.config.element_script.as_deref(), seed);
        let mut report = DocumentReport::new(&doc.path);

        for anchor in scan.anchors() {
            let outcome = self.link_anchor(&mut injector, anchor)?;
            tracing::debug!(
                document = %doc.path.display(),
                anchor = %anchor.label(),
                ?outcome,
                "anchor"
            );
            report.record(anchor.label(), outcome);
        }

        if injector.is_empty() {
            return Ok(report);
        }

        // Steps already loaded: every declaration, every embedded block, and
        // the document itself. Used only when the header lacks a counter.
        let present = (scan.declarations.len() + scan.blocks.len() + 1) as u64;
        let header_line =
            header::bump(&doc.lines[header_index], injector.new_declarations(), present)?;
        report.declarations_added = injector.apply(doc);
        doc.lines[header_index] = header_line;
        report.written = !self.dry_run;
        Ok(report)
    }

    fn link_anchor(
        &self,
        injector: &mut ReferenceInjector<'_>,
        anchor: &Block,
    ) -> Result<AnchorOutcome, DocumentError> {
        if !self.config.accepts_category(anchor.category.as_deref()) {
            return Ok(AnchorOutcome::Ignored);
        }
        if anchor.has_target_field {
            return Ok(AnchorOutcome::AlreadyWired);
        }
        let Some(name) = anchor.name.as_deref() else {
            return Ok(AnchorOutcome::Ignored);
        };
        let Some(target_path) = self.resolver.resolve(name) else {
            return Ok(AnchorOutcome::Unresolved {
                reason: format!("no size token in '{}'", name),
            });
        };
        let Some(uid) = self.cache.get(&target_path) else {
            return Ok(AnchorOutcome::Unresolved {
                reason: format!("'{}' is not a known target", target_path),
            });
        };

        let injection = injector.inject(
            anchor,
            &self.config.target_field,
            self.config.reference_kind(anchor.is_root()),
            TargetRef {
                path: &target_path,
                uid,
                resource_type: &self.config.target_type,
            },
        )?;
        Ok(AnchorOutcome::Wired {
            target: target_path,
            new_declaration: injection.new_declaration,
        })
    }
}

impl LinkerBuilder {
    /// Use an already loaded config.
    pub fn config(mut self, config: LinkerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the config from a RON file at build time.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Override the config's target directory.
    pub fn targets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.targets_dir = Some(dir.into());
        self
    }

    /// Provide the cache directly instead of scanning (for testing without files).
    pub fn with_cache(mut self, cache: TargetCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn build(self) -> Result<Linker, LinkError> {
        let mut config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => LinkerConfig::load_from_ron(&path)?,
            (None, None) => LinkerConfig::default(),
        };
        if let Some(dir) = self.targets_dir {
            config.targets_dir = dir;
        }
        config.validate()?;

        let cache = match self.cache {
            Some(cache) => cache,
            None => TargetCache::build(
                &config.targets_dir,
                &config.targets_res_dir,
                &config.extension,
            )?,
        };
        let resolver = NameResolver::new(
            config.tokens.clone(),
            &config.targets_res_dir,
            &config.extension,
        );

        Ok(Linker {
            fields: config.field_names(),
            config,
            cache,
            resolver,
            dry_run: self.dry_run,
        })
    }
}

/// Documents with `extension` in `dir`, sorted by path.
pub fn collect_documents(
    dir: &Path,
    extension: &str,
    recursive: bool,
) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut out = Vec::new();
    collect_into(dir, extension.trim_start_matches('.'), recursive, &mut out)?;
    out.sort();
    Ok(out)
}

/// Only `dir` itself must be listable; unreadable entries and
/// sub-directories are logged and skipped.
fn collect_into(
    dir: &Path,
    extension: &str,
    recursive: bool,
    out: &mut Vec<PathBuf>,
) -> Result<(), std::io::Error> {
    for entry in std::fs::read_dir(dir)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                tracing::warn!("skipping entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        if path.is_dir() {
            if recursive {
                if let Err(e) = collect_into(&path, extension, recursive, out) {
                    tracing::warn!("skipping directory {}: {}", path.display(), e);
                }
            }
        } else if path.extension().and_then(|e| e.to_str()) == Some(extension) {
            out.push(path);
        }
    }
    Ok(())
}

fn document_seed(base: u64, path: &Path) -> u64 {
    let mut hasher = FxHasher::default();
    path.hash(&mut hasher);
    base ^ hasher.finish()
}
