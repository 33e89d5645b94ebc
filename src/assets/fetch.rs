use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::foundation::core::{Dimensions, build_thread_pool};
use crate::foundation::error::{AnimError, AnimResult};
use crate::timeline::compositor::MaskSet;
use crate::timeline::model::Timeline;

/// Returns the raw encoded bytes behind an image URL.
///
/// Implementations are called concurrently from a rayon pool.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> AnimResult<Vec<u8>>;
}

/// Resolves `file://` and relative URLs against a local directory.
#[derive(Clone, Debug)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Local path for `url`, or an error for schemes this fetcher cannot serve.
    pub fn resolve(&self, url: &str) -> AnimResult<PathBuf> {
        if let Some(abs) = url.strip_prefix("file://") {
            return Ok(PathBuf::from(abs));
        }
        if url.contains("://") {
            return Err(AnimError::fetch(format!(
                "no fetcher configured for remote url '{url}'"
            )));
        }
        Ok(self.root.join(normalize_rel_path(url)?))
    }
}

impl ImageFetcher for DirFetcher {
    fn fetch(&self, url: &str) -> AnimResult<Vec<u8>> {
        let path = self.resolve(url)?;
        std::fs::read(&path).map_err(|e| {
            AnimError::fetch_with_cause(format!("read '{url}' ({})", path.display()), e)
        })
    }
}

/// Serves images from memory; unknown URLs fail.
#[derive(Clone, Debug, Default)]
pub struct MemoryFetcher {
    images: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(url.into(), bytes);
    }
}

impl ImageFetcher for MemoryFetcher {
    fn fetch(&self, url: &str) -> AnimResult<Vec<u8>> {
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| AnimError::fetch(format!("no image registered for '{url}'")))
    }
}

/// Normalize a relative path to `/` separators, rejecting absolute paths and `..`.
pub(crate) fn normalize_rel_path(source: &str) -> AnimResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') || Path::new(source).is_absolute() {
        return Err(AnimError::fetch(format!(
            "mask path '{source}' must be relative"
        )));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(AnimError::fetch(format!(
                "mask path '{source}' must not contain '..'"
            )));
        }
        out.push(part);
    }
    if out.is_empty() {
        return Err(AnimError::fetch(format!(
            "mask path '{source}' has no file name"
        )));
    }
    Ok(out.join("/"))
}

/// Fetch every URL on a bounded pool. Results keep the order of `urls`.
///
/// The first failure aborts the batch as [`AnimError::SourceFetchFailed`].
pub fn fetch_all(
    urls: &[String],
    fetcher: &dyn ImageFetcher,
    threads: Option<usize>,
) -> AnimResult<Vec<(String, Vec<u8>)>> {
    if urls.is_empty() {
        return Ok(Vec::new());
    }
    let pool = build_thread_pool(threads)?;
    pool.install(|| {
        urls.par_iter()
            .map(|url| -> AnimResult<(String, Vec<u8>)> {
                let bytes = fetcher.fetch(url).map_err(|e| match e {
                    e @ AnimError::SourceFetchFailed { .. } => e,
                    other => AnimError::fetch_with_cause(format!("fetch '{url}'"), other),
                })?;
                Ok((url.clone(), bytes))
            })
            .collect()
    })
}

/// Fetch and decode every distinct mask referenced by `timeline`.
#[tracing::instrument(skip(timeline, fetcher))]
pub fn fetch_masks(
    timeline: &Timeline,
    fetcher: &dyn ImageFetcher,
    dims: Dimensions,
    threads: Option<usize>,
) -> AnimResult<MaskSet> {
    let urls = timeline.mask_urls();
    let fetched = fetch_all(&urls, fetcher, threads)?;

    let mut masks = MaskSet::new(dims);
    for (url, bytes) in fetched {
        masks.insert_encoded(url, &bytes)?;
    }
    tracing::debug!(masks = masks.len(), "mask images ready");
    Ok(masks)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
