use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::errors::{BrowseError, BrowseResult};
use crate::record::ObjectRecord;

/// Number of keys a single listing page holds.
pub const DEFAULT_MAX_KEYS: usize = 1000;

/// A bucket listing call. Only the first page of results is returned.
pub trait ObjectLister {
    /// Lists the objects of `bucket` whose keys start with `prefix`.
    fn list_objects(&self, bucket: &str, prefix: &str) -> BrowseResult<Vec<ObjectRecord>>;
}

/// Where a [`ManifestLister`] reads its JSON from.
#[derive(Debug, Clone)]
pub enum ManifestSource {
    File(PathBuf),
    Stdin,
    Inline(String),
}

impl ManifestSource {
    /// `-` means stdin; anything else is a file path.
    pub fn from_arg(arg: &Path) -> Self {
        if arg == Path::new("-") {
            ManifestSource::Stdin
        } else {
            ManifestSource::File(arg.to_path_buf())
        }
    }

    fn display_path(&self) -> PathBuf {
        match self {
            ManifestSource::File(path) => path.clone(),
            ManifestSource::Stdin => PathBuf::from("<stdin>"),
            ManifestSource::Inline(_) => PathBuf::from("<inline>"),
        }
    }

    fn read(&self) -> io::Result<String> {
        match self {
            ManifestSource::File(path) => fs::read_to_string(path),
            ManifestSource::Stdin => {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                Ok(buffer)
            }
            ManifestSource::Inline(json) => Ok(json.clone()),
        }
    }
}

/// Lists objects from a saved `ListObjects` / `ListObjectsV2` response, such
/// as the output of `aws s3api list-objects-v2 --bucket B --prefix P`.
///
/// The CLI follows continuation tokens on its own, so a saved response may
/// hold the whole bucket. Only the first `max_keys` matching entries are
/// returned, in manifest order.
#[derive(Debug, Clone)]
pub struct ManifestLister {
    source: ManifestSource,
    max_keys: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListObjectsDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    is_truncated: bool,
    #[serde(default)]
    contents: Vec<ManifestObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ManifestObject {
    key: String,
    #[serde(default)]
    size: u64,
}

impl ManifestLister {
    pub fn new(source: ManifestSource) -> Self {
        Self {
            source,
            max_keys: DEFAULT_MAX_KEYS,
        }
    }

    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }
}

impl ObjectLister for ManifestLister {
    fn list_objects(&self, bucket: &str, prefix: &str) -> BrowseResult<Vec<ObjectRecord>> {
        let path = self.source.display_path();
        debug!("Reading listing manifest from {:?}", path);
        let raw = self.source.read().map_err(|e| BrowseError::ManifestRead {
            path: path.clone(),
            source: e,
        })?;

        // The CLI prints nothing at all for an empty listing.
        if raw.trim().is_empty() {
            info!("Listing manifest {:?} is empty", path);
            return Ok(Vec::new());
        }

        let document: ListObjectsDocument =
            serde_json::from_str(&raw).map_err(|e| BrowseError::ManifestParse {
                path: path.clone(),
                source: e,
            })?;

        if let Some(found) = document.name {
            if found != bucket {
                return Err(BrowseError::BucketMismatch {
                    expected: bucket.to_string(),
                    found,
                });
            }
        }
        if document.is_truncated {
            warn!("Listing manifest is truncated; only the first page is shown");
        }

        let total = document.contents.len();
        let mut records: Vec<ObjectRecord> = document
            .contents
            .into_iter()
            .filter(|object| object.key.starts_with(prefix))
            .map(|object| ObjectRecord::new(object.key, object.size))
            .collect();
        if records.len() > self.max_keys {
            warn!(
                "Listing manifest holds {} matching objects; only the first {} are listed",
                records.len(),
                self.max_keys
            );
            records.truncate(self.max_keys);
        }
        info!(
            "Manifest lists {} objects, {} under prefix {:?}",
            total,
            records.len(),
            prefix
        );
        Ok(records)
    }
}

/// Treats `<root>/<bucket>/` on the local filesystem as a bucket.
///
/// Keys are the `/`-joined paths of regular files relative to the bucket
/// directory, returned in lexicographic order and capped at `max_keys`.
#[derive(Debug, Clone)]
pub struct LocalDirLister {
    root: PathBuf,
    max_keys: usize,
}

impl LocalDirLister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_keys: DEFAULT_MAX_KEYS,
        }
    }

    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }
}

impl ObjectLister for LocalDirLister {
    fn list_objects(&self, bucket: &str, prefix: &str) -> BrowseResult<Vec<ObjectRecord>> {
        let bucket_dir = self.root.join(bucket);
        debug!("Listing local bucket directory {:?}", bucket_dir);
        if !bucket_dir.is_dir() {
            return Err(BrowseError::BucketNotFound(bucket_dir));
        }

        let mut records = Vec::new();
        for entry_result in WalkDir::new(&bucket_dir) {
            let entry = entry_result.map_err(|e| walk_error(&bucket_dir, e))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&bucket_dir) else {
                continue;
            };
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if !key.starts_with(prefix) {
                continue;
            }

            let metadata = entry.metadata().map_err(|e| walk_error(&bucket_dir, e))?;
            records.push(ObjectRecord::new(key, metadata.len()));
        }

        records.sort_by(|a, b| a.key.cmp(&b.key));
        if records.len() > self.max_keys {
            warn!(
                "Local bucket {:?} holds {} matching objects; only the first {} are listed",
                bucket,
                records.len(),
                self.max_keys
            );
            records.truncate(self.max_keys);
        }
        info!(
            "Found {} objects in local bucket {:?} under prefix {:?}",
            records.len(),
            bucket,
            prefix
        );
        Ok(records)
    }
}

fn walk_error(bucket_dir: &Path, e: walkdir::Error) -> BrowseError {
    let path_display = e.path().map_or_else(
        || bucket_dir.display().to_string(),
        |p| p.display().to_string(),
    );
    BrowseError::WalkError {
        path_display,
        source_str: e.to_string(),
    }
}
