use std::collections::BTreeMap;

use log::debug;

use crate::errors::{BrowseError, BrowseResult};

/// Attribute holding the bucket identifier on the host element.
pub const BUCKET_ATTRIBUTE: &str = "data-bucket";
/// Attribute holding the key prefix on the host element.
pub const PREFIX_ATTRIBUTE: &str = "data-prefix";

/// The attributes read from the element a listing is rendered into.
///
/// These are the lowest-precedence source of settings. Only
/// [`BUCKET_ATTRIBUTE`] and [`PREFIX_ATTRIBUTE`] are consulted when resolving
/// [`BrowseSettings`]; other attributes are kept so the host can echo them back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementAttributes {
    values: BTreeMap<String, String>,
}

impl ElementAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Parses and sets a `NAME=VALUE` pair, as given on the command line.
    ///
    /// Only the first `=` separates name from value, so values may contain `=`.
    /// Surrounding double quotes on the value are stripped.
    pub fn set_pair(&mut self, raw: &str) -> BrowseResult<()> {
        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| BrowseError::InvalidAttribute(raw.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(BrowseError::InvalidAttribute(raw.to_string()));
        }
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        self.set(name, value);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Settings supplied explicitly by the caller. Any `Some` field takes
/// precedence over the matching element attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseOptions {
    pub bucket: Option<String>,
    pub prefix: Option<String>,
}

/// The resolved settings for one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseSettings {
    /// Bucket identifier passed to both the lister and the signer.
    pub bucket: String,

    /// Literal prefix passed to the lister and stripped from every key before
    /// it is split into path segments. May be empty.
    pub prefix: String,
}

impl BrowseSettings {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Merges element attributes with explicit options.
    ///
    /// # Errors
    /// Returns [`BrowseError::MissingBucket`] when neither source names a bucket.
    pub fn resolve(attributes: &ElementAttributes, options: &BrowseOptions) -> BrowseResult<Self> {
        let bucket = options
            .bucket
            .clone()
            .or_else(|| attributes.get(BUCKET_ATTRIBUTE).map(str::to_string))
            .ok_or(BrowseError::MissingBucket)?;
        let prefix = options
            .prefix
            .clone()
            .or_else(|| attributes.get(PREFIX_ATTRIBUTE).map(str::to_string))
            .unwrap_or_default();

        debug!("Resolved settings: bucket={:?} prefix={:?}", bucket, prefix);
        Ok(Self { bucket, prefix })
    }
}
