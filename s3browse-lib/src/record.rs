/// Opaque reference to a stored object, handed to a [`UrlSigner`](crate::UrlSigner)
/// to mint a retrieval URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    key: String,
}

impl ObjectHandle {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// The full object key the handle refers to.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// One entry of a bucket listing.
///
/// Records are produced by an [`ObjectLister`](crate::ObjectLister) and moved
/// into the listing tree; they are never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    /// Full slash-delimited key, including the listing prefix.
    pub key: String,
    pub size_bytes: u64,
    pub handle: ObjectHandle,
}

impl ObjectRecord {
    /// Builds a record whose handle points at `key` itself.
    pub fn new(key: impl Into<String>, size_bytes: u64) -> Self {
        let key = key.into();
        let handle = ObjectHandle::new(key.clone());
        Self {
            key,
            size_bytes,
            handle,
        }
    }

    /// The key with the first `prefix.len()` bytes removed.
    ///
    /// The listing source guarantees every key starts with the prefix, so this
    /// does not check it. A cut that is out of range or inside a multi-byte
    /// character yields an empty path.
    pub fn relative_path(&self, prefix: &str) -> &str {
        self.key.get(prefix.len()..).unwrap_or_default()
    }

    /// Number of `/`-separated segments in the relative path.
    pub fn segment_count(&self, prefix: &str) -> usize {
        self.relative_path(prefix).split('/').count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_strips_prefix_bytes() {
        let record = ObjectRecord::new("logs/2024/app.log", 10);
        assert_eq!(record.relative_path("logs/"), "2024/app.log");
        assert_eq!(record.relative_path(""), "logs/2024/app.log");
        assert_eq!(record.segment_count("logs/"), 2);
    }

    #[test]
    fn prefix_without_trailing_slash_leaves_empty_first_segment() {
        let record = ObjectRecord::new("logs/app.log", 10);
        assert_eq!(record.relative_path("logs"), "/app.log");
        assert_eq!(record.segment_count("logs"), 2);
    }

    #[test]
    fn key_equal_to_prefix_has_one_empty_segment() {
        let record = ObjectRecord::new("logs/", 0);
        assert_eq!(record.relative_path("logs/"), "");
        assert_eq!(record.segment_count("logs/"), 1);
    }

    #[test]
    fn handle_carries_full_key() {
        let record = ObjectRecord::new("a/b.txt", 1);
        assert_eq!(record.handle.key(), "a/b.txt");
    }
}
