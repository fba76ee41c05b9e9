use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during the `s3browse` library operations.
///
/// These cover settings resolution and the failures a listing source can
/// report. A listing failure is not fatal to `browse`: it becomes a
/// [`ListingOutcome::Failed`](crate::ListingOutcome::Failed) carrying this
/// error's display text.
#[derive(Error, Debug)]
pub enum BrowseError {
    /// Neither the element attributes nor the explicit options named a bucket.
    #[error("No bucket configured: set the 'data-bucket' attribute or pass a bucket option")]
    MissingBucket,

    /// An attribute could not be parsed from its `NAME=VALUE` form.
    #[error("Invalid element attribute '{0}': expected NAME=VALUE")]
    InvalidAttribute(String),

    /// The listing manifest could not be read from disk or stdin.
    #[error("Failed to read listing manifest '{path}': {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The listing manifest was not a valid `ListObjects` JSON document.
    #[error("Failed to parse listing manifest '{path}': {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The manifest names a different bucket than the one requested.
    #[error("Listing manifest is for bucket '{found}', not '{expected}'")]
    BucketMismatch { expected: String, found: String },

    /// The local directory standing in for the bucket does not exist.
    #[error("The specified bucket does not exist: {0}")]
    BucketNotFound(PathBuf),

    /// Walking the local bucket directory failed.
    #[error("Error walking directory {path_display}: {source_str}")]
    WalkError {
        path_display: String, // Displayable path near the error
        source_str: String,   // The underlying error message from walkdir
    },
}

/// A convenience type alias for `Result<T, BrowseError>`.
pub type BrowseResult<T> = Result<T, BrowseError>;
