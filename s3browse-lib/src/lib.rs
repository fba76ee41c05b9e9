#![doc = include_str!("../README.md")]

use log::{debug, error, info};

mod config;
mod errors;
mod listing;
mod record;
mod render;
mod signing;
mod tree;

pub use config::{
    BrowseOptions, BrowseSettings, ElementAttributes, BUCKET_ATTRIBUTE, PREFIX_ATTRIBUTE,
};
pub use errors::{BrowseError, BrowseResult};
pub use listing::{LocalDirLister, ManifestLister, ManifestSource, ObjectLister, DEFAULT_MAX_KEYS};
pub use record::{ObjectHandle, ObjectRecord};
pub use render::{escape_html, format_size_kb, render_markup};
pub use signing::{
    encode_key, TemplateUrlSigner, UrlSigner, DEFAULT_EXPIRES_SECS, DEFAULT_URL_TEMPLATE,
};
pub use tree::{Directory, Leaf, ListingTree, NodeId, TreeNode};

/// Text shown in place of markup when a listing holds no objects.
pub const EMPTY_LISTING_TEXT: &str = "No files found.";

/// Result of one listing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingOutcome {
    /// Nested `<ul>` markup for the listing.
    Markup(String),
    /// The listing succeeded but held no objects.
    Empty,
    /// The listing call failed; carries its error text verbatim.
    Failed(String),
}

impl ListingOutcome {
    /// The string handed to the host: markup, the empty-state text, or the
    /// error text.
    pub fn as_str(&self) -> &str {
        match self {
            ListingOutcome::Markup(markup) => markup,
            ListingOutcome::Empty => EMPTY_LISTING_TEXT,
            ListingOutcome::Failed(message) => message,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ListingOutcome::Failed(_))
    }

    /// Hands the outcome to `target`: markup as HTML, anything else as text.
    pub fn render_into<T: RenderTarget + ?Sized>(&self, target: &mut T) {
        match self {
            ListingOutcome::Markup(markup) => target.set_html(markup),
            ListingOutcome::Empty | ListingOutcome::Failed(_) => target.set_text(self.as_str()),
        }
    }
}

/// The insertion point a listing is displayed in.
pub trait RenderTarget {
    /// Replaces the target's content with markup.
    fn set_html(&mut self, markup: &str);
    /// Replaces the target's content with plain text.
    fn set_text(&mut self, text: &str);
}

/// Turns the result of a listing call into a [`ListingOutcome`].
///
/// A failed listing short-circuits to [`ListingOutcome::Failed`] with the
/// error's display text, and an empty one to [`ListingOutcome::Empty`].
/// Otherwise the records are arranged into a [`ListingTree`] under
/// `settings.prefix` and rendered with links minted by `signer`.
///
/// # Examples
///
/// ```
/// use s3browse_lib::{build_listing, BrowseSettings, ObjectRecord, UrlSigner};
///
/// struct Plain;
/// impl UrlSigner for Plain {
///     fn signed_url(&self, bucket: &str, key: &str) -> String {
///         format!("https://{}.example.com/{}", bucket, key)
///     }
/// }
///
/// let settings = BrowseSettings::new("media", "");
/// let records = vec![ObjectRecord::new("docs/a.txt", 1024)];
/// let outcome = build_listing(Ok(records), &settings, &Plain);
/// assert_eq!(
///     outcome.as_str(),
///     "<ul><li>docs<ul><li><a href=\"https://media.example.com/docs/a.txt\">a.txt</a> (1.0kb)</li></ul></li></ul>"
/// );
/// ```
pub fn build_listing(
    listing: BrowseResult<Vec<ObjectRecord>>,
    settings: &BrowseSettings,
    signer: &dyn UrlSigner,
) -> ListingOutcome {
    let records = match listing {
        Ok(records) => records,
        Err(e) => {
            error!("Listing of bucket {:?} failed: {}", settings.bucket, e);
            return ListingOutcome::Failed(e.to_string());
        }
    };

    if records.is_empty() {
        info!(
            "No objects in bucket {:?} under prefix {:?}",
            settings.bucket, settings.prefix
        );
        return ListingOutcome::Empty;
    }

    let tree = ListingTree::build(records, &settings.prefix);
    let markup = render_markup(&tree, &settings.bucket, signer);
    debug!("Rendered {} bytes of markup", markup.len());
    ListingOutcome::Markup(markup)
}

/// Runs one listing against `lister` and renders it.
pub fn browse(
    lister: &dyn ObjectLister,
    signer: &dyn UrlSigner,
    settings: &BrowseSettings,
) -> ListingOutcome {
    info!(
        "Listing bucket {:?} with prefix {:?}",
        settings.bucket, settings.prefix
    );
    let listing = lister.list_objects(&settings.bucket, &settings.prefix);
    build_listing(listing, settings, signer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Signer that counts how often it is asked for a URL.
    #[derive(Default)]
    struct CountingSigner {
        calls: Cell<usize>,
    }

    impl UrlSigner for CountingSigner {
        fn signed_url(&self, bucket: &str, key: &str) -> String {
            self.calls.set(self.calls.get() + 1);
            format!("https://{}.test/{}", bucket, key)
        }
    }

    struct FixedLister(Vec<ObjectRecord>);

    impl ObjectLister for FixedLister {
        fn list_objects(&self, _bucket: &str, prefix: &str) -> BrowseResult<Vec<ObjectRecord>> {
            Ok(self
                .0
                .iter()
                .filter(|r| r.key.starts_with(prefix))
                .cloned()
                .collect())
        }
    }

    struct FailingLister;

    impl ObjectLister for FailingLister {
        fn list_objects(&self, bucket: &str, _prefix: &str) -> BrowseResult<Vec<ObjectRecord>> {
            Err(BrowseError::BucketNotFound(bucket.into()))
        }
    }

    #[derive(Default)]
    struct RecordingTarget {
        html: Option<String>,
        text: Option<String>,
    }

    impl RenderTarget for RecordingTarget {
        fn set_html(&mut self, markup: &str) {
            self.html = Some(markup.to_string());
        }
        fn set_text(&mut self, text: &str) {
            self.text = Some(text.to_string());
        }
    }

    #[test]
    fn empty_listing_yields_empty_state_text() {
        let signer = CountingSigner::default();
        let outcome = build_listing(Ok(Vec::new()), &BrowseSettings::new("b", ""), &signer);
        assert_eq!(outcome, ListingOutcome::Empty);
        assert_eq!(outcome.as_str(), "No files found.");
        assert!(!outcome.as_str().contains('<'));
    }

    #[test]
    fn failed_listing_yields_error_text_without_rendering() {
        let signer = CountingSigner::default();
        let outcome = browse(&FailingLister, &signer, &BrowseSettings::new("gone", ""));
        assert_eq!(
            outcome,
            ListingOutcome::Failed("The specified bucket does not exist: gone".to_string())
        );
        assert_eq!(signer.calls.get(), 0);
    }

    #[test]
    fn one_leaf_per_record_with_final_segment_label() {
        let records = vec![
            ObjectRecord::new("a/x.txt", 100),
            ObjectRecord::new("a/b/y.txt", 2000),
            ObjectRecord::new("c/d/e/z.txt", 3072),
            ObjectRecord::new("c/w.txt", 0),
        ];
        let signer = CountingSigner::default();
        let outcome = build_listing(Ok(records.clone()), &BrowseSettings::new("b", ""), &signer);
        let markup = outcome.as_str();

        assert_eq!(markup.matches("<a href=").count(), records.len());
        assert_eq!(signer.calls.get(), records.len());
        for (label, size) in [
            ("x.txt", "0.1kb"),
            ("y.txt", "2.0kb"),
            ("z.txt", "3.0kb"),
            ("w.txt", "0.0kb"),
        ] {
            assert!(
                markup.contains(&format!(">{}</a> ({})", label, size)),
                "missing leaf {} in {}",
                label,
                markup
            );
        }
    }

    #[test]
    fn nested_example_renders_expected_tree() {
        let lister = FixedLister(vec![
            ObjectRecord::new("dir1/dir2/file1.bin", 2048),
            ObjectRecord::new("dir1/file2.bin", 1024),
        ]);
        let outcome = browse(&lister, &CountingSigner::default(), &BrowseSettings::new("b", ""));
        assert_eq!(
            outcome.as_str(),
            "<ul><li>dir1<ul>\
             <li><a href=\"https://b.test/dir1/file2.bin\">file2.bin</a> (1.0kb)</li>\
             <li>dir2<ul><li><a href=\"https://b.test/dir1/dir2/file1.bin\">file1.bin</a> (2.0kb)</li></ul></li>\
             </ul></li></ul>"
        );
    }

    #[test]
    fn file_directly_under_prefix_shows_no_link() {
        let lister = FixedLister(vec![ObjectRecord::new("logs/app.log", 512)]);
        let signer = CountingSigner::default();
        let outcome = browse(&lister, &signer, &BrowseSettings::new("b", "logs/"));
        assert_eq!(outcome.as_str(), "<ul><li>app.log<ul></ul></li></ul>");
        assert!(!outcome.as_str().contains("0.5kb"));
        assert_eq!(signer.calls.get(), 0);
    }

    #[test]
    fn outcomes_reach_the_right_target_slot() {
        let mut target = RecordingTarget::default();
        ListingOutcome::Markup("<ul></ul>".to_string()).render_into(&mut target);
        assert_eq!(target.html.as_deref(), Some("<ul></ul>"));
        assert!(target.text.is_none());

        let mut target = RecordingTarget::default();
        ListingOutcome::Empty.render_into(&mut target);
        assert_eq!(target.text.as_deref(), Some(EMPTY_LISTING_TEXT));
        assert!(target.html.is_none());

        let mut target = RecordingTarget::default();
        ListingOutcome::Failed("Access Denied".to_string()).render_into(&mut target);
        assert_eq!(target.text.as_deref(), Some("Access Denied"));
    }
}
