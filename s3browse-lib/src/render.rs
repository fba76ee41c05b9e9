use log::debug;

use crate::signing::UrlSigner;
use crate::tree::{Directory, ListingTree};

/// Serializes a listing tree as nested `<ul>` markup.
///
/// Inside each directory the leaves come first, each rendered as a link to a
/// URL minted by `signer` followed by its size, then the sub-directories,
/// each as its name followed by a nested list. Both groups keep insertion
/// order. Text and attribute values are HTML-escaped.
pub fn render_markup(tree: &ListingTree, bucket: &str, signer: &dyn UrlSigner) -> String {
    debug!("Rendering {} leaves as markup", tree.leaf_count());
    let mut markup = String::new();
    if let Some(root) = tree.directory(tree.root()) {
        render_directory(tree, root, bucket, signer, &mut markup);
    }
    markup
}

fn render_directory(
    tree: &ListingTree,
    dir: &Directory,
    bucket: &str,
    signer: &dyn UrlSigner,
    markup: &mut String,
) {
    markup.push_str("<ul>");
    for id in dir.files() {
        if let Some(leaf) = tree.leaf(*id) {
            let url = signer.signed_url(bucket, leaf.record.handle.key());
            markup.push_str(&format!(
                "<li><a href=\"{}\">{}</a> ({})</li>",
                escape_html(&url),
                escape_html(&leaf.label),
                format_size_kb(leaf.record.size_bytes)
            ));
        }
    }
    for id in dir.dirs() {
        if let Some(child) = tree.directory(*id) {
            markup.push_str("<li>");
            markup.push_str(&escape_html(&child.name));
            render_directory(tree, child, bucket, signer, markup);
            markup.push_str("</li>");
        }
    }
    markup.push_str("</ul>");
}

/// Formats a byte count as kilobytes with one decimal, e.g. `0.5kb`.
///
/// Ties round up (`256` bytes is `0.3kb`). Integer arithmetic keeps this
/// exact for every `u64`.
pub fn format_size_kb(size_bytes: u64) -> String {
    let tenths = (u128::from(size_bytes) * 20 + 1024) / 2048;
    format!("{}.{}kb", tenths / 10, tenths % 10)
}

/// Escapes text for use in HTML content or a double-quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ObjectRecord;

    struct FakeSigner;

    impl UrlSigner for FakeSigner {
        fn signed_url(&self, bucket: &str, key: &str) -> String {
            format!("https://signed.test/{}/{}", bucket, key)
        }
    }

    #[test]
    fn size_is_rounded_to_one_decimal() {
        assert_eq!(format_size_kb(0), "0.0kb");
        assert_eq!(format_size_kb(512), "0.5kb");
        assert_eq!(format_size_kb(1024), "1.0kb");
        assert_eq!(format_size_kb(1023), "1.0kb");
        assert_eq!(format_size_kb(2048), "2.0kb");
        assert_eq!(format_size_kb(1536), "1.5kb");
        assert_eq!(format_size_kb(50), "0.0kb");
        assert_eq!(format_size_kb(52), "0.1kb");
    }

    #[test]
    fn size_ties_round_up() {
        // 256 / 1024 = 0.25 exactly.
        assert_eq!(format_size_kb(256), "0.3kb");
        // 1280 / 1024 = 1.25 exactly.
        assert_eq!(format_size_kb(1280), "1.3kb");
    }

    #[test]
    fn huge_sizes_do_not_overflow() {
        assert_eq!(format_size_kb(u64::MAX), "18014398509481984.0kb");
    }

    #[test]
    fn nested_tree_renders_leaves_before_directories() {
        let tree = ListingTree::build(
            vec![
                ObjectRecord::new("dir1/dir2/file1.bin", 2048),
                ObjectRecord::new("dir1/file2.bin", 1024),
            ],
            "",
        );
        let markup = render_markup(&tree, "bucket", &FakeSigner);
        assert_eq!(
            markup,
            "<ul><li>dir1<ul>\
             <li><a href=\"https://signed.test/bucket/dir1/file2.bin\">file2.bin</a> (1.0kb)</li>\
             <li>dir2<ul>\
             <li><a href=\"https://signed.test/bucket/dir1/dir2/file1.bin\">file1.bin</a> (2.0kb)</li>\
             </ul></li>\
             </ul></li></ul>"
        );
    }

    #[test]
    fn empty_bucket_renders_empty_list() {
        let tree = ListingTree::build(vec![ObjectRecord::new("logs/app.log", 512)], "logs/");
        assert_eq!(
            render_markup(&tree, "bucket", &FakeSigner),
            "<ul><li>app.log<ul></ul></li></ul>"
        );
    }

    #[test]
    fn labels_and_urls_are_escaped() {
        let tree = ListingTree::build(vec![ObjectRecord::new("<b>/a&b\".txt", 1024)], "");
        let markup = render_markup(&tree, "bkt", &FakeSigner);
        assert_eq!(
            markup,
            "<ul><li>&lt;b&gt;<ul>\
             <li><a href=\"https://signed.test/bkt/&lt;b&gt;/a&amp;b&quot;.txt\">a&amp;b&quot;.txt</a> (1.0kb)</li>\
             </ul></li></ul>"
        );
    }
}
