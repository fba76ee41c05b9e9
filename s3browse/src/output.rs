use s3browse_lib::{escape_html, ElementAttributes, RenderTarget};

/// The element a listing is rendered into.
///
/// Unwrapped, the content is written as-is: markup for a listing, plain text
/// for the empty state or an error. Wrapped, it is enclosed in a
/// `<div class="s3browser" …>` carrying the element's attributes, and plain
/// text is escaped so it displays literally.
#[derive(Debug)]
pub struct HostElement {
    attributes: ElementAttributes,
    wrap: bool,
    content: String,
}

impl HostElement {
    pub fn new(attributes: ElementAttributes, wrap: bool) -> Self {
        Self {
            attributes,
            wrap,
            content: String::new(),
        }
    }

    pub fn into_content(self) -> String {
        self.content
    }

    fn wrapped(&self, inner: &str) -> String {
        let mut open = String::from("<div class=\"s3browser\"");
        for (name, value) in self.attributes.iter() {
            if name == "class" {
                continue;
            }
            open.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
        }
        format!("{}>{}</div>\n", open, inner)
    }
}

impl RenderTarget for HostElement {
    fn set_html(&mut self, markup: &str) {
        self.content = if self.wrap {
            self.wrapped(markup)
        } else {
            markup.to_string()
        };
    }

    fn set_text(&mut self, text: &str) {
        self.content = if self.wrap {
            self.wrapped(&escape_html(text))
        } else {
            text.to_string()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use s3browse_lib::{ListingOutcome, BUCKET_ATTRIBUTE, PREFIX_ATTRIBUTE};

    fn attributes() -> ElementAttributes {
        let mut attrs = ElementAttributes::new();
        attrs.set(BUCKET_ATTRIBUTE, "media");
        attrs.set(PREFIX_ATTRIBUTE, "photos/");
        attrs
    }

    #[test]
    fn unwrapped_output_is_verbatim() {
        let mut element = HostElement::new(attributes(), false);
        ListingOutcome::Markup("<ul></ul>".to_string()).render_into(&mut element);
        assert_eq!(element.into_content(), "<ul></ul>");

        let mut element = HostElement::new(attributes(), false);
        ListingOutcome::Failed("Access <Denied>".to_string()).render_into(&mut element);
        assert_eq!(element.into_content(), "Access <Denied>");
    }

    #[test]
    fn wrapped_markup_carries_attributes() {
        let mut element = HostElement::new(attributes(), true);
        ListingOutcome::Markup("<ul></ul>".to_string()).render_into(&mut element);
        assert_eq!(
            element.into_content(),
            "<div class=\"s3browser\" data-bucket=\"media\" data-prefix=\"photos/\"><ul></ul></div>\n"
        );
    }

    #[test]
    fn wrapped_text_is_escaped() {
        let mut element = HostElement::new(attributes(), true);
        ListingOutcome::Failed("Access <Denied>".to_string()).render_into(&mut element);
        assert_eq!(
            element.into_content(),
            "<div class=\"s3browser\" data-bucket=\"media\" data-prefix=\"photos/\">Access &lt;Denied&gt;</div>\n"
        );

        let mut element = HostElement::new(ElementAttributes::new(), true);
        ListingOutcome::Empty.render_into(&mut element);
        assert_eq!(
            element.into_content(),
            "<div class=\"s3browser\">No files found.</div>\n"
        );
    }
}
