use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::trace;

/// Default link template, virtual-hosted style S3 addressing.
pub const DEFAULT_URL_TEMPLATE: &str = "https://{bucket}.s3.amazonaws.com/{key}";

/// Default lifetime of a retrieval link, matching the SDK's presign default.
pub const DEFAULT_EXPIRES_SECS: u64 = 900;

/// Mints time-limited retrieval URLs for stored objects.
pub trait UrlSigner {
    /// Returns a URL granting download access to `key` in `bucket`.
    fn signed_url(&self, bucket: &str, key: &str) -> String;
}

/// Fills a URL template and stamps it with an expiry time.
///
/// The template may contain `{bucket}` and `{key}`. The key is
/// percent-encoded segment by segment, keeping its `/` separators. An
/// `Expires=<unix seconds>` query parameter is appended, `expires_in` after
/// the issue time.
///
/// No signature or credential is added. The links suit public buckets, CDNs
/// and gateways that honour `Expires`; S3 itself rejects them for private
/// objects. Real presigning belongs in an SDK-backed [`UrlSigner`].
#[derive(Debug, Clone)]
pub struct TemplateUrlSigner {
    template: String,
    expires_in: Duration,
    issued_at: Option<SystemTime>,
}

impl Default for TemplateUrlSigner {
    fn default() -> Self {
        Self::new(
            DEFAULT_URL_TEMPLATE,
            Duration::from_secs(DEFAULT_EXPIRES_SECS),
        )
    }
}

impl TemplateUrlSigner {
    pub fn new(template: impl Into<String>, expires_in: Duration) -> Self {
        Self {
            template: template.into(),
            expires_in,
            issued_at: None,
        }
    }

    /// Pins the issue time instead of reading the clock for every link.
    pub fn issued_at(mut self, at: SystemTime) -> Self {
        self.issued_at = Some(at);
        self
    }

    fn expires_at(&self) -> u64 {
        let issued = self.issued_at.unwrap_or_else(SystemTime::now);
        // A clock set before 1970 yields expiry relative to the epoch.
        let since_epoch = issued.duration_since(UNIX_EPOCH).unwrap_or_default();
        (since_epoch + self.expires_in).as_secs()
    }
}

impl UrlSigner for TemplateUrlSigner {
    fn signed_url(&self, bucket: &str, key: &str) -> String {
        let base = self
            .template
            .replace("{bucket}", bucket)
            .replace("{key}", &encode_key(key));
        let separator = if base.contains('?') { '&' } else { '?' };
        let url = format!("{}{}Expires={}", base, separator, self.expires_at());
        trace!("Signed {:?} in {:?} as {}", key, bucket, url);
        url
    }
}

/// Percent-encodes an object key for use in a URL path, leaving unreserved
/// characters and `/` untouched.
pub fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(char::from(byte))
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
