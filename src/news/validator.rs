use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::news::{Article, Source};

/// Sentinel name for articles whose source is missing.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Validation and sanitization pipeline for untrusted article payloads.
///
/// Operates on raw JSON records so one malformed entry never poisons the
/// batch: malformed records are dropped rather than surfaced as errors,
/// and survivors keep their input order.
pub struct Validator {
    script_re: Regex,
    tag_re: Regex,
}

impl Validator {
    pub fn new() -> Self {
        // Patterns are static, so compilation cannot fail at runtime.
        let script_re = Regex::new(r"(?is)<script\b.*?</script\s*>")
            .expect("Failed to compile script-tag pattern");
        let tag_re = Regex::new(r"<[^>]*>").expect("Failed to compile markup pattern");

        Self { script_re, tag_re }
    }

    /// Strip script blocks and any remaining markup tags, then trim.
    pub fn sanitize_text(&self, text: &str) -> String {
        let without_scripts = self.script_re.replace_all(text, "");
        let without_tags = self.tag_re.replace_all(&without_scripts, "");
        without_tags.trim().to_string()
    }

    /// Sanitize a loosely typed text field; non-string or absent values
    /// normalize to the empty string.
    fn sanitize_field(&self, record: &Value, field: &str) -> String {
        match record.get(field) {
            Some(Value::String(s)) => self.sanitize_text(s),
            _ => String::new(),
        }
    }

    /// Validate a single raw record into an [`Article`], or nothing.
    ///
    /// Required: a well-formed object with a non-empty title and a
    /// syntactically valid absolute URL. Optional URLs (image, source)
    /// degrade to empty strings when invalid instead of rejecting the
    /// whole article.
    pub fn validate_article(&self, raw: &Value) -> Option<Article> {
        if !raw.is_object() {
            debug!("Dropping non-object article record");
            return None;
        }

        let title = self.sanitize_field(raw, "title");
        if title.is_empty() {
            debug!("Dropping article without a usable title");
            return None;
        }

        let url = match raw.get("url").and_then(Value::as_str) {
            Some(url) if is_valid_url(url) => url.to_string(),
            _ => {
                debug!("Dropping article '{}' without a valid URL", title);
                return None;
            }
        };

        let image = match raw.get("image").and_then(Value::as_str) {
            Some(image) if is_valid_url(image) => image.to_string(),
            _ => String::new(),
        };

        let published_at = raw
            .get("publishedAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        let source = raw.get("source").unwrap_or(&Value::Null);
        let source_name = match self.sanitize_field(source, "name") {
            name if name.is_empty() => UNKNOWN_SOURCE.to_string(),
            name => name,
        };
        let source_url = match source.get("url").and_then(Value::as_str) {
            Some(url) if is_valid_url(url) => url.to_string(),
            _ => String::new(),
        };

        Some(Article {
            title,
            description: self.sanitize_field(raw, "description"),
            content: self.sanitize_field(raw, "content"),
            url,
            image,
            published_at,
            source: Source {
                name: source_name,
                url: source_url,
            },
        })
    }

    /// Reduce a response batch to its well-formed articles, preserving
    /// input order. A wholly malformed batch yields an empty list.
    pub fn validate_articles(&self, raw: &[Value]) -> Vec<Article> {
        raw.iter()
            .filter_map(|article| self.validate_article(article))
            .collect()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute-URL syntax check.
pub fn is_valid_url(url: &str) -> bool {
    url::Url::parse(url).is_ok()
}
