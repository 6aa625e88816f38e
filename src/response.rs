//! Response metadata captured from the final header block.
//!
//! There is no body: the transfer is cut off as soon as the headers are in.

use crate::filename;
use std::collections::HashMap;
use url::Url;

/// What the server said about a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Final URL, after any redirects that were followed.
    pub url: Url,
    /// HTTP status code (e.g. `200`, `404`).
    pub status: u16,
    /// Media type from `Content-Type`, parameters stripped and lower-cased
    /// (e.g. `text/html`). `None` when the header is missing or empty.
    pub mime_type: Option<String>,
    /// Header names exactly as the server sent them. Repeated headers are
    /// joined with `", "`.
    pub headers: HashMap<String, String>,
}

impl Response {
    pub fn new(url: Url, status: u16, headers: HashMap<String, String>) -> Self {
        let mime_type = find_header(&headers, "Content-Type").and_then(media_type);
        Self {
            url,
            status,
            mime_type,
            headers,
        }
    }

    /// Case-insensitive header lookup. When the server sent the same name in
    /// several spellings, `name` as given wins, then the smallest spelling.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Status in `[200, 300)`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body length announced by `Content-Length`, if any.
    pub fn expected_content_length(&self) -> Option<u64> {
        self.header("Content-Length")?.trim().parse().ok()
    }

    /// `charset` parameter of `Content-Type`, lower-cased.
    pub fn text_encoding_name(&self) -> Option<String> {
        let content_type = self.header("Content-Type")?;
        content_type.split(';').skip(1).find_map(|param| {
            let (name, value) = param.split_once('=')?;
            if !name.trim().eq_ignore_ascii_case("charset") {
                return None;
            }
            let value = value.trim().trim_matches('"');
            (!value.is_empty()).then(|| value.to_ascii_lowercase())
        })
    }

    /// Filename to save the body under; see [`filename::suggested_filename`].
    pub fn suggested_filename(&self) -> String {
        filename::suggested_filename(&self.url, self.header("Content-Disposition"))
    }
}

fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    if let Some(value) = headers.get(name) {
        return Some(value.as_str());
    }
    headers
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case(name))
        .min_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, v)| v.as_str())
}

fn media_type(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim();
    (!essence.is_empty()).then(|| essence.to_ascii_lowercase())
}
