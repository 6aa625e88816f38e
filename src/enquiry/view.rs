//! Narrower views of an enquiry's result.

use super::EnquiryError;
use crate::response::Response;
use std::collections::HashMap;

/// MIME type, headers and status, populated only when there was no error.
///
/// A 404 is not an error: it shows up here with its MIME type and headers.
#[derive(Debug, Default)]
pub struct UrlInfo {
    pub mime_type: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub status_code: Option<u16>,
    pub error: Option<EnquiryError>,
}

impl UrlInfo {
    pub fn new(response: Option<Response>, error: Option<EnquiryError>) -> Self {
        if error.is_some() {
            return Self {
                error,
                ..Self::default()
            };
        }
        match response {
            Some(r) => Self {
                mime_type: r.mime_type,
                headers: Some(r.headers),
                status_code: Some(r.status),
                error: None,
            },
            None => Self::default(),
        }
    }

    /// Adapts `f` into a raw completion callback.
    pub fn handler<F>(f: F) -> impl FnOnce(Option<Response>, Option<EnquiryError>) + Send + 'static
    where
        F: FnOnce(UrlInfo) + Send + 'static,
    {
        move |response, error| f(UrlInfo::new(response, error))
    }
}

/// MIME type and headers, only for an error-free 2xx response.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SuccessInfo {
    pub mime_type: Option<String>,
    pub headers: Option<HashMap<String, String>>,
}

impl SuccessInfo {
    pub fn new(response: Option<Response>, error: Option<EnquiryError>) -> Self {
        match (response, error) {
            (Some(r), None) if r.is_success() => Self {
                mime_type: r.mime_type,
                headers: Some(r.headers),
            },
            _ => Self::default(),
        }
    }

    pub fn handler<F>(f: F) -> impl FnOnce(Option<Response>, Option<EnquiryError>) + Send + 'static
    where
        F: FnOnce(SuccessInfo) + Send + 'static,
    {
        move |response, error| f(SuccessInfo::new(response, error))
    }
}
