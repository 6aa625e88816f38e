//! What to enquire about: a bare URL or a full request.

use crate::enquiry::EnquiryError;
use url::Url;

/// A request with method, headers and an optional body.
///
/// Nothing here is interpreted beyond what is needed to put it on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// A `GET` request for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn head(url: impl Into<String>) -> Self {
        Self::new(url).method("HEAD")
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Appends a header. Repeated names are sent repeatedly.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Parses the URL and checks that the request can be sent over HTTP.
    pub(crate) fn validate(&self) -> Result<Url, EnquiryError> {
        let url = Url::parse(&self.url)?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(EnquiryError::UnsupportedScheme(other.to_string())),
        }
        if !is_token(&self.method) {
            return Err(EnquiryError::InvalidHeader(format!("method {}", self.method)));
        }
        for (name, value) in &self.headers {
            if !is_token(name) || value.contains(|c: char| matches!(c, '\r' | '\n' | '\0')) {
                return Err(EnquiryError::InvalidHeader(name.clone()));
            }
        }
        Ok(url)
    }
}

/// RFC 9110 token: header names and methods.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

/// Input to an enquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSource {
    Url(String),
    Request(Request),
}

impl RequestSource {
    pub fn url(&self) -> &str {
        match self {
            RequestSource::Url(url) => url,
            RequestSource::Request(req) => &req.url,
        }
    }

    pub(crate) fn into_request(self) -> Request {
        match self {
            RequestSource::Url(url) => Request::new(url),
            RequestSource::Request(req) => req,
        }
    }
}

impl From<&str> for RequestSource {
    fn from(url: &str) -> Self {
        RequestSource::Url(url.to_string())
    }
}

impl From<String> for RequestSource {
    fn from(url: String) -> Self {
        RequestSource::Url(url)
    }
}

impl From<Url> for RequestSource {
    fn from(url: Url) -> Self {
        RequestSource::Url(url.into())
    }
}

impl From<&Url> for RequestSource {
    fn from(url: &Url) -> Self {
        RequestSource::Url(url.to_string())
    }
}

impl From<Request> for RequestSource {
    fn from(req: Request) -> Self {
        RequestSource::Request(req)
    }
}
