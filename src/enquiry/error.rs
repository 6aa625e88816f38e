//! Enquiry errors and their classification.

/// Error reported to an enquiry's completion callback.
///
/// HTTP status codes are never errors here: a 404 arrives as a normal
/// [`Response`](crate::Response).
#[derive(Debug, thiserror::Error)]
pub enum EnquiryError {
    /// The URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL parsed, but its scheme is not `http` or `https`.
    #[error("unsupported URL scheme `{0}`")]
    UnsupportedScheme(String),
    /// A request header name or value cannot be put on the wire.
    #[error("invalid request header `{0}`")]
    InvalidHeader(String),
    /// libcurl failed before or during the exchange.
    #[error("transport error: {0}")]
    Transport(#[from] curl::Error),
}

/// Coarse classification of an [`EnquiryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before anything was sent (bad URL, bad header).
    InvalidRequest,
    /// Scheme or protocol not supported.
    UnsupportedScheme,
    /// Host name could not be resolved.
    Dns,
    /// TCP connection failed (refused, unreachable).
    Connect,
    /// TLS handshake or certificate verification failed.
    Tls,
    /// Connect or total timeout elapsed.
    Timeout,
    /// The peer spoke broken or unexpected HTTP.
    Protocol,
    /// Anything else.
    Other,
}

impl EnquiryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnquiryError::InvalidUrl(_) | EnquiryError::InvalidHeader(_) => {
                ErrorKind::InvalidRequest
            }
            EnquiryError::UnsupportedScheme(_) => ErrorKind::UnsupportedScheme,
            EnquiryError::Transport(e) => classify_curl_error(e),
        }
    }
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        return ErrorKind::Dns;
    }
    if e.is_couldnt_connect() {
        return ErrorKind::Connect;
    }
    if e.is_ssl_connect_error()
        || e.is_peer_failed_verification()
        || e.is_ssl_certproblem()
        || e.is_ssl_cipher()
        || e.is_ssl_cacert()
    {
        return ErrorKind::Tls;
    }
    if e.is_unsupported_protocol() {
        return ErrorKind::UnsupportedScheme;
    }
    if e.is_url_malformed() {
        return ErrorKind::InvalidRequest;
    }
    if e.is_got_nothing()
        || e.is_too_many_redirects()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_partial_file()
        || e.is_http2_error()
    {
        return ErrorKind::Protocol;
    }
    ErrorKind::Other
}

/// True when `e` is the abort we caused ourselves by refusing the rest of the
/// transfer once the final headers were in.
pub(crate) fn is_self_cancellation(e: &curl::Error, cancelled_after_headers: bool) -> bool {
    cancelled_after_headers && e.is_write_error()
}
