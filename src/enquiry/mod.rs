//! The enquiry task.
//!
//! An [`Enquiry`] starts as soon as it is built. A worker thread owns the
//! session, the request and the completion callback; it sends the request,
//! stops the transfer once the final response headers are in, calls the
//! callback exactly once and then drops the session. The returned handle
//! can be waited on or simply dropped.

mod error;
mod parse;
mod session;
mod view;

pub use error::{classify_curl_error, EnquiryError, ErrorKind};
pub use view::{SuccessInfo, UrlInfo};

use crate::config::EnquiryConfig;
use crate::response::Response;
use crate::source::RequestSource;
use session::Session;
use std::thread::{self, JoinHandle};

/// Raw result of an enquiry.
///
/// `error` is `None` when the only interruption was our own hang-up after
/// the headers. `response` may still be set alongside an error, e.g. when a
/// redirect arrived and following it failed.
#[derive(Debug)]
pub struct Outcome {
    pub response: Option<Response>,
    pub error: Option<EnquiryError>,
}

impl Outcome {
    pub(crate) fn failed(error: EnquiryError) -> Self {
        Self {
            response: None,
            error: Some(error),
        }
    }

    pub fn into_parts(self) -> (Option<Response>, Option<EnquiryError>) {
        (self.response, self.error)
    }

    pub fn info(self) -> UrlInfo {
        UrlInfo::new(self.response, self.error)
    }

    pub fn success_info(self) -> SuccessInfo {
        SuccessInfo::new(self.response, self.error)
    }
}

/// Handle to a running enquiry.
///
/// Dropping the handle does not stop the enquiry; the callback still fires.
#[derive(Debug)]
pub struct Enquiry {
    worker: JoinHandle<()>,
}

impl Enquiry {
    /// Starts an enquiry with default settings; `on_complete` receives the
    /// last response seen and the error, if any.
    pub fn new<S, F>(source: S, on_complete: F) -> Self
    where
        S: Into<RequestSource>,
        F: FnOnce(Option<Response>, Option<EnquiryError>) + Send + 'static,
    {
        Self::with_config(source, EnquiryConfig::default(), on_complete)
    }

    pub fn with_config<S, F>(source: S, config: EnquiryConfig, on_complete: F) -> Self
    where
        S: Into<RequestSource>,
        F: FnOnce(Option<Response>, Option<EnquiryError>) + Send + 'static,
    {
        let source = source.into();
        let worker = thread::spawn(move || {
            let (outcome, session) = dispatch(source, &config);
            on_complete(outcome.response, outcome.error);
            if let Some(session) = session {
                drop(session);
                tracing::debug!("session released");
            }
        });
        Self { worker }
    }

    /// MIME type, headers and status; all `None` if there was an error.
    pub fn with_info_handler<S, F>(source: S, on_info: F) -> Self
    where
        S: Into<RequestSource>,
        F: FnOnce(UrlInfo) + Send + 'static,
    {
        Self::new(source, UrlInfo::handler(on_info))
    }

    /// MIME type and headers, only for an error-free 2xx response.
    pub fn with_success_handler<S, F>(source: S, on_success: F) -> Self
    where
        S: Into<RequestSource>,
        F: FnOnce(SuccessInfo) + Send + 'static,
    {
        Self::new(source, SuccessInfo::handler(on_success))
    }

    /// Blocks until the callback has returned and the session is released.
    ///
    /// A panic inside the callback is resumed on the waiting thread.
    pub fn wait(self) {
        if let Err(panic) = self.worker.join() {
            std::panic::resume_unwind(panic);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Lets the enquiry finish on its own.
    pub fn detach(self) {}
}

/// Async form: runs the enquiry on tokio's blocking pool.
pub async fn enquire<S>(source: S, config: &EnquiryConfig) -> Outcome
where
    S: Into<RequestSource>,
{
    let source = source.into();
    let config = config.clone();
    let task = tokio::task::spawn_blocking(move || dispatch(source, &config).0);
    match task.await {
        Ok(outcome) => outcome,
        // Blocking tasks are only cancelled at runtime shutdown, which drops
        // this future as well; what is left is a panic.
        Err(e) => std::panic::resume_unwind(e.into_panic()),
    }
}

/// Validates, opens the session and runs the exchange. The session is handed
/// back so the caller decides when it is released.
fn dispatch(source: RequestSource, config: &EnquiryConfig) -> (Outcome, Option<Session>) {
    let request = source.into_request();
    let url = match request.validate() {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(url = %request.url, error = %e, "request rejected");
            return (Outcome::failed(e), None);
        }
    };

    let mut session = match Session::open(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "could not set up session");
            return (Outcome::failed(e.into()), None);
        }
    };

    tracing::debug!(%url, method = %request.method, "enquiry dispatched");
    let outcome = session.perform(&request, &url);
    match (&outcome.response, &outcome.error) {
        (_, Some(e)) => tracing::warn!(%url, error = %e, kind = ?e.kind(), "enquiry failed"),
        (Some(r), None) => {
            tracing::debug!(%url, status = r.status, mime_type = ?r.mime_type, "headers received")
        }
        (None, None) => tracing::debug!(%url, "exchange ended without a response"),
    }
    (outcome, Some(session))
}
