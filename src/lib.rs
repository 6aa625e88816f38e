//! Single-shot HTTP enquiry.
//!
//! An [`Enquiry`] sends one request, waits for the response headers, hangs up
//! before the body arrives and hands the result to a callback.

pub mod config;
pub mod enquiry;
pub mod filename;
pub mod logging;
pub mod response;
pub mod source;

pub use config::EnquiryConfig;
pub use enquiry::{enquire, Enquiry, EnquiryError, ErrorKind, Outcome, SuccessInfo, UrlInfo};
pub use response::Response;
pub use source::{Request, RequestSource};
