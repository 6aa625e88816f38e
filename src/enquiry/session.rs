//! One libcurl easy handle, configured for a single throwaway exchange.

use super::error::is_self_cancellation;
use super::parse::{HeaderEvent, HeaderParser};
use super::{EnquiryError, Outcome};
use crate::config::EnquiryConfig;
use crate::response::Response;
use crate::source::Request;
use std::os::raw::c_long;
use url::Url;

/// Not exposed by the curl crate; libcurl 7.54.0 and later.
const CURLOPT_SUPPRESS_CONNECT_HEADERS: curl_sys::CURLoption = 265;

/// A non-persistent network session: no cookie engine, no connection cache
/// shared with anything else, connection closed after use.
pub(crate) struct Session {
    easy: curl::easy::Easy,
    follow_redirects: bool,
}

impl Session {
    pub(crate) fn open(config: &EnquiryConfig) -> Result<Self, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.fresh_connect(true)?;
        easy.forbid_reuse(true)?;
        easy.follow_location(config.follow_redirects)?;
        easy.max_redirections(config.max_redirects)?;
        if let Some(d) = config.connect_timeout() {
            easy.connect_timeout(d)?;
        }
        if let Some(d) = config.timeout() {
            easy.timeout(d)?;
        }
        if let Some(ua) = &config.user_agent {
            easy.useragent(ua)?;
        }
        if let Some(proxy) = &config.proxy {
            easy.proxy(proxy)?;
            // An empty list overrides `no_proxy` from the environment.
            easy.noproxy("")?;
        } else if !config.use_env_proxy {
            easy.noproxy("*")?;
        }
        suppress_connect_headers(&mut easy)?;
        Ok(Self {
            easy,
            follow_redirects: config.follow_redirects,
        })
    }

    /// Runs the exchange up to the final header block, then hangs up.
    pub(crate) fn perform(&mut self, request: &Request, url: &Url) -> Outcome {
        if let Err(e) = self.prepare(request, url) {
            return Outcome::failed(e.into());
        }

        let mut parser = HeaderParser::new(self.follow_redirects);
        let mut cancelled = false;
        let result = self.transfer(&mut parser, &mut cancelled);

        let response = parser
            .into_last()
            .map(|head| Response::new(self.effective_url(url), head.status, head.headers));

        let error = match result {
            Ok(()) => None,
            Err(e) if is_self_cancellation(&e, cancelled) => None,
            Err(e) => Some(EnquiryError::Transport(e)),
        };

        Outcome { response, error }
    }

    /// Subscribes to header lines only. Body bytes that slip through before
    /// the abort are discarded.
    fn transfer(
        &mut self,
        parser: &mut HeaderParser,
        cancelled: &mut bool,
    ) -> Result<(), curl::Error> {
        let mut transfer = self.easy.transfer();
        transfer.header_function(|line| match parser.feed(line) {
            HeaderEvent::Complete => {
                // Refusing the line makes libcurl abort with a write error.
                *cancelled = true;
                false
            }
            HeaderEvent::Interim(status) | HeaderEvent::Redirect(status) => {
                tracing::debug!(status, "intermediate response");
                true
            }
            HeaderEvent::Pending => true,
        })?;
        transfer.write_function(|data| Ok(data.len()))?;
        transfer.perform()
    }

    fn prepare(&mut self, request: &Request, url: &Url) -> Result<(), curl::Error> {
        self.easy.url(url.as_str())?;

        let method = request.method.to_ascii_uppercase();
        if let Some(body) = &request.body {
            self.easy.post_fields_copy(body)?;
        }
        match (method.as_str(), request.body.is_some()) {
            ("GET", false) => self.easy.get(true)?,
            ("HEAD", _) => self.easy.nobody(true)?,
            ("POST", true) => {}
            (other, _) => self.easy.custom_request(other)?,
        }

        if !request.headers.is_empty() {
            let mut list = curl::easy::List::new();
            for (name, value) in &request.headers {
                // "Name;" is libcurl's spelling of an empty header; "Name:" would drop it.
                if value.trim().is_empty() {
                    list.append(&format!("{};", name))?;
                } else {
                    list.append(&format!("{}: {}", name, value.trim()))?;
                }
            }
            self.easy.http_headers(list)?;
        }
        Ok(())
    }

    fn effective_url(&mut self, requested: &Url) -> Url {
        self.easy
            .effective_url()
            .ok()
            .flatten()
            .and_then(|u| Url::parse(u).ok())
            .unwrap_or_else(|| requested.clone())
    }
}

/// Keeps a proxy's reply to `CONNECT` out of the header callback, so the
/// tunnel's "200 Connection established" is never taken for the final
/// response.
fn suppress_connect_headers(easy: &mut curl::easy::Easy) -> Result<(), curl::Error> {
    let rc = unsafe {
        curl_sys::curl_easy_setopt(easy.raw(), CURLOPT_SUPPRESS_CONNECT_HEADERS, 1 as c_long)
    };
    match rc {
        curl_sys::CURLE_OK => Ok(()),
        curl_sys::CURLE_UNKNOWN_OPTION => {
            tracing::warn!("libcurl too old to suppress CONNECT headers; proxied https may misreport");
            Ok(())
        }
        _ => Err(curl::Error::new(rc)),
    }
}
