//! Header-block parsing for libcurl's header callback.
//!
//! libcurl hands over one raw line at a time, for every response on the
//! way: interim `1xx` blocks, redirects it is about to follow, and finally
//! the response we want. The parser turns that line stream into events.

use std::collections::HashMap;

/// A complete status line plus header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Head {
    pub status: u16,
    /// Names as received; repeated names joined with `", "`.
    pub headers: HashMap<String, String>,
}

impl Head {
    fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|k| k.eq_ignore_ascii_case(name))
    }
}

/// What a header line meant for the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderEvent {
    /// Inside a block.
    Pending,
    /// An interim `1xx` block ended; the real response follows.
    Interim(u16),
    /// A redirect block ended and libcurl will follow it.
    Redirect(u16),
    /// The final response's headers are complete.
    Complete,
}

pub(crate) struct HeaderParser {
    follow_redirects: bool,
    status: Option<u16>,
    lines: Vec<(String, String)>,
    last: Option<Head>,
}

impl HeaderParser {
    pub(crate) fn new(follow_redirects: bool) -> Self {
        Self {
            follow_redirects,
            status: None,
            lines: Vec::new(),
            last: None,
        }
    }

    /// Feed one raw header line (terminator included).
    pub(crate) fn feed(&mut self, data: &[u8]) -> HeaderEvent {
        let line = String::from_utf8_lossy(data);
        let line = line.trim_end_matches(|c: char| c == '\r' || c == '\n');

        if line.is_empty() {
            return self.finish_block();
        }
        if line.starts_with("HTTP/") {
            self.status = parse_status_line(line);
            self.lines.clear();
            return HeaderEvent::Pending;
        }
        if line.starts_with(|c: char| c == ' ' || c == '\t') {
            // obs-fold continuation
            if let Some((_, value)) = self.lines.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            return HeaderEvent::Pending;
        }
        if let Some((name, value)) = line.split_once(':') {
            self.lines
                .push((name.trim().to_string(), value.trim().to_string()));
        }
        HeaderEvent::Pending
    }

    /// The last non-interim block seen, complete or not followed.
    pub(crate) fn into_last(self) -> Option<Head> {
        self.last
    }

    fn finish_block(&mut self) -> HeaderEvent {
        // Blank line with no status line before it (trailers, stray CRLF).
        let Some(status) = self.status.take() else {
            return HeaderEvent::Pending;
        };

        let mut headers: HashMap<String, String> = HashMap::new();
        for (name, value) in self.lines.drain(..) {
            headers
                .entry(name)
                .and_modify(|v| {
                    v.push_str(", ");
                    v.push_str(&value);
                })
                .or_insert(value);
        }
        let head = Head { status, headers };

        if (100..200).contains(&status) {
            return HeaderEvent::Interim(status);
        }
        let followed = self.follow_redirects
            && matches!(status, 301 | 302 | 303 | 307 | 308)
            && head.has_header("location");
        self.last = Some(head);
        if followed {
            HeaderEvent::Redirect(status)
        } else {
            HeaderEvent::Complete
        }
    }
}

/// `HTTP/1.1 404 Not Found` or `HTTP/2 200` → status code.
fn parse_status_line(line: &str) -> Option<u16> {
    line.split_whitespace().nth(1)?.parse().ok()
}
