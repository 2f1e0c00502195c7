use crate::http::headers::Headers;

/// The parsed first line of a request: method, target, and version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    /// Upper-case ASCII method token (GET, POST, ...).
    pub method: String,
    /// Request target exactly as sent (e.g. "/search?q=rust").
    pub target: String,
    /// Version number with the "HTTP/" prefix stripped; always "1.1".
    pub http_version: String,
}

/// A fully parsed HTTP/1.1 request.
///
/// Built incrementally by [`Request::from_reader`]; frozen by the time a
/// handler sees it. One request per connection, no pipelining.
#[derive(Debug)]
pub struct Request {
    pub request_line: RequestLine,
    pub headers: Headers,
    /// Exactly `Content-Length` bytes, or empty when the header is absent.
    pub body: Vec<u8>,
    pub(crate) state: ParseState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParseState {
    Initialized,
    ParsingHeaders,
    ParsingBody,
    Done,
}

impl Request {
    pub(crate) fn new() -> Self {
        Self {
            request_line: RequestLine::default(),
            headers: Headers::new(),
            body: Vec::new(),
            state: ParseState::Initialized,
        }
    }
}
