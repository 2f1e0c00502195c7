use crate::http::headers::Headers;

/// HTTP status codes the server emits.
///
/// Codes without a dedicated variant can be written via `Other`; they carry
/// an empty reason phrase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 500 Internal Server Error
    InternalServerError,
    /// Any other numeric status code.
    Other(u16),
}

impl StatusCode {
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::InternalServerError => 500,
            StatusCode::Other(code) => *code,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::Other(_) => "",
        }
    }
}

/// Default headers for a plain-text response of `content_length` bytes.
///
/// Callers may override any entry with [`Headers::insert`] before passing the
/// collection to `write_headers`.
pub fn default_headers(content_length: usize) -> Headers {
    let mut headers = Headers::new();
    headers.set("Content-Type", "text/plain");
    headers.set("Content-Length", content_length.to_string());
    headers.set("Connection", "close");
    headers
}
