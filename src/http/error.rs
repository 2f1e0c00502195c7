use std::io;

use thiserror::Error;

/// Errors produced while assembling a request from the wire.
///
/// All variants are terminal for the current request; there is no retry. The
/// server answers malformed input with a synthesized error response before
/// closing the connection.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed request line: {0}")]
    MalformedRequestLine(String),
    #[error("invalid method: {0}")]
    InvalidMethod(String),
    #[error("unsupported HTTP version: {0}")]
    UnsupportedHttpVersion(String),
    #[error("malformed header line")]
    MalformedHeaderLine,
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),
    #[error("invalid content-length: {0}")]
    InvalidContentLength(String),
    #[error("body is larger than declared content-length")]
    BodyTooLarge,
    #[error("unexpected end of stream")]
    UnexpectedEof,
    #[error("no request line found")]
    NoRequestLine,
    #[error("parser driven past completion")]
    ParserReused,
    #[error(transparent)]
    Io(#[from] io::Error),
}
