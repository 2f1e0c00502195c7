use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::error::ParseError;
use crate::http::headers::{CRLF, find_crlf};
use crate::http::request::{ParseState, Request, RequestLine};

/// Initial read buffer capacity. The buffer doubles whenever it fills up, so
/// the amortized copy cost stays linear however small the physical reads are.
const INITIAL_BUFFER_CAPACITY: usize = 1024;

impl Request {
    /// Reads and parses one complete request from `reader`.
    ///
    /// The reader may return any number of bytes per call, down to a single
    /// byte; the parser assembles the same request regardless of how the
    /// stream is chunked. Consumed bytes are compacted out of the buffer
    /// after every parse pass.
    pub async fn from_reader<R>(reader: &mut R) -> Result<Request, ParseError>
    where
        R: AsyncRead + Unpin,
    {
        let mut request = Request::new();
        let mut buf = BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY);

        while request.state != ParseState::Done {
            if buf.len() == buf.capacity() {
                buf.reserve(buf.capacity().max(INITIAL_BUFFER_CAPACITY));
            }
            let n = reader.read_buf(&mut buf).await?;
            if n == 0 {
                return Err(match request.state {
                    ParseState::Initialized => ParseError::NoRequestLine,
                    _ => ParseError::UnexpectedEof,
                });
            }
            let consumed = request.parse(&buf)?;
            buf.advance(consumed);
        }

        Ok(request)
    }

    /// Runs the state machine against the unconsumed buffer, advancing through
    /// as many states as the available bytes allow. Returns the total number
    /// of bytes consumed; zero means more input is needed.
    fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let mut total = 0;
        while self.state != ParseState::Done {
            let consumed = self.parse_single(&data[total..])?;
            if consumed == 0 {
                break;
            }
            total += consumed;
        }
        Ok(total)
    }

    fn parse_single(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParseState::Initialized => {
                let Some(idx) = find_crlf(data) else {
                    return Ok(0);
                };
                let line = std::str::from_utf8(&data[..idx]).map_err(|_| {
                    ParseError::MalformedRequestLine(
                        String::from_utf8_lossy(&data[..idx]).into_owned(),
                    )
                })?;
                self.request_line = parse_request_line(line)?;
                self.state = ParseState::ParsingHeaders;
                Ok(idx + CRLF.len())
            }

            ParseState::ParsingHeaders => {
                let (consumed, done) = self.headers.parse_line(data)?;
                if done {
                    self.state = ParseState::ParsingBody;
                }
                Ok(consumed)
            }

            ParseState::ParsingBody => {
                let declared: usize = match self.headers.get("content-length") {
                    None => {
                        self.state = ParseState::Done;
                        return Ok(0);
                    }
                    Some(raw) => raw
                        .parse()
                        .map_err(|_| ParseError::InvalidContentLength(raw.to_string()))?,
                };
                self.body.extend_from_slice(data);
                if self.body.len() > declared {
                    return Err(ParseError::BodyTooLarge);
                }
                if self.body.len() == declared {
                    self.state = ParseState::Done;
                }
                Ok(data.len())
            }

            ParseState::Done => Err(ParseError::ParserReused),
        }
    }
}

fn parse_request_line(line: &str) -> Result<RequestLine, ParseError> {
    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = parts.as_slice() else {
        return Err(ParseError::MalformedRequestLine(line.to_string()));
    };

    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(ParseError::InvalidMethod(method.to_string()));
    }

    let number = version
        .strip_prefix("HTTP/")
        .ok_or_else(|| ParseError::UnsupportedHttpVersion(version.to_string()))?;
    if number != "1.1" {
        return Err(ParseError::UnsupportedHttpVersion(version.to_string()));
    }

    Ok(RequestLine {
        method: method.to_string(),
        target: target.to_string(),
        http_version: number.to_string(),
    })
}
