use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use rawhttp::http::error::ParseError;
use rawhttp::http::request::Request;
use tokio::io::{AsyncRead, ReadBuf};

/// Reads at most `chunk` bytes per call, simulating a network peer that
/// delivers the stream in arbitrarily small pieces.
struct ChunkReader {
    data: Vec<u8>,
    chunk: usize,
    pos: usize,
}

impl ChunkReader {
    fn new(data: &[u8], chunk: usize) -> Self {
        assert!(chunk > 0);
        Self {
            data: data.to_vec(),
            chunk,
            pos: 0,
        }
    }
}

impl AsyncRead for ChunkReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.pos >= this.data.len() {
            return Poll::Ready(Ok(()));
        }
        let end = (this.pos + this.chunk).min(this.data.len());
        let n = (end - this.pos).min(buf.remaining());
        buf.put_slice(&this.data[this.pos..this.pos + n]);
        this.pos += n;
        Poll::Ready(Ok(()))
    }
}

async fn parse(input: &[u8], chunk: usize) -> Result<Request, ParseError> {
    let mut reader = ChunkReader::new(input, chunk);
    Request::from_reader(&mut reader).await
}

const CURL_GET: &[u8] =
    b"GET / HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";

#[tokio::test]
async fn test_basic_get_in_three_byte_reads() {
    let request = parse(CURL_GET, 3).await.unwrap();

    assert_eq!(request.request_line.method, "GET");
    assert_eq!(request.request_line.target, "/");
    assert_eq!(request.request_line.http_version, "1.1");
    assert_eq!(request.headers.get("host"), Some("localhost:42069"));
    assert_eq!(request.headers.get("user-agent"), Some("curl/7.81.0"));
    assert_eq!(request.headers.get("accept"), Some("*/*"));
    assert!(request.body.is_empty());
}

#[tokio::test]
async fn test_same_request_at_every_read_granularity() {
    for chunk in 1..=CURL_GET.len() {
        let request = parse(CURL_GET, chunk).await.unwrap();

        assert_eq!(request.request_line.method, "GET", "chunk size {chunk}");
        assert_eq!(request.request_line.target, "/");
        assert_eq!(request.request_line.http_version, "1.1");
        assert_eq!(request.headers.get("host"), Some("localhost:42069"));
        assert_eq!(request.headers.get("user-agent"), Some("curl/7.81.0"));
        assert_eq!(request.headers.get("accept"), Some("*/*"));
        assert!(request.body.is_empty());
    }
}

#[tokio::test]
async fn test_get_with_path() {
    let input = b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n";
    let request = parse(input, 8).await.unwrap();

    assert_eq!(request.request_line.method, "GET");
    assert_eq!(request.request_line.target, "/coffee");
}

#[tokio::test]
async fn test_lowercase_method_rejected_regardless_of_chunking() {
    let input =
        b"get / HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";
    for chunk in 1..=input.len() {
        let err = parse(input, chunk).await.unwrap_err();
        assert!(
            matches!(err, ParseError::InvalidMethod(_)),
            "chunk size {chunk}: {err}"
        );
    }
}

#[tokio::test]
async fn test_http_1_0_rejected() {
    let input = b"GET / HTTP/1.0\r\nHost: localhost:42069\r\n\r\n";
    let err = parse(input, 4).await.unwrap_err();

    assert!(matches!(err, ParseError::UnsupportedHttpVersion(_)));
}

#[tokio::test]
async fn test_four_token_request_line_rejected() {
    let input = b"GET / HTTP/1.1 extra\r\nHost: localhost:42069\r\n\r\n";
    let err = parse(input, 3).await.unwrap_err();

    assert!(matches!(err, ParseError::MalformedRequestLine(_)));
}

#[tokio::test]
async fn test_post_with_exact_content_length() {
    let input = b"POST / HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 5\r\n\r\nHello";
    for chunk in 1..=input.len() {
        let request = parse(input, chunk).await.unwrap();

        assert_eq!(request.request_line.method, "POST", "chunk size {chunk}");
        assert_eq!(request.body, b"Hello");
    }
}

#[tokio::test]
async fn test_body_larger_than_content_length() {
    let input = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nHello!";
    for chunk in 1..=input.len() {
        let err = parse(input, chunk).await.unwrap_err();
        assert!(
            matches!(err, ParseError::BodyTooLarge),
            "chunk size {chunk}: {err}"
        );
    }
}

#[tokio::test]
async fn test_body_shorter_than_content_length_hits_eof() {
    let input = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nHel";
    let err = parse(input, 3).await.unwrap_err();

    assert!(matches!(err, ParseError::UnexpectedEof));
}

#[tokio::test]
async fn test_content_length_zero_with_empty_body() {
    let input = b"POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n";
    let request = parse(input, 3).await.unwrap();

    assert!(request.body.is_empty());
}

#[tokio::test]
async fn test_invalid_content_length_rejected() {
    let input = b"POST / HTTP/1.1\r\nContent-Length: five\r\n\r\nHello";
    let err = parse(input, 3).await.unwrap_err();

    assert!(matches!(err, ParseError::InvalidContentLength(_)));
}

#[tokio::test]
async fn test_request_without_headers() {
    let input = b"GET / HTTP/1.1\r\n\r\n";
    let request = parse(input, 3).await.unwrap();

    assert_eq!(request.headers.len(), 0);
    assert!(request.body.is_empty());
}

#[tokio::test]
async fn test_duplicate_headers_are_merged() {
    let input = b"GET / HTTP/1.1\r\nHost: localhost:42069\r\nHost: localhost:42070\r\n\r\n";
    let request = parse(input, 3).await.unwrap();

    assert_eq!(
        request.headers.get("host"),
        Some("localhost:42069, localhost:42070")
    );
}

#[tokio::test]
async fn test_header_names_merge_case_insensitively() {
    let input = b"GET / HTTP/1.1\r\nHost: localhost:42069\r\nhost: localhost:42070\r\n\r\n";
    let request = parse(input, 3).await.unwrap();

    assert_eq!(
        request.headers.get("host"),
        Some("localhost:42069, localhost:42070")
    );
}

#[tokio::test]
async fn test_missing_end_of_headers_hits_eof() {
    let input = b"GET / HTTP/1.1\r\nHost: localhost:42069\r\nAccept: */*";
    let err = parse(input, 3).await.unwrap_err();

    assert!(matches!(err, ParseError::UnexpectedEof));
}

#[tokio::test]
async fn test_malformed_header_rejected() {
    let input = b"GET / HTTP/1.1\r\nHost localhost:42069\r\n\r\n";
    let err = parse(input, 3).await.unwrap_err();

    assert!(matches!(err, ParseError::MalformedHeaderLine));
}

#[tokio::test]
async fn test_empty_stream_has_no_request_line() {
    let err = parse(b"", 1).await.unwrap_err();

    assert!(matches!(err, ParseError::NoRequestLine));
}

#[tokio::test]
async fn test_partial_request_line_then_eof() {
    let err = parse(b"GET / HT", 2).await.unwrap_err();

    assert!(matches!(err, ParseError::NoRequestLine));
}

#[tokio::test]
async fn test_binary_body_preserved() {
    let input = b"POST /upload HTTP/1.1\r\nContent-Length: 4\r\n\r\n\x00\x01\x02\x03";
    let request = parse(input, 3).await.unwrap();

    assert_eq!(request.body, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_large_request_grows_the_buffer() {
    let body = vec![b'x'; 16 * 1024];
    let mut input = format!(
        "POST /big HTTP/1.1\r\nContent-Length: {}\r\n\r\n",
        body.len()
    )
    .into_bytes();
    input.extend_from_slice(&body);

    let request = parse(&input, 1499).await.unwrap();
    assert_eq!(request.body.len(), body.len());
    assert_eq!(request.body, body);
}
