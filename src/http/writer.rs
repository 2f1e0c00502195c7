use std::io;

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::Headers;
use crate::http::response::StatusCode;

/// Out-of-order or transport failures while writing a response.
///
/// Ordering variants are programming errors in the handler; they are reported
/// synchronously and never auto-corrected.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("status line already written")]
    StatusLineAlreadyWritten,
    #[error("status line not written")]
    StatusLineNotWritten,
    #[error("headers already written")]
    HeadersAlreadyWritten,
    #[error("headers not written")]
    HeadersNotWritten,
    #[error("body already written")]
    BodyAlreadyWritten,
    #[error("chunked body not terminated")]
    ChunksNotEnded,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// What the writer expects next. Each operation is a single forward edge,
/// except chunk writes which repeat in `Chunking`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    StatusLine,
    Headers,
    Body,
    Chunking,
    Trailers,
    Done,
}

/// Ordered response serializer bound to one connection's output stream.
///
/// Enforces HTTP/1.1 framing: status line, then headers, then either a single
/// fixed body or a run of chunks ended by the zero-chunk terminator and an
/// optional trailer section.
#[derive(Debug)]
pub struct ResponseWriter<W> {
    sink: W,
    state: WriterState,
}

impl<W: AsyncWrite + Unpin> ResponseWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            state: WriterState::StatusLine,
        }
    }

    /// Returns the underlying sink, discarding the framing state.
    pub fn into_inner(self) -> W {
        self.sink
    }

    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        if self.state != WriterState::StatusLine {
            return Err(WriteError::StatusLineAlreadyWritten);
        }
        let line = format!("HTTP/1.1 {} {}\r\n", status.as_u16(), status.reason_phrase());
        self.sink.write_all(line.as_bytes()).await?;
        self.state = WriterState::Headers;
        Ok(())
    }

    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), WriteError> {
        match self.state {
            WriterState::StatusLine => return Err(WriteError::StatusLineNotWritten),
            WriterState::Headers => {}
            _ => return Err(WriteError::HeadersAlreadyWritten),
        }
        self.write_header_block(headers).await?;
        self.state = WriterState::Body;
        Ok(())
    }

    /// Writes a fixed-length body exactly once. Mutually exclusive with the
    /// chunked operations.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<(), WriteError> {
        self.check_body_ready(false)?;
        self.sink.write_all(body).await?;
        self.state = WriterState::Done;
        Ok(())
    }

    /// Writes one chunk: lower-hex size, CRLF, the bytes, CRLF. May be called
    /// any number of times before [`end_chunks`].
    ///
    /// [`end_chunks`]: ResponseWriter::end_chunks
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), WriteError> {
        self.check_body_ready(true)?;
        let size = format!("{:x}\r\n", chunk.len());
        self.sink.write_all(size.as_bytes()).await?;
        self.sink.write_all(chunk).await?;
        self.sink.write_all(b"\r\n").await?;
        self.state = WriterState::Chunking;
        Ok(())
    }

    /// Writes the terminal zero-chunk marker. Valid with no prior chunks; an
    /// empty chunked body is well-formed.
    pub async fn end_chunks(&mut self) -> Result<(), WriteError> {
        self.check_body_ready(true)?;
        self.sink.write_all(b"0\r\n").await?;
        self.state = WriterState::Trailers;
        Ok(())
    }

    /// Writes the trailer section after [`end_chunks`]: header lines followed
    /// by the final blank line. The writer does not cross-check the names
    /// against a `Trailer` advertisement; that is the handler's obligation.
    ///
    /// [`end_chunks`]: ResponseWriter::end_chunks
    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriteError> {
        match self.state {
            WriterState::StatusLine => return Err(WriteError::StatusLineNotWritten),
            WriterState::Headers => return Err(WriteError::HeadersNotWritten),
            WriterState::Body | WriterState::Chunking => return Err(WriteError::ChunksNotEnded),
            WriterState::Trailers => {}
            WriterState::Done => return Err(WriteError::BodyAlreadyWritten),
        }
        self.write_header_block(trailers).await?;
        self.state = WriterState::Done;
        Ok(())
    }

    fn check_body_ready(&self, chunked: bool) -> Result<(), WriteError> {
        match self.state {
            WriterState::StatusLine => Err(WriteError::StatusLineNotWritten),
            WriterState::Headers => Err(WriteError::HeadersNotWritten),
            WriterState::Body => Ok(()),
            WriterState::Chunking if chunked => Ok(()),
            _ => Err(WriteError::BodyAlreadyWritten),
        }
    }

    async fn write_header_block(&mut self, headers: &Headers) -> Result<(), WriteError> {
        for (name, value) in headers.iter() {
            self.sink.write_all(name.as_bytes()).await?;
            self.sink.write_all(b": ").await?;
            self.sink.write_all(value.as_bytes()).await?;
            self.sink.write_all(b"\r\n").await?;
        }
        self.sink.write_all(b"\r\n").await?;
        Ok(())
    }
}
