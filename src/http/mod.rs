//! HTTP/1.1 protocol machinery built directly on byte streams.
//!
//! No higher-level HTTP library is involved: this module owns request
//! parsing, response framing, and chunked transfer encoding.
//!
//! - **`headers`**: case-insensitive header map with an incremental
//!   line-oriented parser for the header block
//! - **`request`** / **`parser`**: the request type and the four-state
//!   incremental parser that assembles it from arbitrary partial reads
//! - **`response`**: status codes and the default-header helper
//! - **`writer`**: the ordered response-writing state machine, including
//!   chunked bodies and trailers
//!
//! # Parser states
//!
//! ```text
//! Initialized → ParsingHeaders → ParsingBody → Done
//! ```
//!
//! Each state consumes what it can from the unconsumed buffer prefix and
//! reports zero bytes when it needs more input. There are no backward
//! transitions; any malformed input is a terminal failure for the request.

pub mod error;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
