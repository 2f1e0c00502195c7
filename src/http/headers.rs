use std::collections::HashMap;

use crate::http::error::ParseError;

pub(crate) const CRLF: &[u8] = b"\r\n";

/// Case-insensitive header map.
///
/// Names are lower-cased on insertion. Setting a name that is already present
/// merges the values into a single `old, new` string, preserving arrival
/// order, which is how repeated header fields are combined on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header, merging with any existing value for the same name.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = name.as_ref().to_ascii_lowercase();
        let value = value.into();
        match self.entries.get_mut(&name) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => {
                self.entries.insert(name, value);
            }
        }
    }

    /// Adds a header, replacing any existing value for the same name.
    ///
    /// Used to override entries produced by [`default_headers`] before they
    /// are written out.
    ///
    /// [`default_headers`]: crate::http::response::default_headers
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consumes at most one `name: value` line from the front of `data`.
    ///
    /// Returns `(bytes_consumed, section_done)`. A `(0, false)` result with no
    /// error means no complete line is available yet; the caller must supply
    /// more input before retrying. An empty line marks the end of the header
    /// section and consumes just the CRLF.
    pub fn parse_line(&mut self, data: &[u8]) -> Result<(usize, bool), ParseError> {
        let Some(idx) = find_crlf(data) else {
            return Ok((0, false));
        };
        if idx == 0 {
            return Ok((CRLF.len(), true));
        }

        let line = &data[..idx];
        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or(ParseError::MalformedHeaderLine)?;
        let (raw_name, rest) = line.split_at(colon);

        // Whitespace directly before the colon is a hard error, it cannot be
        // repaired by trimming.
        if raw_name.last().is_some_and(u8::is_ascii_whitespace) {
            return Err(ParseError::MalformedHeaderLine);
        }

        let name = raw_name.trim_ascii().to_ascii_lowercase();
        if !is_valid_token(&name) {
            return Err(ParseError::InvalidHeaderName(
                String::from_utf8_lossy(&name).into_owned(),
            ));
        }
        // Token validation guarantees the name is ASCII.
        let name = String::from_utf8(name).map_err(|_| ParseError::MalformedHeaderLine)?;
        let value = String::from_utf8_lossy(rest[1..].trim_ascii()).into_owned();
        self.set(name, value);

        Ok((idx + CRLF.len(), false))
    }
}

pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(CRLF.len()).position(|w| w == CRLF)
}

/// RFC 7230 `tchar`, restricted to lower-case since names are normalized
/// before validation.
fn is_valid_token(name: &[u8]) -> bool {
    if name.is_empty() {
        return false;
    }
    name.iter().all(|&b| {
        matches!(b,
            b'a'..=b'z'
            | b'0'..=b'9'
            | b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*'
            | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~')
    })
}
