use std::io::{self, Read};

use thiserror::Error;

/// Quoting that RFC 4180 does not allow. `byte` is the offset in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("quote inside an unquoted field at byte {byte}")]
    BareQuote { byte: u64 },
    #[error("unexpected text after a closing quote at byte {byte}")]
    TextAfterQuote { byte: u64 },
    #[error("quoted field opened at byte {byte} is never closed")]
    Unterminated { byte: u64 },
}

impl QuoteError {
    pub(crate) fn byte(&self) -> u64 {
        match self {
            QuoteError::BareQuote { byte } => *byte,
            QuoteError::TextAfterQuote { byte } => *byte,
            QuoteError::Unterminated { byte } => *byte,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    // a quote seen inside a quoted field, either closing it or the first half of ""
    QuoteInQuoted,
}

/// Passes the input through unchanged while tracking the quoting state of every byte.
///
/// The csv reader recovers from bad quoting silently, merging lines or keeping stray quotes.
/// This reader only records the first violation, the record reader decides which record it
/// belongs to.
pub(crate) struct QuoteCheck<R: Read> {
    inner: R,
    delimiter: u8,
    state: QuoteState,
    offset: u64,
    quote_start: u64,
    violation: Option<QuoteError>,
}

impl<R: Read> QuoteCheck<R> {
    pub(crate) fn new(inner: R, delimiter: u8) -> QuoteCheck<R> {
        QuoteCheck {
            inner,
            delimiter,
            state: QuoteState::FieldStart,
            offset: 0,
            quote_start: 0,
            violation: None,
        }
    }

    pub(crate) fn violation(&self) -> Option<QuoteError> {
        self.violation
    }

    fn flag(&mut self, error: QuoteError) {
        if self.violation.is_none() {
            self.violation = Some(error);
        }
    }

    fn is_separator(&self, b: u8) -> bool {
        b == self.delimiter || b == b'\n' || b == b'\r'
    }

    fn scan(&mut self, bytes: &[u8]) {
        for &b in bytes {
            let state = self.state;
            self.state = match state {
                QuoteState::FieldStart if b == b'"' => {
                    self.quote_start = self.offset;
                    QuoteState::Quoted
                }
                QuoteState::FieldStart | QuoteState::Unquoted if self.is_separator(b) => QuoteState::FieldStart,
                QuoteState::FieldStart => QuoteState::Unquoted,
                QuoteState::Unquoted => {
                    if b == b'"' {
                        self.flag(QuoteError::BareQuote { byte: self.offset });
                    }
                    QuoteState::Unquoted
                }
                QuoteState::Quoted if b == b'"' => QuoteState::QuoteInQuoted,
                QuoteState::Quoted => QuoteState::Quoted,
                QuoteState::QuoteInQuoted if b == b'"' => QuoteState::Quoted,
                QuoteState::QuoteInQuoted if self.is_separator(b) => QuoteState::FieldStart,
                QuoteState::QuoteInQuoted => {
                    self.flag(QuoteError::TextAfterQuote { byte: self.offset });
                    QuoteState::Unquoted
                }
            };
            self.offset += 1;
        }
    }
}

impl<R: Read> Read for QuoteCheck<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 {
            if !buf.is_empty() && self.state == QuoteState::Quoted {
                self.flag(QuoteError::Unterminated { byte: self.quote_start });
            }
        } else {
            self.scan(&buf[..n]);
        }
        Ok(n)
    }
}
