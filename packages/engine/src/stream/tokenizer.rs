//! Incremental JSON tokenizer
//!
//! Bytes arrive in arbitrary chunks through [`JsonTokenizer::feed`] and parse
//! events are pulled one at a time with [`JsonTokenizer::next_event`]. The
//! tokenizer never looks further ahead than the token it is currently
//! decoding, so memory is bounded by the container stack plus the largest
//! single string or number in the document.
//!
//! Scalars are handed to `serde_json` for decoding once their extent is known,
//! which keeps escape handling and number grammar identical to a full parse.

use bytes::{Buf, BytesMut};
use serde_json::Value;

use super::events::ParseEvent;
use crate::config::stream::DEFAULT_MAX_TOKEN_BYTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// What the grammar accepts next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Any value (document root, after ':' or after ',' in an array)
    Value,
    /// A value or ']' right after '['
    FirstValue,
    /// A key or '}' right after '{'
    FirstKey,
    /// A key after ',' in an object
    Key,
    Colon,
    CommaOrClose,
    /// Root value complete; only whitespace may follow
    End,
}

/// Result of pulling one step from the tokenizer
#[derive(Debug, Clone, PartialEq)]
pub enum TokenizerStep {
    /// A complete parse event
    Event(ParseEvent),
    /// The buffered bytes end inside a token; feed more input
    NeedMoreData,
    /// The root value is complete and the input is exhausted
    Finished,
}

/// Malformed input at an absolute byte offset
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at byte {offset}")]
pub struct TokenizeError {
    pub offset: u64,
    pub message: String,
}

/// Chunk-boundary-safe JSON lexer and grammar state machine
#[derive(Debug)]
pub struct JsonTokenizer {
    /// Unconsumed input
    buffer: BytesMut,
    /// Absolute offset of `buffer[0]`
    offset: u64,
    stack: Vec<Container>,
    expect: Expect,
    /// No more input will be fed
    eof: bool,
    max_token_bytes: usize,
}

impl JsonTokenizer {
    pub fn new() -> Self {
        Self::with_max_token_bytes(DEFAULT_MAX_TOKEN_BYTES)
    }

    pub fn with_max_token_bytes(max_token_bytes: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
            offset: 0,
            stack: Vec::new(),
            expect: Expect::Value,
            eof: false,
            max_token_bytes,
        }
    }

    /// Append input bytes.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Mark the end of input. Pending partial tokens become errors.
    pub fn finish(&mut self) {
        self.eof = true;
    }

    /// Current container nesting depth.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Absolute offset of the next unconsumed byte.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Bytes buffered but not yet consumed.
    #[inline]
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Pull the next parse event.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenizeError`] on the first grammar violation; the
    /// tokenizer must not be used afterwards.
    pub fn next_event(&mut self) -> Result<TokenizerStep, TokenizeError> {
        loop {
            self.skip_whitespace();
            let Some(&byte) = self.buffer.first() else {
                if !self.eof {
                    return Ok(TokenizerStep::NeedMoreData);
                }
                return if self.expect == Expect::End {
                    Ok(TokenizerStep::Finished)
                } else {
                    Err(self.error("unexpected end of input"))
                };
            };

            match self.expect {
                Expect::Value | Expect::FirstValue => {
                    if self.expect == Expect::FirstValue && byte == b']' {
                        self.advance(1);
                        return Ok(self.close(ParseEvent::ArrayEnd));
                    }
                    return self.value_start(byte);
                }
                Expect::FirstKey | Expect::Key => {
                    if self.expect == Expect::FirstKey && byte == b'}' {
                        self.advance(1);
                        return Ok(self.close(ParseEvent::ObjectEnd));
                    }
                    if byte != b'"' {
                        return Err(self.unexpected(byte, "expected an object key"));
                    }
                    let Some(key) = self.lex_string()? else {
                        return Ok(TokenizerStep::NeedMoreData);
                    };
                    self.expect = Expect::Colon;
                    return Ok(TokenizerStep::Event(ParseEvent::Key(key)));
                }
                Expect::Colon => {
                    if byte != b':' {
                        return Err(self.unexpected(byte, "expected ':'"));
                    }
                    self.advance(1);
                    self.expect = Expect::Value;
                }
                Expect::CommaOrClose => match (self.stack.last().copied(), byte) {
                    (Some(Container::Object), b',') => {
                        self.advance(1);
                        self.expect = Expect::Key;
                    }
                    (Some(Container::Array), b',') => {
                        self.advance(1);
                        self.expect = Expect::Value;
                    }
                    (Some(Container::Object), b'}') => {
                        self.advance(1);
                        return Ok(self.close(ParseEvent::ObjectEnd));
                    }
                    (Some(Container::Array), b']') => {
                        self.advance(1);
                        return Ok(self.close(ParseEvent::ArrayEnd));
                    }
                    _ => return Err(self.unexpected(byte, "expected ',' or a closing bracket")),
                },
                Expect::End => {
                    return Err(self.unexpected(byte, "trailing characters after the JSON value"));
                }
            }
        }
    }

    fn value_start(&mut self, byte: u8) -> Result<TokenizerStep, TokenizeError> {
        match byte {
            b'{' => {
                self.advance(1);
                self.stack.push(Container::Object);
                self.expect = Expect::FirstKey;
                Ok(TokenizerStep::Event(ParseEvent::ObjectStart))
            }
            b'[' => {
                self.advance(1);
                self.stack.push(Container::Array);
                self.expect = Expect::FirstValue;
                Ok(TokenizerStep::Event(ParseEvent::ArrayStart))
            }
            b'"' => match self.lex_string()? {
                Some(text) => Ok(self.scalar(Value::String(text))),
                None => Ok(TokenizerStep::NeedMoreData),
            },
            b'-' | b'0'..=b'9' => match self.lex_number()? {
                Some(number) => Ok(self.scalar(number)),
                None => Ok(TokenizerStep::NeedMoreData),
            },
            b't' => self.lex_literal(b"true", Value::Bool(true)),
            b'f' => self.lex_literal(b"false", Value::Bool(false)),
            b'n' => self.lex_literal(b"null", Value::Null),
            _ => Err(self.unexpected(byte, "expected a JSON value")),
        }
    }

    /// Decode a complete string token starting at `buffer[0] == '"'`.
    fn lex_string(&mut self) -> Result<Option<String>, TokenizeError> {
        let mut cursor = 1;
        loop {
            let found = self
                .buffer
                .get(cursor..)
                .and_then(|rest| memchr::memchr2(b'"', b'\\', rest));
            let Some(position) = found else {
                self.check_incomplete("string")?;
                return Ok(None);
            };
            let at = cursor + position;
            if self.buffer[at] == b'\\' {
                cursor = at + 2;
                continue;
            }
            let end = at + 1;
            let text: String = serde_json::from_slice(&self.buffer[..end])
                .map_err(|e| self.error(format!("invalid string literal: {e}")))?;
            self.advance(end);
            return Ok(Some(text));
        }
    }

    fn lex_number(&mut self) -> Result<Option<Value>, TokenizeError> {
        let boundary = self
            .buffer
            .iter()
            .position(|b| !matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E'));
        let end = match boundary {
            Some(end) => end,
            None if self.eof => self.buffer.len(),
            None => {
                self.check_incomplete("number")?;
                return Ok(None);
            }
        };
        let number: serde_json::Number = serde_json::from_slice(&self.buffer[..end]).map_err(|_| {
            let text = String::from_utf8_lossy(&self.buffer[..end]).into_owned();
            self.error(format!("invalid number '{text}'"))
        })?;
        self.advance(end);
        Ok(Some(Value::Number(number)))
    }

    fn lex_literal(&mut self, word: &[u8], value: Value) -> Result<TokenizerStep, TokenizeError> {
        let available = self.buffer.len().min(word.len());
        if self.buffer[..available] != word[..available] {
            return Err(self.error(format!(
                "invalid literal, expected '{}'",
                String::from_utf8_lossy(word)
            )));
        }
        if available < word.len() {
            if self.eof {
                return Err(self.error("unexpected end of input inside a literal"));
            }
            return Ok(TokenizerStep::NeedMoreData);
        }
        self.advance(word.len());
        Ok(self.scalar(value))
    }

    fn scalar(&mut self, value: Value) -> TokenizerStep {
        self.after_value();
        TokenizerStep::Event(ParseEvent::Scalar(value))
    }

    fn close(&mut self, event: ParseEvent) -> TokenizerStep {
        self.stack.pop();
        self.after_value();
        TokenizerStep::Event(event)
    }

    #[inline]
    fn after_value(&mut self) {
        self.expect = if self.stack.is_empty() {
            Expect::End
        } else {
            Expect::CommaOrClose
        };
    }

    /// A token is still open at the end of the buffer.
    fn check_incomplete(&self, what: &str) -> Result<(), TokenizeError> {
        if self.eof {
            return Err(self.error(format!("unterminated {what}")));
        }
        if self.buffer.len() > self.max_token_bytes {
            return Err(self.error(format!(
                "{what} token exceeds {} bytes",
                self.max_token_bytes
            )));
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        let count = self
            .buffer
            .iter()
            .take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
            .count();
        if count > 0 {
            self.advance(count);
        }
    }

    #[inline]
    fn advance(&mut self, count: usize) {
        self.buffer.advance(count);
        self.offset += count as u64;
    }

    fn error(&self, message: impl Into<String>) -> TokenizeError {
        TokenizeError {
            offset: self.offset,
            message: message.into(),
        }
    }

    fn unexpected(&self, byte: u8, context: &str) -> TokenizeError {
        let shown = if byte.is_ascii_graphic() {
            format!("'{}'", byte as char)
        } else {
            format!("byte 0x{byte:02x}")
        };
        self.error(format!("unexpected {shown}, {context}"))
    }
}

impl Default for JsonTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn drain(tokenizer: &mut JsonTokenizer) -> Result<Vec<ParseEvent>, TokenizeError> {
        let mut events = Vec::new();
        loop {
            match tokenizer.next_event()? {
                TokenizerStep::Event(event) => events.push(event),
                TokenizerStep::NeedMoreData | TokenizerStep::Finished => return Ok(events),
            }
        }
    }

    fn tokenize_whole(input: &str) -> Result<Vec<ParseEvent>, TokenizeError> {
        let mut tokenizer = JsonTokenizer::new();
        tokenizer.feed(input.as_bytes());
        tokenizer.finish();
        drain(&mut tokenizer)
    }

    fn tokenize_bytewise(input: &str) -> Result<Vec<ParseEvent>, TokenizeError> {
        let mut tokenizer = JsonTokenizer::new();
        let mut events = Vec::new();
        for byte in input.as_bytes() {
            tokenizer.feed(std::slice::from_ref(byte));
            events.extend(drain(&mut tokenizer)?);
        }
        tokenizer.finish();
        events.extend(drain(&mut tokenizer)?);
        Ok(events)
    }

    #[test]
    fn emits_events_in_document_order() {
        let events = tokenize_whole(r#"{"a": [1, "x", true, null], "b": {}}"#).expect("valid json");
        assert_eq!(
            events,
            vec![
                ParseEvent::ObjectStart,
                ParseEvent::Key("a".into()),
                ParseEvent::ArrayStart,
                ParseEvent::Scalar(json!(1)),
                ParseEvent::Scalar(json!("x")),
                ParseEvent::Scalar(json!(true)),
                ParseEvent::Scalar(Value::Null),
                ParseEvent::ArrayEnd,
                ParseEvent::Key("b".into()),
                ParseEvent::ObjectStart,
                ParseEvent::ObjectEnd,
                ParseEvent::ObjectEnd,
            ]
        );
    }

    #[test]
    fn chunk_boundaries_do_not_change_events() {
        let input = r#"{"entities":[{"entityId":"Player:1","payload":{"level":-12.5e1,"name":"a\"bé","ok":false}}]}"#;
        assert_eq!(
            tokenize_whole(input).expect("valid"),
            tokenize_bytewise(input).expect("valid")
        );
    }

    #[test]
    fn number_at_end_of_input_is_completed_by_finish() {
        assert_eq!(tokenize_whole("42").expect("valid"), vec![ParseEvent::Scalar(json!(42))]);
    }

    #[test]
    fn rejects_trailing_commas_and_garbage() {
        assert!(tokenize_whole("[1,]").is_err());
        assert!(tokenize_whole(r#"{"a":1,}"#).is_err());
        assert!(tokenize_whole("[1] x").is_err());
        assert!(tokenize_whole("[tru]").is_err());
        assert!(tokenize_whole("").is_err());
    }

    #[test]
    fn reports_offset_of_the_failure() {
        let err = tokenize_whole(r#"{"a" 1}"#).expect_err("missing colon");
        assert_eq!(err.offset, 5);
        assert!(err.message.contains("':'"));
    }

    #[test]
    fn unterminated_string_fails_at_end_of_input() {
        let err = tokenize_whole(r#"["abc"#).expect_err("unterminated");
        assert!(err.message.contains("unterminated string"));
    }

    #[test]
    fn oversized_tokens_are_rejected() {
        let mut tokenizer = JsonTokenizer::with_max_token_bytes(8);
        tokenizer.feed(br#"["0123456789abcdef"#);
        assert!(matches!(tokenizer.next_event(), Ok(TokenizerStep::Event(ParseEvent::ArrayStart))));
        assert!(tokenizer.next_event().is_err());
    }
}
