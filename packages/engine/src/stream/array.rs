//! Array element stream
//!
//! Walks the parse events of a document until it reaches the array named by
//! a [`Source`]'s sub-path, then materializes that array's elements one at a
//! time. Nothing outside the target array is ever assembled into a value, but
//! the rest of the document is still tokenized so that malformed input after
//! the array fails the stream.

use futures::Stream;
use serde_json::Value;

use super::builder::ValueBuilder;
use super::events::{ParseEvent, StreamStats};
use super::reader::EventReader;
use super::source::Source;
use crate::config::StreamConfig;
use crate::error::Result;

/// One materialized element of the target array
#[derive(Debug, Clone, PartialEq)]
pub struct StreamElement {
    /// Zero-based position in the target array
    pub index: u64,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Object,
    Array,
}

/// A container enclosing the current position while seeking
#[derive(Debug)]
struct Ancestor {
    kind: ContainerKind,
    /// Key under which this container sits in its parent object
    key: Option<String>,
}

#[derive(Debug)]
enum Phase {
    Seeking,
    Streaming {
        builder: ValueBuilder,
        next_index: u64,
    },
    /// Target array closed; validating the remainder of the document
    Draining,
    Done,
}

/// Lazily yields the elements of one array inside a JSON file.
///
/// Each `open` creates its own file handle, so several streams over the same
/// file are independent.
#[derive(Debug)]
pub struct ElementStream {
    reader: EventReader,
    sub_path: String,
    target: Vec<String>,
    ancestors: Vec<Ancestor>,
    pending_key: Option<String>,
    phase: Phase,
    elements: u64,
}

impl ElementStream {
    /// Open the array described by `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the file cannot be opened.
    pub async fn open(source: &Source, config: &StreamConfig) -> Result<Self> {
        let reader = EventReader::open(&source.path, config).await?;
        Ok(Self::from_reader(reader, source))
    }

    pub fn from_reader(reader: EventReader, source: &Source) -> Self {
        Self {
            reader,
            sub_path: source.sub_path.clone(),
            target: source.sub_path_keys(),
            ancestors: Vec::new(),
            pending_key: None,
            phase: Phase::Seeking,
            elements: 0,
        }
    }

    /// Next element in document order.
    ///
    /// Returns `Ok(None)` once the document ends, either after the target array
    /// or without containing it (logged as a warning, not an error). Events
    /// after the target array are checked and discarded.
    ///
    /// # Errors
    ///
    /// Propagates parse and I/O errors from the reader.
    pub async fn next_element(&mut self) -> Result<Option<StreamElement>> {
        loop {
            match self.phase {
                Phase::Done => return Ok(None),
                Phase::Draining => {
                    while self.reader.next_event().await?.is_some() {}
                    self.phase = Phase::Done;
                    return Ok(None);
                }
                Phase::Seeking | Phase::Streaming { .. } => {}
            }

            let Some(event) = self.reader.next_event().await? else {
                if matches!(self.phase, Phase::Seeking) {
                    tracing::warn!(
                        target: "entscan::stream",
                        path = %self.reader.path().display(),
                        sub_path = %self.sub_path,
                        "sub-path not found; stream is empty"
                    );
                }
                self.phase = Phase::Done;
                return Ok(None);
            };

            if let Phase::Streaming { builder, next_index } = &mut self.phase {
                if builder.is_idle() && event == ParseEvent::ArrayEnd {
                    tracing::debug!(
                        target: "entscan::stream",
                        elements = self.elements,
                        "target array closed"
                    );
                    self.phase = Phase::Draining;
                    continue;
                }
                if let Some(value) = builder.push(event) {
                    let index = *next_index;
                    *next_index += 1;
                    self.elements += 1;
                    return Ok(Some(StreamElement { index, value }));
                }
            } else {
                self.seek(event);
            }
        }
    }

    fn seek(&mut self, event: ParseEvent) {
        match event {
            ParseEvent::Key(key) => self.pending_key = Some(key),
            ParseEvent::ObjectStart => {
                let key = self.pending_key.take();
                self.ancestors.push(Ancestor {
                    kind: ContainerKind::Object,
                    key,
                });
            }
            ParseEvent::ArrayStart => {
                let key = self.pending_key.take();
                if self.is_target(key.as_deref()) {
                    tracing::debug!(
                        target: "entscan::stream",
                        sub_path = %self.sub_path,
                        "streaming target array"
                    );
                    self.phase = Phase::Streaming {
                        builder: ValueBuilder::new(),
                        next_index: 0,
                    };
                } else {
                    self.ancestors.push(Ancestor {
                        kind: ContainerKind::Array,
                        key,
                    });
                }
            }
            ParseEvent::ObjectEnd | ParseEvent::ArrayEnd => {
                self.ancestors.pop();
            }
            ParseEvent::Scalar(_) => self.pending_key = None,
        }
    }

    /// Is an array opening under `key` at the current position the target?
    fn is_target(&self, key: Option<&str>) -> bool {
        let Some((last, parents)) = self.target.split_last() else {
            return self.ancestors.is_empty();
        };
        if self.ancestors.len() != self.target.len() || key != Some(last.as_str()) {
            return false;
        }
        self.ancestors.iter().all(|a| a.kind == ContainerKind::Object)
            && self.ancestors[0].key.is_none()
            && self.ancestors[1..]
                .iter()
                .zip(parents)
                .all(|(ancestor, expected)| ancestor.key.as_deref() == Some(expected.as_str()))
    }

    #[must_use]
    pub fn stats(&self) -> StreamStats {
        StreamStats {
            elements: self.elements,
            ..self.reader.stats()
        }
    }

    /// Adapt into a `futures::Stream` for combinator-style consumers.
    pub fn into_stream(self) -> impl Stream<Item = Result<StreamElement>> {
        futures::stream::try_unfold(self, |mut stream| async move {
            Ok(stream.next_element().await?.map(|element| (element, stream)))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use futures::TryStreamExt;
    use serde_json::json;

    use super::*;

    fn fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write fixture");
        file
    }

    async fn collect(source: &Source, config: &StreamConfig) -> Result<Vec<StreamElement>> {
        ElementStream::open(source, config).await?.into_stream().try_collect().await
    }

    #[tokio::test]
    async fn yields_entities_in_order() {
        let file = fixture(
            r#"{"version": 3, "entities": [{"entityId": "Player:1"}, {"entityId": "Player:2"}], "tail": [1]}"#,
        );
        let elements = collect(&Source::new(file.path()), &StreamConfig::low_memory())
            .await
            .expect("stream");
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].index, 0);
        assert_eq!(elements[1].value, json!({"entityId": "Player:2"}));
    }

    #[tokio::test]
    async fn nested_arrays_with_the_same_key_are_not_targets() {
        let file = fixture(
            r#"{"meta": {"entities": [0]}, "entities": [{"children": {"entities": [9]}}]}"#,
        );
        let elements = collect(&Source::new(file.path()), &StreamConfig::default())
            .await
            .expect("stream");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].value, json!({"children": {"entities": [9]}}));
    }

    #[tokio::test]
    async fn missing_sub_path_yields_nothing() {
        let file = fixture(r#"{"items": [1, 2, 3]}"#);
        let elements = collect(&Source::new(file.path()), &StreamConfig::default())
            .await
            .expect("stream");
        assert!(elements.is_empty());
    }

    #[tokio::test]
    async fn root_arrays_stream_with_empty_sub_path() {
        let file = fixture("[1, [2], {\"a\": 3}]");
        let elements = collect(&Source::root_array(file.path()), &StreamConfig::default())
            .await
            .expect("stream");
        let values: Vec<Value> = elements.into_iter().map(|e| e.value).collect();
        assert_eq!(values, vec![json!(1), json!([2]), json!({"a": 3})]);
    }

    #[tokio::test]
    async fn malformed_input_after_the_target_array_fails() {
        let file = fixture(r#"{"entities": [{"entityId": "Player:1"}], "tail": [1, 2, }"#);
        let err = collect(&Source::new(file.path()), &StreamConfig::low_memory())
            .await
            .expect_err("trailing garbage is still parsed");
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn truncated_document_after_the_target_array_fails() {
        let file = fixture(r#"{"entities": [1, 2], "meta": {"#);
        let mut stream = ElementStream::open(&Source::new(file.path()), &StreamConfig::default())
            .await
            .expect("open");
        assert!(stream.next_element().await.expect("first").is_some());
        assert!(stream.next_element().await.expect("second").is_some());
        assert!(stream.next_element().await.is_err());
    }

    #[tokio::test]
    async fn malformed_input_fails_with_the_file_path() {
        let file = fixture(r#"{"entities": [{"a": 1,}]}"#);
        let err = collect(&Source::new(file.path()), &StreamConfig::default())
            .await
            .expect_err("malformed");
        assert!(err.is_fatal());
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let err = ElementStream::open(&Source::new("/definitely/not/here.json"), &StreamConfig::default())
            .await
            .expect_err("missing");
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
