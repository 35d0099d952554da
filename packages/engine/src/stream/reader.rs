//! Tokenizing stream reader over a file

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncReadExt;

use super::events::{ParseEvent, StreamStats};
use super::tokenizer::{JsonTokenizer, TokenizerStep};
use crate::config::StreamConfig;
use crate::error::{Error, Result};

/// Pull-based reader turning file bytes into [`ParseEvent`]s.
///
/// A chunk is read from disk only when the tokenizer cannot produce the next
/// event from what it already holds, so the reader never runs ahead of its
/// consumer and buffers at most one chunk plus one partial token.
#[derive(Debug)]
pub struct EventReader {
    path: PathBuf,
    file: File,
    tokenizer: JsonTokenizer,
    chunk: Vec<u8>,
    stats: StreamStats,
}

impl EventReader {
    /// Open `path` for streaming.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened.
    pub async fn open(path: impl AsRef<Path>, config: &StreamConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await.map_err(|e| Error::io(&path, e))?;
        tracing::debug!(
            target: "entscan::stream",
            path = %path.display(),
            chunk_size = config.chunk_size,
            "opened event reader"
        );
        Ok(Self {
            path,
            file,
            tokenizer: JsonTokenizer::with_max_token_bytes(config.max_token_bytes),
            chunk: vec![0; config.chunk_size.max(1)],
            stats: StreamStats::default(),
        })
    }

    /// Next event in document order, or `None` once the document is complete.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed JSON and [`Error::Io`] for read
    /// failures. The reader is unusable after an error.
    pub async fn next_event(&mut self) -> Result<Option<ParseEvent>> {
        loop {
            match self.tokenizer.next_event() {
                Ok(TokenizerStep::Event(event)) => {
                    self.stats.events += 1;
                    return Ok(Some(event));
                }
                Ok(TokenizerStep::Finished) => return Ok(None),
                Ok(TokenizerStep::NeedMoreData) => self.fill().await?,
                Err(e) => return Err(Error::parse(&self.path, e.offset, e.message)),
            }
        }
    }

    async fn fill(&mut self) -> Result<()> {
        let read = self
            .file
            .read(&mut self.chunk)
            .await
            .map_err(|e| Error::io(&self.path, e))?;
        if read == 0 {
            self.tokenizer.finish();
        } else {
            self.tokenizer.feed(&self.chunk[..read]);
            self.stats.bytes_read += read as u64;
        }
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current nesting depth of the underlying tokenizer.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.tokenizer.depth()
    }

    #[must_use]
    pub fn stats(&self) -> StreamStats {
        self.stats
    }
}
