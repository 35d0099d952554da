//! Streaming JSON reader
//!
//! Turns a (potentially very large) JSON file into a lazy sequence of
//! elements from one of its arrays, typically the top-level `entities`
//! array, without materializing the rest of the document.
//!
//! Layers, leaves first:
//!
//! - [`JsonTokenizer`]: incremental lexer + grammar state machine over bytes
//! - [`EventReader`]: pulls file chunks into the tokenizer on demand
//! - [`ElementStream`]: seeks the target array and assembles its elements
//!
//! # Examples
//!
//! ```no_run
//! use entscan_engine::config::StreamConfig;
//! use entscan_engine::stream::{ElementStream, Source};
//!
//! # async fn run() -> entscan_engine::Result<()> {
//! let mut stream = ElementStream::open(&Source::new("live.json"), &StreamConfig::default()).await?;
//! while let Some(element) = stream.next_element().await? {
//!     println!("{} => {}", element.index, element.value);
//! }
//! # Ok(())
//! # }
//! ```

mod array;
mod builder;
mod events;
mod reader;
mod source;
mod tokenizer;

pub use array::{ElementStream, StreamElement};
pub use builder::ValueBuilder;
pub use events::{ParseEvent, StreamStats};
pub use reader::EventReader;
pub use source::{DEFAULT_SUB_PATH, Source};
pub use tokenizer::{JsonTokenizer, TokenizeError, TokenizerStep};
