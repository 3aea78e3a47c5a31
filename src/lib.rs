//!
//! A seekable, forward-only read cursor over push-based byte sources.
//!
//! Wrap a [`ByteSource`] in a root [`Chunk`], point a [`Cursor`] at it and
//! `read` or `seek` by byte counts or size expressions such as `"4mb"`. The
//! source is only ever resumed when the cursor actually needs its next push.
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> chunkhead::Result<()> {
//! use chunkhead::{Chunk, Cursor, source::channel};
//!
//! let (pusher, source) = channel(4);
//! pusher.push("abc").await?;
//! pusher.push("def").await?;
//! pusher.end().await?;
//!
//! let head = Cursor::new(Chunk::from_source(source));
//! assert_eq!(head.read(4).await?.as_ref(), b"abcd");
//!
//! let head = head.seek(5).await?.expect("one byte is left");
//! assert_eq!(head.read("1kb").await?.as_ref(), b"f");
//! # Ok(())
//! # }
//! ```
//!

mod chunk;
mod error;
mod size;
pub mod source;

pub use chunk::{Chunk, Cursor, Next};
pub use error::{Error, Result};
pub use size::{ByteAmount, parse_size};
pub use source::{ByteSource, SourceEvent};
