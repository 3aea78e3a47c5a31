//!
//! Lazy chunk chains and cursors over them.
//!
//! A byte source delivers data in pushes of arbitrary size and timing. This
//! module turns those pushes into a chain of immutable [`Chunk`]s, each
//! holding one push and a lazily resolved link to the next one, and offers
//! a [`Cursor`] that reads and seeks across the chain as if it were one
//! continuous byte sequence.
//!
//! ## Guarantees
//! 1. **Single controller**: the source is owned by exactly one unresolved
//!    chunk at a time and moves to its successor when that link resolves.
//! 2. **Backpressure**: a chunk keeps its source paused until
//!    [`Chunk::next`] is called, so at most one push is ever in flight
//!    ahead of the consumer.
//! 3. **Resolve once**: a link resolves a single time. Calling `next()`
//!    again, or from another cursor, observes the same successor or the
//!    same error without touching the source.
//! 4. **End is not an error**: running off the end of the chain is reported
//!    as `Ok(None)` by [`Cursor::seek`] and as a short result by
//!    [`Cursor::read`].
//!

mod cursor;
mod node;

pub use cursor::Cursor;
pub use node::{Chunk, Next};

#[cfg(all(test, feature = "tokio"))]
#[path = "tests/node_tests.rs"]
mod node_tests;

#[cfg(all(test, feature = "tokio"))]
#[path = "tests/cursor_tests.rs"]
mod cursor_tests;
