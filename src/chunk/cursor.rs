use crate::chunk::Chunk;
use crate::error::Result;
use crate::size::ByteAmount;
use crate::source::{ByteSource, Detached};
use bytes::{Bytes, BytesMut};
use log::trace;
use std::fmt;

/// A position in a chunk chain: a chunk and a byte offset into it.
///
/// Cursors are immutable; `seek` and `read` never move the cursor they are
/// called on. Any number of cursors may point into the same chunk.
pub struct Cursor<S: ByteSource = Detached> {
    chunk: Chunk<S>,
    offset: usize,
}

impl<S: ByteSource> Cursor<S> {
    /// Creates a cursor at the start of `chunk`.
    pub fn new(chunk: Chunk<S>) -> Self {
        Self { chunk, offset: 0 }
    }

    ///
    /// Creates a cursor at `offset` bytes into `chunk`.
    ///
    /// ## Panics
    ///
    /// Panics if `offset` is past the end of the chunk.
    ///
    pub fn at(chunk: Chunk<S>, offset: usize) -> Self {
        assert!(
            offset <= chunk.len(),
            "offset {} is past the end of a {} byte chunk",
            offset,
            chunk.len()
        );
        Self { chunk, offset }
    }

    pub fn chunk(&self) -> &Chunk<S> {
        &self.chunk
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes left in the current chunk.
    pub fn remaining(&self) -> usize {
        self.chunk.len() - self.offset
    }

    ///
    /// Seeks forward by `n` bytes, e.g. `4096` or `"4mb"`.
    ///
    /// Successors are only forced once the current chunk cannot cover the
    /// seek. Returns `Ok(None)` if the chain ends before `n` bytes were
    /// skipped.
    ///
    /// ## Errors
    ///
    /// * `Error::NegativeAmount` or `Error::InvalidSize` for a bad `n`,
    ///   reported before any chunk is forced.
    /// * `Error::Source` if the source fails while a successor is forced.
    ///
    pub async fn seek(&self, n: impl ByteAmount) -> Result<Option<Cursor<S>>> {
        let mut left = n.byte_count()?;
        let mut chunk = self.chunk.clone();
        let mut offset = self.offset;

        loop {
            let remaining = chunk.len() - offset;
            if left <= remaining as u64 {
                // `left` fits in the current chunk, so it fits in a usize.
                return Ok(Some(Cursor {
                    chunk,
                    offset: offset + left as usize,
                }));
            }

            let Some(next) = chunk.next() else {
                trace!(
                    "seek ran past the end of the chain, {} bytes short",
                    left - remaining as u64
                );
                return Ok(None);
            };

            left -= remaining as u64;
            chunk = next.await?;
            offset = 0;
            trace!(
                "seek crossed into a {} byte chunk, {} bytes left",
                chunk.len(),
                left
            );
        }
    }

    ///
    /// Reads up to `n` bytes, e.g. `4096` or `"4mb"`.
    ///
    /// The result is shorter than `n` only if the chain ends first. Reading
    /// within a single chunk does not copy.
    ///
    /// ## Errors
    ///
    /// * `Error::NegativeAmount` or `Error::InvalidSize` for a bad `n`,
    ///   reported before any chunk is forced.
    /// * `Error::Source` if the source fails while a successor is forced.
    ///
    pub async fn read(&self, n: impl ByteAmount) -> Result<Bytes> {
        let mut left = n.byte_count()?;
        let mut parts: Vec<Bytes> = Vec::new();
        let mut chunk = self.chunk.clone();
        let mut offset = self.offset;

        loop {
            let available = chunk.len() - offset;
            let take = usize::try_from(left).map_or(available, |l| l.min(available));
            if take > 0 {
                parts.push(chunk.data().slice(offset..offset + take));
            }

            left -= take as u64;
            if left == 0 {
                break;
            }

            let Some(next) = chunk.next() else {
                trace!("read reached the end of the chain, {} bytes short", left);
                break;
            };

            chunk = next.await?;
            offset = 0;
        }

        Ok(concat(parts))
    }
}

fn concat(mut parts: Vec<Bytes>) -> Bytes {
    if parts.len() <= 1 {
        return parts.pop().unwrap_or_default();
    }

    let total = parts.iter().map(Bytes::len).sum();
    let mut buf = BytesMut::with_capacity(total);
    for part in &parts {
        buf.extend_from_slice(part);
    }
    buf.freeze()
}

impl<S: ByteSource> Clone for Cursor<S> {
    fn clone(&self) -> Self {
        Self {
            chunk: self.chunk.clone(),
            offset: self.offset,
        }
    }
}

impl<S: ByteSource> fmt::Debug for Cursor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("chunk", &self.chunk)
            .field("offset", &self.offset)
            .finish()
    }
}
