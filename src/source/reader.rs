use crate::source::{ByteSource, SourceEvent};
use bytes::BytesMut;
use std::{
    pin::Pin,
    task::{Context, Poll},
};
use tokio::io::{AsyncRead, ReadBuf};

/// Default size of a single push produced by [`ReaderSource`].
pub const DEFAULT_READ_CAPACITY: usize = 8192;

/// Adapts an `AsyncRead` into a [`ByteSource`].
///
/// Each push is the result of one `poll_read` into a buffer of at most
/// `capacity` bytes. Nothing is read while paused.
pub struct ReaderSource<R> {
    reader: R,
    buf: BytesMut,
    capacity: usize,
    paused: bool,
    eof: bool,
}

impl<R> ReaderSource<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_READ_CAPACITY)
    }

    ///
    /// Creates a source whose pushes are at most `capacity` bytes long.
    ///
    /// ## Panics
    ///
    /// Panics if `capacity` is zero.
    ///
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        assert!(capacity > 0, "read capacity must not be zero");
        Self {
            reader,
            buf: BytesMut::new(),
            capacity,
            paused: false,
            eof: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<R> ByteSource for ReaderSource<R>
where
    R: AsyncRead + Unpin,
{
    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn poll_event(&mut self, cx: &mut Context<'_>) -> Poll<SourceEvent> {
        if self.paused {
            return Poll::Pending;
        }

        if self.eof {
            return Poll::Ready(SourceEvent::End);
        }

        self.buf.clear();
        self.buf.reserve(self.capacity);

        let dst = &mut self.buf.spare_capacity_mut()[..self.capacity];
        let mut read_buf = ReadBuf::uninit(dst);

        match Pin::new(&mut self.reader).poll_read(cx, &mut read_buf) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => Poll::Ready(SourceEvent::Error(e)),
            Poll::Ready(Ok(())) => {
                let n = read_buf.filled().len();
                if n == 0 {
                    self.eof = true;
                    return Poll::Ready(SourceEvent::End);
                }

                // SAFETY: `read_buf` ensures `n` bytes were initialized/written.
                unsafe {
                    self.buf.set_len(n);
                }

                Poll::Ready(SourceEvent::Data(self.buf.split().freeze()))
            }
        }
    }
}
