//!
//! The byte source boundary.
//!
//! A [`ByteSource`] is a push-based producer: once resumed it delivers data
//! in pushes of whatever size it likes, followed by either an end-of-data
//! signal or an error. Chunks drive a source through exactly three
//! capabilities and nothing else:
//!
//! 1. **pause / resume**: suspend and re-enable delivery of data pushes.
//! 2. **a single event subscription**: [`ByteSource::poll_event`] reports
//!    whichever of `Data`, `End` or `Error` happens next.
//! 3. **ownership**: a source is moved into the chunk that controls it, so
//!    two chunks can never subscribe to the same source at once.
//!
//! Adapters for the common producers live in the submodules.
//!

use bytes::Bytes;
use std::{
    io,
    task::{Context, Poll},
};

#[cfg(feature = "tokio")]
mod channel;
#[cfg(feature = "tokio")]
mod reader;
mod stream;

#[cfg(feature = "tokio")]
pub use channel::{ChannelSource, Pusher, channel};
#[cfg(feature = "tokio")]
pub use reader::{DEFAULT_READ_CAPACITY, ReaderSource};
pub use stream::StreamSource;

/// One signal from a byte source.
#[derive(Debug)]
pub enum SourceEvent {
    /// A push of data. May be empty.
    Data(Bytes),
    /// No further data will arrive.
    End,
    /// The source failed. No further data will arrive.
    Error(io::Error),
}

/// A push-based, pausable byte producer.
///
/// While paused, a source must not yield `Data` or `End` from
/// [`poll_event`](ByteSource::poll_event); it may still report an `Error`.
/// A freshly constructed source may start paused or resumed, the chunk
/// taking control of it pauses it first.
pub trait ByteSource: Unpin {
    /// Suspends delivery of data pushes.
    fn pause(&mut self);

    /// Re-enables delivery of data pushes.
    fn resume(&mut self);

    /// Polls for the next event.
    ///
    /// After returning `End` or `Error`, the source is dropped by its chunk
    /// and never polled again.
    fn poll_event(&mut self, cx: &mut Context<'_>) -> Poll<SourceEvent>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn pause(&mut self) {
        (**self).pause()
    }

    fn resume(&mut self) {
        (**self).resume()
    }

    fn poll_event(&mut self, cx: &mut Context<'_>) -> Poll<SourceEvent> {
        (**self).poll_event(cx)
    }
}

/// The source type of chunks that were never attached to a source.
///
/// It has no values, so a `Chunk<Detached>` can never have a successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detached {}

impl ByteSource for Detached {
    fn pause(&mut self) {
        match *self {}
    }

    fn resume(&mut self) {
        match *self {}
    }

    fn poll_event(&mut self, _cx: &mut Context<'_>) -> Poll<SourceEvent> {
        match *self {}
    }
}
