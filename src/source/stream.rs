use crate::source::{ByteSource, SourceEvent};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::{
    io,
    task::{Context, Poll},
};

/// Adapts a `Stream` of byte buffers into a [`ByteSource`].
///
/// The stream is simply not polled while paused, so it only ever produces
/// the item the controlling chunk asked for.
pub struct StreamSource<St> {
    stream: St,
    paused: bool,
}

impl<St> StreamSource<St>
where
    St: Stream<Item = io::Result<Bytes>> + Unpin,
{
    pub fn new(stream: St) -> Self {
        Self {
            stream,
            paused: false,
        }
    }

    pub fn into_inner(self) -> St {
        self.stream
    }
}

impl<St> ByteSource for StreamSource<St>
where
    St: Stream<Item = io::Result<Bytes>> + Unpin,
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

        match self.stream.poll_next_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(data))) => Poll::Ready(SourceEvent::Data(data)),
            Poll::Ready(Some(Err(e))) => Poll::Ready(SourceEvent::Error(e)),
            Poll::Ready(None) => Poll::Ready(SourceEvent::End),
        }
    }
}
