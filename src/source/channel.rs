use crate::source::{ByteSource, SourceEvent};
use bytes::Bytes;
use std::{
    io,
    task::{Context, Poll},
};
use tokio::sync::mpsc;

///
/// Creates a bounded push source.
///
/// The [`Pusher`] half writes data, an error or end-of-data into the
/// [`ChannelSource`] half. At most `capacity` events are buffered; further
/// pushes wait until the chunk chain consumes one. Dropping the pusher
/// without calling [`Pusher::end`] also ends the source.
///
/// ## Panics
///
/// Panics if `capacity` is zero.
///
pub fn channel(capacity: usize) -> (Pusher, ChannelSource) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        Pusher { tx },
        ChannelSource {
            rx,
            paused: false,
            held: None,
        },
    )
}

/// The writing half of [`channel`].
#[derive(Debug, Clone)]
pub struct Pusher {
    tx: mpsc::Sender<SourceEvent>,
}

fn detached() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "byte source was dropped")
}

impl Pusher {
    /// Pushes `data`, waiting for buffer space.
    pub async fn push(&self, data: impl Into<Bytes>) -> io::Result<()> {
        self.tx
            .send(SourceEvent::Data(data.into()))
            .await
            .map_err(|_| detached())
    }

    /// Pushes `data` if there is buffer space right now.
    pub fn try_push(&self, data: impl Into<Bytes>) -> io::Result<()> {
        self.tx
            .try_send(SourceEvent::Data(data.into()))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    io::Error::new(io::ErrorKind::WouldBlock, "byte source is full")
                }
                mpsc::error::TrySendError::Closed(_) => detached(),
            })
    }

    /// Reports a failure and closes this pusher.
    pub async fn fail(self, err: io::Error) -> io::Result<()> {
        self.tx
            .send(SourceEvent::Error(err))
            .await
            .map_err(|_| detached())
    }

    /// Signals end-of-data and closes this pusher.
    pub async fn end(self) -> io::Result<()> {
        self.tx.send(SourceEvent::End).await.map_err(|_| detached())
    }
}

/// The reading half of [`channel`].
///
/// While paused it takes at most one event off the channel and holds it
/// back until resumed. An error found while nothing is held is reported
/// right away.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<SourceEvent>,
    paused: bool,
    held: Option<SourceEvent>,
}

impl ByteSource for ChannelSource {
    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn poll_event(&mut self, cx: &mut Context<'_>) -> Poll<SourceEvent> {
        if self.held.is_some() {
            if self.paused {
                return Poll::Pending;
            }
            if let Some(event) = self.held.take() {
                return Poll::Ready(event);
            }
        }

        let event = match self.rx.poll_recv(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Some(event)) => event,
            // Every pusher is gone.
            Poll::Ready(None) => SourceEvent::End,
        };

        match event {
            SourceEvent::Error(e) => Poll::Ready(SourceEvent::Error(e)),
            event if self.paused => {
                self.held = Some(event);
                Poll::Pending
            }
            event => Poll::Ready(event),
        }
    }
}
