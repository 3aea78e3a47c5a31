use crate::error::{Error, Result};
use crate::source::{ByteSource, Detached, SourceEvent};
use bytes::Bytes;
use futures::{
    FutureExt,
    channel::oneshot,
    future::Shared,
};
use log::{debug, trace};
use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
    task::{Context, Poll},
};

/// An immutable slice of a byte stream with a lazy link to the next slice.
///
/// Cloning a `Chunk` is cheap and yields a handle to the same node.
pub struct Chunk<S: ByteSource = Detached> {
    inner: Arc<Inner<S>>,
}

struct Inner<S: ByteSource> {
    data: Bytes,
    link: Option<Link<S>>,
}

struct Link<S: ByteSource> {
    // Taken by the first `next()` call. Its presence means the source has
    // not been handed over yet.
    release: Mutex<Option<oneshot::Sender<()>>>,
    next: Shared<Attached<S>>,
}

/// Holds the paused source until it is released, then waits for its next event.
struct Attached<S> {
    source: Option<S>,
    release: oneshot::Receiver<()>,
    released: bool,
}

impl<S: ByteSource> Future for Attached<S> {
    type Output = Result<Chunk<S>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        // `Shared` drops the future once it completes, so the source is
        // always present here.
        let Some(mut source) = this.source.take() else {
            return Poll::Pending;
        };

        if !this.released {
            // A cancelled sender means the chunk is gone without ever
            // handing over control; the source stays paused.
            if let Poll::Ready(Ok(())) = this.release.poll_unpin(cx) {
                this.released = true;
                source.resume();
            }
        }

        match source.poll_event(cx) {
            Poll::Pending => {
                this.source = Some(source);
                Poll::Pending
            }
            Poll::Ready(SourceEvent::Data(data)) => Poll::Ready(Ok(Chunk::attach(data, source))),
            Poll::Ready(SourceEvent::End) => {
                debug!("byte source ended");
                Poll::Ready(Ok(Chunk::empty()))
            }
            Poll::Ready(SourceEvent::Error(e)) => {
                debug!("byte source failed: {}", e);
                Poll::Ready(Err(Error::from(e)))
            }
        }
    }
}

impl<S: ByteSource> Chunk<S> {
    /// Creates a chunk over `data` with no successor.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            inner: Arc::new(Inner {
                data: data.into(),
                link: None,
            }),
        }
    }

    /// Creates an empty chunk with no successor.
    pub fn empty() -> Self {
        Self::new(Bytes::new())
    }

    ///
    /// Creates a chunk over `data` that takes exclusive control of `source`.
    ///
    /// The source is paused immediately and stays paused until [`Chunk::next`]
    /// is called. Its next event becomes the successor of this chunk: a data
    /// push yields a chunk that inherits the source, end-of-data yields a
    /// terminal chunk, and an error fails the link for good.
    ///
    pub fn attach(data: impl Into<Bytes>, mut source: S) -> Self {
        let data = data.into();
        source.pause();
        trace!("chunk of {} bytes attached to byte source", data.len());

        let (tx, rx) = oneshot::channel();
        let attached = Attached {
            source: Some(source),
            release: rx,
            released: false,
        };

        Self {
            inner: Arc::new(Inner {
                data,
                link: Some(Link {
                    release: Mutex::new(Some(tx)),
                    next: attached.shared(),
                }),
            }),
        }
    }

    /// Creates an empty root chunk attached to `source`.
    pub fn from_source(source: S) -> Self {
        Self::attach(Bytes::new(), source)
    }

    pub fn data(&self) -> &Bytes {
        &self.inner.data
    }

    pub fn len(&self) -> usize {
        self.inner.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }

    /// Returns `true` if both handles point to the same chunk.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns `true` if this chunk has a link to a successor, resolved or not.
    pub fn has_next(&self) -> bool {
        self.inner.link.is_some()
    }

    /// Returns `true` if the link to the successor has already resolved,
    /// successfully or not. Never waits.
    pub fn has_next_available(&self) -> bool {
        self.poll_link().is_some()
    }

    ///
    /// Returns the successor if the link has already resolved. Never waits.
    ///
    /// ## Errors
    ///
    /// Returns the source failure if the link resolved to one.
    ///
    pub fn next_available(&self) -> Result<Option<Chunk<S>>> {
        self.poll_link().transpose()
    }

    fn poll_link(&self) -> Option<Result<Chunk<S>>> {
        let link = self.inner.link.as_ref()?;
        if let Some(output) = link.next.peek() {
            return Some(output.clone());
        }
        // A paused source can still report an error here.
        link.next.clone().now_or_never()
    }

    ///
    /// Hands control of the source to the successor and returns a future of it.
    ///
    /// The first call resumes the source. Later calls leave the source alone
    /// and return a future of the same outcome. Returns `None` for a chunk
    /// without a successor.
    ///
    pub fn next(&self) -> Option<Next<S>> {
        let link = self.inner.link.as_ref()?;

        let release = link
            .release
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(tx) = release {
            debug!("handing byte source over to the next chunk");
            // The receiver is gone only if the link already resolved.
            let _ = tx.send(());
        }

        Some(Next {
            inner: link.next.clone(),
        })
    }
}

impl<S: ByteSource> Clone for Chunk<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ByteSource> fmt::Debug for Chunk<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("len", &self.len())
            .field("has_next", &self.has_next())
            .finish()
    }
}

impl<S: ByteSource> Drop for Inner<S> {
    // Unlinks resolved successors one at a time so that dropping a long
    // chain does not recurse once per chunk.
    fn drop(&mut self) {
        let mut link = self.link.take();
        while let Some(current) = link {
            let successor = match current.next.peek() {
                Some(Ok(chunk)) => Some(chunk.clone()),
                _ => None,
            };
            drop(current);

            link = successor
                .and_then(|chunk| Arc::try_unwrap(chunk.inner).ok())
                .and_then(|mut inner| inner.link.take());
        }
    }
}

/// Future returned by [`Chunk::next`].
///
/// Every clone resolves to the same successor or the same error.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Next<S: ByteSource> {
    inner: Shared<Attached<S>>,
}

impl<S: ByteSource> Clone for Next<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: ByteSource> Future for Next<S> {
    type Output = Result<Chunk<S>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl<S: ByteSource> fmt::Debug for Next<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("resolved", &self.inner.peek().is_some())
            .finish()
    }
}
