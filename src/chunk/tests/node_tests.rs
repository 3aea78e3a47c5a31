use crate::source::{ChannelSource, ReaderSource, channel};
use crate::{Chunk, Cursor, Error};
use bytes::Bytes;
use futures::TryFutureExt;
use std::{io, sync::Arc};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn source_error(err: &Error) -> &Arc<io::Error> {
    err.source_error().expect("expected a source error")
}

// --- has_next ---

#[test]
fn test_detached_chunk_has_no_next() {
    let c: Chunk = Chunk::new("abc");

    assert!(!c.has_next());
    assert!(!c.has_next_available());
    assert!(c.next().is_none());
    assert!(c.next_available().expect("no link, no error").is_none());
    assert_eq!(c.data().as_ref(), b"abc");
}

#[tokio::test]
async fn test_has_next_before_data_is_available() {
    let (_pusher, s) = channel(4);
    let c = Chunk::from_source(s);

    assert!(c.has_next());
}

#[tokio::test]
async fn test_has_next_after_data_is_available() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    pusher.push("abc").await.unwrap();
    pusher.end().await.unwrap();

    assert!(c.has_next());
}

#[tokio::test]
async fn test_no_next_after_all_data_has_been_read() {
    init();
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    pusher.end().await.unwrap();

    let end = c.next().expect("root is attached").await.unwrap();

    assert!(!end.has_next());
    assert!(end.is_empty());
    assert!(end.next().is_none());
}

// --- next: error ---

#[tokio::test]
async fn test_catches_errors_before_the_next_request() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    pusher.fail(io::Error::other("MEH!")).await.unwrap();

    let err = c.next().unwrap().await.expect_err("link should fail");

    assert_eq!(source_error(&err).to_string(), "MEH!");
}

#[tokio::test]
async fn test_catches_errors_after_the_next_request() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);

    let (res, sent) = tokio::join!(c.next().unwrap(), async move {
        tokio::task::yield_now().await;
        pusher.fail(io::Error::other("MEH!")).await
    });

    sent.unwrap();
    let err = res.expect_err("link should fail");
    assert_eq!(source_error(&err).to_string(), "MEH!");
}

#[tokio::test]
async fn test_catches_errors_with_a_failure_handler() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    pusher.fail(io::Error::other("MEH!")).await.unwrap();

    let seen = c
        .next()
        .unwrap()
        .map_ok(|_| String::from("unexpected chunk"))
        .or_else(|err| async move { Ok::<_, Error>(source_error(&err).to_string()) })
        .await
        .unwrap();

    assert_eq!(seen, "MEH!");
}

#[tokio::test]
async fn test_catches_errors_in_a_second_handler() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    pusher.push("MEH!").await.unwrap();
    pusher.fail(io::Error::other("MEH!")).await.unwrap();

    let chunk = c.next().unwrap().await.unwrap();
    assert_eq!(chunk.data().as_ref(), b"MEH!");

    let err = chunk.next().unwrap().await.expect_err("link should fail");
    assert_eq!(source_error(&err).to_string(), "MEH!");
}

#[tokio::test]
async fn test_failure_is_permanent_and_shared() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    pusher.fail(io::Error::other("MEH!")).await.unwrap();

    let first = c.next().unwrap().await.expect_err("link should fail");
    let second = c.next().unwrap().await.expect_err("link should fail");
    let third = c.next_available().expect_err("link should fail");

    // Every observer sees the same error object.
    assert!(Arc::ptr_eq(source_error(&first), source_error(&second)));
    assert!(Arc::ptr_eq(source_error(&first), source_error(&third)));
    assert!(!first.is_precondition());
}

// --- next: data ---

#[tokio::test]
async fn test_gets_data_emitted_before_the_next_request() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    pusher.push("MEH!").await.unwrap();

    let chunk = c.next().unwrap().await.unwrap();

    assert_eq!(chunk.data().as_ref(), b"MEH!");
    assert!(chunk.has_next());
}

#[tokio::test]
async fn test_gets_data_emitted_after_the_next_request() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);

    let (res, sent) = tokio::join!(c.next().unwrap(), async move {
        tokio::task::yield_now().await;
        pusher.push("MEH!").await
    });

    sent.unwrap();
    assert_eq!(res.unwrap().data().as_ref(), b"MEH!");
}

#[tokio::test]
async fn test_gets_data_with_a_success_handler() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    pusher.push("MEH!").await.unwrap();

    let len = c.next().unwrap().map_ok(|chunk| chunk.len()).await.unwrap();

    assert_eq!(len, 4);
}

#[tokio::test]
async fn test_gets_data_in_a_second_handler() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    pusher.push("MEH!1").await.unwrap();
    pusher.push("MEH!2").await.unwrap();

    let chunk1 = c.next().unwrap().await.unwrap();
    let chunk2 = chunk1.next().unwrap().await.unwrap();

    assert_eq!(chunk1.data().as_ref(), b"MEH!1");
    assert_eq!(chunk2.data().as_ref(), b"MEH!2");
}

#[tokio::test]
async fn test_empty_push_is_a_chunk() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    pusher.push(Bytes::new()).await.unwrap();

    let chunk = c.next().unwrap().await.unwrap();

    assert!(chunk.is_empty());
    assert!(chunk.has_next());
}

// --- next: end ---

#[tokio::test]
async fn test_gets_end_emitted_before_the_next_request() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    pusher.end().await.unwrap();

    let chunk = c.next().unwrap().await.unwrap();

    assert!(!chunk.has_next());
}

#[tokio::test]
async fn test_gets_end_emitted_after_the_next_request() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);

    let (res, sent) = tokio::join!(c.next().unwrap(), async move {
        tokio::task::yield_now().await;
        pusher.end().await
    });

    sent.unwrap();
    assert!(!res.unwrap().has_next());
}

#[tokio::test]
async fn test_gets_end_in_a_second_handler() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    pusher.push("MEH!").await.unwrap();
    pusher.end().await.unwrap();

    let chunk1 = c.next().unwrap().await.unwrap();
    assert_eq!(chunk1.data().as_ref(), b"MEH!");

    let chunk2 = chunk1.next().unwrap().await.unwrap();
    assert!(!chunk2.has_next());
    assert!(chunk2.is_empty());
}

#[tokio::test]
async fn test_dropping_every_pusher_ends_the_chain() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    drop(pusher);

    let chunk = c.next().unwrap().await.unwrap();

    assert!(!chunk.has_next());
}

// --- hand-off ---

#[tokio::test]
async fn test_next_twice_consumes_a_single_push() {
    init();
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    pusher.push("one").await.unwrap();
    pusher.push("two").await.unwrap();

    let first = c.next().unwrap().await.unwrap();
    let second = c.next().unwrap().await.unwrap();

    // Both calls observe the same successor.
    assert!(first.ptr_eq(&second));
    assert_eq!(first.data().as_ref(), b"one");

    // The second push is still waiting for the successor.
    let after = first.next().unwrap().await.unwrap();
    assert_eq!(after.data().as_ref(), b"two");
}

#[tokio::test]
async fn test_concurrent_next_futures_share_one_outcome() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);

    let a = c.next().unwrap();
    let b = a.clone();
    let (ra, rb, sent) = tokio::join!(a, b, async move {
        tokio::task::yield_now().await;
        pusher.push("MEH!").await
    });

    sent.unwrap();
    assert!(ra.unwrap().ptr_eq(&rb.unwrap()));
}

#[tokio::test]
async fn test_source_stays_paused_until_next() {
    let (pusher, s) = channel(1);
    let c = Chunk::from_source(s);
    pusher.push("a").await.unwrap();

    // Nothing asked for the push, so the buffer is still full.
    let err = pusher.try_push("b").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::WouldBlock);

    let chunk = c.next().unwrap().await.unwrap();
    assert_eq!(chunk.data().as_ref(), b"a");

    // The successor took the push off, making room for exactly one more.
    pusher.try_push("b").unwrap();
    let err = pusher.try_push("c").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
}

// --- available ---

#[tokio::test]
async fn test_data_is_not_available_before_next() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    pusher.push("MEH!").await.unwrap();

    assert!(!c.has_next_available());
    assert!(c.next_available().unwrap().is_none());

    let chunk = c.next().unwrap().await.unwrap();

    assert!(c.has_next_available());
    let available = c.next_available().unwrap().expect("link has resolved");
    assert!(available.ptr_eq(&chunk));
}

#[tokio::test]
async fn test_error_is_available_before_next() {
    let (pusher, s) = channel(4);
    let c = Chunk::from_source(s);
    pusher.fail(io::Error::other("MEH!")).await.unwrap();

    assert!(c.has_next_available());
    let err = c.next_available().expect_err("link should fail");
    assert_eq!(source_error(&err).to_string(), "MEH!");

    // `next` hands out the very same failure.
    let again = c.next().unwrap().await.expect_err("link should fail");
    assert!(Arc::ptr_eq(source_error(&err), source_error(&again)));
}

#[tokio::test]
async fn test_pending_link_is_not_available() {
    let (_pusher, s) = channel(4);
    let c: Chunk<ChannelSource> = Chunk::from_source(s);

    let next = c.next().unwrap();

    assert!(!c.has_next_available());
    assert!(format!("{:?}", next).contains("resolved: false"));
}

// --- drop ---

#[tokio::test]
async fn test_dropping_a_long_chain() {
    const LEN: usize = 100_000;

    let data = vec![7u8; LEN];
    let root = Chunk::from_source(ReaderSource::with_capacity(&data[..], 1));

    let buf = Cursor::new(root.clone()).read(LEN).await.unwrap();
    assert_eq!(buf.len(), LEN);

    // The root keeps every resolved chunk alive; dropping it must not
    // recurse once per chunk.
    drop(root);
}
