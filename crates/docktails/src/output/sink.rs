//! Sink — one serializing writer task per physical output.
//!
//! Every transformer call hands a single buffer to the task, and the task
//! writes buffers whole and in arrival order. Buffers from different
//! sessions therefore never interleave inside each other.

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Queue depth before senders start waiting on the writer.
pub const SINK_QUEUE_DEPTH: usize = 1024;

/// Maximum number of queued buffers coalesced into one flush.
const DRAIN_BATCH: usize = 64;

#[derive(Debug, Clone)]
pub struct SinkHandle {
    tx: mpsc::Sender<Bytes>,
}

impl SinkHandle {
    /// A handle plus the raw receiving end, for callers that inspect output
    /// themselves instead of writing it anywhere.
    pub fn channel() -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(SINK_QUEUE_DEPTH);
        (Self { tx }, rx)
    }

    /// Start the writer task for `writer`.
    pub fn spawn<W>(writer: W) -> (Self, JoinHandle<()>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (handle, rx) = Self::channel();
        let task = tokio::spawn(drain(rx, writer));
        (handle, task)
    }

    pub fn stdout() -> (Self, JoinHandle<()>) {
        Self::spawn(tokio::io::stdout())
    }

    pub fn stderr() -> (Self, JoinHandle<()>) {
        Self::spawn(tokio::io::stderr())
    }

    /// Queue a buffer. A closed sink drops the buffer silently.
    pub async fn send(&self, buf: Bytes) {
        if buf.is_empty() {
            return;
        }
        let _ = self.tx.send(buf).await;
    }
}

async fn drain<W>(mut rx: mpsc::Receiver<Bytes>, mut writer: W)
where
    W: AsyncWrite + Unpin,
{
    while let Some(buf) = rx.recv().await {
        if writer.write_all(&buf).await.is_err() {
            continue;
        }

        // Coalesce whatever is already queued before paying for a flush.
        let mut batched = 0;
        while batched < DRAIN_BATCH {
            match rx.try_recv() {
                Ok(buf) => {
                    let _ = writer.write_all(&buf).await;
                    batched += 1;
                }
                Err(_) => break,
            }
        }

        let _ = writer.flush().await;
    }
    let _ = writer.flush().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};

    /// Records every write; clones share the buffer.
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl AsyncWrite for Capture {
        fn poll_write(self: Pin<&mut Self>, _: &mut Context<'_>, buf: &[u8]) -> Poll<std::io::Result<usize>> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    /// Accepts a few bytes per call so partial writes are exercised.
    #[derive(Clone, Default)]
    struct Trickle(Arc<Mutex<Vec<u8>>>);

    impl AsyncWrite for Trickle {
        fn poll_write(self: Pin<&mut Self>, _: &mut Context<'_>, buf: &[u8]) -> Poll<std::io::Result<usize>> {
            let n = buf.len().min(3);
            self.0.lock().unwrap().extend_from_slice(&buf[..n]);
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_writes_in_order() {
        let capture = Capture::default();
        let (sink, task) = SinkHandle::spawn(capture.clone());

        sink.send(Bytes::from_static(b"one\n")).await;
        sink.send(Bytes::new()).await;
        sink.send(Bytes::from_static(b"two\n")).await;
        drop(sink);
        task.await.unwrap();

        assert_eq!(capture.0.lock().unwrap().as_slice(), b"one\ntwo\n");
    }

    #[tokio::test]
    async fn test_concurrent_buffers_do_not_interleave() {
        let capture = Trickle::default();
        let (sink, task) = SinkHandle::spawn(capture.clone());

        let mut producers = Vec::new();
        for id in 0..8u8 {
            let sink = sink.clone();
            producers.push(tokio::spawn(async move {
                for _ in 0..50 {
                    let line = vec![b'a' + id; 40];
                    let mut buf = line.clone();
                    buf.push(b'\n');
                    sink.send(Bytes::from(buf)).await;
                }
            }));
        }
        for p in producers {
            p.await.unwrap();
        }
        drop(sink);
        task.await.unwrap();

        let out = capture.0.lock().unwrap().clone();
        let lines: Vec<&[u8]> = out.split(|&b| b == b'\n').filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 400);
        for line in lines {
            assert_eq!(line.len(), 40);
            assert!(line.iter().all(|&b| b == line[0]), "mixed line: {:?}", String::from_utf8_lossy(line));
        }
    }

    #[tokio::test]
    async fn test_send_after_writer_gone_is_silent() {
        let (sink, rx) = SinkHandle::channel();
        drop(rx);
        sink.send(Bytes::from_static(b"lost\n")).await;
    }
}
