//! Response body capture.
//!
//! [`CaptureBody`] wraps the body a handler produced. Every data frame is
//! appended to an in-memory buffer in the same poll that hands it on to the
//! client, so the buffer always equals the bytes delivered so far. When the
//! inner body ends, the completion hook runs with the full capture and the
//! end of stream is only reported once the hook's future has finished.
//!
//! If the body is dropped early (client gone, body error) the hook still
//! runs with whatever was delivered, on a spawned task.

use bytes::{Bytes, BytesMut};
use futures_util::future::BoxFuture;
use http_body::{Body, Frame, SizeHint};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Hook invoked once with the complete captured body.
pub type OnComplete = Box<dyn FnOnce(Bytes) -> BoxFuture<'static, ()> + Send>;

struct Capture {
    buffer: BytesMut,
    on_complete: Option<OnComplete>,
    pending: Option<BoxFuture<'static, ()>>,
}

impl Capture {
    fn start_completion(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            self.pending = Some(on_complete(self.buffer.split().freeze()));
        }
    }

    fn poll_completion(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        if let Some(pending) = self.pending.as_mut() {
            ready!(pending.as_mut().poll(cx));
            self.pending = None;
        }
        Poll::Ready(())
    }

    fn is_done(&self) -> bool {
        self.on_complete.is_none() && self.pending.is_none()
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        self.start_completion();
        if let Some(pending) = self.pending.take() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(pending);
                }
                Err(_) => tracing::debug!("No runtime available, response capture dropped"),
            }
        }
    }
}

pin_project! {
    /// Pass-through body that records every data frame it forwards.
    pub struct CaptureBody<B> {
        #[pin]
        inner: B,
        capture: Capture,
    }
}

impl<B> CaptureBody<B> {
    pub fn new<F>(inner: B, on_complete: F) -> Self
    where
        F: FnOnce(Bytes) -> BoxFuture<'static, ()> + Send + 'static,
    {
        Self {
            inner,
            capture: Capture {
                buffer: BytesMut::new(),
                on_complete: Some(Box::new(on_complete)),
                pending: None,
            },
        }
    }

    /// Bytes forwarded so far (empty once the hook has taken them).
    pub fn captured(&self) -> &[u8] {
        &self.capture.buffer
    }
}

impl<B> Body for CaptureBody<B>
where
    B: Body<Data = Bytes>,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let mut this = self.project();
        loop {
            if this.capture.is_done() {
                return Poll::Ready(None);
            }
            if this.capture.pending.is_some() {
                ready!(this.capture.poll_completion(cx));
                return Poll::Ready(None);
            }

            match ready!(this.inner.as_mut().poll_frame(cx)) {
                Some(Ok(frame)) => {
                    if let Some(data) = frame.data_ref() {
                        this.capture.buffer.extend_from_slice(data);
                    }
                    return Poll::Ready(Some(Ok(frame)));
                }
                Some(Err(e)) => return Poll::Ready(Some(Err(e))),
                None => this.capture.start_completion(),
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.capture.is_done()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
