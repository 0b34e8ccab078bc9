use std::{
    sync::Arc,
    task::{Context, Poll},
};

use futures_core::ready;
use tokio::sync::{mpsc, oneshot, OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::PollSemaphore;
use tower::{Service, ServiceExt};

use super::{
    client::{Request, Response},
    dispatcher::Dispatcher,
    error::Closed,
    future::ResponseFuture,
    log::Log,
    message::Message,
    page::Page,
    worker::Worker,
    BoxError, Operation,
};

/// A cloneable handle to a [`Dispatcher`] running on its own task.
///
/// See the module documentation for more details.
#[derive(Debug)]
pub struct SearchPush {
    // Note: this actually _is_ bounded, but rather than using Tokio's bounded
    // channel, we use Tokio's semaphore separately to implement the bound.
    tx: mpsc::UnboundedSender<Message>,

    // Exerts backpressure in `poll_ready` once `batch_size` operations are waiting for the
    // worker.
    semaphore: PollSemaphore,

    // The current semaphore permit, if one has been acquired.
    //
    // This is acquired in `poll_ready` and taken in `call`.
    permit: Option<OwnedSemaphorePermit>,
}

impl SearchPush {
    /// Creates a new `SearchPush` driving `dispatcher`.
    ///
    /// The worker clones the client for every request it sends, so that batches already on the
    /// wire don't hold up the next operations. Wrap a client that can't be cloned in a
    /// [`tower::buffer::Buffer`].
    ///
    /// The default Tokio executor is used to run the worker, which means that this method must
    /// be called while on the Tokio runtime.
    pub fn new<C, L>(dispatcher: Dispatcher<C, L>) -> Self
    where
        C: Service<Request, Response = Response> + Clone + Send + 'static,
        C::Future: Send,
        C::Error: Into<BoxError>,
        L: Log + 'static,
    {
        let (service, worker) = Self::pair(dispatcher);
        tokio::spawn(worker.run());
        service
    }

    /// Creates a new `SearchPush` driving `dispatcher`, but returns the background worker.
    ///
    /// This is useful if you do not want to spawn directly onto the `tokio` runtime but instead
    /// want to use your own executor. Spawn the future returned by [`Worker::run`].
    pub fn pair<C, L>(dispatcher: Dispatcher<C, L>) -> (Self, Worker<C, L>)
    where
        C: Service<Request, Response = Response> + Clone,
        C::Error: Into<BoxError>,
        L: Log,
    {
        // Allows callers to check readiness for every item of a batch before the worker has
        // picked any of them up.
        let (tx, rx) = mpsc::unbounded_channel();
        let permits = dispatcher.batch_size().min(Semaphore::MAX_PERMITS);
        let semaphore = Arc::new(Semaphore::new(permits));

        let worker = Worker::new(rx, dispatcher, &semaphore);

        let service = Self {
            tx,
            semaphore: PollSemaphore::new(semaphore),
            permit: None,
        };
        (service, worker)
    }

    /// Queues `page` for indexing.
    pub async fn push_page(&mut self, page: Page) -> Result<(), BoxError> {
        self.ready().await?.call(Operation::Push(page)).await
    }

    /// Queues `url` for removal.
    pub async fn delete_page(&mut self, url: impl Into<String>) -> Result<(), BoxError> {
        self.ready().await?.call(Operation::Delete(url.into())).await
    }

    /// Removes every page of type `kind` matching `date`.
    pub async fn delete_pages(
        &mut self,
        kind: impl Into<String>,
        date: impl Into<String>,
    ) -> Result<(), BoxError> {
        let operation = Operation::DeletePages {
            kind: kind.into(),
            date: date.into(),
        };
        self.ready().await?.call(operation).await
    }

    /// Submits whatever the worker has queued.
    pub async fn flush(&mut self) -> Result<(), BoxError> {
        self.ready().await?.call(Operation::Flush).await
    }
}

impl Service<Operation> for SearchPush {
    type Response = ();
    type Error = BoxError;
    type Future = ResponseFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        tracing::debug!("checking if search push is ready");

        // First, check if the worker is still alive.
        if self.tx.is_closed() {
            return Poll::Ready(Err(Closed::new().into()));
        }

        // Then, check if we've already acquired a permit.
        if self.permit.is_some() {
            return Poll::Ready(Ok(()));
        }

        // Finally, poll the semaphore. It returns `None` once the worker closed it, and
        // schedules a wakeup for the next free permit when returning `Pending`.
        let permit = ready!(self.semaphore.poll_acquire(cx)).ok_or_else(Closed::new)?;
        self.permit = Some(permit);

        Poll::Ready(Ok(()))
    }

    fn call(&mut self, operation: Operation) -> Self::Future {
        tracing::debug!(operation = operation.name(), "sending operation to worker");

        let _permit = match self.permit.take() {
            Some(permit) => permit,
            None => {
                return ResponseFuture::failed(
                    "search push not ready; poll_ready must be called first".into(),
                )
            }
        };

        // Propagate the caller's span so the worker's events are counted towards it.
        let span = tracing::Span::current();

        let (tx, rx) = oneshot::channel();

        match self.tx.send(Message {
            operation,
            tx,
            span,
            _permit,
        }) {
            Err(_) => ResponseFuture::failed(Closed::new().into()),
            Ok(_) => ResponseFuture::new(rx),
        }
    }
}

impl Clone for SearchPush {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            semaphore: self.semaphore.clone(),

            // The new clone hasn't acquired a permit yet. It will when it's next polled ready.
            permit: None,
        }
    }
}
