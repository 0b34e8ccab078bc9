use std::sync::{Arc, Weak};

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{mpsc, Semaphore};
use tower::Service;
use tracing::{debug, trace};
use tracing_futures::Instrument;

use crate::{
    client::{Request, Response},
    dispatcher::{Dispatcher, Submission},
    error::ValidationError,
    log::Log,
    message::{Message, Tx},
    submit::Submitter,
    BoxError,
};

/// Task that owns a [`Dispatcher`] and applies the operations sent by [`SearchPush`] handles.
///
/// Operations are queued one at a time in arrival order, so the dispatcher keeps its
/// single-owner discipline even when many tasks share the handles. The requests they trigger
/// run alongside on clones of the client: the worker keeps reading operations while batches
/// are on the wire, and answers each caller once its own request is done. The worker finishes
/// once every handle has been dropped and every request has completed; anything still queued
/// at that point is discarded.
///
/// [`SearchPush`]: crate::SearchPush
#[derive(Debug)]
pub struct Worker<C, L>
where
    L: Log,
{
    rx: mpsc::UnboundedReceiver<Message>,
    dispatcher: Dispatcher<C, L>,
    close: Option<Weak<Semaphore>>,
}

impl<C, L> Worker<C, L>
where
    L: Log,
{
    pub(crate) fn new(
        rx: mpsc::UnboundedReceiver<Message>,
        dispatcher: Dispatcher<C, L>,
        semaphore: &Arc<Semaphore>,
    ) -> Self {
        trace!("creating search push worker");

        // The handles own the semaphore; holding it weakly lets it go away with them.
        let close = Some(Arc::downgrade(semaphore));
        Self {
            rx,
            dispatcher,
            close,
        }
    }

    /// Closes the semaphore if it is still open, waking any pending tasks.
    fn close_semaphore(&mut self) {
        if let Some(close) = self
            .close
            .take()
            .as_ref()
            .and_then(Weak::<Semaphore>::upgrade)
        {
            debug!("search push worker closing; waking pending tasks");
            close.close();
        } else {
            trace!("search push worker already closed");
        }
    }
}

impl<C, L> Worker<C, L>
where
    C: Service<Request, Response = Response> + Clone,
    C::Error: Into<BoxError>,
    L: Log,
{
    /// Drives the worker until every handle is gone.
    pub async fn run(mut self) {
        let mut in_flight = FuturesUnordered::new();

        loop {
            tokio::select! {
                msg = self.rx.recv() => match msg {
                    Some(msg) => {
                        trace!(operation = msg.operation.name(), "worker received operation");

                        let Message { operation, tx, span, _permit } = msg;
                        let staged = span.in_scope(|| self.dispatcher.stage(operation));
                        match staged {
                            Ok(Some(submission)) => {
                                let submitter = self.dispatcher.submitter();
                                in_flight.push(settle(submitter, submission, tx).instrument(span));
                            }
                            result => reply(tx, result.map(drop)),
                        }
                    }
                    None => break,
                },
                _ = in_flight.next(), if !in_flight.is_empty() => {}
            }
        }

        trace!(in_flight = in_flight.len(), "no more operations _ever_, finishing requests");
        while in_flight.next().await.is_some() {}

        trace!("shutting down");
    }
}

/// Submits `submission` and answers the caller that triggered it.
async fn settle<C, L>(mut submitter: Submitter<C, L>, submission: Submission, tx: Tx)
where
    C: Service<Request, Response = Response>,
    C::Error: Into<BoxError>,
    L: Log,
{
    submission.submit(&mut submitter).await;
    reply(tx, Ok(()));
}

fn reply(tx: Tx, result: Result<(), ValidationError>) {
    if tx.send(result).is_err() {
        trace!("caller dropped before the operation completed");
    }
}

impl<C, L> Drop for Worker<C, L>
where
    L: Log,
{
    fn drop(&mut self) {
        self.close_semaphore()
    }
}
