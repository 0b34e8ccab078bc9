use tower::Service;
use tracing::trace;

use crate::{
    client::{DeleteQuery, Request, Response},
    config::Builder,
    error::ValidationError,
    log::Log,
    page::Page,
    queue::Queue,
    submit::{BatchKind, Submitter},
    BoxError, Operation,
};

/// Accumulates page pushes and deletes into batches for the remote search service.
///
/// Each call that brings a queue to `batch_size` items drains it and waits for the resulting
/// request to complete. The drained items leave the queue before the request is sent. Batches that fail are logged through the [`Log`] sink and dropped; the
/// producer only ever sees a [`ValidationError`] for a malformed call.
///
/// Nothing is submitted on drop. Call [`Dispatcher::flush`] before releasing the dispatcher.
#[derive(Debug)]
pub struct Dispatcher<C, L>
where
    L: Log,
{
    batch_size: usize,
    pushes: Queue<Page>,
    deletes: Queue<String>,
    submitter: Submitter<C, L>,
}

impl<C, L> Dispatcher<C, L>
where
    L: Log,
{
    /// Starts building a dispatcher.
    pub fn builder() -> Builder<C, L> {
        Builder::new()
    }

    pub(crate) fn new(batch_size: usize, submitter: Submitter<C, L>) -> Self {
        Self {
            batch_size,
            pushes: Queue::new(batch_size),
            deletes: Queue::new(batch_size),
            submitter,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of pages waiting to be pushed.
    pub fn pending_pushes(&self) -> usize {
        self.pushes.len()
    }

    /// Number of URLs waiting to be deleted.
    pub fn pending_deletes(&self) -> usize {
        self.deletes.len()
    }
}

impl<C, L> Dispatcher<C, L>
where
    L: Log,
{
    /// Applies the queueing half of `operation` without waiting for anything.
    ///
    /// Returns the work the operation left for the remote service, if any: a full batch, the
    /// leftovers of a flush, or a delete-by-query.
    pub(crate) fn stage(
        &mut self,
        operation: Operation,
    ) -> Result<Option<Submission>, ValidationError> {
        match operation {
            Operation::Push(page) => Ok(self.pushes.push(page).map(|batch| {
                trace!(items = batch.len(), "push batch full");
                Submission::Push(batch)
            })),
            Operation::Delete(url) => {
                if url.trim().is_empty() {
                    return Err(ValidationError::missing("url"));
                }
                Ok(self.deletes.push(url).map(|batch| {
                    trace!(items = batch.len(), "delete batch full");
                    Submission::Delete(batch)
                }))
            }
            Operation::DeletePages { kind, date } => {
                if kind.trim().is_empty() {
                    return Err(ValidationError::missing("type"));
                }
                if date.trim().is_empty() {
                    return Err(ValidationError::missing("date"));
                }
                Ok(Some(Submission::DeletePages(DeleteQuery { kind, date })))
            }
            Operation::Flush => {
                let pushes = self.pushes.drain();
                let deletes = self.deletes.drain();
                if pushes.is_empty() && deletes.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(Submission::Flush { pushes, deletes }))
                }
            }
        }
    }

    /// A submitter of its own for work that runs next to this dispatcher.
    pub(crate) fn submitter(&self) -> Submitter<C, L>
    where
        C: Clone,
    {
        self.submitter.clone()
    }
}

impl<C, L> Dispatcher<C, L>
where
    C: Service<Request, Response = Response>,
    C::Error: Into<BoxError>,
    L: Log,
{
    /// Queues `page` for indexing, submitting the push batch once it is full.
    pub async fn push_page(&mut self, page: Page) {
        if let Ok(Some(submission)) = self.stage(Operation::Push(page)) {
            submission.submit(&mut self.submitter).await;
        }
    }

    /// Queues `url` for removal, submitting the delete batch once it is full.
    pub async fn delete_page(&mut self, url: impl Into<String>) -> Result<(), ValidationError> {
        self.apply(Operation::Delete(url.into())).await
    }

    /// Removes every page of type `kind` matching `date` with a single request.
    ///
    /// Neither queue is involved.
    pub async fn delete_pages(&mut self, kind: &str, date: &str) -> Result<(), ValidationError> {
        let operation = Operation::DeletePages {
            kind: kind.to_owned(),
            date: date.to_owned(),
        };
        self.apply(operation).await
    }

    /// Submits whatever is queued, regardless of size.
    ///
    /// Each non-empty queue yields one request; empty queues yield none.
    pub async fn flush(&mut self) {
        if let Ok(Some(submission)) = self.stage(Operation::Flush) {
            submission.submit(&mut self.submitter).await;
        }
    }

    /// Runs `operation` against this dispatcher.
    pub async fn apply(&mut self, operation: Operation) -> Result<(), ValidationError> {
        if let Some(submission) = self.stage(operation)? {
            submission.submit(&mut self.submitter).await;
        }
        Ok(())
    }
}

/// Work drained from the queues, detached from them before anything is sent.
#[derive(Debug)]
pub(crate) enum Submission {
    Push(Vec<Page>),
    Delete(Vec<String>),
    DeletePages(DeleteQuery),
    Flush {
        pushes: Vec<Page>,
        deletes: Vec<String>,
    },
}

impl Submission {
    pub(crate) async fn submit<C, L>(self, submitter: &mut Submitter<C, L>)
    where
        C: Service<Request, Response = Response>,
        C::Error: Into<BoxError>,
        L: Log,
    {
        match self {
            Submission::Push(batch) => submitter.submit_push(batch).await,
            Submission::Delete(batch) => submitter.submit_delete(batch).await,
            Submission::DeletePages(query) => submitter.delete_by_query(query).await,
            Submission::Flush { pushes, deletes } => {
                if !pushes.is_empty() {
                    submitter.flushing(BatchKind::Push, pushes.len());
                    submitter.submit_push(pushes).await;
                }
                if !deletes.is_empty() {
                    submitter.flushing(BatchKind::Delete, deletes.len());
                    submitter.submit_delete(deletes).await;
                }
            }
        }
    }
}

impl<C, L> Drop for Dispatcher<C, L>
where
    L: Log,
{
    fn drop(&mut self) {
        if self.pushes.is_empty() && self.deletes.is_empty() {
            return;
        }
        self.submitter
            .discarding(self.pushes.len(), self.deletes.len());
    }
}
