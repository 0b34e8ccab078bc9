use std::sync::Arc;

use serde::de::DeserializeOwned;
use tower::{Service, ServiceExt};
use tracing::{trace, Level};

use crate::{
    client::{BatchSummary, DeleteQuery, DeleteSummary, Paths, Request, Response},
    log::Log,
    page::{BatchItem, Page},
    report::report,
    BoxError,
};

/// Which pipeline a batch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BatchKind {
    Push,
    Delete,
}

impl BatchKind {
    pub(crate) fn verb(self) -> &'static str {
        match self {
            BatchKind::Push => "push",
            BatchKind::Delete => "delete",
        }
    }

    fn past(self) -> &'static str {
        match self {
            BatchKind::Push => "pushed",
            BatchKind::Delete => "deleted",
        }
    }
}

/// Turns drained batches into requests and reports what came back.
///
/// Every failure past this point is absorbed: it is logged and the batch is dropped.
///
/// Cloning hands out another submitter on a clone of the client, so batches can be in flight
/// side by side.
#[derive(Debug)]
pub(crate) struct Submitter<C, L> {
    client: C,
    log: Arc<L>,
    paths: Paths,
}

impl<C, L> Submitter<C, L> {
    pub(crate) fn new(client: C, log: L, paths: Paths) -> Self {
        Self {
            client,
            log: Arc::new(log),
            paths,
        }
    }
}

impl<C, L> Submitter<C, L>
where
    L: Log,
{
    /// Announces the submission of a partial batch on `flush`.
    pub(crate) fn flushing(&self, kind: BatchKind, items: usize) {
        self.log
            .debug(&format!("flushing last {} {}s", items, kind.verb()));
    }

    /// Reports items that were queued but will never be submitted.
    pub(crate) fn discarding(&self, pushes: usize, deletes: usize) {
        self.log.warn(
            &format!(
                "discarding {} pending pushes and {} pending deletes that were never flushed",
                pushes, deletes
            ),
            None,
        );
    }
}

impl<C: Clone, L> Clone for Submitter<C, L> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            log: self.log.clone(),
            paths: self.paths.clone(),
        }
    }
}

impl<C, L> Submitter<C, L>
where
    C: Service<Request, Response = Response>,
    C::Error: Into<BoxError>,
    L: Log,
{
    pub(crate) async fn submit_push(&mut self, batch: Vec<Page>) {
        let body: Arc<[Page]> = batch.into();
        let request = Request::PostBatch {
            uri: self.paths.post_batch.uri.clone(),
            body: body.clone(),
        };
        self.submit(BatchKind::Push, request, &body[..]).await
    }

    pub(crate) async fn submit_delete(&mut self, batch: Vec<String>) {
        let body: Arc<[String]> = batch.into();
        let request = Request::DeleteBatch {
            uri: self.paths.delete_batch.uri.clone(),
            body: body.clone(),
        };
        self.submit(BatchKind::Delete, request, &body[..]).await
    }

    pub(crate) async fn delete_by_query(&mut self, query: DeleteQuery) {
        self.log.debug(&format!(
            "deleting pages of type {} since {}",
            query.kind, query.date
        ));

        let kind = query.kind.clone();
        let request = Request::DeletePages {
            uri: self.paths.delete_pages.uri.clone(),
            body: query,
        };

        let response = match self.call(request).await {
            Ok(response) => response,
            Err(error) => {
                let error = error.to_string();
                self.log.error(
                    &format!("failed to delete pages of type {}", kind),
                    Some(&error),
                );
                return;
            }
        };

        if response.is_rejected() {
            let body = body_text(&response);
            self.log.error(
                &format!(
                    "could not delete pages of type {}, remote answered {}",
                    kind, response.status
                ),
                body.as_deref(),
            );
            return;
        }

        let summary: DeleteSummary = self.decode(response);
        self.log.info(&format!(
            "deleted {} pages of type {}",
            summary.deleted,
            summary.kind.as_deref().unwrap_or(&kind)
        ));
    }

    async fn submit<I: BatchItem>(&mut self, kind: BatchKind, request: Request, batch: &[I]) {
        trace!(kind = kind.verb(), items = batch.len(), "submitting batch");

        let response = match self.call(request).await {
            Ok(response) => response,
            Err(error) => {
                let error = error.to_string();
                self.log.error(
                    &format!("failed to {} batch of {} items", kind.verb(), batch.len()),
                    Some(&error),
                );
                return;
            }
        };

        if response.is_rejected() {
            let body = body_text(&response);
            self.log.error(
                &format!(
                    "could not {} batch of {} items, remote answered {}",
                    kind.verb(),
                    batch.len(),
                    response.status
                ),
                body.as_deref(),
            );
            report(&self.log, kind, batch, Level::ERROR);
            return;
        }

        let summary: BatchSummary = self.decode(response);
        self.log.debug(&format!(
            "{} {}/{} items",
            kind.past(),
            summary.processed,
            summary.total
        ));

        let mut failed = Vec::with_capacity(summary.failed.len());
        for (entry, item) in summary.failed.iter().zip(summary.failed_items()) {
            match item {
                Ok(item) => failed.push(item),
                Err(error) => {
                    let error = error.to_string();
                    self.log.warn(
                        &format!("could not read failed {} item: {}", kind.verb(), entry),
                        Some(&error),
                    );
                }
            }
        }
        report(&self.log, kind, &failed, Level::WARN);
    }

    async fn call(&mut self, request: Request) -> Result<Response, BoxError> {
        let client = self.client.ready().await.map_err(Into::<BoxError>::into)?;
        client.call(request).await.map_err(Into::into)
    }

    /// Reads an accepted response body, falling back to an empty summary.
    fn decode<T>(&self, response: Response) -> T
    where
        T: DeserializeOwned + Default,
    {
        let body = match response.body {
            Some(body) => body,
            None => return T::default(),
        };
        match serde_json::from_value(body) {
            Ok(summary) => summary,
            Err(error) => {
                let error = error.to_string();
                self.log.warn("could not read response body", Some(&error));
                T::default()
            }
        }
    }
}

fn body_text(response: &Response) -> Option<String> {
    response.body.as_ref().map(|body| body.to_string())
}
