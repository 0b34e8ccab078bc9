//! Batches page index and delete operations for a remote search service.
//!
//! A producer of content changes hands pages to index, and URLs to remove, to a [`Dispatcher`].
//! The dispatcher keeps one queue per kind of operation and, as soon as a queue holds
//! `batch_size` items, drains it and submits the whole lot as one bulk request. The producer's
//! call resolves once that request has completed, whatever its outcome: failures are reported
//! item by item through the injected [`Log`] sink and the batch is dropped. Delivery is best
//! effort; nothing is retried or persisted.
//!
//! The remote service is any [`tower::Service`] taking a [`Request`] and answering with a
//! [`Response`], so the HTTP transport, its retries and its timeouts all live outside this crate.
//!
//! A [`Dispatcher`] is owned by a single task. To share one between tasks, hand it to
//! [`SearchPush`]: the dispatcher then runs on a background [`Worker`] and the cloneable handle
//! forwards every [`Operation`] to it in arrival order. The worker keeps queueing while earlier
//! batches are still on the wire, so only the caller that filled a batch waits for its request.
//!
//! Queues are never drained on drop. Call `flush` before shutting down.

/// Export tower's alias for a type-erased error type.
pub use tower::BoxError;

pub use self::client::{
    BatchSummary, DeleteQuery, DeleteSummary, Endpoint, Method, Paths, Request, Response,
};
pub use self::config::{Builder, DEFAULT_BATCH_SIZE};
pub use self::dispatcher::Dispatcher;
pub use self::layer::SearchPushLayer;
pub use self::log::{Log, TracingLog};
pub use self::page::{FailedItem, Page};
pub use self::service::SearchPush;
pub use self::worker::Worker;

pub mod client;
pub mod error;
pub mod future;
mod config;
mod dispatcher;
mod layer;
mod log;
mod message;
mod page;
mod queue;
mod report;
mod service;
mod submit;
mod worker;

/// A single producer operation, as carried to a [`Worker`] by [`SearchPush`].
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Queue a page for indexing.
    Push(Page),

    /// Queue a URL for removal.
    Delete(String),

    /// Remove every page of a type matching a date, bypassing the queues.
    DeletePages { kind: String, date: String },

    /// Submit whatever is queued.
    Flush,
}

impl Operation {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Operation::Push(_) => "push",
            Operation::Delete(_) => "delete",
            Operation::DeletePages { .. } => "delete_pages",
            Operation::Flush => "flush",
        }
    }
}

impl From<Page> for Operation {
    fn from(page: Page) -> Operation {
        Operation::Push(page)
    }
}
