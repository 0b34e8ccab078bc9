use std::fmt;

use tower::{layer::Layer, Service};

use super::{
    client::{Paths, Request, Response},
    config::effective_batch_size,
    dispatcher::Dispatcher,
    log::Log,
    service::SearchPush,
    submit::Submitter,
    BoxError,
};

/// Turns a client into a spawned [`SearchPush`].
///
/// The default Tokio executor is used to run the worker, which means that this layer can only
/// be used on the Tokio runtime.
pub struct SearchPushLayer<L> {
    batch_size: Option<usize>,
    log: L,
    paths: Paths,
}

impl<L> SearchPushLayer<L> {
    /// Creates a new [`SearchPushLayer`] reporting to `log` and calling the endpoints in `paths`.
    pub fn new(paths: Paths, log: L) -> Self {
        Self {
            batch_size: None,
            log,
            paths,
        }
    }

    /// Number of items per batch, see [`Builder::batch_size`](crate::Builder::batch_size).
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}

impl<C, L> Layer<C> for SearchPushLayer<L>
where
    C: Service<Request, Response = Response> + Clone + Send + 'static,
    C::Future: Send,
    C::Error: Into<BoxError>,
    L: Log + Clone + 'static,
{
    type Service = SearchPush;

    fn layer(&self, client: C) -> Self::Service {
        let submitter = Submitter::new(client, self.log.clone(), self.paths.clone());
        let dispatcher = Dispatcher::new(effective_batch_size(self.batch_size), submitter);
        SearchPush::new(dispatcher)
    }
}

impl<L> fmt::Debug for SearchPushLayer<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SearchPushLayer")
            .field("batch_size", &self.batch_size)
            .field("paths", &self.paths)
            .finish()
    }
}
