use std::fmt;

use crate::{
    client::Paths, dispatcher::Dispatcher, error::ConfigurationError, log::Log, submit::Submitter,
};

/// Batch size used when none, or zero, is configured.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Collects the dependencies of a [`Dispatcher`].
///
/// `log`, `client` and `paths` are required; [`Builder::build`] fails fast with a
/// [`ConfigurationError`] naming the first one missing.
pub struct Builder<C, L> {
    batch_size: Option<usize>,
    client: Option<C>,
    log: Option<L>,
    paths: Option<Paths>,
}

impl<C, L> Builder<C, L> {
    pub fn new() -> Self {
        Self {
            batch_size: None,
            client: None,
            log: None,
            paths: None,
        }
    }

    /// Number of items per batch.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// The service performing the remote calls.
    pub fn client(mut self, client: C) -> Self {
        self.client = Some(client);
        self
    }

    /// Where submission outcomes are reported.
    pub fn log(mut self, log: L) -> Self {
        self.log = Some(log);
        self
    }

    pub fn paths(mut self, paths: Paths) -> Self {
        self.paths = Some(paths);
        self
    }
}

impl<C, L> Builder<C, L>
where
    L: Log,
{
    pub fn build(self) -> Result<Dispatcher<C, L>, ConfigurationError> {
        let log = self.log.ok_or_else(|| ConfigurationError::missing("log"))?;
        let client = self
            .client
            .ok_or_else(|| ConfigurationError::missing("client"))?;
        let paths = self
            .paths
            .ok_or_else(|| ConfigurationError::missing("paths"))?;

        Ok(Dispatcher::new(
            effective_batch_size(self.batch_size),
            Submitter::new(client, log, paths),
        ))
    }
}

pub(crate) fn effective_batch_size(batch_size: Option<usize>) -> usize {
    batch_size
        .filter(|size| *size > 0)
        .unwrap_or(DEFAULT_BATCH_SIZE)
}

impl<C, L> Default for Builder<C, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, L> fmt::Debug for Builder<C, L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Builder")
            .field("batch_size", &self.batch_size)
            .field("client", &self.client.is_some())
            .field("log", &self.log.is_some())
            .field("paths", &self.paths)
            .finish()
    }
}
