use tokio::sync::{oneshot, OwnedSemaphorePermit};

use crate::{error::ValidationError, Operation};

/// Message sent to the dispatcher worker.
#[derive(Debug)]
pub(crate) struct Message {
    pub(crate) operation: Operation,
    pub(crate) tx: Tx,
    pub(crate) span: tracing::Span,
    pub(super) _permit: OwnedSemaphorePermit,
}

/// Response sender.
pub(crate) type Tx = oneshot::Sender<Result<(), ValidationError>>;

/// Response receiver.
pub(crate) type Rx = oneshot::Receiver<Result<(), ValidationError>>;
