use tracing::Level;

use crate::{log::Log, page::BatchItem, submit::BatchKind};

/// Emits one event per failed item at `level`.
///
/// Empty `items` is a no-op.
pub(crate) fn report<L, I>(log: &L, kind: BatchKind, items: &[I], level: Level)
where
    L: Log,
    I: BatchItem,
{
    for item in items {
        let message = format!(
            "failed to {} item ({}) with url: {}",
            kind.verb(),
            item.title().unwrap_or("-"),
            item.url().unwrap_or("-"),
        );
        let error = item.error();
        log.log(level, &message, error.as_deref());
    }
}
