use super::types::ItemResult;
use crate::error::AppError;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::path::PathBuf;

/// A batch entry whose paths have already been resolved inside the storage root.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub filename: String,
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
}

impl BatchItem {
    pub fn settle(self, outcome: std::io::Result<()>) -> ItemResult {
        ItemResult::settle(
            self.filename,
            &self.source,
            self.destination.as_deref(),
            outcome,
        )
    }
}

/// Runs `op` for every item with at most `concurrency` calls in flight and
/// waits for all of them. Results come back in input order.
pub async fn run<F, Fut>(items: Vec<BatchItem>, concurrency: usize, op: F) -> Vec<ItemResult>
where
    F: FnMut(BatchItem) -> Fut,
    Fut: Future<Output = ItemResult>,
{
    stream::iter(items)
        .map(op)
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// All-or-nothing reporting: every result when all items succeeded, otherwise
/// only the first failing item. Items that did succeed are not rolled back.
pub fn settle(mut results: Vec<ItemResult>, message: &str) -> Result<Vec<ItemResult>, AppError> {
    let Some(idx) = results.iter().position(|r| !r.success) else {
        return Ok(results);
    };

    let failed = results.iter().filter(|r| !r.success).count();
    tracing::warn!(
        total = results.len(),
        failed,
        succeeded = results.len() - failed,
        "{}",
        message
    );

    Err(AppError::ItemFailure {
        message: message.to_string(),
        failure: Box::new(results.swap_remove(idx)),
    })
}
