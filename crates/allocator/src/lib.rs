//! Pretty-ID allocator for dynstory.
//!
//! Issues strictly increasing story IDs, race-free across concurrent
//! requests and process restarts. The database increment is already atomic;
//! what is not is the create-on-first-use branch that seeds the counter row.
//! Every allocation therefore goes through a single-worker actor holding
//! exclusive access to the counter, so that branch can never be entered
//! twice concurrently. In-process serialization, not a unique index, is the
//! correctness mechanism here.

use axum::{Router, extract::State, routing::post};
use dynstory_common::{AppError, AppResult};
use dynstory_db::repositories::CounterRepository;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

/// Depth of the allocation request queue.
const QUEUE_DEPTH: usize = 64;

/// Handle to the serialized allocator actor.
///
/// Cloning shares the same queue; all clones feed one worker.
#[derive(Clone)]
pub struct PrettyIdAllocator {
    tx: mpsc::Sender<oneshot::Sender<AppResult<i64>>>,
}

impl PrettyIdAllocator {
    /// Spawn the allocator worker over a counter repository and return a
    /// handle to it.
    #[must_use]
    pub fn spawn(counter: CounterRepository) -> Self {
        let (tx, mut rx) = mpsc::channel::<oneshot::Sender<AppResult<i64>>>(QUEUE_DEPTH);

        tokio::spawn(async move {
            while let Some(reply) = rx.recv().await {
                let result = allocate(&counter).await;
                // A dropped receiver means the request was abandoned;
                // nothing to do, the value is simply lost unused.
                let _ = reply.send(result);
            }
            info!("Pretty-ID allocator worker stopped");
        });

        Self { tx }
    }

    /// Allocate the next pretty ID.
    pub async fn next(&self) -> AppResult<i64> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.tx
            .send(reply_tx)
            .await
            .map_err(|_| AppError::Internal("Allocator worker is gone.".to_string()))?;

        reply_rx
            .await
            .map_err(|_| AppError::Internal("Allocator worker dropped the request.".to_string()))?
    }
}

/// One allocation against the counter row.
///
/// Reads the pre-increment value atomically. An empty table means this is
/// the first-ever allocation: seed the row with the value the *second*
/// caller should receive and report 1. A nonsensical counter value is fatal;
/// retrying would re-read the already-incremented counter and hand out a
/// duplicate.
async fn allocate(counter: &CounterRepository) -> AppResult<i64> {
    match counter.increment_and_get().await? {
        Some(value) if value >= 1 => Ok(value),
        Some(value) => Err(AppError::Internal(format!(
            "Pretty-ID counter held non-positive value {value}"
        ))),
        None => {
            counter.create_seeded().await?;
            Ok(1)
        }
    }
}

/// Build the allocator's HTTP surface: one POST route answering with the
/// allocated ID as plain text.
pub fn router(path: &str, allocator: PrettyIdAllocator) -> Router {
    Router::new()
        .route(path, post(next_pretty_id))
        .with_state(allocator)
}

async fn next_pretty_id(State(allocator): State<PrettyIdAllocator>) -> AppResult<String> {
    let pretty_id = allocator.next().await?;
    Ok(pretty_id.to_string())
}
