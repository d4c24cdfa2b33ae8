//! Content hashing — fingerprints device assets for content-addressed
//! change detection.
//!
//! Each batch runs its items in parallel under an engine-wide concurrency
//! ceiling, with cooperative cancellation observed at permit acquisition
//! and between buffer reads. At most one batch is in flight per store:
//! issuing a new batch cancels and discards the previous one rather than
//! interleaving with it. Item failures are embedded in that item's result;
//! only cancellation terminates a batch.

pub mod error;
mod store;

pub use error::HashingCancelled;
pub use store::{AssetStore, CloudIdResult, HashResult};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use base64::Engine;
use futures_util::future::join_all;
use rusqlite::OptionalExtension;
use sha1::{Digest, Sha1};
use tokio::io::AsyncReadExt;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::index::MediaIndex;

use error::ItemError;

/// Concurrency ceiling shared by all batches of one store.
const MAX_CONCURRENT_HASH_OPERATIONS: usize = 16;

/// Read-buffer size for streaming file contents through the digest.
const HASH_BUFFER_SIZE: usize = 2 * 1024 * 1024;

/// One in-flight batch: its cancellation token, tagged so a finished batch
/// only clears the slot it still owns.
struct Batch {
    id: u64,
    token: CancellationToken,
}

/// The on-device asset store.
///
/// Holds the only mutable shared state of the hashing pipeline: the
/// outstanding-batch slot, which is replaced (never mutated in place) —
/// replacing it cancels and drops the previous batch.
pub struct LocalAssetStore {
    index: Arc<MediaIndex>,
    permits: Arc<Semaphore>,
    current_batch: Mutex<Option<Batch>>,
    next_batch_id: AtomicU64,
}

impl std::fmt::Debug for LocalAssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalAssetStore")
            .field("available_permits", &self.permits.available_permits())
            .finish_non_exhaustive()
    }
}

impl LocalAssetStore {
    pub fn new(index: Arc<MediaIndex>) -> Self {
        Self {
            index,
            permits: Arc::new(Semaphore::new(MAX_CONCURRENT_HASH_OPERATIONS)),
            current_batch: Mutex::new(None),
            next_batch_id: AtomicU64::new(1),
        }
    }

    /// Fingerprint each id, preserving input order in the result list.
    ///
    /// An empty input resolves immediately without creating a batch or
    /// disturbing one already in flight.
    pub async fn hash_assets(&self, ids: &[String]) -> Result<Vec<HashResult>, HashingCancelled> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let (batch_id, token) = self.begin_batch();
        tracing::debug!(batch_id, items = ids.len(), "Starting hash batch");

        let targets = self.resolve_backing_paths(ids);
        let tasks: Vec<JoinHandle<Result<HashResult, HashingCancelled>>> = ids
            .iter()
            .cloned()
            .zip(targets)
            .map(|(id, target)| {
                let permits = Arc::clone(&self.permits);
                let token = token.clone();
                tokio::spawn(async move {
                    let _permit = tokio::select! {
                        permit = permits.acquire_owned() => match permit {
                            Ok(permit) => permit,
                            Err(_) => return Err(HashingCancelled),
                        },
                        () = token.cancelled() => return Err(HashingCancelled),
                    };
                    hash_one(id, target, &token).await
                })
            })
            .collect();

        // join_all preserves task order, so the result list mirrors the
        // input regardless of completion order.
        let outcomes = join_all(tasks).await;
        let mut results = Vec::with_capacity(ids.len());
        let mut cancelled = false;
        for (id, outcome) in ids.iter().zip(outcomes) {
            match outcome {
                Ok(Ok(result)) => results.push(result),
                Ok(Err(HashingCancelled)) => cancelled = true,
                Err(join_err) if join_err.is_cancelled() => cancelled = true,
                Err(join_err) => {
                    tracing::error!("Hash task for asset {} died: {}", id, join_err);
                    results.push(HashResult::failure(
                        id.clone(),
                        format!("Failed to hash asset: {join_err}"),
                    ));
                }
            }
        }

        self.finish_batch(batch_id);
        if cancelled || token.is_cancelled() {
            tracing::debug!(batch_id, "Hash batch cancelled");
            return Err(HashingCancelled);
        }
        Ok(results)
    }

    /// Cancel the in-flight batch, if any. Idempotent.
    pub fn cancel_hashing(&self) {
        let mut slot = self.lock_batch_slot();
        if let Some(batch) = slot.take() {
            tracing::debug!(batch_id = batch.id, "Cancelling hash batch");
            batch.token.cancel();
        }
    }

    /// Install a fresh batch, cancelling and discarding any previous one.
    fn begin_batch(&self) -> (u64, CancellationToken) {
        let id = self.next_batch_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let mut slot = self.lock_batch_slot();
        if let Some(previous) = slot.replace(Batch {
            id,
            token: token.clone(),
        }) {
            tracing::debug!(superseded = previous.id, "Superseding in-flight hash batch");
            previous.token.cancel();
        }
        (id, token)
    }

    /// Clear the batch slot, but only if this batch still owns it.
    fn finish_batch(&self, batch_id: u64) {
        let mut slot = self.lock_batch_slot();
        if slot.as_ref().is_some_and(|batch| batch.id == batch_id) {
            *slot = None;
        }
    }

    fn lock_batch_slot(&self) -> std::sync::MutexGuard<'_, Option<Batch>> {
        // A poisoned slot only means a panicking thread held it; the data
        // (an id and a token) is still coherent.
        self.current_batch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve every requested id to its backing file up front, so the
    /// parallel tasks never touch the index connection.
    fn resolve_backing_paths(&self, ids: &[String]) -> Vec<Result<PathBuf, ItemError>> {
        let conn = match self.index.lock() {
            Ok(conn) => conn,
            Err(e) => {
                let message = e.to_string();
                return ids
                    .iter()
                    .map(|_| Err(ItemError::Io(message.clone())))
                    .collect();
            }
        };
        ids.iter()
            .map(|id| {
                let numeric: i64 = id
                    .parse()
                    .map_err(|_| ItemError::Io(format!("invalid asset id: {id}")))?;
                let path: Option<String> = conn
                    .query_row(
                        "SELECT path FROM media_files WHERE id = ?1",
                        [numeric],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(|e| ItemError::Io(e.to_string()))?;
                match path {
                    Some(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
                    _ => Err(ItemError::CannotOpen),
                }
            })
            .collect()
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn hash_assets(
        &self,
        ids: &[String],
        allow_network_access: bool,
    ) -> Result<Vec<HashResult>, HashingCancelled> {
        // Only network-backed stores consult this flag; the local index
        // never leaves the device.
        let _ = allow_network_access;
        LocalAssetStore::hash_assets(self, ids).await
    }

    fn cancel_hashing(&self) {
        LocalAssetStore::cancel_hashing(self);
    }

    async fn cloud_id_for_asset_ids(&self, _ids: &[String]) -> Vec<CloudIdResult> {
        // The device library has no notion of cloud identifiers.
        Vec::new()
    }
}

async fn hash_one(
    id: String,
    target: Result<PathBuf, ItemError>,
    token: &CancellationToken,
) -> Result<HashResult, HashingCancelled> {
    let path = match target {
        Ok(path) => path,
        Err(e) => return Ok(HashResult::failure(id, e.to_string())),
    };
    match hash_file(&path, token).await {
        Ok(fingerprint) => Ok(HashResult::success(id, fingerprint)),
        Err(HashFileError::Cancelled) => Err(HashingCancelled),
        Err(HashFileError::Item(e)) => Ok(HashResult::failure(id, e.to_string())),
    }
}

enum HashFileError {
    Cancelled,
    Item(ItemError),
}

/// Stream a file through the digest in fixed-size chunks, checking the
/// cancellation signal before each read.
async fn hash_file(path: &Path, token: &CancellationToken) -> Result<String, HashFileError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| HashFileError::Item(ItemError::from_open(e)))?;

    let mut digest = Sha1::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        if token.is_cancelled() {
            return Err(HashFileError::Cancelled);
        }
        let read = file
            .read(&mut buffer)
            .await
            .map_err(|e| HashFileError::Item(ItemError::from_read(e)))?;
        if read == 0 {
            break;
        }
        digest.update(&buffer[..read]);
    }

    Ok(base64::engine::general_purpose::STANDARD.encode(digest.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::schema::RowFixture;
    use std::fs;
    use std::time::Duration;

    fn test_dir(case: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("devicesync-tests").join(case);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Build a store over an in-memory index whose rows point at real files
    /// with the given contents.
    fn store_with_assets(case: &str, assets: &[(i64, &[u8])]) -> Arc<LocalAssetStore> {
        let dir = test_dir(case);
        let index = MediaIndex::open_in_memory(1).unwrap();
        index.with_conn(|conn| {
            for (id, content) in assets {
                let path = dir.join(format!("asset_{id}.bin"));
                fs::write(&path, content).unwrap();
                RowFixture::image(*id, &path.to_string_lossy()).insert(conn, 1);
            }
        });
        Arc::new(LocalAssetStore::new(Arc::new(index)))
    }

    /// Base64 of SHA-1("abc").
    const ABC_SHA1_B64: &str = "qZk+NkcGgWq6PiVxeFDCbJzQ2J0=";

    #[tokio::test]
    async fn results_mirror_input_order_and_length() {
        let store = store_with_assets(
            "hash_order",
            &[(1, b"one"), (2, b"two"), (3, b"three"), (4, b"four")],
        );
        let ids: Vec<String> = ["3", "1", "4", "2"].iter().map(|s| s.to_string()).collect();

        let results = store.hash_assets(&ids).await.unwrap();
        assert_eq!(results.len(), 4);
        let out: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(out, vec!["3", "1", "4", "2"]);
        assert!(results.iter().all(|r| r.fingerprint.is_some()));
        assert!(results.iter().all(|r| r.error_message.is_none()));
    }

    #[tokio::test]
    async fn identical_content_yields_identical_fingerprints() {
        let store = store_with_assets("hash_dedup", &[(1, b"same bytes"), (2, b"same bytes")]);
        let ids = vec!["1".to_string(), "2".to_string()];

        let results = store.hash_assets(&ids).await.unwrap();
        assert_eq!(results[0].fingerprint, results[1].fingerprint);
    }

    #[tokio::test]
    async fn known_content_hashes_to_known_fingerprint() {
        let store = store_with_assets("hash_known", &[(1, b"abc")]);
        let results = store.hash_assets(&["1".to_string()]).await.unwrap();
        assert_eq!(results[0].fingerprint.as_deref(), Some(ABC_SHA1_B64));
    }

    #[tokio::test]
    async fn missing_backing_file_is_an_item_error_not_a_batch_error() {
        let store = store_with_assets("hash_mixed", &[(1, b"abc")]);
        // Id 2 has no row at all; id 3 has a row but the file is gone.
        store.index.with_conn(|conn| {
            RowFixture::image(3, "/nonexistent/gone.jpg").insert(conn, 1);
        });
        let ids = vec!["1".to_string(), "2".to_string(), "3".to_string()];

        let results = store.hash_assets(&ids).await.unwrap();
        assert_eq!(results[0].fingerprint.as_deref(), Some(ABC_SHA1_B64));
        assert_eq!(results[0].error_message, None);
        assert_eq!(
            results[1].error_message.as_deref(),
            Some("Cannot open input stream for asset")
        );
        assert_eq!(results[1].fingerprint, None);
        assert_eq!(
            results[2].error_message.as_deref(),
            Some("Cannot open input stream for asset")
        );
    }

    #[tokio::test]
    async fn empty_input_resolves_without_creating_a_batch() {
        let store = store_with_assets("hash_empty", &[(1, b"abc")]);

        // Install a live batch by hand, then confirm the empty call leaves
        // it untouched.
        let (live_id, live_token) = store.begin_batch();
        let results = store.hash_assets(&[]).await.unwrap();
        assert!(results.is_empty());
        assert!(!live_token.is_cancelled());
        let slot = store.lock_batch_slot();
        assert_eq!(slot.as_ref().map(|b| b.id), Some(live_id));
    }

    #[tokio::test]
    async fn superseding_batch_cancels_the_first() {
        let store = store_with_assets("hash_supersede", &[(1, b"first"), (2, b"second")]);

        // Hold every permit so the first batch parks at slot acquisition.
        let blocker = Arc::clone(&store.permits)
            .acquire_many_owned(MAX_CONCURRENT_HASH_OPERATIONS as u32)
            .await
            .unwrap();

        let first = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.hash_assets(&["1".to_string()]).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.hash_assets(&["2".to_string()]).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(blocker);

        assert_eq!(first.await.unwrap(), Err(HashingCancelled));
        let results = second.await.unwrap().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "2");
        assert!(results[0].fingerprint.is_some());
    }

    #[tokio::test]
    async fn explicit_cancel_terminates_the_batch() {
        let store = store_with_assets("hash_cancel", &[(1, b"payload")]);

        let blocker = Arc::clone(&store.permits)
            .acquire_many_owned(MAX_CONCURRENT_HASH_OPERATIONS as u32)
            .await
            .unwrap();

        let batch = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.hash_assets(&["1".to_string()]).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        store.cancel_hashing();
        drop(blocker);
        assert_eq!(batch.await.unwrap(), Err(HashingCancelled));
    }

    #[tokio::test]
    async fn cancel_with_no_batch_is_a_no_op() {
        let store = store_with_assets("hash_cancel_idempotent", &[(1, b"abc")]);
        store.cancel_hashing();
        store.cancel_hashing();

        // The store still works afterwards.
        let results = store.hash_assets(&["1".to_string()]).await.unwrap();
        assert_eq!(results[0].fingerprint.as_deref(), Some(ABC_SHA1_B64));
    }

    #[tokio::test]
    async fn completed_batch_clears_its_slot() {
        let store = store_with_assets("hash_slot", &[(1, b"abc")]);
        store.hash_assets(&["1".to_string()]).await.unwrap();
        assert!(store.lock_batch_slot().is_none());
    }

    #[tokio::test]
    async fn unparseable_id_embeds_a_message() {
        let store = store_with_assets("hash_bad_id", &[(1, b"abc")]);
        let results = store
            .hash_assets(&["not-a-number".to_string()])
            .await
            .unwrap();
        assert_eq!(
            results[0].error_message.as_deref(),
            Some("Failed to hash asset: invalid asset id: not-a-number")
        );
    }

    #[tokio::test]
    async fn cloud_ids_are_always_empty_locally() {
        let store = store_with_assets("hash_cloud", &[(1, b"abc")]);
        let store: Arc<dyn AssetStore> = store;
        let results = store
            .cloud_id_for_asset_ids(&["1".to_string(), "2".to_string()])
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn trait_object_flag_is_ignored_locally() {
        let store = store_with_assets("hash_flag", &[(1, b"abc")]);
        let store: Arc<dyn AssetStore> = store;
        let with_network = store.hash_assets(&["1".to_string()], true).await.unwrap();
        let without = store.hash_assets(&["1".to_string()], false).await.unwrap();
        assert_eq!(with_network, without);
    }
}
