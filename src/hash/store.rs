//! The asset-store interface shared by local and network-backed back ends.

use async_trait::async_trait;
use serde::Serialize;

use super::error::HashingCancelled;

/// Outcome of hashing one requested asset id.
///
/// Exactly one of `error_message` / `fingerprint` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashResult {
    pub id: String,
    pub error_message: Option<String>,
    pub fingerprint: Option<String>,
}

impl HashResult {
    pub(crate) fn success(id: String, fingerprint: String) -> Self {
        Self {
            id,
            error_message: None,
            fingerprint: Some(fingerprint),
        }
    }

    pub(crate) fn failure(id: String, message: String) -> Self {
        Self {
            id,
            error_message: Some(message),
            fingerprint: None,
        }
    }
}

/// Mapping from a device asset id to a remote catalog identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloudIdResult {
    pub asset_id: String,
    pub cloud_id: Option<String>,
}

/// Content-addressing operations over a set of asset ids.
///
/// Implemented by the on-device store here and, elsewhere, by
/// network-backed stores; the two are alternate implementations of this
/// interface, not code paths of each other. Consumed as
/// `Arc<dyn AssetStore>` by the application shell.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Fingerprint each id, in input order, under the store's concurrency
    /// ceiling. A new call supersedes (cancels) any batch still in flight;
    /// the superseded call resolves with [`HashingCancelled`].
    ///
    /// `allow_network_access` is honored only by network-backed stores;
    /// local stores accept and ignore it.
    async fn hash_assets(
        &self,
        ids: &[String],
        allow_network_access: bool,
    ) -> Result<Vec<HashResult>, HashingCancelled>;

    /// Cancel the in-flight batch, if any. Idempotent.
    fn cancel_hashing(&self);

    /// Resolve device asset ids to remote catalog identifiers.
    ///
    /// Local stores have no notion of cloud identifiers and always return
    /// an empty list.
    async fn cloud_id_for_asset_ids(&self, ids: &[String]) -> Vec<CloudIdResult>;
}
