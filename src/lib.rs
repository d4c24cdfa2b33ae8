//! devicesync — device-side media library synchronization engine.
//!
//! Enumerates the local media library from the platform's media index,
//! groups items into albums, classifies each item's playback rendering
//! style, and computes content fingerprints under bounded concurrency with
//! cooperative cancellation. The crate is a library boundary consumed by an
//! application shell: it receives asset identifiers and time cursors and
//! returns typed records or fingerprints. Nothing is persisted — every
//! operation re-derives its result from the live index.

#![warn(clippy::all)]

mod classify;
pub mod cli;
pub mod hash;
pub mod index;
pub mod library;

pub use hash::{AssetStore, CloudIdResult, HashResult, HashingCancelled, LocalAssetStore};
pub use index::{Capability, ClassifierMarker, IndexError, MediaIndex};
pub use library::{
    AlbumRecord, AssetFilter, AssetRecord, DeviceLibrary, EnumeratedAsset, KindFilter, MediaKind,
    PlaybackStyle,
};
