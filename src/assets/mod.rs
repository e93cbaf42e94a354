//! Asset resolution for decoders.
//!
//! Decoders only ever read from the resolver, so a single [`AssetCache`] can
//! be shared across worker threads decoding different transactions.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use alloy_primitives::Address;
use tracing::debug;

use crate::models::datasets::assets::{Asset, AssetEntry};

/// Maps a chain address to the asset it represents. `None` means the token is
/// unknown and cannot be classified.
pub trait AssetResolver: Send + Sync {
    fn resolve_evm_token(&self, address: &Address) -> Option<Asset>;
}

/// In-memory read-through cache of known tokens.
#[derive(Debug, Default)]
pub struct AssetCache {
    tokens: RwLock<HashMap<Address, Asset>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = AssetEntry>) -> Self {
        let cache = Self::new();
        for entry in entries {
            cache.insert(entry.into());
        }
        cache
    }

    /// Adds or replaces an asset. Assets without an address are ignored.
    pub fn insert(&self, asset: Asset) {
        let Some(address) = asset.address else {
            debug!("Skipping asset {} without an address", asset.identifier);
            return;
        };
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        tokens.insert(address, asset);
    }

    pub fn len(&self) -> usize {
        self.tokens.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssetResolver for AssetCache {
    fn resolve_evm_token(&self, address: &Address) -> Option<Asset> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned()
    }
}
