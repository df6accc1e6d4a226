//! Swap Commitments — content-addressed swap registry
//!
//! Maps each swap id to the SHA-256 digest of its full terms:
//! - Only the digest is persisted; callers resubmit the full terms
//! - Every later reference re-hashes the terms and compares digests
//! - Ids come from a counter starting at 1 and are never reused

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use swap_types::ids::SwapId;
use swap_types::swap::SwapTerms;
use tracing::debug;

use crate::errors::SwapError;

/// Digest of a canonical swap terms encoding.
pub type TermsHash = [u8; 32];

/// Hash swap terms over their canonical fixed-width encoding.
pub fn hash_terms(terms: &SwapTerms) -> TermsHash {
    compute_hash(&terms.encode_canonical())
}

/// Compute a SHA-256 hash of arbitrary data.
pub fn compute_hash(data: &[u8]) -> TermsHash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Commitment store: the single source of truth for which swaps are open.
#[derive(Debug, Clone)]
pub struct CommitmentStore {
    /// Open swaps: id -> terms digest
    commitments: BTreeMap<SwapId, TermsHash>,
    /// Next id to issue
    next_swap_id: SwapId,
}

impl CommitmentStore {
    /// Create an empty store issuing ids from 1.
    pub fn new() -> Self {
        Self {
            commitments: BTreeMap::new(),
            next_swap_id: SwapId::FIRST,
        }
    }

    /// Record a commitment to `terms` under a freshly issued id.
    pub fn open(&mut self, terms: &SwapTerms) -> Result<(SwapId, TermsHash), SwapError> {
        let swap_id = self.next_swap_id;
        let next = swap_id.checked_next().ok_or(SwapError::SwapIdOverflow)?;
        let digest = hash_terms(terms);

        self.commitments.insert(swap_id, digest);
        self.next_swap_id = next;

        debug!(swap_id = %swap_id, digest = %hex::encode(digest), "Commitment opened");
        Ok((swap_id, digest))
    }

    /// Check that `swap_id` is open under exactly these terms.
    ///
    /// A missing entry, a closed entry and tampered terms are
    /// indistinguishable to the caller.
    pub fn verify(&self, swap_id: SwapId, terms: &SwapTerms) -> Result<TermsHash, SwapError> {
        let stored = self
            .commitments
            .get(&swap_id)
            .ok_or(SwapError::SwapNotFound)?;

        if *stored != hash_terms(terms) {
            return Err(SwapError::SwapNotFound);
        }
        Ok(*stored)
    }

    /// Remove the commitment for `swap_id`. The id is never issued again.
    pub fn close(&mut self, swap_id: SwapId) -> Option<TermsHash> {
        let removed = self.commitments.remove(&swap_id);
        if removed.is_some() {
            debug!(swap_id = %swap_id, "Commitment closed");
        }
        removed
    }

    /// Current digest stored for `swap_id`, if the swap is open.
    pub fn digest(&self, swap_id: SwapId) -> Option<TermsHash> {
        self.commitments.get(&swap_id).copied()
    }

    /// Whether `swap_id` is currently open.
    pub fn is_open(&self, swap_id: SwapId) -> bool {
        self.commitments.contains_key(&swap_id)
    }

    /// Id the next successful initiation will receive.
    pub fn next_swap_id(&self) -> SwapId {
        self.next_swap_id
    }

    /// Number of open swaps.
    pub fn open_count(&self) -> usize {
        self.commitments.len()
    }
}

impl Default for CommitmentStore {
    fn default() -> Self {
        Self::new()
    }
}
