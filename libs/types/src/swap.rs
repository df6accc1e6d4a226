//! Swap terms
//!
//! The full agreement between initiator and acceptor. Terms are always
//! passed whole and never persisted; only their digest is stored.

use serde::{Deserialize, Serialize};

use crate::ids::{Address, TokenId, Wei};

/// Size of one encoded field.
pub const WORD_SIZE: usize = 32;

/// Number of fields in [`SwapTerms`].
pub const TERMS_FIELD_COUNT: usize = 8;

/// Size of the canonical encoding of [`SwapTerms`].
pub const ENCODED_TERMS_LEN: usize = WORD_SIZE * TERMS_FIELD_COUNT;

/// Full terms of a two-party NFT swap.
///
/// Invariant: at most one of `initiator_eth_portion` and
/// `acceptor_eth_portion` is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwapTerms {
    pub initiator: Address,
    pub acceptor: Address,
    pub initiator_nft_contract: Address,
    pub acceptor_nft_contract: Address,
    pub initiator_token_id: TokenId,
    pub acceptor_token_id: TokenId,
    pub initiator_eth_portion: Wei,
    pub acceptor_eth_portion: Wei,
}

impl SwapTerms {
    /// Canonical encoding: every field as a 32-byte big-endian word, in
    /// declaration order. Addresses are left-padded with zeros.
    pub fn encode_canonical(&self) -> [u8; ENCODED_TERMS_LEN] {
        let mut out = [0u8; ENCODED_TERMS_LEN];
        let words: [[u8; WORD_SIZE]; TERMS_FIELD_COUNT] = [
            address_word(&self.initiator),
            address_word(&self.acceptor),
            address_word(&self.initiator_nft_contract),
            address_word(&self.acceptor_nft_contract),
            uint_word(self.initiator_token_id),
            uint_word(self.acceptor_token_id),
            uint_word(self.initiator_eth_portion),
            uint_word(self.acceptor_eth_portion),
        ];
        for (chunk, word) in out.chunks_exact_mut(WORD_SIZE).zip(words.iter()) {
            chunk.copy_from_slice(word);
        }
        out
    }

    /// Whether both sides attach native value.
    pub fn is_two_way(&self) -> bool {
        self.initiator_eth_portion > 0 && self.acceptor_eth_portion > 0
    }

    /// Whether any mandatory identity is the null address.
    pub fn has_zero_address(&self) -> bool {
        self.initiator_nft_contract.is_zero()
            || self.acceptor_nft_contract.is_zero()
            || self.acceptor.is_zero()
    }
}

fn address_word(address: &Address) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - Address::LEN..].copy_from_slice(address.as_bytes());
    word
}

fn uint_word(value: u128) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - 16..].copy_from_slice(&value.to_be_bytes());
    word
}
