//! Ledger primitives and cbor codec for the Shelley-era wire format
//!
//! Handcrafted, idiomatic rust artifacts based on the Shelley/Allegra CDDL
//! published with the Cardano ledger. Every entity round-trips: decoding a
//! valid fragment and re-encoding it yields the original bytes.

mod model;

pub mod crypto;

pub use model::*;

pub use ceres_codec::utils::{Bytes, Int, KeyValuePairs, MaybeIndefArray, Nullable};
pub use ceres_codec::Fragment;
pub use ceres_crypto::hash::Hash;

/// Entities with a well-known cryptographic digest of their CBOR form
pub trait ComputeHash<const BYTES: usize> {
    fn compute_hash(&self) -> Hash<BYTES>;
}
