//! Cryptographic hashing for the Cardano wire format
//!
//! Two helper objects are exposed:
//!
//! * [`Hasher`] to stream bytes or CBOR fragments into a digest without
//!   buffering the encoded form first
//! * [`struct@Hash`] a strongly typed digest byte array
//!
//! The algorithm is `Blake2b` with the two digest widths the protocol
//! needs: 224 bits (key and script hashes) and 256 bits (transaction and
//! metadata hashes).

#[allow(clippy::module_inception)]
mod hash;
mod hasher;

pub use self::{hash::Hash, hasher::Hasher};
