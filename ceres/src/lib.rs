//! Rust-native serialization core for the Cardano wire format
//!
//! Ceres is a collection of crates that re-implement the Cardano address
//! and transaction wire formats in native Rust: bit-exact address codecs
//! across every era, BIP32-Ed25519 key derivation, and a transaction
//! builder that resolves fees and witnesses into submittable bytes. This
//! crate doesn't provide any particular application; it is a base layer
//! for wallets, explorers and tooling.

#[doc(inline)]
pub use ceres_codec as codec;

#[doc(inline)]
pub use ceres_crypto as crypto;

#[doc(inline)]
pub use ceres_addresses as addresses;

#[doc(inline)]
pub use ceres_primitives as primitives;

#[doc(inline)]
pub use ceres_wallet as wallet;

#[doc(inline)]
pub use ceres_txbuilder as txbuilder;
