//! Hierarchical deterministic key material for Cardano wallets

use ceres_crypto::key::ed25519::{
    PublicKey, SecretKey, SecretKeyExtended, Signature, TryFromSecretKeyExtendedError,
};
use thiserror::Error;

pub mod hd;

#[derive(Error, Debug)]
pub enum Error {
    /// Root seed of unexpected length
    #[error("Seed must be 32 bytes, got {0}")]
    InvalidSeedLength(usize),
    /// Extended key scalar missing the required bit tweaks
    #[error("Extended private key scalar has invalid bit tweaks")]
    InvalidKeyTweaks,
    /// Unexpected bech32 HRP prefix
    #[error("Unexpected bech32 HRP prefix")]
    InvalidBech32Hrp,
    /// Unable to decode bech32 string
    #[error("Unable to decode bech32: {0}")]
    InvalidBech32(bech32::Error),
    /// Decoded bech32 data of unexpected length
    #[error("Decoded bech32 data of unexpected length")]
    UnexpectedBech32Length,
    /// Error that may occur when importing an Ed25519 extended secret key
    #[error("Invalid Ed25519 Extended Secret Key: {0}")]
    InvalidSecretKeyExtended(#[from] TryFromSecretKeyExtendedError),
}

/// A standard or extended Ed25519 secret key
pub enum PrivateKey {
    Normal(SecretKey),
    Extended(SecretKeyExtended),
}

impl PrivateKey {
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        match self {
            Self::Normal(_) => SecretKey::SIZE,
            Self::Extended(_) => SecretKeyExtended::SIZE,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Normal(x) => x.public_key(),
            Self::Extended(x) => x.public_key(),
        }
    }

    pub fn sign<T>(&self, msg: T) -> Signature
    where
        T: AsRef<[u8]>,
    {
        match self {
            Self::Normal(x) => x.sign(msg),
            Self::Extended(x) => x.sign(msg),
        }
    }
}

impl From<SecretKey> for PrivateKey {
    fn from(key: SecretKey) -> Self {
        PrivateKey::Normal(key)
    }
}

impl From<SecretKeyExtended> for PrivateKey {
    fn from(key: SecretKeyExtended) -> Self {
        PrivateKey::Extended(key)
    }
}

/// Flags an index as hardened for child derivation
pub fn harden(index: u32) -> u32 {
    index | 0x8000_0000
}
