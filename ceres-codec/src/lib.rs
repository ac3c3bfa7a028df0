//! Shared CBOR plumbing for the Ceres workspace
//!
//! Every crate in the workspace encodes and decodes through the same
//! [`minicbor`] version re-exported here, so wire fragments produced by one
//! layer can be consumed by another without version skew.

/// Shared re-export of the minicbor lib across all Ceres crates
pub use minicbor;

/// Round-trip friendly common helper structs
pub mod utils;

/// A self-contained piece of the wire format
///
/// Anything that can be encoded and decoded without external context
/// qualifies as a fragment. The trait exists mostly as a shorthand bound and
/// to hang the byte-level helpers from.
pub trait Fragment: Sized + for<'b> minicbor::Decode<'b, ()> + minicbor::Encode<()> {
    fn encode_fragment(&self) -> Result<Vec<u8>, minicbor::encode::Error<std::convert::Infallible>> {
        minicbor::to_vec(self)
    }

    fn decode_fragment(bytes: &[u8]) -> Result<Self, minicbor::decode::Error> {
        minicbor::decode(bytes)
    }
}

impl<T> Fragment for T where T: for<'b> minicbor::Decode<'b, ()> + minicbor::Encode<()> + Sized {}
