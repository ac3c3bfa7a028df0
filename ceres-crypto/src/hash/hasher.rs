use crate::hash::Hash;
use ceres_codec::minicbor;
use cryptoxide::blake2b::Blake2b;

/// Incremental Blake2b hasher parameterized by digest size in bits
///
/// ```
/// # use ceres_crypto::hash::Hasher;
/// let mut hasher = Hasher::<256>::new();
/// hasher.input(b"My transaction");
///
/// let digest = hasher.finalize();
/// # assert_eq!(
/// #   "0d8d00cdd4657ac84d82f0a56067634a7adfdf43da41cb534bcaa45060973d21",
/// #   hex::encode(digest)
/// # );
/// ```
pub struct Hasher<const BITS: usize>(Blake2b);

impl<const BITS: usize> Hasher<BITS> {
    /// update the [`Hasher`] with the given input bytes
    #[inline]
    pub fn input(&mut self, bytes: &[u8]) {
        use cryptoxide::digest::Digest as _;
        self.0.input(bytes);
    }
}

macro_rules! common_hasher {
    ($size:literal) => {
        impl Hasher<$size> {
            /// create a new [`Hasher`]
            #[inline]
            pub fn new() -> Self {
                Self(Blake2b::new($size / 8))
            }

            /// hash the given bytes in one shot
            #[inline]
            pub fn hash(bytes: &[u8]) -> Hash<{ $size / 8 }> {
                let mut hasher = Self::new();
                hasher.input(bytes);
                hasher.finalize()
            }

            /// hash the CBOR encoding of the given object, streaming the
            /// encoder output straight into the hasher
            #[inline]
            pub fn hash_cbor(data: &impl minicbor::Encode<()>) -> Hash<{ $size / 8 }> {
                let mut hasher = Self::new();
                let () = minicbor::encode(data, &mut hasher).expect("Infallible");
                hasher.finalize()
            }

            /// consume the [`Hasher`] and return the computed digest
            pub fn finalize(mut self) -> Hash<{ $size / 8 }> {
                use cryptoxide::digest::Digest as _;
                let mut hash = [0; $size / 8];
                self.0.result(&mut hash);
                Hash::new(hash)
            }
        }

        impl Default for Hasher<$size> {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

common_hasher!(224);
common_hasher!(256);

impl<'a, const BITS: usize> minicbor::encode::Write for &'a mut Hasher<BITS> {
    type Error = std::convert::Infallible;

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.input(buf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake2b_224_matches_known_digest() {
        let digest = Hasher::<224>::hash(b"My Public Key");

        assert_eq!(
            hex::encode(digest),
            "c123c9bc0e9e31a20a4aa23518836ec5fb54bdc85735c56b38eb79a5"
        );
    }

    #[test]
    fn hash_cbor_matches_hash_of_encoding() {
        let value = (42u64, "cardano");
        let direct = Hasher::<256>::hash_cbor(&value);
        let buffered = Hasher::<256>::hash(&minicbor::to_vec(&value).unwrap());

        assert_eq!(direct, buffered);
    }
}
