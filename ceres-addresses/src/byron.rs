//! Legacy Byron-era addresses
//!
//! A Byron address is a CBOR envelope `[tag24(inner_bytes), crc32]` where
//! the inner bytes hold `[root_hash, attributes, addr_type]`. The CRC is
//! computed over the inner bytes and checked on every decode.

use ceres_codec::minicbor::{self, bytes::ByteVec, Decode, Encode};
use ceres_codec::utils::{OrderPreservingProperties, TagWrap};
use ceres_crypto::hash::{Hash, Hasher};
use crc::{Crc, CRC_32_ISO_HDLC};

use base58::{FromBase58, ToBase58};

use crate::Error;

// CRC-32/ISO-HDLC is the classic IEEE polynomial used by the Byron envelope
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

pub const MAINNET_MAGIC: u32 = 764824073;
pub const TESTNET_MAGIC: u32 = 1097911063;

pub type Blake2b224 = Hash<28>;

/// Root hash that identifies the spending data of a Byron address
pub type AddressId = Blake2b224;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddrType {
    PubKey,
    Script,
    Redeem,
    Other(u64),
}

impl<'b, C> minicbor::Decode<'b, C> for AddrType {
    fn decode(
        d: &mut minicbor::Decoder<'b>,
        _ctx: &mut C,
    ) -> Result<Self, minicbor::decode::Error> {
        let variant = d.u64()?;

        match variant {
            0 => Ok(AddrType::PubKey),
            1 => Ok(AddrType::Script),
            2 => Ok(AddrType::Redeem),
            x => Ok(AddrType::Other(x)),
        }
    }
}

impl<C> minicbor::Encode<C> for AddrType {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            AddrType::PubKey => e.u64(0)?,
            AddrType::Script => e.u64(1)?,
            AddrType::Redeem => e.u64(2)?,
            AddrType::Other(x) => e.u64(*x)?,
        };

        Ok(())
    }
}

/// Spending data committed to by the address-id hash
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd)]
pub enum SpendingData {
    PubKey(ByteVec),
    Other(u64, ByteVec),
}

impl<'b, C> minicbor::Decode<'b, C> for SpendingData {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        d.array()?;
        let variant = d.u64()?;

        match variant {
            0 => Ok(SpendingData::PubKey(d.decode_with(ctx)?)),
            x => Ok(SpendingData::Other(x, d.decode_with(ctx)?)),
        }
    }
}

impl<C> minicbor::Encode<C> for SpendingData {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            SpendingData::PubKey(x) => {
                e.array(2)?;
                e.u64(0)?;
                e.encode_with(x, ctx)?;

                Ok(())
            }
            SpendingData::Other(variant, x) => {
                e.array(2)?;
                e.u64(*variant)?;
                e.encode_with(x, ctx)?;

                Ok(())
            }
        }
    }
}

/// A single entry of the optional attributes map
///
/// Key 1 carries the HD wallet derivation-path ciphertext, key 2 the
/// protocol magic of non-mainnet networks. The magic is CBOR-in-bytes, so
/// decoding re-reads the payload to extract the integer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd)]
pub enum AddrAttrProperty {
    DerivationPath(ByteVec),
    NetworkMagic(u32),
    Unparsed(u8, ByteVec),
}

impl<'b, C> minicbor::Decode<'b, C> for AddrAttrProperty {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let key = d.u8()?;

        match key {
            1 => Ok(AddrAttrProperty::DerivationPath(d.decode_with(ctx)?)),
            2 => {
                let raw = d.bytes()?;
                let magic = minicbor::decode(raw)?;

                Ok(AddrAttrProperty::NetworkMagic(magic))
            }
            x => Ok(AddrAttrProperty::Unparsed(x, d.decode_with(ctx)?)),
        }
    }
}

impl<C> minicbor::Encode<C> for AddrAttrProperty {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            AddrAttrProperty::DerivationPath(x) => {
                e.u32(1)?;
                e.encode_with(x, ctx)?;

                Ok(())
            }
            AddrAttrProperty::NetworkMagic(x) => {
                let raw = minicbor::to_vec(x)
                    .map_err(|_| minicbor::encode::Error::message("error encoding magic"))?;

                e.u32(2)?;
                e.bytes(&raw)?;

                Ok(())
            }
            AddrAttrProperty::Unparsed(key, x) => {
                e.u8(*key)?;
                e.encode_with(x, ctx)?;

                Ok(())
            }
        }
    }
}

pub type AddrAttrs = OrderPreservingProperties<AddrAttrProperty>;

/// The inner payload of a Byron address
#[derive(Debug, Encode, Decode, Clone, PartialEq, Eq, PartialOrd)]
pub struct AddressPayload {
    #[n(0)]
    pub root: AddressId,

    #[n(1)]
    pub attributes: AddrAttrs,

    #[n(2)]
    pub addrtype: AddrType,
}

impl AddressPayload {
    pub fn new(root: AddressId, attributes: AddrAttrs, addrtype: AddrType) -> Self {
        AddressPayload {
            root,
            attributes,
            addrtype,
        }
    }

    /// Computes the root hash of an address from its spending data
    ///
    /// The recipe is fixed by the legacy chain:
    /// `blake2b224(sha3_256(cbor([addr_type, spending_data, attributes])))`.
    pub fn hash_address_id(
        addrtype: &AddrType,
        spending_data: &SpendingData,
        attributes: &AddrAttrs,
    ) -> AddressId {
        use cryptoxide::digest::Digest as _;

        let buf = minicbor::to_vec((addrtype, spending_data, attributes)).unwrap();

        let mut sha3 = cryptoxide::sha3::Sha3_256::new();
        sha3.input(&buf);
        let mut digest = [0u8; 32];
        sha3.result(&mut digest);

        Hasher::<224>::hash(&digest)
    }

    /// Bootstrap-era (Icarus) pubkey payload: no derivation path, magic only
    /// on non-mainnet networks
    pub fn from_pubkey(xpub: Vec<u8>, magic: Option<u32>) -> Self {
        let attributes = match magic {
            Some(x) => vec![AddrAttrProperty::NetworkMagic(x)],
            None => vec![],
        }
        .into();

        let spending_data = SpendingData::PubKey(xpub.into());
        let root = Self::hash_address_id(&AddrType::PubKey, &spending_data, &attributes);

        AddressPayload::new(root, attributes, AddrType::PubKey)
    }

    /// HD derivation-path ciphertext, if the attribute is present
    pub fn derivation_path(&self) -> Option<&[u8]> {
        self.attributes.iter().find_map(|x| match x {
            AddrAttrProperty::DerivationPath(x) => Some(x.as_slice()),
            _ => None,
        })
    }

    /// Protocol magic attribute; absence means mainnet
    pub fn protocol_magic(&self) -> Option<u32> {
        self.attributes.iter().find_map(|x| match x {
            AddrAttrProperty::NetworkMagic(x) => Some(*x),
            _ => None,
        })
    }
}

impl From<AddressPayload> for ByronAddress {
    fn from(value: AddressPayload) -> Self {
        ByronAddress::from_decoded(value)
    }
}

/// A deserialized Byron address
#[derive(Debug, Encode, Decode, Clone, PartialEq, Eq, PartialOrd, Hash)]
pub struct ByronAddress {
    #[n(0)]
    pub payload: TagWrap<ByteVec, 24>,

    #[n(1)]
    pub crc: u32,
}

impl ByronAddress {
    pub fn new(payload: &[u8], crc: u32) -> Self {
        Self {
            payload: TagWrap(ByteVec::from(payload.to_vec())),
            crc,
        }
    }

    /// Builds the envelope around an inner payload, computing the checksum
    pub fn from_decoded(payload: AddressPayload) -> Self {
        let bytes = minicbor::to_vec(payload).unwrap();
        let crc = CRC32.checksum(&bytes);

        Self::new(&bytes, crc)
    }

    pub fn from_bytes(value: &[u8]) -> Result<Self, Error> {
        let out: Self = minicbor::decode(value).map_err(Error::InvalidByronCbor)?;
        out.verify_checksum()?;

        Ok(out)
    }

    /// Checks the stored CRC against the payload bytes
    pub fn verify_checksum(&self) -> Result<(), Error> {
        let computed = CRC32.checksum(&self.payload.0);

        if computed != self.crc {
            return Err(Error::InvalidByronChecksum(self.crc, computed));
        }

        Ok(())
    }

    pub fn decode_payload(&self) -> Result<AddressPayload, Error> {
        minicbor::decode(&self.payload.0).map_err(Error::InvalidByronCbor)
    }

    /// Gets a numeric id describing the type of the address
    pub fn typeid(&self) -> u8 {
        0b1000
    }

    pub fn to_vec(&self) -> Vec<u8> {
        minicbor::to_vec(self).unwrap()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_vec())
    }

    pub fn to_base58(&self) -> String {
        self.to_vec().to_base58()
    }

    pub fn from_base58(value: &str) -> Result<Self, Error> {
        let bytes = value.from_base58().map_err(Error::BadBase58)?;
        Self::from_bytes(&bytes)
    }

    /// The 4-bit network id implied by the protocol-magic attribute
    pub fn network_id(&self) -> Result<u8, Error> {
        let payload = self.decode_payload()?;

        match payload.protocol_magic() {
            None => Ok(1),
            Some(magic) if magic == MAINNET_MAGIC => Ok(1),
            Some(magic) if magic == TESTNET_MAGIC => Ok(0),
            Some(magic) => Err(Error::UnknownProtocolMagic(magic)),
        }
    }
}
