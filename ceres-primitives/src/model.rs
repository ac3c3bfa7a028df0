use ceres_codec::minicbor::{self, data::Tag, Decode, Encode};
use ceres_codec::utils::{Bytes, Int, KeyValuePairs, MaybeIndefArray, Nullable};
use ceres_crypto::hash::Hash;

pub type Coin = u64;

pub type Epoch = u64;

pub type AddrKeyhash = Hash<28>;
pub type Scripthash = Hash<28>;
pub type PoolKeyhash = Hash<28>;
pub type Genesishash = Hash<28>;
pub type GenesisDelegateHash = Hash<28>;
pub type VrfKeyhash = Hash<32>;
pub type AuxiliaryDataHash = Hash<32>;

/// Raw bytes of a reward (stake) address
pub type RewardAccount = Bytes;

pub type PolicyId = Hash<28>;

pub type AssetName = Bytes;

pub type Multiasset<A> = KeyValuePairs<PolicyId, KeyValuePairs<AssetName, A>>;

pub type Mint = Multiasset<i64>;

#[derive(Encode, Decode, Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct TransactionInput {
    #[n(0)]
    pub transaction_id: Hash<32>,

    #[n(1)]
    pub index: u64,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Coin(Coin),
    Multiasset(Coin, Multiasset<Coin>),
}

impl Value {
    /// The plain lovelace portion of the value
    pub fn coin(&self) -> Coin {
        match self {
            Value::Coin(x) => *x,
            Value::Multiasset(x, _) => *x,
        }
    }
}

impl<'b, C> minicbor::decode::Decode<'b, C> for Value {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        match d.datatype()? {
            minicbor::data::Type::U8
            | minicbor::data::Type::U16
            | minicbor::data::Type::U32
            | minicbor::data::Type::U64 => Ok(Value::Coin(d.decode_with(ctx)?)),
            minicbor::data::Type::Array | minicbor::data::Type::ArrayIndef => {
                d.array()?;
                let coin = d.decode_with(ctx)?;
                let multiasset = d.decode_with(ctx)?;
                Ok(Value::Multiasset(coin, multiasset))
            }
            _ => Err(minicbor::decode::Error::message(
                "unknown cbor data type for Value",
            )),
        }
    }
}

impl<C> minicbor::encode::Encode<C> for Value {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            Value::Coin(coin) => {
                e.encode_with(coin, ctx)?;
            }
            Value::Multiasset(coin, other) => {
                e.array(2)?;
                e.encode_with(coin, ctx)?;
                e.encode_with(other, ctx)?;
            }
        };

        Ok(())
    }
}

#[derive(Encode, Decode, Debug, PartialEq, Clone)]
pub struct TransactionOutput {
    #[n(0)]
    pub address: Bytes,

    #[n(1)]
    pub amount: Value,
}

#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone)]
pub enum StakeCredential {
    AddrKeyhash(AddrKeyhash),
    Scripthash(Scripthash),
}

impl<'b, C> minicbor::decode::Decode<'b, C> for StakeCredential {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        d.array()?;
        let variant = d.u16()?;

        match variant {
            0 => Ok(StakeCredential::AddrKeyhash(d.decode_with(ctx)?)),
            1 => Ok(StakeCredential::Scripthash(d.decode_with(ctx)?)),
            _ => Err(minicbor::decode::Error::message(
                "invalid variant id for StakeCredential",
            )),
        }
    }
}

impl<C> minicbor::encode::Encode<C> for StakeCredential {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            StakeCredential::AddrKeyhash(a) => {
                e.array(2)?;
                e.encode_with(0, ctx)?;
                e.encode_with(a, ctx)?;

                Ok(())
            }
            StakeCredential::Scripthash(a) => {
                e.array(2)?;
                e.encode_with(1, ctx)?;
                e.encode_with(a, ctx)?;

                Ok(())
            }
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RationalNumber {
    pub numerator: u64,
    pub denominator: u64,
}

impl<'b, C> minicbor::decode::Decode<'b, C> for RationalNumber {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        d.tag()?;
        d.array()?;

        Ok(RationalNumber {
            numerator: d.decode_with(ctx)?,
            denominator: d.decode_with(ctx)?,
        })
    }
}

impl<C> minicbor::encode::Encode<C> for RationalNumber {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.tag(Tag::Unassigned(30))?;
        e.array(2)?;
        e.encode_with(self.numerator, ctx)?;
        e.encode_with(self.denominator, ctx)?;

        Ok(())
    }
}

pub type UnitInterval = RationalNumber;

pub type Port = u32;
pub type IPv4 = Bytes;
pub type IPv6 = Bytes;
pub type DnsName = String;

#[derive(Debug, PartialEq, Clone)]
pub enum Relay {
    SingleHostAddr(Option<Port>, Option<IPv4>, Option<IPv6>),
    SingleHostName(Option<Port>, DnsName),
    MultiHostName(DnsName),
}

impl<'b, C> minicbor::decode::Decode<'b, C> for Relay {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        d.array()?;
        let variant = d.u16()?;

        match variant {
            0 => Ok(Relay::SingleHostAddr(
                d.decode_with(ctx)?,
                d.decode_with(ctx)?,
                d.decode_with(ctx)?,
            )),
            1 => Ok(Relay::SingleHostName(
                d.decode_with(ctx)?,
                d.decode_with(ctx)?,
            )),
            2 => Ok(Relay::MultiHostName(d.decode_with(ctx)?)),
            _ => Err(minicbor::decode::Error::message(
                "invalid variant id for Relay",
            )),
        }
    }
}

impl<C> minicbor::encode::Encode<C> for Relay {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            Relay::SingleHostAddr(a, b, c) => {
                e.array(4)?;
                e.encode_with(0, ctx)?;
                e.encode_with(a, ctx)?;
                e.encode_with(b, ctx)?;
                e.encode_with(c, ctx)?;

                Ok(())
            }
            Relay::SingleHostName(a, b) => {
                e.array(3)?;
                e.encode_with(1, ctx)?;
                e.encode_with(a, ctx)?;
                e.encode_with(b, ctx)?;

                Ok(())
            }
            Relay::MultiHostName(a) => {
                e.array(2)?;
                e.encode_with(2, ctx)?;
                e.encode_with(a, ctx)?;

                Ok(())
            }
        }
    }
}

pub type PoolMetadataHash = Hash<32>;

#[derive(Encode, Decode, Debug, PartialEq, Clone)]
pub struct PoolMetadata {
    #[n(0)]
    pub url: String,

    #[n(1)]
    pub hash: PoolMetadataHash,
}

/* move_instantaneous_reward = [ 0 / 1, { * stake_credential => delta_coin } / coin ]
; The first field determines where the funds are drawn from: 0 denotes the
; reserves, 1 the treasury. If the second field is a map, funds are moved to
; stake credentials, otherwise to the other accounting pot. */

#[derive(Debug, PartialEq, PartialOrd, Clone)]
pub enum InstantaneousRewardSource {
    Reserves,
    Treasury,
}

impl<'b, C> minicbor::decode::Decode<'b, C> for InstantaneousRewardSource {
    fn decode(
        d: &mut minicbor::Decoder<'b>,
        _ctx: &mut C,
    ) -> Result<Self, minicbor::decode::Error> {
        let variant = d.u32()?;

        match variant {
            0 => Ok(Self::Reserves),
            1 => Ok(Self::Treasury),
            _ => Err(minicbor::decode::Error::message("invalid funds variant")),
        }
    }
}

impl<C> minicbor::encode::Encode<C> for InstantaneousRewardSource {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        let variant = match self {
            Self::Reserves => 0,
            Self::Treasury => 1,
        };

        e.u32(variant)?;

        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum InstantaneousRewardTarget {
    StakeCredentials(KeyValuePairs<StakeCredential, i64>),
    OtherAccountingPot(Coin),
}

impl<'b, C> minicbor::decode::Decode<'b, C> for InstantaneousRewardTarget {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let datatype = d.datatype()?;

        match datatype {
            minicbor::data::Type::Map | minicbor::data::Type::MapIndef => {
                let a = d.decode_with(ctx)?;
                Ok(Self::StakeCredentials(a))
            }
            _ => {
                let a = d.decode_with(ctx)?;
                Ok(Self::OtherAccountingPot(a))
            }
        }
    }
}

impl<C> minicbor::encode::Encode<C> for InstantaneousRewardTarget {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            InstantaneousRewardTarget::StakeCredentials(a) => {
                e.encode_with(a, ctx)?;
                Ok(())
            }
            InstantaneousRewardTarget::OtherAccountingPot(a) => {
                e.encode_with(a, ctx)?;
                Ok(())
            }
        }
    }
}

#[derive(Encode, Decode, Debug, PartialEq, Clone)]
pub struct MoveInstantaneousReward {
    #[n(0)]
    pub source: InstantaneousRewardSource,

    #[n(1)]
    pub target: InstantaneousRewardTarget,
}

/// Certificates carried by a transaction body
///
/// The builder only produces kinds 0 through 4; the genesis-delegation and
/// instantaneous-rewards kinds (5 and 6) are decoded and re-encoded
/// faithfully so foreign transactions survive a round trip.
#[derive(Debug, PartialEq, Clone)]
pub enum Certificate {
    StakeRegistration(StakeCredential),
    StakeDeregistration(StakeCredential),
    StakeDelegation(StakeCredential, PoolKeyhash),
    PoolRegistration {
        operator: PoolKeyhash,
        vrf_keyhash: VrfKeyhash,
        pledge: Coin,
        cost: Coin,
        margin: UnitInterval,
        reward_account: RewardAccount,
        pool_owners: MaybeIndefArray<AddrKeyhash>,
        relays: MaybeIndefArray<Relay>,
        pool_metadata: Option<PoolMetadata>,
    },
    PoolRetirement(PoolKeyhash, Epoch),
    GenesisKeyDelegation(Genesishash, GenesisDelegateHash, VrfKeyhash),
    MoveInstantaneousRewardsCert(MoveInstantaneousReward),
}

impl<'b, C> minicbor::decode::Decode<'b, C> for Certificate {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        d.array()?;
        let variant = d.u16()?;

        match variant {
            0 => {
                let a = d.decode_with(ctx)?;
                Ok(Certificate::StakeRegistration(a))
            }
            1 => {
                let a = d.decode_with(ctx)?;
                Ok(Certificate::StakeDeregistration(a))
            }
            2 => {
                let a = d.decode_with(ctx)?;
                let b = d.decode_with(ctx)?;
                Ok(Certificate::StakeDelegation(a, b))
            }
            3 => {
                let operator = d.decode_with(ctx)?;
                let vrf_keyhash = d.decode_with(ctx)?;
                let pledge = d.decode_with(ctx)?;
                let cost = d.decode_with(ctx)?;
                let margin = d.decode_with(ctx)?;
                let reward_account = d.decode_with(ctx)?;
                let pool_owners = d.decode_with(ctx)?;
                let relays = d.decode_with(ctx)?;
                let pool_metadata = d.decode_with(ctx)?;

                Ok(Certificate::PoolRegistration {
                    operator,
                    vrf_keyhash,
                    pledge,
                    cost,
                    margin,
                    reward_account,
                    pool_owners,
                    relays,
                    pool_metadata,
                })
            }
            4 => {
                let a = d.decode_with(ctx)?;
                let b = d.decode_with(ctx)?;
                Ok(Certificate::PoolRetirement(a, b))
            }
            5 => {
                let a = d.decode_with(ctx)?;
                let b = d.decode_with(ctx)?;
                let c = d.decode_with(ctx)?;
                Ok(Certificate::GenesisKeyDelegation(a, b, c))
            }
            6 => {
                let a = d.decode_with(ctx)?;
                Ok(Certificate::MoveInstantaneousRewardsCert(a))
            }
            _ => Err(minicbor::decode::Error::message(
                "unknown variant id for certificate",
            )),
        }
    }
}

impl<C> minicbor::encode::Encode<C> for Certificate {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            Certificate::StakeRegistration(a) => {
                e.array(2)?;
                e.u16(0)?;
                e.encode_with(a, ctx)?;

                Ok(())
            }
            Certificate::StakeDeregistration(a) => {
                e.array(2)?;
                e.u16(1)?;
                e.encode_with(a, ctx)?;

                Ok(())
            }
            Certificate::StakeDelegation(a, b) => {
                e.array(3)?;
                e.u16(2)?;
                e.encode_with(a, ctx)?;
                e.encode_with(b, ctx)?;

                Ok(())
            }
            Certificate::PoolRegistration {
                operator,
                vrf_keyhash,
                pledge,
                cost,
                margin,
                reward_account,
                pool_owners,
                relays,
                pool_metadata,
            } => {
                e.array(10)?;
                e.u16(3)?;

                e.encode_with(operator, ctx)?;
                e.encode_with(vrf_keyhash, ctx)?;
                e.encode_with(pledge, ctx)?;
                e.encode_with(cost, ctx)?;
                e.encode_with(margin, ctx)?;
                e.encode_with(reward_account, ctx)?;
                e.encode_with(pool_owners, ctx)?;
                e.encode_with(relays, ctx)?;
                e.encode_with(pool_metadata, ctx)?;

                Ok(())
            }
            Certificate::PoolRetirement(a, b) => {
                e.array(3)?;
                e.u16(4)?;
                e.encode_with(a, ctx)?;
                e.encode_with(b, ctx)?;

                Ok(())
            }
            Certificate::GenesisKeyDelegation(a, b, c) => {
                e.array(4)?;
                e.u16(5)?;
                e.encode_with(a, ctx)?;
                e.encode_with(b, ctx)?;
                e.encode_with(c, ctx)?;

                Ok(())
            }
            Certificate::MoveInstantaneousRewardsCert(a) => {
                e.array(2)?;
                e.u16(6)?;
                e.encode_with(a, ctx)?;

                Ok(())
            }
        }
    }
}

/* $nonce /= [ 0 // 1, bytes .size 32 ] */

#[derive(Encode, Decode, Debug, PartialEq, Clone)]
#[cbor(index_only)]
pub enum NonceVariant {
    #[n(0)]
    NeutralNonce,

    #[n(1)]
    Nonce,
}

#[derive(Encode, Decode, Debug, PartialEq, Clone)]
pub struct Nonce {
    #[n(0)]
    pub variant: NonceVariant,

    #[n(1)]
    pub hash: Option<Hash<32>>,
}

pub type ProtocolVersion = (u64, u64);

#[derive(Encode, Decode, Debug, PartialEq, Clone)]
#[cbor(map)]
pub struct ProtocolParamUpdate {
    #[n(0)]
    pub minfee_a: Option<u64>,
    #[n(1)]
    pub minfee_b: Option<u64>,
    #[n(2)]
    pub max_block_body_size: Option<u64>,
    #[n(3)]
    pub max_transaction_size: Option<u64>,
    #[n(4)]
    pub max_block_header_size: Option<u64>,
    #[n(5)]
    pub key_deposit: Option<Coin>,
    #[n(6)]
    pub pool_deposit: Option<Coin>,
    #[n(7)]
    pub maximum_epoch: Option<Epoch>,
    #[n(8)]
    pub desired_number_of_stake_pools: Option<u64>,
    #[n(9)]
    pub pool_pledge_influence: Option<RationalNumber>,
    #[n(10)]
    pub expansion_rate: Option<UnitInterval>,
    #[n(11)]
    pub treasury_growth_rate: Option<UnitInterval>,
    #[n(12)]
    pub decentralization_constant: Option<UnitInterval>,
    #[n(13)]
    pub extra_entropy: Option<Nonce>,
    #[n(14)]
    pub protocol_version: Option<ProtocolVersion>,
    #[n(15)]
    pub min_utxo_value: Option<Coin>,
}

#[derive(Encode, Decode, Debug, PartialEq, Clone)]
pub struct Update {
    #[n(0)]
    pub proposed_protocol_parameter_updates: KeyValuePairs<Genesishash, ProtocolParamUpdate>,

    #[n(1)]
    pub epoch: Epoch,
}

pub type Withdrawals = KeyValuePairs<RewardAccount, Coin>;

#[derive(Encode, Decode, Debug, PartialEq, Clone)]
#[cbor(map)]
pub struct TransactionBody {
    #[n(0)]
    pub inputs: MaybeIndefArray<TransactionInput>,

    #[n(1)]
    pub outputs: MaybeIndefArray<TransactionOutput>,

    #[n(2)]
    pub fee: Coin,

    #[n(3)]
    pub ttl: Option<u64>,

    #[n(4)]
    pub certificates: Option<MaybeIndefArray<Certificate>>,

    #[n(5)]
    pub withdrawals: Option<Withdrawals>,

    #[n(6)]
    pub update: Option<Update>,

    #[n(7)]
    pub auxiliary_data_hash: Option<AuxiliaryDataHash>,

    #[n(8)]
    pub validity_interval_start: Option<u64>,

    #[n(9)]
    pub mint: Option<Mint>,
}

#[derive(Encode, Decode, Debug, PartialEq, Clone)]
pub struct VKeyWitness {
    #[n(0)]
    pub vkey: Bytes,

    #[n(1)]
    pub signature: Bytes,
}

#[derive(Debug, PartialEq, Clone)]
pub enum NativeScript {
    ScriptPubkey(AddrKeyhash),
    ScriptAll(MaybeIndefArray<NativeScript>),
    ScriptAny(MaybeIndefArray<NativeScript>),
    ScriptNOfK(u32, MaybeIndefArray<NativeScript>),
    InvalidBefore(u64),
    InvalidHereafter(u64),
}

impl<'b, C> minicbor::decode::Decode<'b, C> for NativeScript {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        d.array()?;
        let variant = d.u32()?;

        match variant {
            0 => Ok(NativeScript::ScriptPubkey(d.decode_with(ctx)?)),
            1 => Ok(NativeScript::ScriptAll(d.decode_with(ctx)?)),
            2 => Ok(NativeScript::ScriptAny(d.decode_with(ctx)?)),
            3 => Ok(NativeScript::ScriptNOfK(
                d.decode_with(ctx)?,
                d.decode_with(ctx)?,
            )),
            4 => Ok(NativeScript::InvalidBefore(d.decode_with(ctx)?)),
            5 => Ok(NativeScript::InvalidHereafter(d.decode_with(ctx)?)),
            _ => Err(minicbor::decode::Error::message(
                "unknown variant id for native script",
            )),
        }
    }
}

impl<C> minicbor::encode::Encode<C> for NativeScript {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.array(2)?;

        match self {
            NativeScript::ScriptPubkey(v) => {
                e.encode_with(0, ctx)?;
                e.encode_with(v, ctx)?;
            }
            NativeScript::ScriptAll(v) => {
                e.encode_with(1, ctx)?;
                e.encode_with(v, ctx)?;
            }
            NativeScript::ScriptAny(v) => {
                e.encode_with(2, ctx)?;
                e.encode_with(v, ctx)?;
            }
            NativeScript::ScriptNOfK(a, b) => {
                e.encode_with(3, ctx)?;
                e.encode_with(a, ctx)?;
                e.encode_with(b, ctx)?;
            }
            NativeScript::InvalidBefore(v) => {
                e.encode_with(4, ctx)?;
                e.encode_with(v, ctx)?;
            }
            NativeScript::InvalidHereafter(v) => {
                e.encode_with(5, ctx)?;
                e.encode_with(v, ctx)?;
            }
        }

        Ok(())
    }
}

/* bootstrap_witness =
[ public_key : $vkey
, signature  : $signature
, chain_code : bytes .size 32
, attributes : bytes
] */

#[derive(Encode, Decode, Debug, PartialEq, Clone)]
pub struct BootstrapWitness {
    #[n(0)]
    pub public_key: Bytes,

    #[n(1)]
    pub signature: Bytes,

    #[n(2)]
    pub chain_code: Bytes,

    #[n(3)]
    pub attributes: Bytes,
}

#[derive(Encode, Decode, Debug, PartialEq, Clone)]
#[cbor(map)]
pub struct WitnessSet {
    #[n(0)]
    pub vkeywitness: Option<MaybeIndefArray<VKeyWitness>>,

    #[n(1)]
    pub native_script: Option<MaybeIndefArray<NativeScript>>,

    #[n(2)]
    pub bootstrap_witness: Option<MaybeIndefArray<BootstrapWitness>>,
}

impl Default for WitnessSet {
    fn default() -> Self {
        WitnessSet {
            vkeywitness: None,
            native_script: None,
            bootstrap_witness: None,
        }
    }
}

pub type MetadatumLabel = u64;

/// Arbitrary metadata trees attached to a transaction
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub enum Metadatum {
    Int(Int),
    Bytes(Bytes),
    Text(String),
    Array(MaybeIndefArray<Metadatum>),
    Map(KeyValuePairs<Metadatum, Metadatum>),
}

impl<'b, C> minicbor::decode::Decode<'b, C> for Metadatum {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        match d.datatype()? {
            minicbor::data::Type::U8
            | minicbor::data::Type::U16
            | minicbor::data::Type::U32
            | minicbor::data::Type::U64
            | minicbor::data::Type::I8
            | minicbor::data::Type::I16
            | minicbor::data::Type::I32
            | minicbor::data::Type::I64
            | minicbor::data::Type::Int => Ok(Metadatum::Int(d.decode_with(ctx)?)),
            minicbor::data::Type::Bytes => Ok(Metadatum::Bytes(d.decode_with(ctx)?)),
            minicbor::data::Type::String => Ok(Metadatum::Text(d.decode_with(ctx)?)),
            minicbor::data::Type::Array | minicbor::data::Type::ArrayIndef => {
                Ok(Metadatum::Array(d.decode_with(ctx)?))
            }
            minicbor::data::Type::Map | minicbor::data::Type::MapIndef => {
                Ok(Metadatum::Map(d.decode_with(ctx)?))
            }
            _ => Err(minicbor::decode::Error::message(
                "unknown cbor data type for metadatum",
            )),
        }
    }
}

impl<C> minicbor::encode::Encode<C> for Metadatum {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            Metadatum::Int(a) => {
                e.encode_with(a, ctx)?;
            }
            Metadatum::Bytes(a) => {
                e.encode_with(a, ctx)?;
            }
            Metadatum::Text(a) => {
                e.encode_with(a, ctx)?;
            }
            Metadatum::Array(a) => {
                e.encode_with(a, ctx)?;
            }
            Metadatum::Map(a) => {
                e.encode_with(a, ctx)?;
            }
        };

        Ok(())
    }
}

pub type Metadata = KeyValuePairs<MetadatumLabel, Metadatum>;

#[derive(Encode, Decode, Debug, PartialEq, Clone)]
pub struct ShelleyMaAuxiliaryData {
    #[n(0)]
    pub transaction_metadata: Metadata,

    #[n(1)]
    pub auxiliary_scripts: Option<MaybeIndefArray<NativeScript>>,
}

/// Auxiliary data in its Shelley (bare metadata map) or Allegra
/// (metadata + scripts array) shape
#[derive(Debug, PartialEq, Clone)]
pub enum AuxiliaryData {
    Shelley(Metadata),
    ShelleyMa(ShelleyMaAuxiliaryData),
}

impl<'b, C> minicbor::decode::Decode<'b, C> for AuxiliaryData {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        match d.datatype()? {
            minicbor::data::Type::Map | minicbor::data::Type::MapIndef => {
                Ok(AuxiliaryData::Shelley(d.decode_with(ctx)?))
            }
            minicbor::data::Type::Array | minicbor::data::Type::ArrayIndef => {
                Ok(AuxiliaryData::ShelleyMa(d.decode_with(ctx)?))
            }
            _ => Err(minicbor::decode::Error::message(
                "unknown cbor data type for auxiliary data",
            )),
        }
    }
}

impl<C> minicbor::encode::Encode<C> for AuxiliaryData {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            AuxiliaryData::Shelley(m) => {
                e.encode_with(m, ctx)?;
            }
            AuxiliaryData::ShelleyMa(m) => {
                e.encode_with(m, ctx)?;
            }
        };

        Ok(())
    }
}

/// A complete transaction
///
/// Encodes as the 3-element envelope `[body, witness_set, auxiliary_data]`
/// with a null placeholder when no auxiliary data is attached. Decoding also
/// accepts the 4-element form that appends a validity flag.
#[derive(Debug, PartialEq, Clone)]
pub struct Tx {
    pub transaction_body: TransactionBody,
    pub transaction_witness_set: WitnessSet,
    pub auxiliary_data: Nullable<AuxiliaryData>,
    pub valid: Option<bool>,
}

impl<'b, C> minicbor::decode::Decode<'b, C> for Tx {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let len = d.array()?;

        let transaction_body = d.decode_with(ctx)?;
        let transaction_witness_set = d.decode_with(ctx)?;
        let auxiliary_data = d.decode_with(ctx)?;

        let valid = match len {
            Some(3) => None,
            Some(4) => Some(d.bool()?),
            _ => {
                return Err(minicbor::decode::Error::message(
                    "invalid array length for transaction",
                ))
            }
        };

        Ok(Tx {
            transaction_body,
            transaction_witness_set,
            auxiliary_data,
            valid,
        })
    }
}

impl<C> minicbor::encode::Encode<C> for Tx {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self.valid {
            None => e.array(3)?,
            Some(_) => e.array(4)?,
        };

        e.encode_with(&self.transaction_body, ctx)?;
        e.encode_with(&self.transaction_witness_set, ctx)?;
        e.encode_with(&self.auxiliary_data, ctx)?;

        if let Some(valid) = self.valid {
            e.bool(valid)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ceres_codec::Fragment;
    use std::str::FromStr;

    fn roundtrip<T: Fragment + PartialEq + std::fmt::Debug>(value: &T) {
        let bytes = value.encode_fragment().unwrap();
        let decoded = T::decode_fragment(&bytes).unwrap();
        assert_eq!(&decoded, value);

        let bytes_again = decoded.encode_fragment().unwrap();
        assert_eq!(bytes, bytes_again);
    }

    fn some_input() -> TransactionInput {
        TransactionInput {
            transaction_id: Hash::<32>::from_str(
                "3b40265111d8bb3c3c608d95b3a0bf83461ace32d79336579a1939b3aad1c0b7",
            )
            .unwrap(),
            index: 0,
        }
    }

    fn some_credential() -> StakeCredential {
        StakeCredential::AddrKeyhash(
            Hash::<28>::from_str("276fd18711931e2c0e21430192dbeac0e458093cd9d1fcd7210f64b3")
                .unwrap(),
        )
    }

    #[test]
    fn known_body_encoding() {
        let body = TransactionBody {
            inputs: MaybeIndefArray::Def(vec![some_input()]),
            outputs: MaybeIndefArray::Def(vec![TransactionOutput {
                address: hex::decode("611c616f1acb460668a9b2f123c80372c2adad3583b9c6cd2b1deeed1c")
                    .unwrap()
                    .into(),
                amount: Value::Coin(1),
            }]),
            fee: 94002,
            ttl: Some(10),
            certificates: None,
            withdrawals: None,
            update: None,
            auxiliary_data_hash: None,
            validity_interval_start: None,
            mint: None,
        };

        let bytes = body.encode_fragment().unwrap();

        assert_eq!(
            hex::encode(&bytes),
            "a400818258203b40265111d8bb3c3c608d95b3a0bf83461ace32d79336579a1939b3aad1c0b700018182581d611c616f1acb460668a9b2f123c80372c2adad3583b9c6cd2b1deeed1c01021a00016f32030a"
        );

        roundtrip(&body);
    }

    #[test]
    fn value_roundtrips() {
        roundtrip(&Value::Coin(0));
        roundtrip(&Value::Coin(u64::MAX));

        let policy =
            Hash::<28>::from_str("276fd18711931e2c0e21430192dbeac0e458093cd9d1fcd7210f64b3")
                .unwrap();

        let bundle: Multiasset<Coin> = KeyValuePairs::Def(vec![(
            policy,
            KeyValuePairs::Def(vec![(Bytes::from(b"pickles".to_vec()), 7u64)]),
        )]);

        roundtrip(&Value::Multiasset(1_000_000, bundle));
    }

    #[test]
    fn certificates_roundtrip() {
        let pool = Hash::<28>::from_str(
            "4d04380dcb9fbad5aff8e2f4e19394ef4e5e11b37932838f01984a12",
        )
        .unwrap();

        roundtrip(&Certificate::StakeRegistration(some_credential()));
        roundtrip(&Certificate::StakeDeregistration(some_credential()));
        roundtrip(&Certificate::StakeDelegation(some_credential(), pool));
        roundtrip(&Certificate::PoolRetirement(pool, 218));

        roundtrip(&Certificate::PoolRegistration {
            operator: pool,
            vrf_keyhash: Hash::<32>::from_str(
                "0d8d00cdd4657ac84d82f0a56067634a7adfdf43da41cb534bcaa45060973d21",
            )
            .unwrap(),
            pledge: 5_000_000_000,
            cost: 340_000_000,
            margin: RationalNumber {
                numerator: 3,
                denominator: 100,
            },
            reward_account: hex::decode(
                "e15c7d2a6792e59a27988abea7ec0063bb0f859997741ef1139e442296",
            )
            .unwrap()
            .into(),
            pool_owners: MaybeIndefArray::Def(vec![pool]),
            relays: MaybeIndefArray::Def(vec![Relay::SingleHostName(
                Some(3001),
                String::from("relay.example.com"),
            )]),
            pool_metadata: None,
        });
    }

    #[test]
    fn reserved_certificate_kinds_roundtrip() {
        let genesis =
            Hash::<28>::from_str("276fd18711931e2c0e21430192dbeac0e458093cd9d1fcd7210f64b3")
                .unwrap();
        let vrf = Hash::<32>::from_str(
            "0d8d00cdd4657ac84d82f0a56067634a7adfdf43da41cb534bcaa45060973d21",
        )
        .unwrap();

        roundtrip(&Certificate::GenesisKeyDelegation(genesis, genesis, vrf));

        roundtrip(&Certificate::MoveInstantaneousRewardsCert(
            MoveInstantaneousReward {
                source: InstantaneousRewardSource::Reserves,
                target: InstantaneousRewardTarget::StakeCredentials(KeyValuePairs::Def(vec![(
                    some_credential(),
                    42,
                )])),
            },
        ));
    }

    #[test]
    fn unknown_certificate_kind_fails() {
        // [7, [0, hash]] is outside the known kinds
        let bogus = minicbor::to_vec((7u16, some_credential())).unwrap();
        assert!(Certificate::decode_fragment(&bogus).is_err());
    }

    #[test]
    fn metadata_roundtrips() {
        let metadata: Metadata = KeyValuePairs::Def(vec![(
            674u64,
            Metadatum::Map(KeyValuePairs::Def(vec![(
                Metadatum::Text(String::from("msg")),
                Metadatum::Array(MaybeIndefArray::Def(vec![
                    Metadatum::Int(Int::from(-42)),
                    Metadatum::Bytes(Bytes::from(vec![0xca, 0xfe])),
                ])),
            )])),
        )]);

        roundtrip(&AuxiliaryData::Shelley(metadata.clone()));

        roundtrip(&AuxiliaryData::ShelleyMa(ShelleyMaAuxiliaryData {
            transaction_metadata: metadata,
            auxiliary_scripts: None,
        }));
    }

    #[test]
    fn witness_set_roundtrips() {
        let witness_set = WitnessSet {
            vkeywitness: Some(MaybeIndefArray::Def(vec![VKeyWitness {
                vkey: Bytes::from(vec![0; 32]),
                signature: Bytes::from(vec![0; 64]),
            }])),
            native_script: Some(MaybeIndefArray::Def(vec![NativeScript::ScriptAll(
                MaybeIndefArray::Def(vec![
                    NativeScript::ScriptPubkey(
                        Hash::<28>::from_str(
                            "4d04380dcb9fbad5aff8e2f4e19394ef4e5e11b37932838f01984a12",
                        )
                        .unwrap(),
                    ),
                    NativeScript::InvalidBefore(112500819),
                ]),
            )])),
            bootstrap_witness: None,
        };

        roundtrip(&witness_set);
    }

    #[test]
    fn four_element_transaction_decodes() {
        let tx = Tx {
            transaction_body: TransactionBody {
                inputs: MaybeIndefArray::Def(vec![some_input()]),
                outputs: MaybeIndefArray::Def(vec![]),
                fee: 0,
                ttl: None,
                certificates: None,
                withdrawals: None,
                update: None,
                auxiliary_data_hash: None,
                validity_interval_start: None,
                mint: None,
            },
            transaction_witness_set: WitnessSet::default(),
            auxiliary_data: Nullable::Null,
            valid: Some(true),
        };

        let bytes = tx.encode_fragment().unwrap();
        assert_eq!(bytes[0], 0x84);

        roundtrip(&tx);

        let three = Tx { valid: None, ..tx };
        let bytes = three.encode_fragment().unwrap();
        assert_eq!(bytes[0], 0x83);

        roundtrip(&three);
    }

    #[test]
    fn protocol_update_roundtrips() {
        let update = Update {
            proposed_protocol_parameter_updates: KeyValuePairs::Def(vec![(
                Hash::<28>::from_str(
                    "276fd18711931e2c0e21430192dbeac0e458093cd9d1fcd7210f64b3",
                )
                .unwrap(),
                ProtocolParamUpdate {
                    minfee_a: Some(44),
                    minfee_b: Some(155381),
                    max_block_body_size: None,
                    max_transaction_size: Some(16384),
                    max_block_header_size: None,
                    key_deposit: Some(2_000_000),
                    pool_deposit: Some(500_000_000),
                    maximum_epoch: None,
                    desired_number_of_stake_pools: Some(500),
                    pool_pledge_influence: None,
                    expansion_rate: None,
                    treasury_growth_rate: None,
                    decentralization_constant: None,
                    extra_entropy: None,
                    protocol_version: Some((4, 0)),
                    min_utxo_value: Some(1_000_000),
                },
            )]),
            epoch: 218,
        };

        roundtrip(&update);
    }
}
