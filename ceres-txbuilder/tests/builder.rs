use std::str::FromStr;

use ceres_addresses::byron::{AddressPayload, TESTNET_MAGIC};
use ceres_addresses::{Address, ByronAddress};
use ceres_codec::Fragment;
use ceres_crypto::hash::{Hash, Hasher};
use ceres_crypto::key::ed25519::{PublicKey, SecretKey, Signature};
use ceres_primitives::{ComputeHash, TransactionOutput, Value};
use ceres_txbuilder::{Input, Protocol, ProtocolVersion, TxBuilder, TxBuilderError};
use ceres_wallet::hd::Bip32PrivateKey;
use ceres_wallet::PrivateKey;

const GENESIS_HASH: &str = "3b40265111d8bb3c3c608d95b3a0bf83461ace32d79336579a1939b3aad1c0b7";

const PAYMENT_SK: &str = "c660e50315d76a53d80732efda7630cae8885dfb85c46378684b3c6103e1284a";

// signed single-input single-output transaction with fee 94002 and ttl 10
const REFERENCE_TX: &str = "83a400818258203b40265111d8bb3c3c608d95b3a0bf83461ace32d79336579a1939b3aad1c0b700018182581d611c616f1acb460668a9b2f123c80372c2adad3583b9c6cd2b1deeed1c01021a00016f32030aa10081825820f9aa3fccb7fe539e471188ccc9ee65514c5961c070b06ca185962484a4813bee5840fae5de40c94d759ce13bf9886262159c4f26a289fd192e165995b785259e503f6887bf39dfa23a47cf163784c6eee23f61440e749bc1df3c73975f5231aeda902f6";

fn protocol() -> Protocol {
    Protocol {
        tx_fee_per_byte: 500,
        tx_fee_fixed: 2,
        max_tx_size: 16384,
        min_utxo_value: 1_000_000,
        key_deposit: 2_000_000,
        pool_deposit: 500_000_000,
        protocol_version: ProtocolVersion { major: 4, minor: 0 },
    }
}

fn payment_key() -> SecretKey {
    let bytes: [u8; 32] = hex::decode(PAYMENT_SK).unwrap().try_into().unwrap();
    SecretKey::from(bytes)
}

fn genesis_input(amount: u64) -> Input {
    Input::new(Hash::from_str(GENESIS_HASH).unwrap(), 0, amount)
}

fn payment_output(amount: u64) -> TransactionOutput {
    let address =
        Address::from_hex("611c616f1acb460668a9b2f123c80372c2adad3583b9c6cd2b1deeed1c").unwrap();

    TransactionOutput {
        address: address.to_vec().into(),
        amount: Value::Coin(amount),
    }
}

fn change_address() -> Address {
    Address::from_bech32("addr_test1qqe92py4mf3ffrtmjuwjpzu6jwlw0zmr50h8ey67qcehlmty5kcrvg2ds9fkpg32t535l9v6lkgaj5cunufgvz5f7snql2fawd").unwrap()
}

fn funded_builder(amount: u64) -> TxBuilder {
    let sk = payment_key();
    let key_hash = Hasher::<224>::hash(sk.public_key().as_ref());

    let mut builder = TxBuilder::new(protocol());
    builder.add_key_input(key_hash, genesis_input(amount));
    builder.sign(PrivateKey::Normal(sk));

    builder
}

#[test]
fn simple_transaction_matches_reference_bytes() {
    let mut proto = protocol();
    proto.min_utxo_value = 0;

    let sk = payment_key();
    let key_hash = Hasher::<224>::hash(sk.public_key().as_ref());

    let mut builder = TxBuilder::new(proto);
    builder.add_key_input(key_hash, genesis_input(1_000_000));
    builder.add_output(payment_output(1)).unwrap();
    builder.set_ttl(10);
    builder.set_fee(94002);
    builder.sign(PrivateKey::Normal(sk));

    let tx = builder.build().unwrap();
    let bytes = tx.encode_fragment().unwrap();

    assert_eq!(hex::encode(bytes), REFERENCE_TX);
}

#[test]
fn built_signatures_verify_against_the_body_hash() {
    let mut builder = funded_builder(10_000_000);
    builder.add_output(payment_output(2_000_000)).unwrap();
    builder.add_change_if_needed(&change_address()).unwrap();

    let tx = builder.build().unwrap();
    let body_hash = tx.transaction_body.compute_hash();

    let witnesses = tx.transaction_witness_set.vkeywitness.unwrap();
    assert_eq!(witnesses.len(), 1);

    let vkey = PublicKey::try_from(witnesses[0].vkey.as_slice()).unwrap();
    let signature = Signature::try_from(witnesses[0].signature.as_slice()).unwrap();

    assert!(vkey.verify(body_hash, &signature));
}

#[test]
fn fee_grows_with_every_added_piece() {
    let mut builder = funded_builder(100_000_000);
    builder.add_output(payment_output(2_000_000)).unwrap();

    let baseline = builder.min_fee().unwrap();

    builder.add_output(payment_output(3_000_000)).unwrap();
    let with_extra_output = builder.min_fee().unwrap();
    assert!(with_extra_output > baseline);

    let other_hash = Hasher::<224>::hash(b"another key entirely");
    builder.add_key_input(
        other_hash,
        Input::new(Hash::from_str(GENESIS_HASH).unwrap(), 1, 1_000_000),
    );
    let with_extra_input = builder.min_fee().unwrap();
    assert!(with_extra_input > with_extra_output);
}

#[test]
fn change_keeps_the_transaction_balanced() {
    let mut builder = funded_builder(10_000_000);
    builder.add_output(payment_output(2_000_000)).unwrap();
    builder.add_change_if_needed(&change_address()).unwrap();

    let fee = builder.fee().unwrap();
    let tx = builder.build().unwrap();

    let outputs = tx.transaction_body.outputs.to_vec();
    assert_eq!(outputs.len(), 2);

    let total_out: u64 = outputs.iter().map(|x| x.amount.coin()).sum();
    assert_eq!(10_000_000, total_out + fee);
}

#[test]
fn small_residual_is_absorbed_into_the_fee() {
    let mut builder = funded_builder(2_200_000);
    builder.add_output(payment_output(2_000_000)).unwrap();
    builder.add_change_if_needed(&change_address()).unwrap();

    // residual was below min-ada for a change output, so it went to the fee
    assert_eq!(builder.fee().unwrap(), 200_000);

    let tx = builder.build().unwrap();
    assert_eq!(tx.transaction_body.outputs.len(), 1);
}

#[test]
fn unbalanced_transaction_is_rejected() {
    let mut builder = funded_builder(1_000_000);
    builder.add_output(payment_output(1_000_000)).unwrap();

    assert!(matches!(
        builder.add_change_if_needed(&change_address()),
        Err(TxBuilderError::InsufficientFunds)
    ));
}

#[test]
fn withdrawals_and_refunds_count_as_inputs() {
    let mut builder = funded_builder(1_500_000);
    builder.add_output(payment_output(2_000_000)).unwrap();

    // not enough from the input alone
    assert!(matches!(
        builder.add_change_if_needed(&change_address()),
        Err(TxBuilderError::InsufficientFunds)
    ));

    let reward_account =
        hex::decode("e15c7d2a6792e59a27988abea7ec0063bb0f859997741ef1139e442296").unwrap();
    builder.add_withdrawal(reward_account, 3_000_000);
    builder.add_change_if_needed(&change_address()).unwrap();

    let fee = builder.fee().unwrap();
    let tx = builder.build().unwrap();

    let total_out: u64 = tx
        .transaction_body
        .outputs
        .iter()
        .map(|x| x.amount.coin())
        .sum();

    assert_eq!(1_500_000 + 3_000_000, total_out + fee);
}

#[test]
fn outputs_below_min_ada_are_rejected() {
    let mut builder = funded_builder(10_000_000);

    assert!(matches!(
        builder.add_output(payment_output(999_999)),
        Err(TxBuilderError::ValueTooSmall {
            required: 1_000_000,
            provided: 999_999
        })
    ));
}

#[test]
fn building_without_a_fee_fails() {
    let mut builder = funded_builder(10_000_000);
    builder.add_output(payment_output(2_000_000)).unwrap();

    assert!(matches!(builder.build(), Err(TxBuilderError::FeeNotSet)));
}

#[test]
fn adding_after_balancing_invalidates_the_fee() {
    let mut builder = funded_builder(10_000_000);
    builder.add_output(payment_output(2_000_000)).unwrap();
    builder.add_change_if_needed(&change_address()).unwrap();
    assert!(builder.fee().is_some());

    builder.add_output(payment_output(1_000_000)).unwrap();
    assert!(builder.fee().is_none());
    assert!(matches!(builder.build(), Err(TxBuilderError::FeeNotSet)));
}

#[test]
fn script_inputs_are_refused() {
    let mut builder = funded_builder(10_000_000);
    builder.add_script_input(
        Hasher::<224>::hash(b"some script"),
        Input::new(Hash::from_str(GENESIS_HASH).unwrap(), 1, 1_000_000),
    );

    assert!(matches!(
        builder.min_fee(),
        Err(TxBuilderError::ScriptsUnsupported)
    ));
}

#[test]
fn fee_requires_at_least_one_input() {
    let builder = TxBuilder::new(protocol());

    assert!(matches!(builder.min_fee(), Err(TxBuilderError::NoInputs)));
}

#[test]
fn bootstrap_inputs_get_full_witnesses() {
    let key = Bip32PrivateKey::from_seed(&[3u8; 32]).unwrap();
    let xpub = key.to_public().as_bytes();

    let byron: ByronAddress = AddressPayload::from_pubkey(xpub, Some(TESTNET_MAGIC)).into();
    let address = Address::Byron(byron.clone());

    let mut builder = TxBuilder::new(protocol());
    builder
        .add_input(&address, genesis_input(10_000_000))
        .unwrap();
    builder.add_output(payment_output(2_000_000)).unwrap();
    builder.add_change_if_needed(&change_address()).unwrap();
    builder.sign_bootstrap(key.clone());

    let tx = builder.build().unwrap();
    let body_hash = tx.transaction_body.compute_hash();

    let witnesses = tx.transaction_witness_set.bootstrap_witness.unwrap();
    assert_eq!(witnesses.len(), 1);

    let witness = &witnesses[0];
    assert_eq!(witness.chain_code.as_slice(), key.chain_code().as_slice());

    let vkey = PublicKey::try_from(witness.public_key.as_slice()).unwrap();
    let signature = Signature::try_from(witness.signature.as_slice()).unwrap();
    assert!(vkey.verify(body_hash, &signature));

    // the recorded attributes are the address's own
    let payload = byron.decode_payload().unwrap();
    let attributes = ceres_codec::minicbor::to_vec(&payload.attributes).unwrap();
    assert_eq!(witness.attributes.as_slice(), attributes.as_slice());
}

#[test]
fn missing_signing_key_is_reported() {
    let mut proto = protocol();
    proto.min_utxo_value = 0;

    let mut builder = TxBuilder::new(proto);
    builder.add_key_input(Hasher::<224>::hash(b"unknown key"), genesis_input(1_000_000));
    builder.add_output(payment_output(1)).unwrap();
    builder.set_fee(94002);

    assert!(matches!(
        builder.build(),
        Err(TxBuilderError::MissingSigningKey(_))
    ));
}
