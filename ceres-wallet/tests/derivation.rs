use ceres_addresses::{Network, ShelleyAddress, ShelleyDelegationPart, ShelleyPaymentPart};
use ceres_crypto::hash::Hasher;
use ceres_wallet::hd::Bip32PrivateKey;
use ceres_wallet::harden;

// 15-word Icarus test entropy used across Cardano serialization libraries
const ENTROPY: &str = "0ccb74f36b7da1649a8144675522d4d8097c6412";

fn root_key() -> Bip32PrivateKey {
    let entropy = hex::decode(ENTROPY).unwrap();
    Bip32PrivateKey::from_entropy(&entropy, b"")
}

fn account_key() -> Bip32PrivateKey {
    root_key()
        .derive(harden(1852))
        .derive(harden(1815))
        .derive(harden(0))
}

#[test]
fn bip32_15_base_address_vector() {
    let payment = account_key().derive(0).derive(0).to_public();
    let stake = account_key().derive(2).derive(0).to_public();

    let payment_hash = Hasher::<224>::hash(payment.to_ed25519_pubkey().as_ref());
    let stake_hash = Hasher::<224>::hash(stake.to_ed25519_pubkey().as_ref());

    let addr = ShelleyAddress::new(
        Network::Testnet,
        ShelleyPaymentPart::key_hash(payment_hash),
        ShelleyDelegationPart::key_hash(stake_hash),
    );

    assert_eq!(
        addr.to_bech32().unwrap(),
        "addr_test1qpu5vlrf4xkxv2qpwngf6cjhtw542ayty80v8dyr49rf5ewvxwdrt70qlcpeeagscasafhffqsxy36t90ldv06wqrk2qum8x5w"
    );
}

#[test]
fn derivation_produces_identical_bytes_on_repeat() {
    let a = account_key().derive(0).derive(0);
    let b = account_key().derive(0).derive(0);

    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn derived_keys_keep_the_scalar_clamped() {
    let key = account_key().derive(0).derive(0);
    let bytes = key.as_bytes();

    assert_eq!(bytes[0] & 0x07, 0);
    assert_eq!(bytes[31] & 0x80, 0);
    assert_eq!(bytes[31] & 0x40, 0x40);
}
