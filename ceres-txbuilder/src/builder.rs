use std::collections::{BTreeMap, BTreeSet};

use ceres_addresses::byron::{AddressPayload, SpendingData};
use ceres_addresses::{Address, ByronAddress, ShelleyPaymentPart};
use ceres_codec::minicbor;
use ceres_crypto::hash::{Hash, Hasher};
use ceres_primitives::{
    AuxiliaryData, BootstrapWitness, Bytes, Certificate, ComputeHash, KeyValuePairs,
    MaybeIndefArray, Mint, TransactionBody, TransactionInput, TransactionOutput, Tx, VKeyWitness,
    Value, WitnessSet,
};
use ceres_wallet::hd::Bip32PrivateKey;
use ceres_wallet::PrivateKey;

use crate::{fee::LinearFee, min_ada::min_ada_required, protocol::Protocol, TxBuilderError};

/// A resolved input: where the funds sit and how much lovelace they hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub tx_hash: Hash<32>,
    pub index: u64,
    pub amount: u64,
}

impl Input {
    pub fn new(tx_hash: Hash<32>, index: u64, amount: u64) -> Self {
        Input {
            tx_hash,
            index,
            amount,
        }
    }
}

// which witness form will redeem an input at build time
#[derive(Debug, Clone, PartialEq)]
enum WitnessSlot {
    VKey(Hash<28>),
    Script(Hash<28>),
    Bootstrap(Box<ByronAddress>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderState {
    Empty,
    Accumulating,
    Balanced,
}

/// Accumulates transaction pieces and resolves them into a signed [`Tx`]
///
/// The builder is the only mutable entity of the core. Adding anything
/// after the fee was resolved invalidates the fee and drops the builder
/// back into the accumulating state.
pub struct TxBuilder {
    protocol: Protocol,
    state: BuilderState,
    inputs: Vec<(Input, WitnessSlot)>,
    outputs: Vec<TransactionOutput>,
    ttl: Option<u64>,
    validity_start: Option<u64>,
    certificates: Vec<Certificate>,
    withdrawals: BTreeMap<Vec<u8>, u64>,
    mint: BTreeMap<Hash<28>, BTreeMap<Vec<u8>, i64>>,
    auxiliary_data: Option<AuxiliaryData>,
    fee: Option<u64>,
    payment_keys: Vec<PrivateKey>,
    bootstrap_keys: Vec<Bip32PrivateKey>,
}

fn opt_if_empty<T>(value: Vec<T>) -> Option<MaybeIndefArray<T>> {
    if value.is_empty() {
        None
    } else {
        Some(MaybeIndefArray::Def(value))
    }
}

impl TxBuilder {
    pub fn new(protocol: Protocol) -> Self {
        TxBuilder {
            protocol,
            state: BuilderState::Empty,
            inputs: vec![],
            outputs: vec![],
            ttl: None,
            validity_start: None,
            certificates: vec![],
            withdrawals: BTreeMap::new(),
            mint: BTreeMap::new(),
            auxiliary_data: None,
            fee: None,
            payment_keys: vec![],
            bootstrap_keys: vec![],
        }
    }

    // any mutation invalidates a previously resolved fee
    fn touch(&mut self) {
        self.state = BuilderState::Accumulating;
        self.fee = None;
    }

    /// Appends an input redeemed by the key hashing to `hash`
    pub fn add_key_input(&mut self, hash: Hash<28>, input: Input) {
        self.inputs.push((input, WitnessSlot::VKey(hash)));
        self.touch();
    }

    /// Appends an input locked by a native script
    ///
    /// The slot is recorded so the input is visible for balancing, but any
    /// fee or build over it fails with [`TxBuilderError::ScriptsUnsupported`].
    pub fn add_script_input(&mut self, hash: Hash<28>, input: Input) {
        self.inputs.push((input, WitnessSlot::Script(hash)));
        self.touch();
    }

    /// Appends an input held by a legacy Byron address
    pub fn add_bootstrap_input(&mut self, address: ByronAddress, input: Input) {
        self.inputs
            .push((input, WitnessSlot::Bootstrap(Box::new(address))));
        self.touch();
    }

    /// Dispatches on the address variant and credential kind
    pub fn add_input(&mut self, address: &Address, input: Input) -> Result<(), TxBuilderError> {
        match address {
            Address::Shelley(x) => match x.payment() {
                ShelleyPaymentPart::Key(hash) => {
                    self.add_key_input(*hash, input);
                    Ok(())
                }
                ShelleyPaymentPart::Script(hash) => {
                    self.add_script_input(*hash, input);
                    Ok(())
                }
            },
            Address::Byron(x) => {
                self.add_bootstrap_input(x.clone(), input);
                Ok(())
            }
            Address::Stake(_) => Err(TxBuilderError::UnsupportedAddress),
        }
    }

    /// Appends an output, enforcing the ledger's minimum-lovelace rule
    pub fn add_output(&mut self, output: TransactionOutput) -> Result<(), TxBuilderError> {
        let required = min_ada_required(&output.amount, self.protocol.min_utxo_value);
        let provided = output.amount.coin();

        if provided < required {
            return Err(TxBuilderError::ValueTooSmall { required, provided });
        }

        self.outputs.push(output);
        self.touch();

        Ok(())
    }

    pub fn set_ttl(&mut self, slot: u64) {
        self.ttl = Some(slot);
        self.touch();
    }

    pub fn set_validity_start(&mut self, slot: u64) {
        self.validity_start = Some(slot);
        self.touch();
    }

    pub fn add_certificate(&mut self, certificate: Certificate) {
        self.certificates.push(certificate);
        self.touch();
    }

    /// Records a withdrawal for the given reward-account bytes
    pub fn add_withdrawal(&mut self, reward_account: Vec<u8>, amount: u64) {
        self.withdrawals.insert(reward_account, amount);
        self.touch();
    }

    /// Merges an asset quantity into the mint field
    pub fn add_mint_asset(&mut self, policy: Hash<28>, name: Vec<u8>, amount: i64) {
        self.mint
            .entry(policy)
            .or_default()
            .entry(name)
            .and_modify(|x| *x += amount)
            .or_insert(amount);
        self.touch();
    }

    /// Replaces the whole mint field
    pub fn set_mint(&mut self, mint: Mint) {
        self.mint.clear();

        for (policy, assets) in mint.iter() {
            let entry = self.mint.entry(*policy).or_default();
            for (name, amount) in assets.iter() {
                entry.insert(name.as_ref().to_vec(), *amount);
            }
        }

        self.touch();
    }

    /// Records auxiliary data; its hash lands in the body at build time
    pub fn set_metadata(&mut self, auxiliary_data: AuxiliaryData) {
        self.auxiliary_data = Some(auxiliary_data);
        self.touch();
    }

    pub fn set_fee(&mut self, fee: u64) {
        self.fee = Some(fee);
        self.state = BuilderState::Balanced;
    }

    pub fn fee(&self) -> Option<u64> {
        self.fee
    }

    /// Registers a payment signing key for vkey witness slots
    pub fn sign(&mut self, key: PrivateKey) {
        self.payment_keys.push(key);
    }

    /// Registers an HD key for bootstrap witness slots
    pub fn sign_bootstrap(&mut self, key: Bip32PrivateKey) {
        self.bootstrap_keys.push(key);
    }

    // deposits owed by registration certificates
    fn deposits(&self) -> Result<u64, TxBuilderError> {
        let mut total: u64 = 0;

        for certificate in &self.certificates {
            let deposit = match certificate {
                Certificate::StakeRegistration(_) => self.protocol.key_deposit,
                Certificate::PoolRegistration { .. } => self.protocol.pool_deposit,
                _ => 0,
            };

            total = total
                .checked_add(deposit)
                .ok_or(TxBuilderError::ArithmeticOverflow)?;
        }

        Ok(total)
    }

    // withdrawals plus deposit refunds of deregistrations and retirements
    fn implicit_input(&self) -> Result<u64, TxBuilderError> {
        let mut total: u64 = 0;

        for amount in self.withdrawals.values() {
            total = total
                .checked_add(*amount)
                .ok_or(TxBuilderError::ArithmeticOverflow)?;
        }

        for certificate in &self.certificates {
            let refund = match certificate {
                Certificate::StakeDeregistration(_) => self.protocol.key_deposit,
                Certificate::PoolRetirement(..) => self.protocol.pool_deposit,
                _ => 0,
            };

            total = total
                .checked_add(refund)
                .ok_or(TxBuilderError::ArithmeticOverflow)?;
        }

        Ok(total)
    }

    fn explicit_input(&self) -> Result<u64, TxBuilderError> {
        let mut total: u64 = 0;

        for (input, _) in &self.inputs {
            total = total
                .checked_add(input.amount)
                .ok_or(TxBuilderError::ArithmeticOverflow)?;
        }

        Ok(total)
    }

    fn explicit_output(&self) -> Result<u64, TxBuilderError> {
        let mut total: u64 = 0;

        for output in &self.outputs {
            total = total
                .checked_add(output.amount.coin())
                .ok_or(TxBuilderError::ArithmeticOverflow)?;
        }

        Ok(total)
    }

    fn to_body(&self, fee: u64) -> TransactionBody {
        let inputs = self
            .inputs
            .iter()
            .map(|(x, _)| TransactionInput {
                transaction_id: x.tx_hash,
                index: x.index,
            })
            .collect();

        let withdrawals = if self.withdrawals.is_empty() {
            None
        } else {
            // BTreeMap iteration gives the canonical byte order
            Some(KeyValuePairs::Def(
                self.withdrawals
                    .iter()
                    .map(|(account, amount)| (Bytes::from(account.clone()), *amount))
                    .collect(),
            ))
        };

        let mint: Option<Mint> = if self.mint.is_empty() {
            None
        } else {
            Some(KeyValuePairs::Def(
                self.mint
                    .iter()
                    .map(|(policy, assets)| {
                        (
                            *policy,
                            KeyValuePairs::Def(
                                assets
                                    .iter()
                                    .map(|(name, amount)| (Bytes::from(name.clone()), *amount))
                                    .collect(),
                            ),
                        )
                    })
                    .collect(),
            ))
        };

        let certificates = if self.certificates.is_empty() {
            None
        } else {
            Some(MaybeIndefArray::Def(self.certificates.clone()))
        };

        TransactionBody {
            inputs: MaybeIndefArray::Def(inputs),
            outputs: MaybeIndefArray::Def(self.outputs.clone()),
            fee,
            ttl: self.ttl,
            certificates,
            withdrawals,
            update: None,
            auxiliary_data_hash: self.auxiliary_data.as_ref().map(|x| x.compute_hash()),
            validity_interval_start: self.validity_start,
            mint,
        }
    }

    // zero-filled witnesses with the exact wire size of the real ones
    fn placeholder_witnesses(&self) -> Result<WitnessSet, TxBuilderError> {
        let mut key_hashes = BTreeSet::new();
        let mut bootstraps = vec![];

        for (_, slot) in &self.inputs {
            match slot {
                WitnessSlot::VKey(hash) => {
                    key_hashes.insert(*hash);
                }
                WitnessSlot::Script(_) => return Err(TxBuilderError::ScriptsUnsupported),
                WitnessSlot::Bootstrap(address) => bootstraps.push(address.as_ref()),
            }
        }

        let vkeys: Vec<_> = key_hashes
            .iter()
            .map(|_| VKeyWitness {
                vkey: vec![0; 32].into(),
                signature: vec![0; 64].into(),
            })
            .collect();

        let mut boots = vec![];
        for address in bootstraps {
            let payload = address
                .decode_payload()
                .map_err(|x| TxBuilderError::InvalidBootstrapAddress(x.to_string()))?;

            boots.push(BootstrapWitness {
                public_key: vec![0; 32].into(),
                signature: vec![0; 64].into(),
                chain_code: vec![0; 32].into(),
                attributes: minicbor::to_vec(&payload.attributes).unwrap().into(),
            });
        }

        Ok(WitnessSet {
            vkeywitness: opt_if_empty(vkeys),
            native_script: None,
            bootstrap_witness: opt_if_empty(boots),
        })
    }

    /// Prices the transaction as if it were fully witnessed right now
    pub fn min_fee(&self) -> Result<u64, TxBuilderError> {
        if self.inputs.is_empty() {
            return Err(TxBuilderError::NoInputs);
        }

        // the fee field influences its own encoded size; a 1-ada stand-in
        // has the same width as any realistic fee
        let fee_placeholder = self.fee.unwrap_or(1_000_000);

        let tx = Tx {
            transaction_body: self.to_body(fee_placeholder),
            transaction_witness_set: self.placeholder_witnesses()?,
            auxiliary_data: self.auxiliary_data.clone().into(),
            valid: None,
        };

        LinearFee::from(&self.protocol).min_fee(&tx)
    }

    /// Balances the transaction against `address`
    ///
    /// The residual of inputs over outputs, deposits and fee either becomes
    /// a change output (re-pricing the now larger transaction), is absorbed
    /// into the fee when below the change output's own minimum, or fails
    /// the balance entirely.
    pub fn add_change_if_needed(&mut self, address: &Address) -> Result<(), TxBuilderError> {
        if self.state == BuilderState::Balanced {
            return Err(TxBuilderError::FeeAlreadySet);
        }

        let fee_estimate = self.min_fee()?;

        let total_in = self
            .explicit_input()?
            .checked_add(self.implicit_input()?)
            .ok_or(TxBuilderError::ArithmeticOverflow)?;

        let outgoing = self
            .explicit_output()?
            .checked_add(self.deposits()?)
            .ok_or(TxBuilderError::ArithmeticOverflow)?;

        let committed = outgoing
            .checked_add(fee_estimate)
            .ok_or(TxBuilderError::ArithmeticOverflow)?;

        if total_in < committed {
            return Err(TxBuilderError::InsufficientFunds);
        }

        let residual = total_in - committed;

        if residual == 0 {
            self.fee = Some(fee_estimate);
            self.state = BuilderState::Balanced;
            return Ok(());
        }

        let change_minimum = min_ada_required(&Value::Coin(residual), self.protocol.min_utxo_value);

        if residual < change_minimum {
            // too small for an output of its own, the fee absorbs it
            self.fee = Some(fee_estimate + residual);
            self.state = BuilderState::Balanced;
            return Ok(());
        }

        self.outputs.push(TransactionOutput {
            address: address.to_vec().into(),
            amount: Value::Coin(residual),
        });

        let fee = self.min_fee()?;
        let fee_delta = fee - fee_estimate;

        match residual.checked_sub(fee_delta) {
            Some(change) if change >= change_minimum => {
                if let Some(output) = self.outputs.last_mut() {
                    output.amount = Value::Coin(change);
                }

                self.fee = Some(fee);
            }
            _ => {
                // the larger envelope ate the change below its minimum
                self.outputs.pop();
                self.fee = Some(total_in - outgoing);
            }
        }

        self.state = BuilderState::Balanced;

        Ok(())
    }

    fn bootstrap_witness(
        &self,
        address: &ByronAddress,
        body_hash: &Hash<32>,
    ) -> Result<BootstrapWitness, TxBuilderError> {
        let payload = address
            .decode_payload()
            .map_err(|x| TxBuilderError::InvalidBootstrapAddress(x.to_string()))?;

        // the redeeming key is the one whose spending data hashes back to
        // the address root under the address's own attributes
        let key = self
            .bootstrap_keys
            .iter()
            .find(|key| {
                let xpub = key.to_public().as_bytes();
                let spending_data = SpendingData::PubKey(xpub.into());
                let root = AddressPayload::hash_address_id(
                    &payload.addrtype,
                    &spending_data,
                    &payload.attributes,
                );

                root == payload.root
            })
            .ok_or_else(|| TxBuilderError::MissingBootstrapKey(address.to_base58()))?;

        let signature = key.sign(body_hash);

        Ok(BootstrapWitness {
            public_key: key.to_public().to_ed25519_pubkey().as_ref().to_vec().into(),
            signature: signature.as_ref().to_vec().into(),
            chain_code: key.chain_code().to_vec().into(),
            attributes: minicbor::to_vec(&payload.attributes).unwrap().into(),
        })
    }

    /// Hashes the body, signs every recorded witness slot and assembles
    /// the final transaction
    pub fn build(&self) -> Result<Tx, TxBuilderError> {
        if self.inputs.is_empty() {
            return Err(TxBuilderError::NoInputs);
        }

        let fee = self.fee.ok_or(TxBuilderError::FeeNotSet)?;

        let body = self.to_body(fee);
        let body_hash = body.compute_hash();

        let mut key_hashes = BTreeSet::new();
        let mut bootstraps = vec![];

        for (_, slot) in &self.inputs {
            match slot {
                WitnessSlot::VKey(hash) => {
                    key_hashes.insert(*hash);
                }
                WitnessSlot::Script(_) => return Err(TxBuilderError::ScriptsUnsupported),
                WitnessSlot::Bootstrap(address) => bootstraps.push(address.as_ref()),
            }
        }

        let mut vkey_witnesses = vec![];
        for hash in key_hashes {
            let key = self
                .payment_keys
                .iter()
                .find(|key| Hasher::<224>::hash(key.public_key().as_ref()) == hash)
                .ok_or_else(|| TxBuilderError::MissingSigningKey(hash.to_string()))?;

            let signature = key.sign(body_hash);

            vkey_witnesses.push(VKeyWitness {
                vkey: key.public_key().as_ref().to_vec().into(),
                signature: signature.as_ref().to_vec().into(),
            });
        }

        let mut bootstrap_witnesses = vec![];
        for address in bootstraps {
            bootstrap_witnesses.push(self.bootstrap_witness(address, &body_hash)?);
        }

        Ok(Tx {
            transaction_body: body,
            transaction_witness_set: WitnessSet {
                vkeywitness: opt_if_empty(vkey_witnesses),
                native_script: None,
                bootstrap_witness: opt_if_empty(bootstrap_witnesses),
            },
            auxiliary_data: self.auxiliary_data.clone().into(),
            valid: None,
        })
    }
}
