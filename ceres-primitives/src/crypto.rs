//! Digests of ledger entities

use crate::{AuxiliaryData, ComputeHash, TransactionBody};
use ceres_crypto::hash::{Hash, Hasher};

impl ComputeHash<32> for TransactionBody {
    fn compute_hash(&self) -> Hash<32> {
        Hasher::<256>::hash_cbor(self)
    }
}

impl ComputeHash<32> for AuxiliaryData {
    fn compute_hash(&self) -> Hash<32> {
        Hasher::<256>::hash_cbor(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ComputeHash, MaybeIndefArray, TransactionBody, TransactionInput, Value};
    use ceres_crypto::hash::Hash;
    use std::str::FromStr;

    #[test]
    fn body_hash_is_blake2b_256_of_cbor() {
        let body = TransactionBody {
            inputs: MaybeIndefArray::Def(vec![TransactionInput {
                transaction_id: Hash::<32>::from_str(
                    "3b40265111d8bb3c3c608d95b3a0bf83461ace32d79336579a1939b3aad1c0b7",
                )
                .unwrap(),
                index: 0,
            }]),
            outputs: MaybeIndefArray::Def(vec![crate::TransactionOutput {
                address: hex::decode(
                    "611c616f1acb460668a9b2f123c80372c2adad3583b9c6cd2b1deeed1c",
                )
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

        let direct = body.compute_hash();

        let encoded = ceres_codec::minicbor::to_vec(&body).unwrap();
        let buffered = ceres_crypto::hash::Hasher::<256>::hash(&encoded);

        assert_eq!(direct, buffered);
    }
}
