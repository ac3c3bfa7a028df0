use ceres_codec::Fragment;
use ceres_primitives::Tx;

use crate::{Protocol, TxBuilderError};

/// Linear fee policy: `fee = coefficient · size_bytes + constant`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearFee {
    /// Per-byte coefficient (the protocol's `a`)
    pub coefficient: u64,

    /// Fixed constant (the protocol's `b`)
    pub constant: u64,
}

impl LinearFee {
    pub fn new(coefficient: u64, constant: u64) -> Self {
        LinearFee {
            coefficient,
            constant,
        }
    }

    /// The fee owed by an encoded transaction of `size` bytes
    pub fn fee_for_size(&self, size: usize) -> Result<u64, TxBuilderError> {
        (size as u64)
            .checked_mul(self.coefficient)
            .and_then(|x| x.checked_add(self.constant))
            .ok_or(TxBuilderError::ArithmeticOverflow)
    }

    /// Measures the full `[body, witness_set, aux?]` envelope
    pub fn min_fee(&self, tx: &Tx) -> Result<u64, TxBuilderError> {
        let bytes = tx.encode_fragment().unwrap();

        self.fee_for_size(bytes.len())
    }
}

impl From<&Protocol> for LinearFee {
    fn from(protocol: &Protocol) -> Self {
        LinearFee::new(protocol.tx_fee_per_byte, protocol.tx_fee_fixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_is_linear_in_size() {
        let fee = LinearFee::new(500, 2);

        assert_eq!(fee.fee_for_size(0).unwrap(), 2);
        assert_eq!(fee.fee_for_size(10).unwrap(), 5002);
        assert_eq!(fee.fee_for_size(188).unwrap(), 94002);
    }

    #[test]
    fn fee_overflow_is_reported() {
        let fee = LinearFee::new(u64::MAX, 0);

        assert!(matches!(
            fee.fee_for_size(2),
            Err(TxBuilderError::ArithmeticOverflow)
        ));
    }
}
