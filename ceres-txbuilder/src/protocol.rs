use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProtocolVersion {
    pub major: u64,
    pub minor: u64,
}

/// Protocol parameters the builder consumes
///
/// Field names follow the JSON emitted by `cardano-cli query
/// protocol-parameters`, so a node-provided record deserializes directly.
/// Where the parameters come from is up to the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    /// The 'a' coefficient of the linear fee equation `a * size(tx) + b`
    pub tx_fee_per_byte: u64,

    /// The 'b' constant of the linear fee equation
    pub tx_fee_fixed: u64,

    /// The maximum transaction size in bytes
    pub max_tx_size: u64,

    /// Minimum lovelace a UTXO entry must hold
    #[serde(rename = "minUTxOValue")]
    pub min_utxo_value: u64,

    /// Deposit taken by stake-key registration certificates
    pub key_deposit: u64,

    /// Deposit taken by pool registration certificates
    pub pool_deposit: u64,

    pub protocol_version: ProtocolVersion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_cli_parameter_shape() {
        let raw = r#"{
            "txFeePerByte": 44,
            "txFeeFixed": 155381,
            "maxTxSize": 16384,
            "minUTxOValue": 1000000,
            "keyDeposit": 2000000,
            "poolDeposit": 500000000,
            "protocolVersion": { "major": 4, "minor": 0 }
        }"#;

        let protocol: Protocol = serde_json::from_str(raw).unwrap();

        assert_eq!(protocol.tx_fee_per_byte, 44);
        assert_eq!(protocol.tx_fee_fixed, 155381);
        assert_eq!(protocol.min_utxo_value, 1_000_000);
        assert_eq!(protocol.protocol_version.major, 4);
    }
}
