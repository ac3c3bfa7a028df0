use ceres_addresses::Address;

use crate::{builder::Input, protocol::Protocol};

/// Where the chain currently ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkTip {
    pub slot: u64,
    pub epoch: u64,
    pub block: u64,
}

/// Synchronous port to a Cardano node or node-like service
///
/// The core never performs I/O itself; implementations (HTTP explorers,
/// local node wrappers) live outside and may be concurrent internally, as
/// long as they present this blocking interface.
pub trait Node {
    type Error;

    /// Unspent transaction outputs sitting at the given address
    fn utxos(&self, address: &Address) -> Result<Vec<Input>, Self::Error>;

    /// Protocol parameters of the current era
    fn protocol_parameters(&self) -> Result<Protocol, Self::Error>;

    /// Tip of the chain, for validity windows
    fn query_tip(&self) -> Result<NetworkTip, Self::Error>;

    /// Submits encoded transaction bytes, returning the tx hash as hex
    fn submit(&self, tx_bytes: &[u8]) -> Result<String, Self::Error>;
}
