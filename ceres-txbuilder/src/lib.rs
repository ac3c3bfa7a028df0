//! Assemble, price and sign Cardano transactions
//!
//! The [`TxBuilder`] accumulates resolved inputs, outputs and the rest of
//! the body fields, resolves the linear fee against the ambient protocol
//! parameters, and produces a signed transaction ready for submission
//! through a [`Node`] port.

mod builder;
mod fee;
mod min_ada;
mod node;
mod protocol;

pub use builder::{Input, TxBuilder};
pub use fee::LinearFee;
pub use min_ada::min_ada_required;
pub use node::{NetworkTip, Node};
pub use protocol::{Protocol, ProtocolVersion};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TxBuilderError {
    /// Fee or balance requested before any input was added
    #[error("Transaction has no inputs")]
    NoInputs,
    /// Output carries less lovelace than the ledger minimum for its size
    #[error("Output of {provided} is below the required minimum of {required}")]
    ValueTooSmall { required: u64, provided: u64 },
    /// Inputs don't cover outputs, deposits and fee
    #[error("Inputs are too small to cover outputs, deposits and fee")]
    InsufficientFunds,
    /// Build attempted before the fee was resolved
    #[error("Fee was not set before building")]
    FeeNotSet,
    /// Fee already resolved, balancing would be stale
    #[error("Fee is already set for this transaction")]
    FeeAlreadySet,
    /// Coin arithmetic left the u64 range
    #[error("Coin arithmetic overflowed")]
    ArithmeticOverflow,
    /// Script-locked inputs are out of scope for this builder
    #[error("Script inputs are not supported by this builder")]
    ScriptsUnsupported,
    /// No registered signing key matches a recorded witness slot
    #[error("No signing key provided for key hash {0}")]
    MissingSigningKey(String),
    /// No registered HD key redeems a bootstrap input
    #[error("No signing key provided for bootstrap address {0}")]
    MissingBootstrapKey(String),
    /// Stake addresses cannot fund inputs
    #[error("Address kind cannot fund an input")]
    UnsupportedAddress,
    /// Bootstrap input address failed to re-decode
    #[error("Invalid bootstrap address: {0}")]
    InvalidBootstrapAddress(String),
}
