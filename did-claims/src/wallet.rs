//! The wallet seam: whatever holds the user's account and signs on their
//! behalf. Connection protocols live behind implementations of
//! [`WalletBridge`]; this crate only consumes the capability.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::{Error, Result};

/// An established wallet connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletConnection {
    pub address: String,
    pub chain_id: u64,
}

/// Changes pushed by the wallet after it has connected
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletEvent {
    /// The selected accounts changed. The first one is the active account;
    /// an empty list means the wallet no longer exposes any.
    AccountsChanged(Vec<String>),
    /// The wallet switched networks. Chain ids arrive as hex (`0x89`) or decimal strings.
    ChainChanged(String),
    Disconnect,
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait WalletBridge {
    /// Connect to the wallet, prompting the user if needed
    async fn connect(&self) -> Result<WalletConnection>;

    /// Ask the wallet to sign a text message
    async fn sign_message(&self, message: &str) -> Result<Vec<u8>>;

    /// Subscribe to wallet events. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;
}

/// Parse a chain id given either as `0x`-prefixed hex or as decimal
pub fn parse_chain_id(chain_id: &str) -> Result<u64> {
    let chain_id = chain_id.trim();
    let parsed = match chain_id
        .strip_prefix("0x")
        .or_else(|| chain_id.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => chain_id.parse::<u64>(),
    };

    parsed.map_err(|error| Error::WalletConnection {
        reason: format!("Invalid chain id {chain_id:?}: {error}"),
    })
}
