use anyhow::{Context, Result};
use clap::Args;
use did_claims::SessionConfig;
use did_claims_key_support::LocalWallet;
use log::warn;
use url::Url;

/// Settings shared by every command. Each can come from the command line,
/// the environment, or a `.env` file.
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Read-only JSON-RPC endpoint, used when no wallet is connected
    #[arg(long, env = "ETH_RPC_URL", global = true)]
    pub rpc_url: Option<Url>,

    /// Hex secp256k1 private key of the wallet that signs the seed digest
    #[arg(long, env = "DID_CLAIMS_WALLET_KEY", global = true, hide_env_values = true)]
    pub wallet_key: Option<String>,

    /// Mix the wallet address into the seed digest
    #[arg(long, env = "DID_CLAIMS_BIND_ADDRESS", global = true)]
    pub bind_address: bool,
}

impl Config {
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            bind_address: self.bind_address,
        }
    }

    /// The wallet named by `wallet_key`, or a throwaway one when unset
    pub fn wallet(&self) -> Result<LocalWallet> {
        match &self.wallet_key {
            Some(key) => {
                LocalWallet::from_hex(key).context("Could not load DID_CLAIMS_WALLET_KEY")
            }
            None => {
                warn!(
                    "No wallet key configured; using an ephemeral wallet, \
                     so the DID will not be reproducible"
                );
                Ok(LocalWallet::random())
            }
        }
    }

    pub fn read_endpoint(&self) -> Option<&Url> {
        self.rpc_url.as_ref()
    }
}
