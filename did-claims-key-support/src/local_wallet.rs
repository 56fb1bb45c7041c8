use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use did_claims::{
    error::Error,
    wallet::{WalletBridge, WalletConnection, WalletEvent},
};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use tokio::sync::broadcast;

use crate::ethereum::{hash_message, public_key_to_address, to_checksum_address};

/// Recovery ids are offset by 27 in the `v` byte of a personal signature
const V_OFFSET: u8 = 27;
const EVENT_CAPACITY: usize = 16;
const MAINNET: u64 = 1;

/// A secp256k1 wallet held in process. It signs personal messages the way a
/// browser wallet does and can announce chain switches and disconnects to
/// its subscribers.
pub struct LocalWallet {
    signing_key: SigningKey,
    address: String,
    chain_id: AtomicU64,
    events: broadcast::Sender<WalletEvent>,
}

impl LocalWallet {
    pub fn new(signing_key: SigningKey) -> Self {
        let address = to_checksum_address(&public_key_to_address(signing_key.verifying_key()));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        LocalWallet {
            signing_key,
            address,
            chain_id: AtomicU64::new(MAINNET),
            events,
        }
    }

    pub fn random() -> Self {
        LocalWallet::new(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Load a wallet from a hex private key, with or without `0x`
    pub fn from_hex(private_key: &str) -> Result<Self> {
        let private_key = private_key.trim();
        let bytes = hex::decode(private_key.strip_prefix("0x").unwrap_or(private_key))?;
        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|error| anyhow!("Invalid secp256k1 private key: {}", error))?;

        Ok(LocalWallet::new(signing_key))
    }

    pub fn with_chain_id(self, chain_id: u64) -> Self {
        self.chain_id.store(chain_id, Ordering::SeqCst);
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id.load(Ordering::SeqCst)
    }

    /// Move to another chain and tell subscribers about it
    pub fn switch_chain(&self, chain_id: u64) {
        self.chain_id.store(chain_id, Ordering::SeqCst);
        self.emit(WalletEvent::ChainChanged(format!("{chain_id:#x}")));
    }

    pub fn disconnect(&self) {
        self.emit(WalletEvent::Disconnect);
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn emit(&self, event: WalletEvent) {
        if self.events.send(event).is_err() {
            debug!("No subscribers for wallet event");
        }
    }

    /// Sign a personal message, returning `r || s || v`
    pub fn sign_personal_message(&self, message: &str) -> Result<[u8; 65]> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&hash_message(message))
            .map_err(|error| anyhow!("Could not sign message: {}", error))?;

        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = recovery_id.to_byte() + V_OFFSET;
        Ok(bytes)
    }
}

/// Recover the checksummed address that produced a personal signature
pub fn recover_address(message: &str, signature: &[u8]) -> Result<String> {
    if signature.len() != 65 {
        return Err(anyhow!(
            "Expected a 65 byte signature, found {} bytes",
            signature.len()
        ));
    }

    let recovery_byte = signature[64].checked_sub(V_OFFSET).unwrap_or(signature[64]);
    let recovery_id = RecoveryId::from_byte(recovery_byte)
        .ok_or_else(|| anyhow!("Invalid recovery byte {}", signature[64]))?;
    let signature = Signature::from_slice(&signature[..64])?;

    let public_key =
        VerifyingKey::recover_from_prehash(&hash_message(message), &signature, recovery_id)?;

    Ok(to_checksum_address(&public_key_to_address(&public_key)))
}

#[async_trait]
impl WalletBridge for LocalWallet {
    async fn connect(&self) -> did_claims::Result<WalletConnection> {
        info!("Connecting local wallet {}", self.address);

        Ok(WalletConnection {
            address: self.address.clone(),
            chain_id: self.chain_id(),
        })
    }

    async fn sign_message(&self, message: &str) -> did_claims::Result<Vec<u8>> {
        self.sign_personal_message(message)
            .map(|signature| signature.to_vec())
            .map_err(|error| Error::WalletSigning {
                reason: format!("{error:#}"),
            })
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::{recover_address, LocalWallet};
    use did_claims::wallet::{WalletBridge, WalletEvent};

    const KEY_ONE: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn it_derives_the_checksummed_address() {
        let wallet = LocalWallet::from_hex(KEY_ONE).unwrap();

        assert_eq!(wallet.address(), "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");
    }

    #[test]
    fn it_rejects_invalid_private_keys() {
        assert!(LocalWallet::from_hex("0x00").is_err());
        assert!(LocalWallet::from_hex("not hex").is_err());
        assert!(LocalWallet::from_hex(&format!("0x{}", "00".repeat(32))).is_err());
    }

    #[tokio::test]
    async fn it_signs_messages_its_address_can_be_recovered_from() {
        let wallet = LocalWallet::random();
        let signature = wallet.sign_message("a message").await.unwrap();

        assert_eq!(signature.len(), 65);
        assert!(signature[64] == 27 || signature[64] == 28);
        assert_eq!(
            recover_address("a message", &signature).unwrap(),
            wallet.address()
        );
        assert_ne!(
            recover_address("another message", &signature).ok().as_deref(),
            Some(wallet.address())
        );
    }

    #[tokio::test]
    async fn it_signs_deterministically() {
        let wallet = LocalWallet::from_hex(KEY_ONE).unwrap();

        assert_eq!(
            wallet.sign_message("same").await.unwrap(),
            wallet.sign_message("same").await.unwrap()
        );
    }

    #[tokio::test]
    async fn it_announces_chain_switches() {
        let wallet = LocalWallet::random().with_chain_id(314);
        let mut events = wallet.subscribe();

        assert_eq!(wallet.connect().await.unwrap().chain_id, 314);

        wallet.switch_chain(137);
        wallet.disconnect();

        assert_eq!(
            events.recv().await.unwrap(),
            WalletEvent::ChainChanged("0x89".into())
        );
        assert_eq!(events.recv().await.unwrap(), WalletEvent::Disconnect);
        assert_eq!(wallet.chain_id(), 137);
    }
}
