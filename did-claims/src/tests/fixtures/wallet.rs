use std::sync::Mutex;

use async_trait::async_trait;
use sha2::{Digest, Sha512};
use tokio::sync::broadcast;

use crate::{
    error::{Error, Result},
    wallet::{WalletBridge, WalletConnection, WalletEvent},
};

pub const MOCK_ADDRESS: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";
pub const MOCK_EVENT_CAPACITY: usize = 16;

/// A wallet whose "signature" over a message is the SHA-512 of the message:
/// 64 deterministic bytes, which is all the DID derivation cares about.
pub struct MockWallet {
    events: Mutex<Option<broadcast::Sender<WalletEvent>>>,
    address: String,
    chain_id: u64,
    refuse_connection: bool,
    refuse_signing: bool,
    signature_length: usize,
}

impl Default for MockWallet {
    fn default() -> Self {
        let (events, _) = broadcast::channel(MOCK_EVENT_CAPACITY);
        MockWallet {
            events: Mutex::new(Some(events)),
            address: MOCK_ADDRESS.into(),
            chain_id: 1,
            refuse_connection: false,
            refuse_signing: false,
            signature_length: 64,
        }
    }
}

impl MockWallet {
    pub fn with_address(mut self, address: &str) -> Self {
        self.address = address.into();
        self
    }

    pub fn refusing_connection(mut self) -> Self {
        self.refuse_connection = true;
        self
    }

    pub fn refusing_signatures(mut self) -> Self {
        self.refuse_signing = true;
        self
    }

    /// Truncate every signature to `length` bytes
    pub fn with_signature_length(mut self, length: usize) -> Self {
        self.signature_length = length;
        self
    }

    fn events(&self) -> Option<broadcast::Sender<WalletEvent>> {
        self.events.lock().unwrap().clone()
    }

    pub fn emit(&self, event: WalletEvent) {
        if let Some(events) = self.events() {
            let _ = events.send(event);
        }
    }

    /// A handle on the event channel that outlives the wallet's owner
    pub fn sender(&self) -> broadcast::Sender<WalletEvent> {
        self.events().unwrap()
    }

    /// Drop the wallet's own sender, closing the stream once no other
    /// handles remain
    pub fn close_events(&self) {
        self.events.lock().unwrap().take();
    }

    pub fn subscriber_count(&self) -> usize {
        self.events()
            .map(|events| events.receiver_count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl WalletBridge for MockWallet {
    async fn connect(&self) -> Result<WalletConnection> {
        if self.refuse_connection {
            return Err(Error::WalletConnection {
                reason: "User rejected the request".into(),
            });
        }

        Ok(WalletConnection {
            address: self.address.clone(),
            chain_id: self.chain_id,
        })
    }

    async fn sign_message(&self, message: &str) -> Result<Vec<u8>> {
        if self.refuse_signing {
            return Err(Error::WalletSigning {
                reason: "User denied message signature".into(),
            });
        }

        let mut signature = Sha512::digest(message.as_bytes()).to_vec();
        signature.truncate(self.signature_length);
        Ok(signature)
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        match self.events() {
            Some(events) => events.subscribe(),
            None => broadcast::channel(MOCK_EVENT_CAPACITY).1,
        }
    }
}
