//! The page-level flow as an explicit state machine:
//! `Disconnected -> Connected -> DidDerived -> {TokenCreated <-> TokenDecoded}`.

use log::{debug, warn};
use strum_macros::{Display, EnumIter};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::{
    claims::ClaimForm,
    did::{derive_did, Did},
    error::{Error, Result},
    jws::DecodedToken,
    seed::{derive_seed, seed_from_signature},
    wallet::{parse_chain_id, WalletBridge, WalletConnection, WalletEvent},
};

/// Where the session stands with respect to its wallet
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected { address: String, chain_id: u64 },
    Error { reason: String },
}

/// Progress through the flow
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum Stage {
    #[strum(serialize = "disconnected")]
    Disconnected,
    #[strum(serialize = "connected")]
    Connected,
    #[strum(serialize = "holding a derived DID")]
    DidDerived,
    #[strum(serialize = "holding a created token")]
    TokenCreated,
    #[strum(serialize = "holding a decoded token")]
    TokenDecoded,
}

/// User actions that move the session between stages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum Action {
    #[strum(serialize = "connect")]
    Connect,
    #[strum(serialize = "derive a DID")]
    DeriveDid,
    #[strum(serialize = "sign claims")]
    SignClaims,
    #[strum(serialize = "decode a token")]
    Decode,
    #[strum(serialize = "disconnect")]
    Disconnect,
}

impl Stage {
    /// The stage reached by taking `action` from this one, if it is allowed
    pub fn on(self, action: Action) -> Option<Stage> {
        use Action::*;
        use Stage::*;

        match (self, action) {
            (_, Disconnect) => Some(Disconnected),
            (Disconnected, Connect) => Some(Connected),
            (Connected, DeriveDid) => Some(DidDerived),
            (DidDerived | TokenCreated | TokenDecoded, SignClaims) => Some(TokenCreated),
            (DidDerived | TokenCreated | TokenDecoded, Decode) => Some(TokenDecoded),
            _ => None,
        }
    }

    /// Whether a DID is available in this stage
    pub fn has_did(self) -> bool {
        matches!(
            self,
            Stage::DidDerived | Stage::TokenCreated | Stage::TokenDecoded
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    /// Mix the wallet address into the seed digest after the passphrase, so
    /// the same passphrase yields different DIDs for different accounts
    pub bind_address: bool,
}

/// A single user's pass through the flow. The session owns its wallet and
/// the wallet's event subscription; the subscription is released when the
/// session disconnects or is dropped.
pub struct Session<W>
where
    W: WalletBridge,
{
    wallet: W,
    config: SessionConfig,
    connection: ConnectionState,
    events: Option<broadcast::Receiver<WalletEvent>>,
    stage: Stage,
    did: Option<Did>,
    token: Option<String>,
    decoded: Option<DecodedToken>,
}

impl<W> Session<W>
where
    W: WalletBridge,
{
    pub fn new(wallet: W, config: SessionConfig) -> Self {
        Session {
            wallet,
            config,
            connection: ConnectionState::Disconnected,
            events: None,
            stage: Stage::Disconnected,
            did: None,
            token: None,
            decoded: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn did(&self) -> Option<&Did> {
        self.did.as_ref()
    }

    /// The most recently created compact token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn decoded(&self) -> Option<&DecodedToken> {
        self.decoded.as_ref()
    }

    pub fn is_subscribed(&self) -> bool {
        self.events.is_some()
    }

    fn next_stage(&self, action: Action) -> Result<Stage> {
        self.stage.on(action).ok_or(Error::InvalidTransition {
            action,
            stage: self.stage,
        })
    }

    fn address(&self) -> Option<&str> {
        match &self.connection {
            ConnectionState::Connected { address, .. } => Some(address.as_str()),
            _ => None,
        }
    }

    /// Connect to the wallet and start listening to its events
    pub async fn connect(&mut self) -> Result<WalletConnection> {
        let next = self.next_stage(Action::Connect)?;
        self.connection = ConnectionState::Connecting;

        match self.wallet.connect().await {
            Ok(connection) => {
                debug!(
                    "Connected to {} on chain {}",
                    connection.address, connection.chain_id
                );
                self.events = Some(self.wallet.subscribe());
                self.connection = ConnectionState::Connected {
                    address: connection.address.clone(),
                    chain_id: connection.chain_id,
                };
                self.stage = next;
                Ok(connection)
            }
            Err(error) => {
                warn!("Wallet connection failed: {}", error);
                self.connection = ConnectionState::Error {
                    reason: error.to_string(),
                };
                Err(error)
            }
        }
    }

    /// Have the wallet sign the passphrase digest and derive a DID from the
    /// signature
    pub async fn derive_did(&mut self, passphrase: &str) -> Result<&Did> {
        let next = self.next_stage(Action::DeriveDid)?;

        let mut inputs = vec![passphrase];
        if self.config.bind_address {
            if let Some(address) = self.address() {
                inputs.push(address);
            }
        }
        let digest = derive_seed(inputs);

        let signature = self.wallet.sign_message(&digest).await?;
        let seed = seed_from_signature(&signature)?;
        let did = derive_did(&seed).await?;

        self.stage = next;
        Ok(self.did.insert(did))
    }

    /// Sign the complete entries of a claim form and keep the compact token
    pub async fn sign_claims(&mut self, form: &ClaimForm) -> Result<&str> {
        let next = self.next_stage(Action::SignClaims)?;
        let did = self.did.as_ref().ok_or(Error::NotAuthenticated)?;

        let claims = form.claims();
        debug!("Signing {} claim(s)", claims.len());
        let compact = did.create_jws(&claims).await?.serialize()?;

        self.stage = next;
        Ok(self.token.insert(compact).as_str())
    }

    /// Verify a compact token and keep its issuer and payload
    pub async fn decode(&mut self, compact: &str) -> Result<&DecodedToken> {
        let next = self.next_stage(Action::Decode)?;
        let did = self.did.as_ref().ok_or(Error::NotAuthenticated)?;

        let decoded = crate::did::decode(did, compact).await?;

        self.stage = next;
        Ok(self.decoded.insert(decoded))
    }

    /// Drop every piece of session state and release the wallet subscription
    pub fn disconnect(&mut self) {
        self.events = None;
        self.did = None;
        self.token = None;
        self.decoded = None;
        self.connection = ConnectionState::Disconnected;
        self.stage = Stage::Disconnected;
    }

    /// Apply every wallet event received since the last call, without
    /// waiting. Returns the number of events applied.
    pub fn sync_events(&mut self) -> usize {
        let mut applied = 0;

        loop {
            let received = match self.events.as_mut() {
                Some(events) => events.try_recv(),
                None => break,
            };

            match received {
                Ok(event) => {
                    self.apply_event(event);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Missed {} wallet event(s)", skipped);
                }
                Err(TryRecvError::Closed) => {
                    warn!("Wallet event stream closed");
                    self.disconnect();
                    break;
                }
            }
        }

        applied
    }

    fn apply_event(&mut self, event: WalletEvent) {
        debug!("Wallet event: {:?}", event);

        match event {
            WalletEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                Some(account) => {
                    if let ConnectionState::Connected { address, .. } = &mut self.connection {
                        *address = account;
                    }
                }
                None => self.disconnect(),
            },
            WalletEvent::ChainChanged(chain) => match parse_chain_id(&chain) {
                Ok(id) => {
                    if let ConnectionState::Connected { chain_id, .. } = &mut self.connection {
                        *chain_id = id;
                    }
                }
                Err(error) => warn!("Ignoring chain change: {}", error),
            },
            WalletEvent::Disconnect => self.disconnect(),
        }
    }
}
