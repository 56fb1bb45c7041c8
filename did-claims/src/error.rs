//! Error types for DID derivation and claim signing

use thiserror::Error;

use crate::session::{Action, Stage};

/// Every way a step of the DID claims flow can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The wallet refused or failed to connect
    #[error("Could not connect to the wallet: {reason}")]
    WalletConnection {
        /// Error message
        reason: String,
    },
    /// The wallet refused or failed to sign a message
    #[error("The wallet did not sign the message: {reason}")]
    WalletSigning {
        /// Error message
        reason: String,
    },
    /// A wallet signature is too short to seed an Ed25519 key
    #[error("Wallet signature is {len} bytes; at least 32 are needed to derive a seed")]
    SignatureTooShort {
        /// Length of the rejected signature
        len: usize,
    },
    /// The DID could not be authenticated against its resolver
    #[error("Could not authenticate the DID: {reason}")]
    Authentication {
        /// Error message
        reason: String,
    },
    /// The DID was used to sign before it was authenticated
    #[error("The DID has not been authenticated")]
    NotAuthenticated,
    /// The key provider failed to sign a claim set
    #[error("Could not sign the claims: {reason}")]
    ClaimSigning {
        /// Error message
        reason: String,
    },
    /// A token carries no signature to serialize
    #[error("The token has no signatures")]
    MissingSignature,
    /// A compact token could not be parsed
    #[error("Malformed token: {reason}")]
    MalformedToken {
        /// Error message
        reason: String,
    },
    /// The issuer of a token could not be resolved to key material
    #[error("Could not resolve {did}: {reason}")]
    Resolution {
        /// The DID that failed to resolve
        did: String,
        /// Error message
        reason: String,
    },
    /// The token signature does not match the issuer's key
    #[error("Invalid signature for issuer {issuer}: {reason}")]
    InvalidSignature {
        /// The resolved issuer
        issuer: String,
        /// Error message
        reason: String,
    },
    /// The token was issued by someone other than the expected issuer
    #[error("Expected the token to be issued by {expected}, but it was issued by {actual}")]
    IssuerMismatch {
        /// The issuer the caller asked for
        expected: String,
        /// The issuer named by the token
        actual: String,
    },
    /// An action was attempted from a stage that does not allow it
    #[error("Cannot {action} while {stage}")]
    InvalidTransition {
        /// The rejected action
        action: Action,
        /// The stage the session was in
        stage: Stage,
    },
}

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;
