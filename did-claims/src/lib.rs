//! Derive a `did:key` identity from a wallet signature, sign claim sets with
//! it as compact JWS tokens, and verify those tokens back into their issuer
//! and payload.
//!
//! ```ignore
//! let digest = derive_seed(["correct-horse-battery-staple"]);
//! let signature = wallet.sign_message(&digest).await?;
//! let did = derive_did(&seed_from_signature(&signature)?).await?;
//!
//! let claims = build_claims(&[Claim::new("name", "alice")]);
//! let token = sign(&did, &claims).await?.serialize()?;
//! let decoded = decode(&did, &token).await?;
//! assert_eq!(decoded.issuer, did.id()?);
//! ```

pub mod claims;
pub mod crypto;
pub mod did;
pub mod error;
pub mod jws;
pub mod seed;
pub mod serde;
pub mod session;
pub mod wallet;

pub use claims::{build_claims, Claim, ClaimForm, Claims, MAX_CLAIMS};
pub use did::{decode, derive_did, sign, Did, VerifyOptions};
pub use error::{Error, Result};
pub use jws::{DagJws, DecodedToken, VerifiedJws};
pub use seed::{derive_seed, seed_from_signature};
pub use session::{Action, ConnectionState, Session, SessionConfig, Stage};
pub use wallet::{WalletBridge, WalletConnection, WalletEvent};

#[cfg(test)]
mod tests;
