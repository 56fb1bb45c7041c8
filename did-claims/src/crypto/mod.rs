pub mod did;
pub mod ed25519;

use anyhow::Result;
use async_trait::async_trait;

#[cfg(not(target_arch = "wasm32"))]
pub trait KeyMaterialConditionalSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<K> KeyMaterialConditionalSendSync for K where K: KeyMaterial + Send + Sync {}

#[cfg(target_arch = "wasm32")]
pub trait KeyMaterialConditionalSendSync {}

#[cfg(target_arch = "wasm32")]
impl<K> KeyMaterialConditionalSendSync for K where K: KeyMaterial {}

/// This trait must be implemented by a struct that encapsulates cryptographic
/// keypair data. It is the minimum capability a [`crate::did::Did`] needs from
/// its key provider in order to sign claim sets, and that the resolver needs
/// in order to verify them.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait KeyMaterial: KeyMaterialConditionalSendSync {
    /// The JWS `alg` produced by the sign method of this implementation
    fn get_jwt_algorithm_name(&self) -> String;

    /// Raw public key bytes, as embedded in the key's DID
    fn public_key_bytes(&self) -> Vec<u8>;

    /// Provides a valid DID that can be used to resolve the key
    async fn get_did(&self) -> Result<String>;

    /// Sign some data with this key
    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>>;

    /// Verify the alleged signature of some data against this key
    async fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<()>;
}
