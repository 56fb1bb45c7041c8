use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use super::{did::BASE58_DID_PREFIX, KeyMaterial};

pub const ED25519_MAGIC_BYTES: &[u8] = &[0xed, 0x01];

pub fn bytes_to_ed25519_key(bytes: Vec<u8>) -> Result<Box<dyn KeyMaterial>> {
    let public_key = VerifyingKey::try_from(bytes.as_slice())
        .map_err(|error| anyhow!("Invalid Ed25519 public key: {}", error))?;

    Ok(Box::new(Ed25519KeyMaterial(public_key, None)))
}

/// Ed25519 key material. The private half is only present for keys derived
/// from a seed; keys resolved from a DID can verify but not sign.
#[derive(Clone)]
pub struct Ed25519KeyMaterial(pub VerifyingKey, Option<SigningKey>);

impl Ed25519KeyMaterial {
    /// Deterministically build a key pair from a 32-byte seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let private_key = SigningKey::from_bytes(seed);
        Ed25519KeyMaterial(private_key.verifying_key(), Some(private_key))
    }

    pub fn from_public_key(public_key: VerifyingKey) -> Self {
        Ed25519KeyMaterial(public_key, None)
    }

    pub fn can_sign(&self) -> bool {
        self.1.is_some()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl KeyMaterial for Ed25519KeyMaterial {
    fn get_jwt_algorithm_name(&self) -> String {
        "EdDSA".into()
    }

    fn public_key_bytes(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }

    async fn get_did(&self) -> Result<String> {
        let bytes = [ED25519_MAGIC_BYTES, self.0.as_bytes()].concat();
        Ok(format!(
            "{}{}",
            BASE58_DID_PREFIX,
            bs58::encode(bytes).into_string()
        ))
    }

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        match &self.1 {
            Some(private_key) => Ok(private_key.sign(payload).to_bytes().to_vec()),
            None => Err(anyhow!("No private key; cannot sign data")),
        }
    }

    async fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<()> {
        let signature = Signature::from_slice(signature)
            .map_err(|error| anyhow!("Invalid Ed25519 signature: {}", error))?;
        self.0
            .verify(payload, &signature)
            .map_err(|error| anyhow!("Signature mismatch: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::Ed25519KeyMaterial;
    use crate::crypto::KeyMaterial;

    #[tokio::test]
    async fn it_can_sign_and_verify_data() {
        let key = Ed25519KeyMaterial::from_seed(&[7u8; 32]);
        let data = &[0xdeu8, 0xad, 0xbe, 0xef];
        let signature = key.sign(data).await.unwrap();

        key.verify(data, &signature).await.unwrap();
    }

    #[tokio::test]
    async fn it_refuses_to_sign_without_a_private_key() {
        let key = Ed25519KeyMaterial::from_public_key(Ed25519KeyMaterial::from_seed(&[7u8; 32]).0);

        assert!(!key.can_sign());
        assert!(key.sign(b"data").await.is_err());
    }

    #[tokio::test]
    async fn it_rejects_a_signature_over_other_data() {
        let key = Ed25519KeyMaterial::from_seed(&[7u8; 32]);
        let signature = key.sign(b"one").await.unwrap();

        assert!(key.verify(b"two", &signature).await.is_err());
    }
}
