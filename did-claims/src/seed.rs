//! Seed derivation: passphrase digests and wallet signature truncation

use log::debug;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Length in bytes of an Ed25519 seed
pub const SEED_LENGTH: usize = 32;

/// Hash the inputs, in order, into a lowercase hex SHA-256 digest.
///
/// Each input is fed to the hasher as a separate update, which is equivalent
/// to hashing their concatenation: `["ab", "c"]` and `["a", "bc"]` produce
/// the same digest, while `["a", "b"]` and `["b", "a"]` do not.
pub fn derive_seed<I, S>(inputs: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();
    for input in inputs {
        hasher.update(input.as_ref());
    }
    hex::encode(hasher.finalize())
}

/// Take the first [`SEED_LENGTH`] bytes of a wallet signature as a key seed.
pub fn seed_from_signature(signature: &[u8]) -> Result<[u8; SEED_LENGTH]> {
    let mut seed = [0u8; SEED_LENGTH];
    match signature.get(..SEED_LENGTH) {
        Some(prefix) => {
            seed.copy_from_slice(prefix);
            debug!(
                "Derived seed from the first {} of {} signature bytes",
                SEED_LENGTH,
                signature.len()
            );
            Ok(seed)
        }
        None => Err(Error::SignatureTooShort {
            len: signature.len(),
        }),
    }
}
