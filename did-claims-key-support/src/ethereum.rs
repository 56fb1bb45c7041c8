//! Ethereum conventions a wallet signs and identifies itself with:
//! EIP-191 personal messages and EIP-55 checksummed addresses.

use k256::ecdsa::VerifyingKey;
use sha3::{Digest, Keccak256};

pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// The digest a wallet signs for `personal_sign`: the message prefixed with
/// the EIP-191 header and its byte length
pub fn hash_message(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message.as_bytes());
    hasher.finalize().into()
}

/// The 20-byte account address of a public key
pub fn public_key_to_address(public_key: &VerifyingKey) -> [u8; 20] {
    let point = public_key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Render an address as `0x`-prefixed mixed-case hex (EIP-55)
pub fn to_checksum_address(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let checksummed: String = lower
        .chars()
        .enumerate()
        .map(|(index, character)| {
            let byte = hash[index / 2];
            let nibble = if index % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if nibble >= 8 {
                character.to_ascii_uppercase()
            } else {
                character
            }
        })
        .collect();

    format!("0x{checksummed}")
}
