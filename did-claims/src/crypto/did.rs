use std::collections::BTreeMap;

use anyhow::{anyhow, Result};

use super::{ed25519::bytes_to_ed25519_key, KeyMaterial};

pub type DidPrefix = [u8; 2];
pub type BytesToKey = fn(Vec<u8>) -> Result<Box<dyn KeyMaterial>>;
pub type KeyConstructors = BTreeMap<DidPrefix, BytesToKey>;
pub type KeyConstructorSlice = [(DidPrefix, BytesToKey)];

pub const BASE58_DID_PREFIX: &str = "did:key:z";

pub const SUPPORTED_KEYS: &KeyConstructorSlice = &[
    // https://github.com/multiformats/multicodec/blob/e9ecf587558964715054a0afcc01f7ace220952c/table.csv#L94
    ([0xed, 0x01], bytes_to_ed25519_key),
];

/// A parser that is able to convert from a DID string into a corresponding
/// [`KeyMaterial`] implementation. The parser extracts the signature magic
/// bytes from a given DID and tries to match them to a corresponding
/// constructor function that produces the public half of the key.
///
/// This is the `did:key` resolver: the DID document is implied by the key, so
/// resolution never leaves the process.
#[derive(Clone)]
pub struct DidParser {
    key_constructors: KeyConstructors,
}

impl Default for DidParser {
    fn default() -> Self {
        DidParser::new(SUPPORTED_KEYS)
    }
}

impl DidParser {
    pub fn new(key_constructor_slice: &KeyConstructorSlice) -> Self {
        let mut key_constructors = BTreeMap::new();
        for pair in key_constructor_slice {
            key_constructors.insert(pair.0, pair.1);
        }
        DidParser { key_constructors }
    }

    /// Resolve a DID (or a DID URL such as a JWS `kid`) to its key material.
    /// Any `#fragment` is ignored.
    pub fn parse(&self, did: &str) -> Result<Box<dyn KeyMaterial>> {
        let did = strip_fragment(did);
        if !did.starts_with(BASE58_DID_PREFIX) {
            return Err(anyhow!("Not a DID: {}", did));
        }

        let did_bytes = bs58::decode(&did[BASE58_DID_PREFIX.len()..]).into_vec()?;
        if did_bytes.len() < 2 {
            return Err(anyhow!("DID is too short to carry a key: {}", did));
        }
        let magic_bytes = &did_bytes[0..2];

        match self.key_constructors.get(magic_bytes) {
            Some(ctor) => ctor(Vec::from(&did_bytes[2..])),
            None => Err(anyhow!("Unrecognized magic bytes: {:?}", magic_bytes)),
        }
    }
}

/// The DID part of a DID URL
pub fn strip_fragment(did_url: &str) -> &str {
    match did_url.split_once('#') {
        Some((did, _)) => did,
        None => did_url,
    }
}
