use anyhow::Result;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{de::DeserializeOwned, Serialize};

/// Helper trait to encode structs as base64url JSON as part of creating a JWS
pub trait Base64Encode: Serialize {
    fn jwt_base64_encode(&self) -> Result<String> {
        Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(self)?))
    }
}

impl<T> Base64Encode for T where T: Serialize {}

/// Helper trait to decode base64url JSON segments of a JWS
pub trait Base64Decode: DeserializeOwned {
    fn jwt_base64_decode(segment: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(segment)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl<T> Base64Decode for T where T: DeserializeOwned {}
